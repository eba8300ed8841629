//! Move validation. Pure predicates over a session snapshot.
//!
//! The boolean predicates answer "could the active player do this?"; the
//! `check_*` functions additionally name the reason when the answer is no.
//! Nothing here mutates a session.

use ludo_protocol::PlayerId;

use crate::board::{FINISH, HOME, TOKENS_PER_PLAYER};
use crate::{GameSession, GameState, RuleError};

/// Returns `true` if the active player may bring `token` out of the yard.
pub fn can_bring_into_play(session: &GameSession, token: usize) -> bool {
    session.state() == GameState::Move
        && session.current_roll() == 6
        && token < TOKENS_PER_PLAYER
        && session.tokens(session.current_player())[token] == HOME
}

/// Returns `true` if the active player may advance `token` by the roll.
pub fn can_move_token(session: &GameSession, token: usize) -> bool {
    session.state() == GameState::Move
        && token < TOKENS_PER_PLAYER
        && fits(session.tokens(session.current_player())[token], session.current_roll())
}

/// Returns `true` if the active player has anything to do with the roll.
pub fn has_any_legal_move(session: &GameSession) -> bool {
    (0..TOKENS_PER_PLAYER)
        .any(|token| can_bring_into_play(session, token) || can_move_token(session, token))
}

/// Token indices the active player may act on, in order.
pub fn legal_tokens(session: &GameSession) -> Vec<usize> {
    (0..TOKENS_PER_PLAYER)
        .filter(|token| can_bring_into_play(session, *token) || can_move_token(session, *token))
        .collect()
}

/// Whether `roll` would leave a player owning `tokens` any legal action.
/// Used while the dice value is being resolved, before it is recorded.
pub(crate) fn roll_has_legal_move(tokens: &[i8; TOKENS_PER_PLAYER], roll: u8) -> bool {
    tokens
        .iter()
        .any(|position| (*position == HOME && roll == 6) || fits(*position, roll))
}

/// Widened so an unverified snapshot can't overflow.
fn fits(position: i8, roll: u8) -> bool {
    position >= 0 && i16::from(position) + i16::from(roll) <= i16::from(FINISH)
}

/// Full check for bringing a token into play, with the precise error.
///
/// Precedence: wrong state, then wrong player, then the token itself.
pub fn check_bring_into_play(
    session: &GameSession,
    player: &PlayerId,
    token: usize,
) -> Result<(), RuleError> {
    check_turn(session, player, "bring a token into play")?;
    let position = token_position(session, token)?;
    if session.current_roll() != 6 {
        return Err(RuleError::IllegalMove {
            token,
            reason: format!("entering needs a six, rolled {}", session.current_roll()),
        });
    }
    if position != HOME {
        return Err(RuleError::IllegalMove {
            token,
            reason: format!("already in play at {position}"),
        });
    }
    Ok(())
}

/// Full check for advancing a token, with the precise error.
pub fn check_move_token(
    session: &GameSession,
    player: &PlayerId,
    token: usize,
) -> Result<(), RuleError> {
    check_turn(session, player, "move a token")?;
    let position = token_position(session, token)?;
    if position == HOME {
        return Err(RuleError::IllegalMove {
            token,
            reason: "still in the yard".into(),
        });
    }
    if !fits(position, session.current_roll()) {
        return Err(RuleError::IllegalMove {
            token,
            reason: format!(
                "{position} + {} overshoots {FINISH}",
                session.current_roll()
            ),
        });
    }
    Ok(())
}

fn check_turn(
    session: &GameSession,
    player: &PlayerId,
    action: &'static str,
) -> Result<(), RuleError> {
    if session.state() != GameState::Move {
        return Err(RuleError::InvalidTransition {
            action,
            state: session.state(),
        });
    }
    if session.active_player() != Some(player) {
        return Err(RuleError::NotYourTurn(player.clone()));
    }
    Ok(())
}

fn token_position(session: &GameSession, token: usize) -> Result<i8, RuleError> {
    session
        .tokens(session.current_player())
        .get(token)
        .copied()
        .ok_or_else(|| RuleError::IllegalMove {
            token,
            reason: format!("tokens are numbered 0..{TOKENS_PER_PLAYER}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludo_protocol::Color;

    /// Two players, Red to move with `roll`, Red's tokens at `red`.
    fn moving(red: [i8; 4], roll: u8) -> GameSession {
        let mut session = GameSession::create(2, PlayerId::new("red"), Color::Red).unwrap();
        session.players[Color::Yellow.index()] = Some(PlayerId::new("yellow"));
        session.token_positions[Color::Red.index()] = red;
        session.current_player = Color::Red;
        session.state = GameState::Move;
        session.current_roll = roll;
        session
    }

    #[test]
    fn test_bring_into_play_needs_six_and_yard_token() {
        let session = moving([-1, 5, -1, -1], 6);
        assert!(can_bring_into_play(&session, 0));
        assert!(!can_bring_into_play(&session, 1));
        assert!(!can_bring_into_play(&moving([-1, -1, -1, -1], 5), 0));
    }

    #[test]
    fn test_move_token_respects_finish() {
        let session = moving([53, 51, 56, -1], 3);
        assert!(can_move_token(&session, 0)); // exactly 56
        assert!(can_move_token(&session, 1));
        assert!(!can_move_token(&session, 2)); // finished
        assert!(!can_move_token(&session, 3)); // yard
        assert!(!can_move_token(&moving([53, -1, -1, -1], 5), 0));
    }

    #[test]
    fn test_predicates_false_outside_move() {
        let mut session = moving([10, -1, -1, -1], 6);
        session.state = GameState::RollDice;
        assert!(!can_move_token(&session, 0));
        assert!(!can_bring_into_play(&session, 1));
        assert!(!has_any_legal_move(&session));
    }

    #[test]
    fn test_no_legal_move_with_all_home_and_non_six() {
        assert!(!has_any_legal_move(&moving([-1, -1, -1, -1], 3)));
        assert!(has_any_legal_move(&moving([-1, -1, -1, -1], 6)));
    }

    #[test]
    fn test_legal_tokens_lists_both_kinds() {
        let session = moving([-1, 20, 55, 56], 6);
        assert_eq!(legal_tokens(&session), vec![0, 1]);
    }

    #[test]
    fn test_out_of_range_positions_are_not_movable() {
        let session = moving([i8::MAX, 50, -1, -1], 6);
        assert!(!can_move_token(&session, 0));
        assert!(can_move_token(&session, 1));
        assert!(!can_move_token(&moving([10, -1, -1, -1], u8::MAX), 0));
        assert!(!roll_has_legal_move(&[i8::MAX; 4], 6));
    }

    #[test]
    fn test_roll_has_legal_move_ignores_state() {
        assert!(roll_has_legal_move(&[-1, -1, -1, 50], 6));
        assert!(!roll_has_legal_move(&[-1, -1, -1, 55], 2));
        assert!(!roll_has_legal_move(&[56, 56, 56, 56], 1));
    }

    #[test]
    fn test_check_move_token_error_precedence() {
        let session = moving([53, -1, -1, -1], 5);
        let yellow = PlayerId::new("yellow");
        let red = PlayerId::new("red");

        assert!(matches!(
            check_move_token(&session, &yellow, 0),
            Err(RuleError::NotYourTurn(_))
        ));
        assert!(matches!(
            check_move_token(&session, &red, 0),
            Err(RuleError::IllegalMove { token: 0, .. })
        ));
        assert!(matches!(
            check_move_token(&session, &red, 1),
            Err(RuleError::IllegalMove { token: 1, .. })
        ));
        assert!(matches!(
            check_move_token(&session, &red, 4),
            Err(RuleError::IllegalMove { token: 4, .. })
        ));
    }

    #[test]
    fn test_check_bring_into_play_reasons() {
        let red = PlayerId::new("red");
        let err = check_bring_into_play(&moving([-1, -1, -1, -1], 4), &red, 0).unwrap_err();
        assert!(err.to_string().contains("needs a six"));

        let err = check_bring_into_play(&moving([7, -1, -1, -1], 6), &red, 0).unwrap_err();
        assert!(err.to_string().contains("already in play"));

        let mut session = moving([-1, -1, -1, -1], 6);
        session.state = GameState::RollDice;
        session.current_roll = 0;
        assert!(matches!(
            check_bring_into_play(&session, &red, 0),
            Err(RuleError::InvalidTransition { .. })
        ));
    }
}
