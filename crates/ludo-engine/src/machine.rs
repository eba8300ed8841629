//! The turn state machine: a pure reducer from `(session, action)` to a new
//! session.
//!
//! `apply` never touches its input. It validates the action against the
//! snapshot, then builds the successor on a clone, so a rejected action
//! leaves the caller's session exactly as it was.
//!
//! Waiting for randomness is explicit: `Start` and `Roll` move the session
//! into `Starting` / `RollingDice`, and the driver answers with
//! `SeedResolved` / `DiceResolved`.

use ludo_protocol::{Color, PlayerId};
use serde::{Deserialize, Serialize};

use crate::board::{self, FINISH, HOME};
use crate::validator;
use crate::{GameSession, GameState, RandomnessPort, RandomnessRequest, RuleError};

// ---------------------------------------------------------------------------
// Actions and events
// ---------------------------------------------------------------------------

/// Everything that can happen to a session after it was created.
///
/// Player actions carry the caller's identity; the two `*Resolved`
/// actions are delivered by whoever talks to the randomness source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Action {
    Join { player: PlayerId, color: Color },
    Start { player: PlayerId },
    SeedResolved { seed: u64 },
    Roll { player: PlayerId },
    DiceResolved { value: u8 },
    BringIntoPlay { player: PlayerId, token: usize },
    MoveToken { player: PlayerId, token: usize },
}

impl Action {
    /// Short verb phrase for errors and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Start { .. } => "start the game",
            Self::SeedResolved { .. } => "resolve the turn seed",
            Self::Roll { .. } => "roll the dice",
            Self::DiceResolved { .. } => "resolve the dice",
            Self::BringIntoPlay { .. } => "bring a token into play",
            Self::MoveToken { .. } => "move a token",
        }
    }
}

/// Why a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassReason {
    /// A non-six move completed.
    TurnComplete,
    /// The roll left nothing to move.
    NoLegalMove,
    /// Third six in a row.
    ThirdSix,
}

/// What observers should know happened during a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum GameEvent {
    PlayerJoined { player: PlayerId, color: Color },
    StartRequested,
    FirstPlayerChosen { color: Color },
    RollRequested { color: Color },
    DiceRolled { color: Color, value: u8 },
    TokenEntered { color: Color, token: usize },
    TokenMoved {
        color: Color,
        token: usize,
        from: i8,
        to: i8,
    },
    TokenCaptured {
        color: Color,
        token: usize,
        by: Color,
        from: i8,
    },
    /// A six: the same player rolls again.
    ExtraRoll { color: Color, sixes: u8 },
    TurnPassed {
        from: Color,
        to: Color,
        reason: PassReason,
    },
    GameWon { color: Color, winner: PlayerId },
}

/// The result of a successful action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: GameSession,
    pub events: Vec<GameEvent>,
}

impl Transition {
    /// The randomness the new session is waiting for, if any.
    pub fn pending(&self) -> Option<RandomnessRequest> {
        self.session.state().awaiting()
    }
}

// ---------------------------------------------------------------------------
// TurnStateMachine
// ---------------------------------------------------------------------------

/// The only component allowed to produce a new [`GameSession`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnStateMachine;

impl TurnStateMachine {
    /// Applies one action.
    ///
    /// # Errors
    /// Any [`RuleError`]; `session` is never modified.
    pub fn apply(session: &GameSession, action: Action) -> Result<Transition, RuleError> {
        let name = action.name();
        let mut next = session.clone();
        let mut events = Vec::new();

        let result = match action {
            Action::Join { player, color } => join(&mut next, player, color, &mut events),
            Action::Start { player } => start(&mut next, &player, &mut events),
            Action::SeedResolved { seed } => seed_resolved(&mut next, seed, &mut events),
            Action::Roll { player } => roll(&mut next, &player, &mut events),
            Action::DiceResolved { value } => dice_resolved(&mut next, value, &mut events),
            Action::BringIntoPlay { player, token } => {
                bring_into_play(&mut next, &player, token, &mut events)
            }
            Action::MoveToken { player, token } => {
                move_token(&mut next, &player, token, &mut events)
            }
        };

        match result {
            Ok(()) => {
                tracing::debug!(
                    action = name,
                    from = %session.state(),
                    to = %next.state(),
                    "transition applied"
                );
                Ok(Transition {
                    session: next,
                    events,
                })
            }
            Err(err) => {
                tracing::debug!(action = name, state = %session.state(), %err, "action rejected");
                Err(err)
            }
        }
    }

    /// Checks that `player` may cancel: only before the game starts, and
    /// only someone holding a seat. The caller discards the session on
    /// success.
    pub fn cancel(session: &GameSession, player: &PlayerId) -> Result<(), RuleError> {
        expect_state(session, GameState::NotStarted, "cancel the game")?;
        if session.seat_of(player).is_none() {
            return Err(RuleError::NotSeated(player.clone()));
        }
        Ok(())
    }

    /// Discards everything and returns a fresh, empty table with the same
    /// number of seats. Never fails, whatever the state.
    pub fn reset(session: &GameSession) -> GameSession {
        GameSession::open(session.num_players())
    }

    /// Abandons a pending randomness request, returning the session to
    /// where it was before the request was made: `Starting` goes back to
    /// `NotStarted`, `RollingDice` to `RollDice`. Any other state is
    /// returned as is.
    ///
    /// `Start` and `Roll` change nothing but the state, so this is an exact
    /// undo.
    pub fn rewind(session: &GameSession) -> GameSession {
        let mut previous = session.clone();
        previous.state = match session.state() {
            GameState::Starting => GameState::NotStarted,
            GameState::RollingDice => GameState::RollDice,
            other => other,
        };
        previous
    }

    /// Applies `action` and, if that leaves the session waiting, asks
    /// `port` and applies the answer too. The returned transition carries
    /// the events of both steps.
    ///
    /// Convenient for single-owner use; a concurrent driver that must stay
    /// responsive while waiting applies the steps itself.
    ///
    /// # Errors
    /// The action's own [`RuleError`], or
    /// [`RuleError::RandomnessUnavailable`] if the port fails. Either way
    /// `session` is untouched.
    pub async fn play<P: RandomnessPort>(
        session: &GameSession,
        action: Action,
        port: &P,
    ) -> Result<Transition, RuleError> {
        let mut transition = Self::apply(session, action)?;
        if let Some(request) = transition.pending() {
            let resolved = match request {
                RandomnessRequest::TurnSeed => Action::SeedResolved {
                    seed: port.next_turn_seed().await?,
                },
                RandomnessRequest::DiceValue => Action::DiceResolved {
                    value: port.next_dice_value().await?,
                },
            };
            let step = Self::apply(&transition.session, resolved)?;
            transition.events.extend(step.events);
            transition.session = step.session;
        }
        Ok(transition)
    }
}

// ---------------------------------------------------------------------------
// Handlers. Each validates first, then mutates `next`.
// ---------------------------------------------------------------------------

fn expect_state(
    session: &GameSession,
    expected: GameState,
    action: &'static str,
) -> Result<(), RuleError> {
    if session.state() != expected {
        return Err(RuleError::InvalidTransition {
            action,
            state: session.state(),
        });
    }
    Ok(())
}

fn join(
    next: &mut GameSession,
    player: PlayerId,
    color: Color,
    events: &mut Vec<GameEvent>,
) -> Result<(), RuleError> {
    expect_state(next, GameState::NotStarted, "join")?;
    if let Some(seat) = next.seat_of(&player) {
        return Err(RuleError::SlotUnavailable(format!(
            "{player} already sits at {seat}"
        )));
    }
    if let Some(holder) = next.player(color) {
        return Err(RuleError::SlotUnavailable(format!(
            "{color} is taken by {holder}"
        )));
    }
    if next.is_full() {
        return Err(RuleError::SlotUnavailable(format!(
            "all {} seats are taken",
            next.num_players().get()
        )));
    }

    next.players[color.index()] = Some(player.clone());
    events.push(GameEvent::PlayerJoined { player, color });
    Ok(())
}

fn start(
    next: &mut GameSession,
    player: &PlayerId,
    events: &mut Vec<GameEvent>,
) -> Result<(), RuleError> {
    expect_state(next, GameState::NotStarted, "start the game")?;
    if next.seat_of(player).is_none() {
        return Err(RuleError::NotSeated(player.clone()));
    }
    if !next.is_full() {
        return Err(RuleError::InvalidTransition {
            action: "start the game with empty seats",
            state: next.state(),
        });
    }

    next.state = GameState::Starting;
    events.push(GameEvent::StartRequested);
    Ok(())
}

fn seed_resolved(
    next: &mut GameSession,
    seed: u64,
    events: &mut Vec<GameEvent>,
) -> Result<(), RuleError> {
    expect_state(next, GameState::Starting, "resolve the turn seed")?;
    let count = next.num_players().get() as u64;
    let nth = (seed % count) as usize;
    let first = next
        .seated_colors()
        .nth(nth)
        .ok_or_else(|| RuleError::CorruptSnapshot("started with empty seats".into()))?;

    next.current_player = first;
    next.state = GameState::RollDice;
    events.push(GameEvent::FirstPlayerChosen { color: first });
    Ok(())
}

fn roll(
    next: &mut GameSession,
    player: &PlayerId,
    events: &mut Vec<GameEvent>,
) -> Result<(), RuleError> {
    expect_state(next, GameState::RollDice, "roll the dice")?;
    if next.active_player() != Some(player) {
        return Err(RuleError::NotYourTurn(player.clone()));
    }

    next.state = GameState::RollingDice;
    events.push(GameEvent::RollRequested {
        color: next.current_player,
    });
    Ok(())
}

fn dice_resolved(
    next: &mut GameSession,
    value: u8,
    events: &mut Vec<GameEvent>,
) -> Result<(), RuleError> {
    expect_state(next, GameState::RollingDice, "resolve the dice")?;
    if !(1..=6).contains(&value) {
        return Err(RuleError::RandomnessUnavailable(format!(
            "dice value {value} outside 1..=6"
        )));
    }

    let color = next.current_player;
    events.push(GameEvent::DiceRolled { color, value });

    if value == 6 && next.consecutive_sixes == 2 {
        pass_turn(next, PassReason::ThirdSix, events);
    } else if !validator::roll_has_legal_move(next.tokens(color), value) {
        pass_turn(next, PassReason::NoLegalMove, events);
    } else {
        next.current_roll = value;
        next.state = GameState::Move;
    }
    Ok(())
}

fn bring_into_play(
    next: &mut GameSession,
    player: &PlayerId,
    token: usize,
    events: &mut Vec<GameEvent>,
) -> Result<(), RuleError> {
    validator::check_bring_into_play(next, player, token)?;

    let color = next.current_player;
    next.token_positions[color.index()][token] = 0;
    events.push(GameEvent::TokenEntered { color, token });

    // The entry square is safe, so nothing can be captured here.
    end_move(next, events);
    Ok(())
}

fn move_token(
    next: &mut GameSession,
    player: &PlayerId,
    token: usize,
    events: &mut Vec<GameEvent>,
) -> Result<(), RuleError> {
    validator::check_move_token(next, player, token)?;

    let color = next.current_player;
    let from = next.token_positions[color.index()][token];
    let to = from + next.current_roll as i8;
    next.token_positions[color.index()][token] = to;
    events.push(GameEvent::TokenMoved {
        color,
        token,
        from,
        to,
    });

    capture(next, color, to, events);

    if next.tokens(color).iter().all(|position| *position == FINISH) {
        let winner = player.clone();
        next.state = GameState::Finished;
        next.winner = Some(winner.clone());
        next.current_roll = 0;
        next.consecutive_sixes = 0;
        tracing::info!(%winner, %color, "game won");
        events.push(GameEvent::GameWon { color, winner });
        return Ok(());
    }

    end_move(next, events);
    Ok(())
}

/// Sends every opposing token sharing `landed`'s loop cell back to its
/// yard, unless the cell is safe.
fn capture(next: &mut GameSession, mover: Color, landed: i8, events: &mut Vec<GameEvent>) {
    if !board::is_on_track(landed) || board::is_safe_cell(landed) {
        return;
    }
    let target = board::track_index(mover, landed);

    for victim in Color::ALL.into_iter().filter(|c| *c != mover) {
        for (token, position) in next.token_positions[victim.index()].iter_mut().enumerate() {
            if *position != HOME && board::track_index(victim, *position) == target {
                events.push(GameEvent::TokenCaptured {
                    color: victim,
                    token,
                    by: mover,
                    from: *position,
                });
                *position = HOME;
            }
        }
    }
}

/// Finishes a completed move: a six earns another roll, anything else
/// passes the turn.
fn end_move(next: &mut GameSession, events: &mut Vec<GameEvent>) {
    if next.current_roll == 6 {
        next.consecutive_sixes += 1;
        next.current_roll = 0;
        next.state = GameState::RollDice;
        events.push(GameEvent::ExtraRoll {
            color: next.current_player,
            sixes: next.consecutive_sixes,
        });
    } else {
        pass_turn(next, PassReason::TurnComplete, events);
    }
}

fn pass_turn(next: &mut GameSession, reason: PassReason, events: &mut Vec<GameEvent>) {
    let from = next.current_player;
    let to = next.next_seated_after(from);
    next.current_player = to;
    next.consecutive_sixes = 0;
    next.current_roll = 0;
    next.state = GameState::RollDice;
    events.push(GameEvent::TurnPassed { from, to, reason });
}
