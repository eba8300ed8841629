//! End-to-end turn flow through the public API, with scripted randomness.

use ludo_engine::{
    Action, GameEvent, GameSession, GameState, PassReason, RuleError, ScriptedRandomness,
    Transition, TurnStateMachine,
};
use ludo_protocol::{Color, PlayerId};
use serde_json::json;

fn pid(id: &str) -> PlayerId {
    PlayerId::new(id)
}

async fn play(session: &GameSession, action: Action, port: &ScriptedRandomness) -> Transition {
    TurnStateMachine::play(session, action, port)
        .await
        .unwrap_or_else(|err| panic!("action rejected: {err}"))
}

/// Builds a session from its wire form, the way a persisted snapshot
/// would come back.
fn restore(
    num_players: u8,
    players: [Option<&str>; 4],
    tokens: [[i8; 4]; 4],
    current: usize,
) -> GameSession {
    let session: GameSession = serde_json::from_value(json!({
        "numPlayers": num_players,
        "players": players,
        "currentPlayerIndex": current,
        "tokenPositions": tokens,
        "state": "RollDice",
        "currentRoll": 0,
        "consecutiveSixCount": 0,
        "winner": null,
    }))
    .unwrap();
    session.verify().unwrap();
    session
}

/// Ann (Red) and Bob (Yellow), seated but not started.
fn two_seated() -> GameSession {
    let session = GameSession::create(2, pid("ann"), Color::Red).unwrap();
    TurnStateMachine::apply(
        &session,
        Action::Join {
            player: pid("bob"),
            color: Color::Yellow,
        },
    )
    .unwrap()
    .session
}

const ALL_PLAYERS: [Option<&str>; 4] = [Some("red"), Some("green"), Some("yellow"), Some("blue")];

#[tokio::test]
async fn test_two_player_opening() {
    let port = ScriptedRandomness::new([0], [6, 5, 3, 2]);

    let t = play(&two_seated(), Action::Start { player: pid("ann") }, &port).await;
    assert_eq!(
        t.events,
        vec![
            GameEvent::StartRequested,
            GameEvent::FirstPlayerChosen { color: Color::Red }
        ]
    );
    assert_eq!(t.session.state(), GameState::RollDice);
    assert_eq!(t.session.status_message(), "Roll the dice!");

    // Six: enter a token and roll again.
    let t = play(&t.session, Action::Roll { player: pid("ann") }, &port).await;
    assert_eq!(t.session.state(), GameState::Move);
    assert_eq!(t.session.current_roll(), 6);
    let t = play(
        &t.session,
        Action::BringIntoPlay {
            player: pid("ann"),
            token: 0,
        },
        &port,
    )
    .await;
    assert_eq!(t.session.tokens(Color::Red), &[0, -1, -1, -1]);
    assert_eq!(t.session.current_player(), Color::Red);

    // Five: move it, turn passes to Yellow.
    let t = play(&t.session, Action::Roll { player: pid("ann") }, &port).await;
    let t = play(
        &t.session,
        Action::MoveToken {
            player: pid("ann"),
            token: 0,
        },
        &port,
    )
    .await;
    assert_eq!(t.session.tokens(Color::Red)[0], 5);
    assert!(t.events.contains(&GameEvent::TurnPassed {
        from: Color::Red,
        to: Color::Yellow,
        reason: PassReason::TurnComplete,
    }));

    // Bob has nothing out; a three passes straight back.
    let t = play(&t.session, Action::Roll { player: pid("bob") }, &port).await;
    assert_eq!(t.session.current_player(), Color::Red);
    assert_eq!(t.session.state(), GameState::RollDice);
    assert_eq!(t.session.current_roll(), 0);

    let t = play(&t.session, Action::Roll { player: pid("ann") }, &port).await;
    let t = play(
        &t.session,
        Action::MoveToken {
            player: pid("ann"),
            token: 0,
        },
        &port,
    )
    .await;
    assert_eq!(t.session.tokens(Color::Red)[0], 7);
    assert_eq!(t.session.current_player(), Color::Yellow);
    assert_eq!(port.remaining_rolls(), 0);
    t.session.verify().unwrap();
}

#[tokio::test]
async fn test_seed_can_choose_second_seat() {
    let port = ScriptedRandomness::new([3], []);
    let t = play(&two_seated(), Action::Start { player: pid("bob") }, &port).await;
    assert_eq!(t.session.current_player(), Color::Yellow);
    assert_eq!(t.session.active_player(), Some(&pid("bob")));
}

#[tokio::test]
async fn test_wrong_player_does_not_consume_randomness() {
    let port = ScriptedRandomness::new([0], [4]);
    let started = play(&two_seated(), Action::Start { player: pid("ann") }, &port).await;

    let err = TurnStateMachine::play(&started.session, Action::Roll { player: pid("bob") }, &port)
        .await
        .unwrap_err();
    assert_eq!(err, RuleError::NotYourTurn(pid("bob")));
    assert_eq!(port.remaining_rolls(), 1);
}

#[tokio::test]
async fn test_restored_snapshot_capture() {
    let mut tokens = [[-1; 4]; 4];
    tokens[Color::Red.index()][0] = 7;
    tokens[Color::Green.index()][1] = 49;
    let session = restore(4, ALL_PLAYERS, tokens, Color::Red.index());

    let port = ScriptedRandomness::new([], [3]);
    let t = play(&session, Action::Roll { player: pid("red") }, &port).await;
    let t = play(
        &t.session,
        Action::MoveToken {
            player: pid("red"),
            token: 0,
        },
        &port,
    )
    .await;

    assert_eq!(t.session.tokens(Color::Red)[0], 10);
    assert_eq!(t.session.tokens(Color::Green), &[-1; 4]);
    assert_eq!(t.session.current_player(), Color::Green);
}

#[tokio::test]
async fn test_restored_snapshot_win_then_reset() {
    let mut tokens = [[-1; 4]; 4];
    tokens[Color::Blue.index()] = [56, 50, 56, 56];
    tokens[Color::Green.index()] = [12, -1, -1, -1];
    let session = restore(
        2,
        [None, Some("gia"), None, Some("bo")],
        tokens,
        Color::Blue.index(),
    );

    let port = ScriptedRandomness::new([], [6]);
    let t = play(&session, Action::Roll { player: pid("bo") }, &port).await;
    let t = play(
        &t.session,
        Action::MoveToken {
            player: pid("bo"),
            token: 1,
        },
        &port,
    )
    .await;

    assert_eq!(t.session.state(), GameState::Finished);
    assert_eq!(t.session.winner(), Some(&pid("bo")));
    assert_eq!(t.session.status_message(), "Game finished!");
    assert!(matches!(
        t.events.last(),
        Some(GameEvent::GameWon {
            color: Color::Blue,
            ..
        })
    ));

    let err = TurnStateMachine::apply(&t.session, Action::Roll { player: pid("gia") }).unwrap_err();
    assert_eq!(err.code(), "InvalidTransition");

    let fresh = TurnStateMachine::reset(&t.session);
    assert_eq!(fresh.state(), GameState::NotStarted);
    assert_eq!(fresh.seated_count(), 0);
    assert!(fresh.token_positions().iter().flatten().all(|p| *p == -1));
}

#[tokio::test]
async fn test_exhausted_port_leaves_session_untouched() {
    let session = restore(4, ALL_PLAYERS, [[-1; 4]; 4], Color::Red.index());
    let port = ScriptedRandomness::default();

    let err = TurnStateMachine::play(&session, Action::Roll { player: pid("red") }, &port)
        .await
        .unwrap_err();
    assert!(matches!(err, RuleError::RandomnessUnavailable(_)));
    assert_eq!(session.state(), GameState::RollDice);
}

#[test]
fn test_verify_rejects_tampered_snapshot() {
    // Green's seat is empty, so Green can't have a token out.
    let mut json = serde_json::to_value(two_seated()).unwrap();
    json["tokenPositions"][1][0] = 3.into();
    let session: GameSession = serde_json::from_value(json).unwrap();
    assert!(matches!(session.verify(), Err(RuleError::CorruptSnapshot(_))));
}

#[test]
fn test_snapshot_survives_json_mid_game() {
    let mut tokens = [[-1; 4]; 4];
    tokens[Color::Red.index()] = [3, 56, -1, 52];
    let session = restore(4, ALL_PLAYERS, tokens, Color::Red.index());
    let encoded = serde_json::to_string(&session).unwrap();
    let decoded: GameSession = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, session);
}
