use ludo::prelude::*;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// Bot
// ---------------------------------------------------------------------------

/// Stops a game that somehow never ends.
const MAX_REQUESTS: usize = 20_000;

/// What the active player does next, or `None` once the game is over.
///
/// Enters a token whenever a six allows it, otherwise advances the token
/// closest to home.
fn next_request(session: &GameSession) -> Option<Request> {
    match session.state() {
        GameState::RollDice => Some(Request::RollDice),
        GameState::Move => {
            let tokens = session.tokens(session.current_player());
            let legal = validator::legal_tokens(session);
            if let Some(token) = legal.iter().find(|t| tokens[**t] == board::HOME) {
                return Some(Request::BringTokenIntoPlay { token: *token as u8 });
            }
            legal
                .into_iter()
                .max_by_key(|t| tokens[*t])
                .map(|token| Request::MoveToken { token: token as u8 })
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

const BOTS: [(&str, Color); 4] = [
    ("red-bot", Color::Red),
    ("green-bot", Color::Green),
    ("yellow-bot", Color::Yellow),
    ("blue-bot", Color::Blue),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let lobby = Lobby::new(ThreadRandomness);

    let (host, color) = BOTS[0];
    let create = Request::CreateGame {
        num_players: 4,
        color,
    };
    let Response::Ok { session_id, .. } = lobby.handle(PlayerId::new(host), create).await? else {
        return Err("table was not created".into());
    };
    for (name, color) in &BOTS[1..] {
        let join = Request::JoinGame {
            session_id,
            color: *color,
        };
        lobby.handle(PlayerId::new(*name), join).await?;
    }
    let mut response = lobby.handle(PlayerId::new(host), Request::StartGame).await?;

    for _ in 0..MAX_REQUESTS {
        let Response::Ok { snapshot, .. } = &response else {
            break;
        };
        let Some(request) = next_request(snapshot) else {
            break;
        };
        let Some(player) = snapshot.active_player().cloned() else {
            break;
        };
        response = lobby.handle(player, request).await?;
    }

    let final_state = lobby
        .handle(PlayerId::new(host), Request::Snapshot { session_id })
        .await?;
    let json = JsonCodec.encode(&final_state)?;
    println!("{}", String::from_utf8_lossy(&json));

    match final_state {
        Response::Ok { snapshot, .. } if snapshot.state() == GameState::Finished => {
            tracing::info!(winner = ?snapshot.winner(), "game over");
            Ok(())
        }
        _ => Err(format!("{session_id} did not finish within {MAX_REQUESTS} requests").into()),
    }
}
