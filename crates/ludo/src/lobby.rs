//! The lobby: turns a player's request into a table operation.
//!
//! Identity is not the lobby's business. Whoever accepts a connection
//! authenticates it and passes the resulting [`PlayerId`] in with every
//! request.

use ludo_engine::{Action, GameSession, RandomnessPort};
use ludo_protocol::{Codec, JsonCodec, PlayerId, Request, SessionId};
use ludo_table::{TableConfig, TableManager};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::LudoError;

/// The answer to one request.
///
/// `#[serde(tag = "type")]` gives `{ "type": "Ok", "sessionId": 3, ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Response {
    /// The request succeeded; this is the table afterwards.
    Ok {
        session_id: SessionId,
        snapshot: GameSession,
        status: String,
    },

    /// The table was closed (a cancelled game).
    Closed { session_id: SessionId },

    /// The request failed. `code` is stable, `message` is for humans.
    Error { code: String, message: String },
}

impl Response {
    fn ok(session_id: SessionId, snapshot: GameSession) -> Self {
        Self::Ok {
            session_id,
            status: snapshot.status_message().to_string(),
            snapshot,
        }
    }
}

impl From<&LudoError> for Response {
    fn from(err: &LudoError) -> Self {
        Self::Error {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Routes requests from many players to many tables.
///
/// The [`TableManager`] sits behind a lock, but in-game actions only hold
/// it long enough to find the caller's table: waiting for dice happens on
/// the table's handle, so one slow roll never blocks the lobby.
pub struct Lobby<R: RandomnessPort, C: Codec = JsonCodec> {
    tables: Mutex<TableManager<R>>,
    codec: C,
}

impl<R: RandomnessPort> Lobby<R, JsonCodec> {
    /// A JSON lobby with the default [`TableConfig`].
    pub fn new(port: R) -> Self {
        Self::with_config(port, TableConfig::default())
    }

    /// A JSON lobby with custom table settings.
    pub fn with_config(port: R, config: TableConfig) -> Self {
        Self::with_codec(TableManager::with_config(port, config), JsonCodec)
    }
}

impl<R: RandomnessPort, C: Codec> Lobby<R, C> {
    pub fn with_codec(tables: TableManager<R>, codec: C) -> Self {
        Self {
            tables: Mutex::new(tables),
            codec,
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Direct access to the table registry (restore, subscribe, close).
    pub fn tables(&self) -> &Mutex<TableManager<R>> {
        &self.tables
    }

    /// Handles one decoded request from `player`.
    pub async fn handle(
        &self,
        player: PlayerId,
        request: Request,
    ) -> Result<Response, LudoError> {
        tracing::debug!(%player, ?request, "handling request");

        let action = match request {
            Request::CreateGame { num_players, color } => {
                let (session_id, session) = self
                    .tables
                    .lock()
                    .await
                    .create_game(player, num_players, color)?;
                return Ok(Response::ok(session_id, session));
            }
            Request::JoinGame { session_id, color } => {
                // An auto-started join waits for the seed; do that unlocked.
                let handle = self
                    .tables
                    .lock()
                    .await
                    .reserve_seat(&player, session_id)?;
                let joined = handle
                    .act(Action::Join {
                        player: player.clone(),
                        color,
                    })
                    .await;
                let session = self
                    .tables
                    .lock()
                    .await
                    .settle_seat(player, session_id, joined)
                    .await?;
                return Ok(Response::ok(session_id, session));
            }
            Request::CancelGame => {
                let session_id = self.tables.lock().await.cancel_game(player).await?;
                return Ok(Response::Closed { session_id });
            }
            Request::ResetGame { session_id } => {
                let session = self.tables.lock().await.reset_game(session_id).await?;
                return Ok(Response::ok(session_id, session));
            }
            Request::Snapshot { session_id } => {
                let session = self.tables.lock().await.snapshot(session_id).await?;
                return Ok(Response::ok(session_id, session));
            }
            Request::StartGame => Action::Start {
                player: player.clone(),
            },
            Request::RollDice => Action::Roll {
                player: player.clone(),
            },
            Request::BringTokenIntoPlay { token } => Action::BringIntoPlay {
                player: player.clone(),
                token: token.into(),
            },
            Request::MoveToken { token } => Action::MoveToken {
                player: player.clone(),
                token: token.into(),
            },
        };

        // Clone the handle and release the lock before waiting on the table.
        let handle = self.tables.lock().await.handle_for(&player)?.clone();
        let session = handle.act(action).await?;
        Ok(Response::ok(handle.session_id(), session))
    }

    /// Decodes a request, handles it, and encodes the [`Response`].
    ///
    /// Failures to decode or to act become `Response::Error`; only a
    /// failure to encode the response itself is returned as `Err`.
    pub async fn handle_encoded(
        &self,
        player: PlayerId,
        data: &[u8],
    ) -> Result<Vec<u8>, LudoError> {
        let outcome = match self.codec.decode::<Request>(data) {
            Ok(request) => self.handle(player.clone(), request).await,
            Err(err) => Err(err.into()),
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(%player, code = err.code(), %err, "request failed");
                Response::from(&err)
            }
        };
        Ok(self.codec.encode(&response)?)
    }
}
