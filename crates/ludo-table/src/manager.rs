//! Table manager: creates, tracks, and routes players to tables.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ludo_engine::{Action, GameSession, GameState, RandomnessPort};
use ludo_protocol::{Color, PlayerId, SessionId};
use tokio::sync::mpsc;

use crate::table::spawn_table;
use crate::{TableConfig, TableError, TableHandle, TableUpdate};

/// Counter for generating unique session ids.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Manages all live tables and tracks which player sits where.
///
/// This is the entry point for table operations from higher layers. Player
/// actions are routed through the caller's seat, so requests like "roll"
/// need no session id.
///
/// The in-game methods wait for randomness. Callers that share a manager
/// behind a lock should clone the [`TableHandle`] from
/// [`handle_for`](Self::handle_for) and await on that instead, so one slow
/// roll doesn't hold up every other table.
pub struct TableManager<R: RandomnessPort> {
    /// Live tables, keyed by session id.
    tables: HashMap<SessionId, TableHandle>,

    /// Maps each player to the table they sit at.
    /// A player sits at most at ONE table at a time.
    seats: HashMap<PlayerId, SessionId>,

    port: Arc<R>,
    config: TableConfig,
}

impl<R: RandomnessPort> TableManager<R> {
    /// A manager with the default [`TableConfig`].
    pub fn new(port: R) -> Self {
        Self::with_config(port, TableConfig::default())
    }

    pub fn with_config(port: R, config: TableConfig) -> Self {
        Self {
            tables: HashMap::new(),
            seats: HashMap::new(),
            port: Arc::new(port),
            config,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Opens a table for `num_players` with `player` seated at `color`.
    pub fn create_game(
        &mut self,
        player: PlayerId,
        num_players: u8,
        color: Color,
    ) -> Result<(SessionId, GameSession), TableError> {
        self.ensure_unseated(&player)?;
        let session = GameSession::create(num_players, player.clone(), color)?;

        let session_id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_table(
            session_id,
            session.clone(),
            Arc::clone(&self.port),
            self.config.clone(),
        );
        self.tables.insert(session_id, handle);
        self.seats.insert(player.clone(), session_id);
        tracing::info!(%session_id, %player, %color, num_players, "table created");
        Ok((session_id, session))
    }

    /// Seats `player` at `color` on an existing table.
    ///
    /// With `auto_start` this also waits for the turn seed. Callers sharing
    /// the manager behind a lock can split the call instead:
    /// [`reserve_seat`](Self::reserve_seat), `act` on the returned handle
    /// without the lock, then [`settle_seat`](Self::settle_seat).
    pub async fn join_game(
        &mut self,
        player: PlayerId,
        session_id: SessionId,
        color: Color,
    ) -> Result<GameSession, TableError> {
        let handle = self.reserve_seat(&player, session_id)?;
        let joined = handle
            .act(Action::Join {
                player: player.clone(),
                color,
            })
            .await;
        self.settle_seat(player, session_id, joined).await
    }

    /// Claims a seat for `player` at a table ahead of a join, so a second
    /// join by the same player fails with `AlreadySeated` while the first
    /// is in flight.
    pub fn reserve_seat(
        &mut self,
        player: &PlayerId,
        session_id: SessionId,
    ) -> Result<TableHandle, TableError> {
        self.ensure_unseated(player)?;
        let handle = self.table(session_id)?.clone();
        self.seats.insert(player.clone(), session_id);
        Ok(handle)
    }

    /// Keeps a reserved seat if the join went through, frees it otherwise.
    pub async fn settle_seat(
        &mut self,
        player: PlayerId,
        session_id: SessionId,
        joined: Result<GameSession, TableError>,
    ) -> Result<GameSession, TableError> {
        match joined {
            Ok(session) => {
                if !self.seats.contains_key(&player) {
                    // A reset freed the reservation. Whether the join landed
                    // before or after it, the table knows.
                    if let Some(handle) = self.tables.get(&session_id) {
                        if handle.snapshot().await?.seat_of(&player).is_some() {
                            self.seats.insert(player, session_id);
                        }
                    }
                }
                Ok(session)
            }
            Err(err) => {
                if self.seats.get(&player) == Some(&session_id) {
                    self.seats.remove(&player);
                }
                Err(err)
            }
        }
    }

    /// Starts the caller's game. Resolves once the first player is chosen.
    pub async fn start_game(
        &self,
        player: PlayerId,
    ) -> Result<(SessionId, GameSession), TableError> {
        self.act(player.clone(), Action::Start { player }).await
    }

    /// Rolls for the caller. Resolves once the dice value is in.
    pub async fn roll_dice(
        &self,
        player: PlayerId,
    ) -> Result<(SessionId, GameSession), TableError> {
        self.act(player.clone(), Action::Roll { player }).await
    }

    pub async fn bring_token_into_play(
        &self,
        player: PlayerId,
        token: usize,
    ) -> Result<(SessionId, GameSession), TableError> {
        self.act(player.clone(), Action::BringIntoPlay { player, token })
            .await
    }

    pub async fn move_token(
        &self,
        player: PlayerId,
        token: usize,
    ) -> Result<(SessionId, GameSession), TableError> {
        self.act(player.clone(), Action::MoveToken { player, token })
            .await
    }

    /// Abandons the caller's unstarted game. The table closes and every
    /// seat at it is freed.
    pub async fn cancel_game(&mut self, player: PlayerId) -> Result<SessionId, TableError> {
        let handle = self.handle_for(&player)?.clone();
        let session_id = handle.session_id();
        handle.cancel(player).await?;
        self.forget(session_id);
        Ok(session_id)
    }

    /// Empties a table. Anyone may reset; every seat at it is freed and a
    /// pending randomness wait is cancelled.
    pub async fn reset_game(&mut self, session_id: SessionId) -> Result<GameSession, TableError> {
        let session = self.table(session_id)?.reset().await?;
        self.seats.retain(|_, seated_at| *seated_at != session_id);
        Ok(session)
    }

    pub async fn snapshot(&self, session_id: SessionId) -> Result<GameSession, TableError> {
        self.table(session_id)?.snapshot().await
    }

    /// Tables still waiting for players, ordered by id.
    ///
    /// Tables that fail to respond (e.g., shutting down) are skipped.
    pub async fn list_open_tables(&self) -> Vec<(SessionId, GameSession)> {
        let mut open = Vec::new();
        for handle in self.tables.values() {
            if let Ok(session) = handle.snapshot().await {
                if session.state() == GameState::NotStarted && !session.is_full() {
                    open.push((handle.session_id(), session));
                }
            }
        }
        open.sort_by_key(|(session_id, _)| session_id.0);
        open
    }

    /// Registers an observer on a table.
    pub async fn subscribe(
        &self,
        session_id: SessionId,
    ) -> Result<mpsc::UnboundedReceiver<TableUpdate>, TableError> {
        self.table(session_id)?.subscribe().await
    }

    /// Resumes a persisted snapshot on a new table.
    ///
    /// The snapshot must pass [`GameSession::verify`], and none of its
    /// players may already sit elsewhere. A snapshot saved while waiting
    /// for randomness asks the port again.
    pub fn restore(&mut self, snapshot: GameSession) -> Result<SessionId, TableError> {
        snapshot.verify()?;
        for player in snapshot.players().iter().flatten() {
            self.ensure_unseated(player)?;
        }

        let session_id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        for player in snapshot.players().iter().flatten() {
            self.seats.insert(player.clone(), session_id);
        }
        let state = snapshot.state();
        let handle = spawn_table(
            session_id,
            snapshot,
            Arc::clone(&self.port),
            self.config.clone(),
        );
        self.tables.insert(session_id, handle);
        tracing::info!(%session_id, %state, "table restored");
        Ok(session_id)
    }

    /// Shuts a table down and frees its seats.
    pub async fn close_table(&mut self, session_id: SessionId) -> Result<(), TableError> {
        let handle = self.table(session_id)?.clone();
        let _ = handle.shutdown().await;
        self.forget(session_id);
        Ok(())
    }

    /// The handle of the table `player` sits at.
    pub fn handle_for(&self, player: &PlayerId) -> Result<&TableHandle, TableError> {
        let session_id = self
            .seats
            .get(player)
            .ok_or_else(|| TableError::NotSeated(player.clone()))?;
        self.table(*session_id)
    }

    /// The table `player` sits at, if any.
    pub fn session_of(&self, player: &PlayerId) -> Option<SessionId> {
        self.seats.get(player).copied()
    }

    /// Returns the number of live tables.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    fn table(&self, session_id: SessionId) -> Result<&TableHandle, TableError> {
        self.tables
            .get(&session_id)
            .ok_or(TableError::NotFound(session_id))
    }

    fn ensure_unseated(&self, player: &PlayerId) -> Result<(), TableError> {
        match self.seats.get(player) {
            Some(session_id) => Err(TableError::AlreadySeated(player.clone(), *session_id)),
            None => Ok(()),
        }
    }

    async fn act(
        &self,
        player: PlayerId,
        action: Action,
    ) -> Result<(SessionId, GameSession), TableError> {
        let handle = self.handle_for(&player)?;
        let session = handle.act(action).await?;
        Ok((handle.session_id(), session))
    }

    fn forget(&mut self, session_id: SessionId) {
        self.tables.remove(&session_id);
        self.seats.retain(|_, seated_at| *seated_at != session_id);
        tracing::info!(%session_id, "table closed");
    }
}
