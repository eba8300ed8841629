//! Table actor: an isolated Tokio task that owns one game session.
//!
//! Each table runs in its own task and talks to the outside world through
//! an mpsc mailbox. Commands are handled one at a time, so two actions on
//! the same session can never interleave.
//!
//! When an action leaves the session waiting for randomness, the actor
//! spawns the port call and goes back to its mailbox. The answer comes
//! back as [`TableCommand::Resolved`], tagged with the epoch it was asked
//! in; a reset bumps the epoch so late answers are dropped.

use std::sync::Arc;
use std::time::Duration;

use ludo_engine::{
    Action, GameEvent, GameSession, RandomnessError, RandomnessPort, RandomnessRequest, RuleError,
    TurnStateMachine,
};
use ludo_protocol::{PlayerId, SessionId};
use tokio::sync::{mpsc, oneshot};

use crate::{TableConfig, TableError};

/// What subscribers receive.
#[derive(Debug, Clone)]
pub enum TableUpdate {
    /// The session changed. `events` is empty for a fresh subscription, a
    /// reset, or a rollback after the randomness port failed.
    Changed {
        snapshot: GameSession,
        events: Vec<GameEvent>,
    },
    /// The table shut down; no more updates follow.
    Closed,
}

/// Channel sender for delivering updates to one observer.
pub type UpdateSender = mpsc::UnboundedSender<TableUpdate>;

type Reply<T> = oneshot::Sender<Result<T, TableError>>;

/// Commands sent to a table actor through its mailbox.
pub(crate) enum TableCommand {
    /// Apply one action. The reply is sent once the action, and any
    /// randomness it waits for, is resolved.
    Act {
        action: Action,
        reply: Reply<GameSession>,
    },

    /// Check that `player` may cancel, then shut down.
    Cancel {
        player: PlayerId,
        reply: Reply<()>,
    },

    /// Discard the session and start over. Never refused.
    Reset { reply: oneshot::Sender<GameSession> },

    Snapshot { reply: oneshot::Sender<GameSession> },

    Subscribe { sender: UpdateSender },

    /// A randomness answer, from the task spawned for `epoch`.
    Resolved {
        epoch: u64,
        outcome: Result<Action, RandomnessError>,
    },

    Shutdown,
}

/// Handle to a running table actor.
///
/// Cheap to clone: it's just an `mpsc::Sender` wrapper. The
/// [`TableManager`](crate::TableManager) holds one per table.
#[derive(Debug, Clone)]
pub struct TableHandle {
    session_id: SessionId,
    sender: mpsc::Sender<TableCommand>,
}

impl TableHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Applies an action and returns the resulting snapshot.
    ///
    /// If the action asks for randomness, this waits until the port
    /// answers (or times out, or the table is reset).
    pub async fn act(&self, action: Action) -> Result<GameSession, TableError> {
        self.request(|reply| TableCommand::Act { action, reply })
            .await?
    }

    /// Cancels a game that has not started. The table shuts down on
    /// success.
    pub async fn cancel(&self, player: PlayerId) -> Result<(), TableError> {
        self.request(|reply| TableCommand::Cancel { player, reply })
            .await?
    }

    /// Resets the table to an empty, unstarted session.
    pub async fn reset(&self) -> Result<GameSession, TableError> {
        self.request(|reply| TableCommand::Reset { reply }).await
    }

    pub async fn snapshot(&self) -> Result<GameSession, TableError> {
        self.request(|reply| TableCommand::Snapshot { reply }).await
    }

    /// Registers an observer. The first update is the current snapshot.
    pub async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<TableUpdate>, TableError> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.send(TableCommand::Subscribe { sender: tx }).await?;
        Ok(rx)
    }

    /// Tells the table to shut down.
    pub async fn shutdown(&self) -> Result<(), TableError> {
        self.send(TableCommand::Shutdown).await
    }

    async fn send(&self, command: TableCommand) -> Result<(), TableError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| TableError::Unavailable(self.session_id))
    }

    /// Sends a command carrying a reply channel and waits for the reply.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> TableCommand,
    ) -> Result<T, TableError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(command(reply_tx)).await?;
        reply_rx
            .await
            .map_err(|_| TableError::Unavailable(self.session_id))
    }
}

/// An action whose randomness has been requested but not yet delivered.
struct Pending {
    /// The session as it was before the action that started the wait.
    /// Restored as-is if the randomness never arrives.
    prior: GameSession,
    /// Events of the action that started the wait.
    events: Vec<GameEvent>,
    /// `None` when nobody is waiting (a restored session).
    reply: Option<Reply<GameSession>>,
}

/// The internal table state. Runs inside a Tokio task.
struct TableActor<R: RandomnessPort> {
    session_id: SessionId,
    session: GameSession,
    port: Arc<R>,
    config: TableConfig,
    /// Bumped by every randomness request and every reset.
    epoch: u64,
    pending: Option<Pending>,
    subscribers: Vec<UpdateSender>,
    receiver: mpsc::Receiver<TableCommand>,
    /// Weak so the actor doesn't keep its own mailbox open.
    mailbox: mpsc::WeakSender<TableCommand>,
}

impl<R: RandomnessPort> TableActor<R> {
    /// Runs the actor loop, processing commands until shutdown.
    async fn run(mut self) {
        tracing::info!(session_id = %self.session_id, "table actor started");

        // A restored session may have been persisted mid-wait.
        if let Some(request) = self.session.state().awaiting() {
            let prior = TurnStateMachine::rewind(&self.session);
            self.request_randomness(request, prior, Vec::new(), None);
        }

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                TableCommand::Act { action, reply } => self.handle_act(action, reply),
                TableCommand::Cancel { player, reply } => {
                    match TurnStateMachine::cancel(&self.session, &player) {
                        Ok(()) => {
                            tracing::info!(
                                session_id = %self.session_id,
                                %player,
                                "game cancelled"
                            );
                            let _ = reply.send(Ok(()));
                            break;
                        }
                        Err(err) => {
                            let _ = reply.send(Err(err.into()));
                        }
                    }
                }
                TableCommand::Reset { reply } => {
                    self.handle_reset();
                    let _ = reply.send(self.session.clone());
                }
                TableCommand::Snapshot { reply } => {
                    let _ = reply.send(self.session.clone());
                }
                TableCommand::Subscribe { sender } => {
                    let _ = sender.send(TableUpdate::Changed {
                        snapshot: self.session.clone(),
                        events: Vec::new(),
                    });
                    self.subscribers.push(sender);
                }
                TableCommand::Resolved { epoch, outcome } => self.handle_resolved(epoch, outcome),
                TableCommand::Shutdown => {
                    tracing::info!(session_id = %self.session_id, "table shutting down");
                    break;
                }
            }
        }

        if let Some(Pending {
            reply: Some(reply), ..
        }) = self.pending.take()
        {
            let _ = reply.send(Err(TableError::Unavailable(self.session_id)));
        }
        self.publish(TableUpdate::Closed);
        tracing::info!(session_id = %self.session_id, "table actor stopped");
    }

    fn handle_act(&mut self, action: Action, reply: Reply<GameSession>) {
        let joining = match &action {
            Action::Join { player, .. } => Some(player.clone()),
            _ => None,
        };

        let mut transition = match TurnStateMachine::apply(&self.session, action) {
            Ok(transition) => transition,
            Err(err) => {
                tracing::debug!(session_id = %self.session_id, %err, "action rejected");
                let _ = reply.send(Err(err.into()));
                return;
            }
        };

        if let Some(player) = joining {
            tracing::info!(
                session_id = %self.session_id,
                %player,
                seated = transition.session.seated_count(),
                "player joined"
            );
            if self.config.auto_start && transition.session.is_full() {
                match TurnStateMachine::apply(&transition.session, Action::Start { player }) {
                    Ok(started) => {
                        transition.events.extend(started.events);
                        transition.session = started.session;
                    }
                    Err(err) => {
                        tracing::warn!(session_id = %self.session_id, %err, "auto-start refused");
                    }
                }
            }
        }

        let pending = transition.pending();
        let prior = std::mem::replace(&mut self.session, transition.session);
        match pending {
            Some(request) => {
                // Observers see the waiting state right away.
                self.publish_changed(transition.events.clone());
                self.request_randomness(request, prior, transition.events, Some(reply));
            }
            None => {
                self.publish_changed(transition.events);
                let _ = reply.send(Ok(self.session.clone()));
            }
        }
    }

    fn handle_reset(&mut self) {
        self.epoch += 1;
        if let Some(Pending {
            reply: Some(reply), ..
        }) = self.pending.take()
        {
            let _ = reply.send(Err(TableError::Cancelled(self.session_id)));
        }
        self.session = TurnStateMachine::reset(&self.session);
        tracing::info!(session_id = %self.session_id, "table reset");
        self.publish_changed(Vec::new());
    }

    /// Spawns the port call. The answer comes back through the mailbox.
    fn request_randomness(
        &mut self,
        request: RandomnessRequest,
        prior: GameSession,
        events: Vec<GameEvent>,
        reply: Option<Reply<GameSession>>,
    ) {
        self.epoch += 1;
        self.pending = Some(Pending {
            prior,
            events,
            reply,
        });

        let Some(mailbox) = self.mailbox.upgrade() else {
            // Every handle is gone; nobody could deliver the answer.
            self.handle_resolved(
                self.epoch,
                Err(RandomnessError::Failed("table mailbox closed".into())),
            );
            return;
        };

        let epoch = self.epoch;
        let port = Arc::clone(&self.port);
        let timeout = self.config.randomness_timeout;
        tracing::debug!(session_id = %self.session_id, ?request, epoch, "requesting randomness");

        tokio::spawn(async move {
            let outcome = fetch(port.as_ref(), request, timeout).await;
            let _ = mailbox.send(TableCommand::Resolved { epoch, outcome }).await;
        });
    }

    fn handle_resolved(&mut self, epoch: u64, outcome: Result<Action, RandomnessError>) {
        if epoch != self.epoch {
            tracing::debug!(session_id = %self.session_id, epoch, "stale randomness dropped");
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        let result = outcome
            .map_err(RuleError::from)
            .and_then(|action| TurnStateMachine::apply(&self.session, action));

        match result {
            Ok(transition) => {
                let mut events = pending.events;
                events.extend(transition.events);
                self.session = transition.session;
                self.publish_changed(events);
                if let Some(reply) = pending.reply {
                    let _ = reply.send(Ok(self.session.clone()));
                }
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %self.session_id,
                    %err,
                    "randomness failed, rolling back"
                );
                self.session = pending.prior;
                self.publish_changed(Vec::new());
                if let Some(reply) = pending.reply {
                    let _ = reply.send(Err(err.into()));
                }
            }
        }
    }

    fn publish_changed(&mut self, events: Vec<GameEvent>) {
        self.publish(TableUpdate::Changed {
            snapshot: self.session.clone(),
            events,
        });
    }

    /// Sends an update to every observer, forgetting those that hung up.
    fn publish(&mut self, update: TableUpdate) {
        self.subscribers
            .retain(|subscriber| subscriber.send(update.clone()).is_ok());
    }
}

/// Asks the port for what `request` needs, within `timeout`.
async fn fetch<R: RandomnessPort>(
    port: &R,
    request: RandomnessRequest,
    timeout: Option<Duration>,
) -> Result<Action, RandomnessError> {
    let call = async {
        Ok(match request {
            RandomnessRequest::TurnSeed => Action::SeedResolved {
                seed: port.next_turn_seed().await?,
            },
            RandomnessRequest::DiceValue => Action::DiceResolved {
                value: port.next_dice_value().await?,
            },
        })
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| RandomnessError::Failed(format!("no answer within {limit:?}")))?,
        None => call.await,
    }
}

/// Spawns a new table actor task and returns a handle to communicate with
/// it.
pub(crate) fn spawn_table<R: RandomnessPort>(
    session_id: SessionId,
    session: GameSession,
    port: Arc<R>,
    config: TableConfig,
) -> TableHandle {
    let (tx, rx) = mpsc::channel(config.mailbox_size.max(1));

    let actor = TableActor {
        session_id,
        session,
        port,
        config,
        epoch: 0,
        pending: None,
        subscribers: Vec::new(),
        receiver: rx,
        mailbox: tx.downgrade(),
    };

    tokio::spawn(actor.run());

    TableHandle {
        session_id,
        sender: tx,
    }
}
