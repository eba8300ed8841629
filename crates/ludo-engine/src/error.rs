//! Error types for the rules engine.

use ludo_protocol::PlayerId;

use crate::GameState;

/// Why an action was refused.
///
/// Whenever one of these comes back, the session the action was applied
/// to is untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The action is not legal in the current state, e.g. rolling while a
    /// token move is pending, or anything but a reset after the game ended.
    #[error("cannot {action} while the game is in state {state}")]
    InvalidTransition {
        action: &'static str,
        state: GameState,
    },

    /// The caller is not the active player.
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),

    /// Bad token index, token not eligible, or the move would overshoot
    /// the finish.
    #[error("illegal move for token {token}: {reason}")]
    IllegalMove { token: usize, reason: String },

    /// The color is taken, the roster is full, or the identity already
    /// holds another seat.
    #[error("seat unavailable: {0}")]
    SlotUnavailable(String),

    /// The randomness source failed or produced an unusable value.
    #[error("randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// Only two- and four-player games exist on this board.
    #[error("unsupported player count {0}, expected 2 or 4")]
    InvalidPlayerCount(u8),

    /// The caller holds no seat at this table.
    #[error("{0} is not seated at this table")]
    NotSeated(PlayerId),

    /// A deserialized snapshot breaks a session invariant.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),
}

impl RuleError {
    /// A stable name for the error kind, suitable for clients to match on.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "InvalidTransition",
            Self::NotYourTurn(_) => "NotYourTurn",
            Self::IllegalMove { .. } => "IllegalMove",
            Self::SlotUnavailable(_) => "SlotUnavailable",
            Self::RandomnessUnavailable(_) => "RandomnessUnavailable",
            Self::InvalidPlayerCount(_) => "InvalidPlayerCount",
            Self::NotSeated(_) => "NotSeated",
            Self::CorruptSnapshot(_) => "CorruptSnapshot",
        }
    }
}

/// Failure reported by a [`RandomnessPort`](crate::RandomnessPort).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RandomnessError {
    /// The source is reachable but refused or failed to answer.
    #[error("randomness source failed: {0}")]
    Failed(String),

    /// A finite source (a script) ran out of values.
    #[error("randomness source exhausted")]
    Exhausted,
}

impl From<RandomnessError> for RuleError {
    fn from(err: RandomnessError) -> Self {
        Self::RandomnessUnavailable(err.to_string())
    }
}
