//! Error types for the table layer.

use ludo_engine::RuleError;
use ludo_protocol::{PlayerId, SessionId};

/// Errors that can occur during table operations.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// No table with this id.
    #[error("table {0} not found")]
    NotFound(SessionId),

    /// The player already sits at a table (a player plays one game at a
    /// time).
    #[error("player {0} already sits at table {1}")]
    AlreadySeated(PlayerId, SessionId),

    /// The player sits at no table.
    #[error("player {0} is not at any table")]
    NotSeated(PlayerId),

    /// The table was reset while this request waited for randomness.
    #[error("request cancelled: table {0} was reset")]
    Cancelled(SessionId),

    /// The table's mailbox is closed or the actor stopped.
    #[error("table {0} is unavailable")]
    Unavailable(SessionId),

    /// The rules engine refused the action.
    #[error(transparent)]
    Rules(#[from] RuleError),
}

impl TableError {
    /// A stable name for the error kind. Rule violations report the rule
    /// error's own code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::AlreadySeated(..) => "AlreadySeated",
            Self::NotSeated(_) => "NotSeated",
            Self::Cancelled(_) => "Cancelled",
            Self::Unavailable(_) => "Unavailable",
            Self::Rules(err) => err.code(),
        }
    }
}
