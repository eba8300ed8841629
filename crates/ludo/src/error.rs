//! Unified error type for the Ludo workspace.

use ludo_protocol::ProtocolError;
use ludo_table::TableError;

/// Top-level error that wraps the crate-specific errors.
///
/// Rule violations arrive as `Table(TableError::Rules(_))`, since every
/// action goes through a table. The `#[from]` attributes let `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum LudoError {
    /// Bytes could not be decoded into a request, or a response could not
    /// be encoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A table refused the request (rules, seating, availability).
    #[error(transparent)]
    Table(#[from] TableError),
}

impl LudoError {
    /// A stable name for the error kind, sent to clients in
    /// `Response::Error`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Protocol(err) => err.code(),
            Self::Table(err) => err.code(),
        }
    }
}
