//! Error types for the protocol layer.
//!
//! Each crate in the workspace defines its own error enum. A
//! `ProtocolError` always means bytes could not be turned into a value (or
//! the other way around), never that a game rule was broken.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, an unknown `"type"` tag on a
    /// [`Request`](crate::Request), or a color name that doesn't exist.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The value decoded fine but is not meaningful, e.g. a color index
    /// outside 0..=3.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}

impl ProtocolError {
    /// A stable name for the error kind, suitable for clients to match on.
    pub fn code(&self) -> &'static str {
        match self {
            #[cfg(feature = "json")]
            Self::Encode(_) => "EncodeFailed",
            #[cfg(feature = "json")]
            Self::Decode(_) => "DecodeFailed",
            Self::InvalidMessage(_) => "InvalidMessage",
        }
    }
}
