//! Wire-level vocabulary for the Ludo rules engine.
//!
//! This crate defines what the rest of the workspace (and any client) agrees
//! on before a single rule is checked:
//!
//! - **Types** ([`PlayerId`], [`SessionId`], [`Color`], [`Request`]):
//!   identities and the action requests that travel between a client and a
//!   table.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer knows nothing about dice, tokens or turns. It only
//! knows how to name things and how to serialize them.
//!
//! ```text
//! bytes → Protocol (Request) → Table (one session) → Engine (rules)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// Users write `use ludo_protocol::Color` instead of reaching into
// `ludo_protocol::types::Color`.

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Color, PlayerId, Request, SessionId};
