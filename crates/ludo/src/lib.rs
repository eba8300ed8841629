//! # Ludo
//!
//! A server-authoritative Ludo rules engine.
//!
//! The rules live in [`ludo_engine`] as a pure state machine. Each game
//! runs on its own table actor ([`ludo_table`]), which serializes actions
//! and fetches dice values from a pluggable randomness port. The
//! [`Lobby`] in this crate is the front door: it takes a player identity
//! plus a wire [`Request`](ludo_protocol::Request) and answers with a
//! [`Response`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ludo::prelude::*;
//!
//! # async fn demo() -> Result<(), LudoError> {
//! let lobby = Lobby::new(ThreadRandomness);
//! let ann = PlayerId::new("ann");
//! let _response = lobby
//!     .handle(ann, Request::CreateGame { num_players: 2, color: Color::Red })
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod lobby;

pub use error::LudoError;
pub use lobby::{Lobby, Response};

/// Everything needed to run games, in one import.
pub mod prelude {
    pub use crate::{Lobby, LudoError, Response};
    pub use ludo_engine::{board, validator};
    pub use ludo_engine::{
        Action, GameEvent, GameSession, GameState, PlayerCount, RandomnessError,
        RandomnessPort, RuleError, ScriptedRandomness, TurnStateMachine,
    };
    pub use ludo_protocol::{Codec, Color, JsonCodec, PlayerId, Request, SessionId};
    pub use ludo_table::{
        TableConfig, TableError, TableHandle, TableManager, TableUpdate, ThreadRandomness,
    };
}
