//! Ludo tables for multiplayer games.
//!
//! Each table runs as an isolated Tokio task (actor model) owning one
//! [`GameSession`](ludo_engine::GameSession). Actions on a table are
//! applied strictly one at a time; randomness is fetched in the background
//! while the table keeps answering its mailbox.
//!
//! # Key types
//!
//! - [`TableManager`]: creates/closes tables, routes players to their seat
//! - [`TableHandle`]: send commands to a running table actor
//! - [`TableUpdate`]: what observers receive after each change
//! - [`TableConfig`]: mailbox size, randomness timeout, auto-start
//! - [`ThreadRandomness`]: a ready-made [`RandomnessPort`](ludo_engine::RandomnessPort)

mod config;
mod error;
mod manager;
mod randomness;
mod table;

pub use config::TableConfig;
pub use error::TableError;
pub use manager::TableManager;
pub use randomness::ThreadRandomness;
pub use table::{TableHandle, TableUpdate, UpdateSender};
