//! # ludo-engine
//!
//! The rules of Ludo as a pure state machine.
//!
//! A [`GameSession`] is an immutable-by-convention snapshot. The
//! [`TurnStateMachine`] takes a session and an [`Action`] and either
//! returns the successor session (plus [`GameEvent`]s describing what
//! happened) or a [`RuleError`] with the input untouched.
//!
//! The engine owns no randomness. When a session enters `Starting` or
//! `RollingDice`, the driver asks a [`RandomnessPort`] and feeds the answer
//! back as [`Action::SeedResolved`] / [`Action::DiceResolved`].
//!
//! ```
//! use ludo_engine::{Action, GameSession, GameState, TurnStateMachine};
//! use ludo_protocol::{Color, PlayerId};
//!
//! let session = GameSession::create(2, PlayerId::new("ann"), Color::Red).unwrap();
//! let joined = TurnStateMachine::apply(
//!     &session,
//!     Action::Join { player: PlayerId::new("bob"), color: Color::Yellow },
//! )
//! .unwrap();
//! let started = TurnStateMachine::apply(
//!     &joined.session,
//!     Action::Start { player: PlayerId::new("ann") },
//! )
//! .unwrap();
//! assert_eq!(started.session.state(), GameState::Starting);
//! ```

pub mod board;
mod error;
mod machine;
mod port;
mod session;
pub mod validator;

pub use error::{RandomnessError, RuleError};
pub use machine::{Action, GameEvent, PassReason, Transition, TurnStateMachine};
pub use port::{RandomnessPort, RandomnessRequest, ScriptedRandomness};
pub use session::{GameSession, GameState, PlayerCount};
