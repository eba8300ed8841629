//! Core protocol types: who is playing, which game, which color, and what
//! they want to do.
//!
//! Everything here derives `Serialize`/`Deserialize` so it can cross a wire
//! or be written into a persisted snapshot.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// An opaque player identity supplied by an external identity provider
/// (wallet address, account id, ...).
///
/// The engine never checks authenticity. It only compares identities for
/// equality, so this is a "newtype wrapper" around a `String`: a
/// `PlayerId` can't be mixed up with any other string in a signature.
///
/// `#[serde(transparent)]` serializes it as the bare string, not as
/// `{ "0": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Builds an identity from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrows the raw identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifies one game session (one table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// One of the four seats at a Ludo board.
///
/// The discriminants are the slot indices used everywhere else: a
/// session's `players[2]` is Yellow's seat, `tokenPositions[3]` are Blue's
/// tokens, and so on. Play proceeds in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Color {
    Red = 0,
    Green = 1,
    Yellow = 2,
    Blue = 3,
}

impl Color {
    /// All colors in seating (and turn) order.
    pub const ALL: [Self; 4] = [Self::Red, Self::Green, Self::Yellow, Self::Blue];

    /// The slot index of this color (0..=3).
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up a color by slot index. `None` outside 0..=3.
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Red),
            1 => Some(Self::Green),
            2 => Some(Self::Yellow),
            3 => Some(Self::Blue),
            _ => None,
        }
    }

    /// The color seated after this one, wrapping Blue → Red.
    pub const fn following(self) -> Self {
        match self {
            Self::Red => Self::Green,
            Self::Green => Self::Yellow,
            Self::Yellow => Self::Blue,
            Self::Blue => Self::Red,
        }
    }
}

impl TryFrom<u8> for Color {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value as usize).ok_or_else(|| {
            ProtocolError::InvalidMessage(format!("no color with index {value}"))
        })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Red => write!(f, "Red"),
            Self::Green => write!(f, "Green"),
            Self::Yellow => write!(f, "Yellow"),
            Self::Blue => write!(f, "Blue"),
        }
    }
}

// ---------------------------------------------------------------------------
// Request: what a client asks a table to do
// ---------------------------------------------------------------------------

/// An action request sent by a connected player.
///
/// The sender's identity is not part of the request; whoever accepts the
/// bytes (the lobby) already knows who sent them. Requests that act on
/// "my current game" carry no session id because a player sits at one
/// table at a time.
///
/// `#[serde(tag = "type")]` produces the internally tagged form
/// `{ "type": "MoveToken", "token": 2 }`, and `rename_all_fields` keeps
/// field names camelCase for JavaScript clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Request {
    /// Open a new table for `num_players` (2 or 4) and sit at `color`.
    CreateGame { num_players: u8, color: Color },

    /// Sit at `color` on an existing table.
    JoinGame { session_id: SessionId, color: Color },

    /// Start the game once every seat is filled.
    StartGame,

    /// Roll the dice on your turn.
    RollDice,

    /// Put a token from the yard onto the entry square (needs a six).
    BringTokenIntoPlay { token: u8 },

    /// Advance a token already in play by the current roll.
    MoveToken { token: u8 },

    /// Abandon a game that hasn't started yet.
    CancelGame,

    /// Throw away whatever is on the table and start over.
    ResetGame { session_id: SessionId },

    /// Read-only: fetch the current snapshot of a table.
    Snapshot { session_id: SessionId },
}
