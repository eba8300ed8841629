//! The game session snapshot and its lifecycle state.

use std::collections::HashSet;

use ludo_protocol::{Color, PlayerId};
use serde::{Deserialize, Serialize};

use crate::board::{FINISH, HOME, TOKENS_PER_PLAYER};
use crate::{RandomnessRequest, RuleError};

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// Where a session is in its lifecycle.
///
/// ```text
/// NotStarted → Starting → RollDice → RollingDice → Move → RollDice ... → Finished
/// ```
///
/// - **NotStarted**: seats are being filled.
/// - **Starting**: waiting for the turn-order seed.
/// - **RollDice**: the active player must roll.
/// - **RollingDice**: waiting for the dice value.
/// - **Move**: the active player must move a token by `current_roll`.
/// - **Finished**: someone won. Terminal; only a reset leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameState {
    NotStarted,
    Starting,
    RollDice,
    RollingDice,
    Move,
    Finished,
}

impl GameState {
    /// Returns `true` while the session waits on the randomness source.
    pub fn is_waiting(self) -> bool {
        matches!(self, Self::Starting | Self::RollingDice)
    }

    /// Returns `true` if exactly one player is active.
    pub fn is_in_play(self) -> bool {
        !matches!(self, Self::NotStarted | Self::Finished)
    }

    /// The randomness this state is waiting for, if any.
    pub fn awaiting(self) -> Option<RandomnessRequest> {
        match self {
            Self::Starting => Some(RandomnessRequest::TurnSeed),
            Self::RollingDice => Some(RandomnessRequest::DiceValue),
            _ => None,
        }
    }

    /// Human-readable status line for observers.
    pub fn status_message(self) -> &'static str {
        match self {
            Self::NotStarted => "Waiting for players to join...",
            Self::Starting => "Starting game...",
            Self::RollDice => "Roll the dice!",
            Self::RollingDice => "Rolling dice...",
            Self::Move => "Choose a token to move",
            Self::Finished => "Game finished!",
        }
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NotStarted"),
            Self::Starting => write!(f, "Starting"),
            Self::RollDice => write!(f, "RollDice"),
            Self::RollingDice => write!(f, "RollingDice"),
            Self::Move => write!(f, "Move"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

// ---------------------------------------------------------------------------
// PlayerCount
// ---------------------------------------------------------------------------

/// How many seats a table has. Serialized as the plain number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerCount {
    Two,
    Four,
}

impl PlayerCount {
    /// The number of seats.
    pub const fn get(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Four => 4,
        }
    }
}

impl TryFrom<u8> for PlayerCount {
    type Error = RuleError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            other => Err(RuleError::InvalidPlayerCount(other)),
        }
    }
}

impl From<PlayerCount> for u8 {
    fn from(count: PlayerCount) -> Self {
        count.get() as u8
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// The authoritative snapshot of one game.
///
/// Only [`TurnStateMachine`](crate::TurnStateMachine) produces new
/// sessions; everything else reads. Serialized as
/// `{numPlayers, players, currentPlayerIndex, tokenPositions, state,
/// currentRoll, consecutiveSixCount, winner}`.
///
/// Decoding checks shapes only. A decoded session must pass
/// [`verify`](Self::verify) before it is played; the table layer's
/// `restore` does this. The predicates in [`validator`](crate::validator)
/// never panic on an unverified session, but their answers mean nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub(crate) num_players: PlayerCount,
    pub(crate) players: [Option<PlayerId>; 4],
    #[serde(rename = "currentPlayerIndex", with = "color_index")]
    pub(crate) current_player: Color,
    pub(crate) token_positions: [[i8; TOKENS_PER_PLAYER]; 4],
    pub(crate) state: GameState,
    pub(crate) current_roll: u8,
    #[serde(rename = "consecutiveSixCount")]
    pub(crate) consecutive_sixes: u8,
    pub(crate) winner: Option<PlayerId>,
}

impl GameSession {
    /// An empty table: no one seated, every token in its yard.
    pub fn open(num_players: PlayerCount) -> Self {
        Self {
            num_players,
            players: Default::default(),
            current_player: Color::Red,
            token_positions: [[HOME; TOKENS_PER_PLAYER]; 4],
            state: GameState::NotStarted,
            current_roll: 0,
            consecutive_sixes: 0,
            winner: None,
        }
    }

    /// Opens a table and seats its creator.
    ///
    /// # Errors
    /// [`RuleError::InvalidPlayerCount`] unless `num_players` is 2 or 4.
    pub fn create(num_players: u8, creator: PlayerId, color: Color) -> Result<Self, RuleError> {
        let mut session = Self::open(PlayerCount::try_from(num_players)?);
        session.players[color.index()] = Some(creator);
        Ok(session)
    }

    pub fn num_players(&self) -> PlayerCount {
        self.num_players
    }

    /// All four seats, indexed by color.
    pub fn players(&self) -> &[Option<PlayerId>; 4] {
        &self.players
    }

    /// Who sits at `color`, if anyone.
    pub fn player(&self, color: Color) -> Option<&PlayerId> {
        self.players[color.index()].as_ref()
    }

    /// The color of the player whose turn it is. Meaningless before the
    /// game starts.
    pub fn current_player(&self) -> Color {
        self.current_player
    }

    /// Slot index of [`Self::current_player`].
    pub fn current_player_index(&self) -> usize {
        self.current_player.index()
    }

    /// The identity that must act next, if the game is in play.
    pub fn active_player(&self) -> Option<&PlayerId> {
        if self.state.is_in_play() {
            self.player(self.current_player)
        } else {
            None
        }
    }

    pub fn token_positions(&self) -> &[[i8; TOKENS_PER_PLAYER]; 4] {
        &self.token_positions
    }

    /// The four token positions of one color.
    pub fn tokens(&self, color: Color) -> &[i8; TOKENS_PER_PLAYER] {
        &self.token_positions[color.index()]
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn current_roll(&self) -> u8 {
        self.current_roll
    }

    pub fn consecutive_sixes(&self) -> u8 {
        self.consecutive_sixes
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    /// Observer status line for the current state.
    pub fn status_message(&self) -> &'static str {
        self.state.status_message()
    }

    /// The seat `player` holds, if any.
    pub fn seat_of(&self, player: &PlayerId) -> Option<Color> {
        Color::ALL
            .into_iter()
            .find(|color| self.player(*color) == Some(player))
    }

    /// Occupied colors in turn order.
    pub fn seated_colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL
            .into_iter()
            .filter(|color| self.players[color.index()].is_some())
    }

    pub fn seated_count(&self) -> usize {
        self.seated_colors().count()
    }

    /// Returns `true` once every seat for `num_players` is taken.
    pub fn is_full(&self) -> bool {
        self.seated_count() >= self.num_players.get()
    }

    /// The next occupied seat after `color`, cycling in color order.
    /// Returns `color` itself if no one else is seated.
    pub(crate) fn next_seated_after(&self, color: Color) -> Color {
        let mut next = color.following();
        while next != color {
            if self.players[next.index()].is_some() {
                return next;
            }
            next = next.following();
        }
        color
    }

    /// Checks every session invariant. Used on snapshots that did not come
    /// out of the state machine (decoded from storage, for example).
    ///
    /// # Errors
    /// [`RuleError::CorruptSnapshot`] describing the first violation found.
    pub fn verify(&self) -> Result<(), RuleError> {
        let corrupt = |msg: String| Err(RuleError::CorruptSnapshot(msg));

        let mut unique = HashSet::new();
        for player in self.players.iter().flatten() {
            if !unique.insert(player) {
                return corrupt(format!("{player} holds more than one seat"));
            }
        }
        if self.seated_count() > self.num_players.get() {
            return corrupt(format!(
                "{} players seated at a {}-player table",
                self.seated_count(),
                self.num_players.get()
            ));
        }

        for color in Color::ALL {
            let tokens = self.tokens(color);
            if let Some(bad) = tokens.iter().find(|p| !(HOME..=FINISH).contains(*p)) {
                return corrupt(format!("{color} token at {bad}"));
            }
            if self.player(color).is_none() && tokens.iter().any(|p| *p != HOME) {
                return corrupt(format!("unseated {color} has tokens in play"));
            }
        }

        if self.consecutive_sixes > 2 {
            return corrupt(format!("{} consecutive sixes", self.consecutive_sixes));
        }
        match self.state {
            GameState::Move if !(1..=6).contains(&self.current_roll) => {
                return corrupt(format!("pending roll {}", self.current_roll));
            }
            GameState::Move => {}
            _ if self.current_roll != 0 => {
                return corrupt(format!("roll {} outside Move", self.current_roll));
            }
            _ => {}
        }

        if self.state.is_in_play() {
            if !self.is_full() {
                return corrupt("game in play with empty seats".into());
            }
            if self.player(self.current_player).is_none() {
                return corrupt(format!("active color {} is unseated", self.current_player));
            }
        }

        match (&self.winner, self.state) {
            (Some(winner), GameState::Finished) => {
                let Some(color) = self.seat_of(winner) else {
                    return corrupt(format!("winner {winner} is not seated"));
                };
                if self.tokens(color).iter().any(|p| *p != FINISH) {
                    return corrupt(format!("winner {winner} has unfinished tokens"));
                }
            }
            (None, GameState::Finished) => return corrupt("finished without a winner".into()),
            (Some(_), _) => return corrupt("winner set before the game finished".into()),
            (None, _) => {}
        }

        Ok(())
    }
}

/// Serializes a [`Color`] as its slot index, matching the
/// `currentPlayerIndex` field of the snapshot layout.
mod color_index {
    use ludo_protocol::Color;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(color: &Color, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(color.index() as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
        let index = u8::deserialize(deserializer)?;
        Color::try_from(index).map_err(D::Error::custom)
    }
}
