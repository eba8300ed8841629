//! Board geometry: where a token actually is on the 15×15 board.
//!
//! Every token position in a session is *relative* to its owner:
//!
//! ```text
//!  -1        yard (not entered yet)
//!   0..=51   main loop, 0 = the color's own entry square
//!  52..=56   private home column, 56 = finished
//! ```
//!
//! The main loop has 52 shared cells. Each color enters it 13 cells after
//! the previous one, so relative offset `p` of color `c` sits on shared
//! index `(p + 13·c) mod 52`. The board is drawn from Red's point of view;
//! the other colors' yards and home columns are Red's rotated clockwise by
//! 90° per seat.
//!
//! Everything here is pure. Positions outside -1..=56 are bugs in the
//! caller and panic.

use ludo_protocol::Color;

/// A `(row, col)` square on the board, both in `0..BOARD_SIZE`.
pub type Cell = (u8, u8);

/// Width and height of the board.
pub const BOARD_SIZE: u8 = 15;

/// Tokens each player owns.
pub const TOKENS_PER_PLAYER: usize = 4;

/// Relative position of a token still in its yard.
pub const HOME: i8 = -1;

/// Last relative position on the shared loop.
pub const LAST_TRACK_POSITION: i8 = 51;

/// First relative position of the private home column.
pub const HOME_STRETCH_START: i8 = 52;

/// Relative position of a finished token.
pub const FINISH: i8 = 56;

/// Number of cells on the shared loop.
pub const TRACK_LENGTH: usize = 52;

/// Distance between consecutive colors' entry squares.
pub const ENTRY_STRIDE: usize = 13;

/// Entry squares and star squares. Rotating by [`ENTRY_STRIDE`] maps the
/// set onto itself, so it reads the same from every color's point of view.
pub const SAFE_CELLS: [i8; 8] = [0, 8, 13, 21, 26, 34, 39, 47];

/// The shared loop, clockwise, starting on Red's entry square.
const TRACK: [Cell; TRACK_LENGTH] = [
    (6, 0),
    (6, 1),
    (6, 2),
    (6, 3),
    (6, 4),
    (6, 5),
    (5, 6),
    (4, 6),
    (3, 6),
    (2, 6),
    (1, 6),
    (0, 6),
    (0, 7),
    (0, 8),
    (1, 8),
    (2, 8),
    (3, 8),
    (4, 8),
    (5, 8),
    (6, 9),
    (6, 10),
    (6, 11),
    (6, 12),
    (6, 13),
    (6, 14),
    (7, 14),
    (8, 14),
    (8, 13),
    (8, 12),
    (8, 11),
    (8, 10),
    (8, 9),
    (9, 8),
    (10, 8),
    (11, 8),
    (12, 8),
    (13, 8),
    (14, 8),
    (14, 7),
    (14, 6),
    (13, 6),
    (12, 6),
    (11, 6),
    (10, 6),
    (9, 6),
    (8, 5),
    (8, 4),
    (8, 3),
    (8, 2),
    (8, 1),
    (8, 0),
    (7, 0),
];

/// Red's home column, relative 52..=56.
const RED_HOME_COLUMN: [Cell; 5] = [(7, 1), (7, 2), (7, 3), (7, 4), (7, 5)];

/// Red's four yard squares.
const RED_YARD: [Cell; TOKENS_PER_PLAYER] = [(1, 1), (1, 4), (4, 1), (4, 4)];

/// Panics unless `relative` is a real position.
fn assert_position(relative: i8) {
    assert!(
        (HOME..=FINISH).contains(&relative),
        "token position {relative} outside {HOME}..={FINISH}"
    );
}

/// Rotates a cell clockwise by 90° `turns` times around the board center.
fn rotate(cell: Cell, turns: usize) -> Cell {
    let last = BOARD_SIZE - 1;
    (0..turns % 4).fold(cell, |(row, col), _| (col, last - row))
}

/// Offset of `color`'s entry square on the shared loop.
pub const fn entry_offset(color: Color) -> usize {
    color.index() * ENTRY_STRIDE
}

/// Shared-loop index of a relative position, or `None` when the token is
/// in its yard, its home column, or finished.
///
/// Two tokens of different colors collide exactly when their shared-loop
/// indices are equal.
pub fn track_index(color: Color, relative: i8) -> Option<usize> {
    assert_position(relative);
    if !(0..=LAST_TRACK_POSITION).contains(&relative) {
        return None;
    }
    Some((relative as usize + entry_offset(color)) % TRACK_LENGTH)
}

/// Maps a player-relative position onto the board.
///
/// A token in the yard (-1) reports the color's first yard square; use
/// [`yard_cell`] to place each waiting token on its own square.
pub fn absolute_cell(color: Color, relative: i8) -> Cell {
    assert_position(relative);
    match relative {
        HOME => yard_cell(color, 0),
        0..=LAST_TRACK_POSITION => {
            TRACK[(relative as usize + entry_offset(color)) % TRACK_LENGTH]
        }
        _ => {
            let step = (relative - HOME_STRETCH_START) as usize;
            rotate(RED_HOME_COLUMN[step], color.index())
        }
    }
}

/// The yard square of one of `color`'s tokens.
pub fn yard_cell(color: Color, token: usize) -> Cell {
    assert!(token < TOKENS_PER_PLAYER, "token index {token} out of range");
    rotate(RED_YARD[token], color.index())
}

/// Returns `true` if a token on this relative position can't be captured.
pub fn is_safe_cell(relative: i8) -> bool {
    assert_position(relative);
    SAFE_CELLS.contains(&relative)
}

/// Returns `true` if the position is on the shared loop, where captures
/// can happen.
pub fn is_on_track(relative: i8) -> bool {
    assert_position(relative);
    (0..=LAST_TRACK_POSITION).contains(&relative)
}
