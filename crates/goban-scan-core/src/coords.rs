use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SgfError;

/// Number of lines on each side of the board.
pub const BOARD_SIZE: usize = 19;
/// Number of intersections on the board.
pub const CELL_COUNT: usize = BOARD_SIZE * BOARD_SIZE;

/// One board intersection.
///
/// Rendered as an SGF point `[cr]`: column letter first, then row letter,
/// `a` for index 0 through `s` for index 18.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BoardCoord {
    // Field order makes the derived `Ord` row-major.
    row: u8,
    col: u8,
}

impl BoardCoord {
    pub fn new(col: usize, row: usize) -> Option<Self> {
        if col >= BOARD_SIZE || row >= BOARD_SIZE {
            return None;
        }
        Some(Self {
            col: col as u8,
            row: row as u8,
        })
    }

    /// Inverse of [`BoardCoord::index`].
    pub fn from_index(index: usize) -> Option<Self> {
        if index >= CELL_COUNT {
            return None;
        }
        Self::new(index % BOARD_SIZE, index / BOARD_SIZE)
    }

    #[inline]
    pub fn col(self) -> usize {
        self.col as usize
    }

    #[inline]
    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Row-major index in `0..CELL_COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        self.row() * BOARD_SIZE + self.col()
    }

    /// All intersections in row-major order.
    pub fn all() -> impl Iterator<Item = BoardCoord> {
        (0..CELL_COUNT).filter_map(BoardCoord::from_index)
    }

    /// Bare two-letter form without brackets, e.g. `"dp"`.
    pub fn letters(self) -> String {
        let mut s = String::with_capacity(2);
        s.push(letter(self.col));
        s.push(letter(self.row));
        s
    }
}

fn letter(i: u8) -> char {
    (b'a' + i) as char
}

fn letter_index(c: char) -> Option<usize> {
    let i = (c as u32).checked_sub('a' as u32)? as usize;
    (i < BOARD_SIZE).then_some(i)
}

impl fmt::Display for BoardCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}{}]", letter(self.col), letter(self.row))
    }
}

impl FromStr for BoardCoord {
    type Err = SgfError;

    /// Accepts both `"[dp]"` and `"dp"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(s);
        let mut chars = inner.chars();
        let parsed = match (chars.next(), chars.next(), chars.next()) {
            (Some(c), Some(r), None) => letter_index(c).zip(letter_index(r)),
            _ => None,
        };
        parsed
            .and_then(|(col, row)| BoardCoord::new(col, row))
            .ok_or_else(|| SgfError::InvalidCoord(s.to_string()))
    }
}

impl TryFrom<String> for BoardCoord {
    type Error = SgfError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BoardCoord> for String {
    fn from(coord: BoardCoord) -> Self {
        coord.letters()
    }
}
