//! Minimal SGF position fragment: `(;AB[..][..]AW[..][..])`.

use crate::coords::BoardCoord;
use crate::error::SgfError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Black and white stone positions of a single board snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveList {
    pub black: Vec<BoardCoord>,
    pub white: Vec<BoardCoord>,
}

impl MoveList {
    pub fn new(black: Vec<BoardCoord>, white: Vec<BoardCoord>) -> Self {
        Self { black, white }
    }

    /// Render as `(;AB<blacks>AW<whites>)`. Both properties are always
    /// written, even when empty.
    pub fn to_sgf(&self) -> String {
        let mut out = String::with_capacity(8 + 4 * (self.black.len() + self.white.len()));
        out.push_str("(;AB");
        for c in &self.black {
            out.push_str(&c.to_string());
        }
        out.push_str("AW");
        for c in &self.white {
            out.push_str(&c.to_string());
        }
        out.push(')');
        out
    }

    /// Parse a fragment produced by [`MoveList::to_sgf`].
    ///
    /// Only `AB` and `AW` are understood; either may be missing or have no
    /// values. Whitespace between tokens is ignored.
    pub fn parse_sgf(text: &str) -> Result<Self, SgfError> {
        let body = text
            .trim()
            .strip_prefix("(;")
            .and_then(|t| t.strip_suffix(')'))
            .ok_or(SgfError::MissingDelimiters)?;
        // Byte offset of `body` within `text`, for error positions.
        let base = text.len() - text.trim_start().len() + 2;

        let mut list = MoveList::default();
        let mut chars = body.char_indices().peekable();
        let mut current: Option<String> = None;
        while let Some((offset, ch)) = chars.next() {
            match ch {
                c if c.is_whitespace() => {}
                c if c.is_ascii_uppercase() => {
                    // Property names are two letters, so `ABAW` is two
                    // properties back to back, not one.
                    let mut ident = String::from(c);
                    if let Some(&(_, next)) = chars.peek() {
                        if next.is_ascii_uppercase() {
                            ident.push(next);
                            chars.next();
                        }
                    }
                    if ident != "AB" && ident != "AW" {
                        return Err(SgfError::UnsupportedProperty(ident));
                    }
                    current = Some(ident);
                }
                '[' => {
                    let Some(prop) = current.as_deref() else {
                        return Err(SgfError::UnexpectedChar {
                            found: ch,
                            offset: base + offset,
                        });
                    };
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some((_, ']')) => break,
                            Some((_, c)) => value.push(c),
                            None => {
                                return Err(SgfError::Unterminated {
                                    offset: base + offset,
                                })
                            }
                        }
                    }
                    let coord = BoardCoord::from_str(&value)
                        .map_err(|_| SgfError::InvalidCoord(format!("[{value}]")))?;
                    if prop == "AB" {
                        list.black.push(coord);
                    } else {
                        list.white.push(coord);
                    }
                }
                other => {
                    return Err(SgfError::UnexpectedChar {
                        found: other,
                        offset: base + offset,
                    })
                }
            }
        }
        Ok(list)
    }
}

impl FromStr for MoveList {
    type Err = SgfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MoveList::parse_sgf(s)
    }
}
