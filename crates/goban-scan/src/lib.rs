//! High-level facade for `goban-scan-core`.
//!
//! This crate provides:
//! - re-exports of the core pipeline types,
//! - JSON scan configuration ([`io::ScanConfig`]),
//! - (feature `image`) helpers that run the pipeline on `image` crate
//!   buffers and render a debug overlay of the classification,
//! - (feature `cli`) the `goban-scan` command line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use goban_scan::detect;
//! use goban_scan::{BoardCorners, CornerOrder, ScanParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = detect::load_rgb("board.jpg")?;
//! let corners = BoardCorners::parse(
//!     "582,224,277,117,399,437,45,280",
//!     CornerOrder::Detector,
//! )?;
//! let result = detect::scan_rgb(&img, &corners, ScanParams::default())?;
//! println!("{}", result.to_sgf());
//! # Ok(())
//! # }
//! ```
//!
//! ## Corner convention
//!
//! Corners are `a, b, c, d` in cyclic order: `a` is the board origin, `b`
//! ends the row axis, `c` is opposite `a`, `d` ends the column axis. Flat
//! arrays of 8 numbers are read per [`CornerOrder`]; orientation is never
//! guessed.

pub use goban_scan_core as core;

pub use goban_scan_core::{
    BoardCoord, BoardCorners, BoardScanner, CornerOrder, MoveList, ScanError, ScanParams,
    ScanResult, StoneClass,
};

pub mod io;

#[cfg(feature = "image")]
pub mod detect;
