//! Core pipeline for reading a Go board position from a photograph.
//!
//! Given a decoded RGB(A) raster and the four outer corners of the 19x19
//! grid, the pipeline:
//!
//! 1. builds a [`ProjectiveFrame`] that maps normalized board coordinates to
//!    image pixels with perspective correction,
//! 2. samples two colorimetric features at each of the 361 intersections
//!    ([`sample_board`]),
//! 3. merges the samples agglomeratively down to three clusters
//!    ([`quick_partition`], [`partition`]),
//! 4. labels the clusters black / white / board ([`assign_sets`]),
//! 5. renders the stones as a minimal SGF fragment ([`MoveList::to_sgf`]).
//!
//! This crate is purely computational. It does not decode images and does
//! not locate the board; both are left to the caller.
//!
//! ```
//! use goban_scan_core::{BoardCorners, BoardScanner, CornerOrder, RgbImage, ScanParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = RgbImage::filled(200, 200, [190, 150, 90]);
//! let corners = BoardCorners::from_values(
//!     &[10.0, 10.0, 10.0, 190.0, 190.0, 190.0, 190.0, 10.0],
//!     CornerOrder::Cyclic,
//! )?;
//! let scanner = BoardScanner::new(ScanParams::default())?;
//! let result = scanner.scan(&image.view(), &corners)?;
//! assert!(result.to_sgf().starts_with("(;AB"));
//! # Ok(())
//! # }
//! ```

mod classify;
mod cluster;
mod coords;
mod corners;
mod error;
mod frame;
mod geometry;
mod image;
mod logger;
mod params;
mod sampler;
mod scan;
mod sgf;

pub use classify::{assign_sets, StoneClass, StoneSets};
pub use cluster::{partition, quick_partition, ClusterPoint, PointCluster};
pub use coords::{BoardCoord, BOARD_SIZE, CELL_COUNT};
pub use corners::{BoardCorners, CornerOrder};
pub use error::{ClusterError, CornerParseError, GeometryError, ScanError, SgfError};
pub use frame::ProjectiveFrame;
pub use geometry::{mix, Line, Point};
pub use image::{reduce_color, Probe, RgbImage, RgbImageView};
pub use params::{ClusterParams, MissingCellPolicy, SamplerParams, ScanParams};
pub use sampler::{sample_board, ColorSample, Feature};
pub use scan::{BoardScanner, ClusterSummary, ScanResult};
pub use sgf::MoveList;

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, parse_level};
