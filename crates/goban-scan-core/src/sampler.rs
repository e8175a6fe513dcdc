//! Colorimetric sampling at every board intersection.
//!
//! Each intersection gets two probes: a ring of reads tightly around the
//! intersection itself, and four reads offset diagonally towards the middle
//! of the neighbouring squares (which always show bare board). A stone
//! differs from its diagonal surroundings in hue/contrast; an empty
//! intersection does not.

use crate::coords::{BoardCoord, BOARD_SIZE, CELL_COUNT};
use crate::frame::ProjectiveFrame;
use crate::geometry::Point;
use crate::image::{Probe, RgbImageView};
use crate::params::SamplerParams;
use log::debug;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Two-dimensional clustering coordinate of one intersection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Hue/contrast discriminator against the diagonal neighbours.
    pub x: f64,
    /// Mean lightness around the intersection.
    pub y: f64,
}

impl Feature {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance `|dx| + |dy|`.
    #[inline]
    pub fn manhattan(&self, other: &Feature) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Everything measured at one intersection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorSample {
    pub coord: BoardCoord,
    /// Image position of the intersection.
    pub pixel: Point,
    /// Mean of the ring reads, `None` if none landed inside the image.
    pub center: Option<Probe>,
    /// Mean of the diagonal reads, `None` if none landed inside the image.
    pub neighbors: Option<Probe>,
    /// Clustering feature, present only when both probes are.
    pub feature: Option<Feature>,
}

/// Sample all 361 intersections in row-major order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(width = image.width, height = image.height))
)]
pub fn sample_board(
    image: &RgbImageView<'_>,
    frame: &ProjectiveFrame,
    params: &SamplerParams,
) -> Vec<ColorSample> {
    let mut samples = Vec::with_capacity(CELL_COUNT);
    samples.extend(BoardCoord::all().map(|coord| sample_cell(image, frame, params, coord)));
    let missing = samples.iter().filter(|s| s.feature.is_none()).count();
    debug!(
        "sampled {} intersections, {missing} without a feature",
        samples.len()
    );
    samples
}

fn sample_cell(
    image: &RgbImageView<'_>,
    frame: &ProjectiveFrame,
    params: &SamplerParams,
    coord: BoardCoord,
) -> ColorSample {
    let u = coord.row() as f64;
    let v = coord.col() as f64;
    let center = ring_probe(image, frame, params, u, v);
    let neighbors = diagonal_probe(image, frame, params, u, v);
    let feature = match (center, neighbors) {
        (Some(c), Some(n)) => Some(Feature {
            x: c.hue - n.hue - (c.lightness - n.lightness).abs() + params.feature_offset,
            y: c.lightness,
        }),
        _ => None,
    };
    ColorSample {
        coord,
        pixel: frame.cell_point(coord),
        center,
        neighbors,
        feature,
    }
}

/// `u`, `v` are in cell units (0..=18).
fn ring_probe(
    image: &RgbImageView<'_>,
    frame: &ProjectiveFrame,
    params: &SamplerParams,
    u: f64,
    v: f64,
) -> Option<Probe> {
    let last = (BOARD_SIZE - 1) as f64;
    let n = params.ring_samples;
    Probe::mean((0..n).filter_map(|t| {
        let phi = t as f64 / n as f64 * TAU;
        let p = frame.get_point(
            u / last + params.ring_radius * phi.cos(),
            v / last + params.ring_radius * phi.sin(),
        );
        image.probe(p)
    }))
}

fn diagonal_probe(
    image: &RgbImageView<'_>,
    frame: &ProjectiveFrame,
    params: &SamplerParams,
    u: f64,
    v: f64,
) -> Option<Probe> {
    let last = (BOARD_SIZE - 1) as f64;
    Probe::mean((0..4).filter_map(|t| {
        let phi = (t as f64 + 0.5) * FRAC_PI_2;
        let u1 = u + params.diagonal_offset * phi.cos();
        let v1 = v + params.diagonal_offset * phi.sin();
        // Corner intersections only have one diagonal neighbour on the board.
        if !(0.0..=last).contains(&u1) || !(0.0..=last).contains(&v1) {
            return None;
        }
        image.probe(frame.get_point(u1 / last, v1 / last))
    }))
}
