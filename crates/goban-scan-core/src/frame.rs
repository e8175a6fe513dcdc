//! Perspective-correct mapping from normalized board coordinates to pixels.
//!
//! The two pairs of opposite board edges meet at vanishing points; the line
//! through them is the horizon (image of the line at infinity). A corner's
//! inverse distance to the horizon is proportional to its projective depth
//! weight, so blending corners with depth-weighted fractions reproduces the
//! exact homography of the unit square onto the quadrilateral without ever
//! solving for the 3x3 matrix.

use crate::coords::{BoardCoord, BOARD_SIZE};
use crate::corners::BoardCorners;
use crate::error::GeometryError;
use crate::geometry::{mix, Line, Point};
use log::debug;

/// Corners closer than this (in pixels) to the horizon are rejected.
const MIN_HORIZON_DISTANCE: f64 = 1e-9;
/// Blended depth weights below this fall back to affine interpolation.
const MIN_DEPTH: f64 = 1e-15;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Depth {
    /// Per-corner inverse horizon distances `za, zb, zc, zd`.
    Perspective([f64; 4]),
    /// Both edge pairs parallel: plain bilinear interpolation is exact.
    Affine,
}

/// Maps `(u, v) ∈ [0, 1]²` onto the board quadrilateral.
///
/// `u` runs from `a` towards `b` (rows), `v` from `a` towards `d` (columns);
/// `(1, 1)` lands on `c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectiveFrame {
    corners: BoardCorners,
    depth: Depth,
}

impl ProjectiveFrame {
    pub fn new(corners: BoardCorners) -> Result<Self, GeometryError> {
        let [a, b, c, d] = *corners.points();
        let side = |p: Point, q: Point, first: usize, second: usize| {
            Line::through(p, q).ok_or(GeometryError::DuplicateCorner { first, second })
        };
        let ab = side(b, a, 0, 1)?;
        let dc = side(c, d, 2, 3)?;
        let ad = side(d, a, 0, 3)?;
        let bc = side(c, b, 1, 2)?;

        let x_inf = ab.intersect(&dc);
        let y_inf = ad.intersect(&bc);
        let horizon = match (x_inf, y_inf) {
            (Some(x), Some(y)) => Line::through(x, y),
            // One pair of sides is parallel: its vanishing point lies at
            // infinity along that pair, so the horizon runs parallel to it.
            (Some(x), None) => Line::with_direction(x, ad.direction()),
            (None, Some(y)) => Line::with_direction(y, ab.direction()),
            (None, None) => None,
        };
        if horizon.is_none() && (x_inf.is_some() || y_inf.is_some()) {
            return Err(GeometryError::NonConvex);
        }

        let depth = match horizon {
            Some(horizon) => {
                let mut z = [0.0; 4];
                for (index, p) in corners.points().iter().enumerate() {
                    let dist = horizon.distance_to(*p);
                    if dist.is_nan() || dist <= MIN_HORIZON_DISTANCE {
                        return Err(GeometryError::CornerOnHorizon { index });
                    }
                    z[index] = 1.0 / dist;
                }
                debug!("perspective frame, depth weights {z:?}");
                Depth::Perspective(z)
            }
            None => {
                debug!("affine frame, both side pairs parallel");
                Depth::Affine
            }
        };

        Ok(Self { corners, depth })
    }

    #[inline]
    pub fn corners(&self) -> &BoardCorners {
        &self.corners
    }

    /// `true` when the frame applies perspective correction.
    pub fn is_perspective(&self) -> bool {
        matches!(self.depth, Depth::Perspective(_))
    }

    /// Pixel position of normalized board coordinates `(u, v)`.
    pub fn get_point(&self, u: f64, v: f64) -> Point {
        let [a, b, c, d] = *self.corners.points();
        let (fab, fdc, f) = match self.depth {
            Depth::Affine => (u, u, v),
            Depth::Perspective([za, zb, zc, zd]) => {
                let zab = za * (1.0 - u) + zb * u;
                let zdc = zd * (1.0 - u) + zc * u;
                let z = zab * (1.0 - v) + zdc * v;
                if zab.abs() < MIN_DEPTH || zdc.abs() < MIN_DEPTH || z.abs() < MIN_DEPTH {
                    (u, u, v)
                } else {
                    (u * zb / zab, u * zc / zdc, v * zdc / z)
                }
            }
        };
        mix(mix(a, b, fab), mix(d, c, fdc), f)
    }

    /// Pixel position of a board intersection.
    pub fn cell_point(&self, coord: BoardCoord) -> Point {
        let last = (BOARD_SIZE - 1) as f64;
        self.get_point(coord.row() as f64 / last, coord.col() as f64 / last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::CornerOrder;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};

    fn assert_close(p: Point, q: Point, tol: f64) {
        assert!(
            (p - q).norm() < tol,
            "expected ({:.6},{:.6}) ~ ({:.6},{:.6}) within {}",
            p.x,
            p.y,
            q.x,
            q.y,
            tol
        );
    }

    fn apply(h: &Matrix3<f64>, u: f64, v: f64) -> Point {
        // Homography takes (row, column) = (u, v) to pixels.
        let w = h * Vector3::new(u, v, 1.0);
        Point::new(w[0] / w[2], w[1] / w[2])
    }

    fn frame_from_homography(h: &Matrix3<f64>) -> ProjectiveFrame {
        let corners = BoardCorners::new([
            apply(h, 0.0, 0.0),
            apply(h, 1.0, 0.0),
            apply(h, 1.0, 1.0),
            apply(h, 0.0, 1.0),
        ])
        .expect("convex");
        ProjectiveFrame::new(corners).expect("frame")
    }

    #[test]
    fn corners_map_to_themselves() {
        let corners = BoardCorners::from_values(
            &[582.0, 224.0, 277.0, 117.0, 399.0, 437.0, 45.0, 280.0],
            CornerOrder::Detector,
        )
        .expect("corners");
        let frame = ProjectiveFrame::new(corners).expect("frame");
        assert!(frame.is_perspective());
        assert_close(frame.get_point(0.0, 0.0), corners.a(), 1e-9);
        assert_close(frame.get_point(1.0, 0.0), corners.b(), 1e-9);
        assert_close(frame.get_point(1.0, 1.0), corners.c(), 1e-9);
        assert_close(frame.get_point(0.0, 1.0), corners.d(), 1e-9);
    }

    #[test]
    fn matches_true_homography_inside_the_board() {
        let h = Matrix3::new(
            310.0, -40.0, 120.0, //
            25.0, 280.0, 60.0, //
            0.35, -0.2, 1.0,
        );
        let frame = frame_from_homography(&h);
        assert!(frame.is_perspective());
        for &(u, v) in &[(0.5, 0.5), (0.1, 0.9), (0.75, 0.2), (0.33, 0.66)] {
            assert_close(frame.get_point(u, v), apply(&h, u, v), 1e-6);
        }
    }

    #[test]
    fn single_vanishing_point_is_still_perspective_correct() {
        // Trapezoid: row edges (a-b, d-c) are parallel, column edges converge.
        let h = Matrix3::new(
            200.0, 0.0, 50.0, //
            0.0, 200.0, 40.0, //
            0.0, 0.6, 1.0,
        );
        let frame = frame_from_homography(&h);
        assert!(frame.is_perspective());
        for &(u, v) in &[(0.5, 0.5), (0.2, 0.8), (0.9, 0.1)] {
            assert_close(frame.get_point(u, v), apply(&h, u, v), 1e-6);
        }
    }

    #[test]
    fn parallelogram_is_affine() {
        let corners = BoardCorners::new([
            Point::new(10.0, 10.0),
            Point::new(110.0, 30.0),
            Point::new(130.0, 130.0),
            Point::new(30.0, 110.0),
        ])
        .expect("corners");
        let frame = ProjectiveFrame::new(corners).expect("frame");
        assert!(!frame.is_perspective());
        let p = frame.get_point(0.5, 0.5);
        assert_relative_eq!(p.x, 70.0, epsilon = 1e-9);
        assert_relative_eq!(p.y, 70.0, epsilon = 1e-9);
    }

    #[test]
    fn far_edge_cells_are_foreshortened() {
        // Column edges converge towards v = 1, so equal steps in v shrink.
        let h = Matrix3::new(
            200.0, 0.0, 50.0, //
            0.0, 200.0, 40.0, //
            0.0, 0.6, 1.0,
        );
        let frame = frame_from_homography(&h);
        let near = (frame.get_point(0.5, 0.1) - frame.get_point(0.5, 0.0)).norm();
        let far = (frame.get_point(0.5, 1.0) - frame.get_point(0.5, 0.9)).norm();
        assert!(far < near, "far step {far} should be shorter than near step {near}");
    }

    #[test]
    fn cell_point_hits_grid_corners() {
        let corners = BoardCorners::new([
            Point::new(0.0, 0.0),
            Point::new(0.0, 180.0),
            Point::new(180.0, 180.0),
            Point::new(180.0, 0.0),
        ])
        .expect("corners");
        let frame = ProjectiveFrame::new(corners).expect("frame");
        let coord = BoardCoord::new(18, 0).expect("coord");
        assert_close(frame.cell_point(coord), corners.d(), 1e-9);
        let coord = BoardCoord::new(3, 5).expect("coord");
        assert_close(frame.cell_point(coord), Point::new(30.0, 50.0), 1e-9);
    }
}
