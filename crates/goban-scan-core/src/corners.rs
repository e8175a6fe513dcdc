//! The four outer corners of the board grid in image pixels.

use crate::error::{CornerParseError, GeometryError};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Relative tolerance for duplicate / collinear corner checks.
const DEGENERATE_EPS: f64 = 1e-9;

/// Layout of the flat `[x0, y0, ..., x3, y3]` corner array.
///
/// Corners are named `a, b, c, d` in cyclic order around the board: `a` is
/// board origin (row 0, column 0), `b` ends the row axis, `c` is opposite
/// `a` and `d` ends the column axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CornerOrder {
    /// `[a, b, c, d]`.
    #[default]
    Cyclic,
    /// `[d, a, c, b]`, the layout emitted by the upstream corner detector.
    Detector,
}

impl CornerOrder {
    /// Slot in the flat array holding each of `a, b, c, d`.
    fn slots(self) -> [usize; 4] {
        match self {
            CornerOrder::Cyclic => [0, 1, 2, 3],
            CornerOrder::Detector => [1, 3, 2, 0],
        }
    }
}

impl std::str::FromStr for CornerOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cyclic" => Ok(CornerOrder::Cyclic),
            "detector" => Ok(CornerOrder::Detector),
            other => Err(format!("unknown corner order {other:?}")),
        }
    }
}

/// Validated board corners `a, b, c, d`.
///
/// Invariants: all coordinates are finite, corners are pairwise distinct,
/// no corner is collinear with its two neighbours and the quadrilateral is
/// convex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Point; 4]", into = "[Point; 4]")]
pub struct BoardCorners {
    points: [Point; 4],
}

impl BoardCorners {
    /// Validate corners given as `[a, b, c, d]`.
    pub fn new(points: [Point; 4]) -> Result<Self, GeometryError> {
        validate(&points)?;
        Ok(Self { points })
    }

    /// Build corners from 8 numbers laid out per `order`.
    pub fn from_values(values: &[f64], order: CornerOrder) -> Result<Self, CornerParseError> {
        if values.len() != 8 {
            return Err(CornerParseError::WrongCount { got: values.len() });
        }
        let points = order
            .slots()
            .map(|slot| Point::new(values[2 * slot], values[2 * slot + 1]));
        Ok(Self::new(points)?)
    }

    /// Parse a comma and/or whitespace separated list of 8 numbers.
    pub fn parse(text: &str, order: CornerOrder) -> Result<Self, CornerParseError> {
        let values = text
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<f64>()
                    .map_err(|_| CornerParseError::InvalidNumber {
                        value: t.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_values(&values, order)
    }

    #[inline]
    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }

    pub fn a(&self) -> Point {
        self.points[0]
    }

    pub fn b(&self) -> Point {
        self.points[1]
    }

    pub fn c(&self) -> Point {
        self.points[2]
    }

    pub fn d(&self) -> Point {
        self.points[3]
    }

    /// Flat `[x0, y0, ..., x3, y3]` in `order`.
    pub fn to_values(&self, order: CornerOrder) -> [f64; 8] {
        let mut out = [0.0; 8];
        for (corner, slot) in order.slots().into_iter().enumerate() {
            out[2 * slot] = self.points[corner].x;
            out[2 * slot + 1] = self.points[corner].y;
        }
        out
    }

    /// Axis-aligned extent `(min, max)` of the corners.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut min = self.points[0];
        let mut max = self.points[0];
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        (min, max)
    }
}

impl TryFrom<[Point; 4]> for BoardCorners {
    type Error = GeometryError;

    fn try_from(points: [Point; 4]) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<BoardCorners> for [Point; 4] {
    fn from(corners: BoardCorners) -> Self {
        corners.points
    }
}

fn validate(points: &[Point; 4]) -> Result<(), GeometryError> {
    for (index, p) in points.iter().enumerate() {
        if !p.x.is_finite() || !p.y.is_finite() {
            return Err(GeometryError::NonFinite { index });
        }
    }

    let scale = points
        .iter()
        .flat_map(|p| [p.x.abs(), p.y.abs()])
        .fold(1.0_f64, f64::max);
    for first in 0..4 {
        for second in first + 1..4 {
            if (points[first] - points[second]).norm() <= DEGENERATE_EPS * scale {
                return Err(GeometryError::DuplicateCorner { first, second });
            }
        }
    }

    // Turn direction at every corner; all must agree for a convex quad.
    let mut sign = 0.0_f64;
    for index in 0..4 {
        let prev = points[(index + 3) % 4];
        let cur = points[index];
        let next = points[(index + 1) % 4];
        let e0 = cur - prev;
        let e1 = next - cur;
        let cross = e0.x * e1.y - e0.y * e1.x;
        if cross.abs() <= DEGENERATE_EPS * e0.norm() * e1.norm() {
            return Err(GeometryError::CollinearCorners { index });
        }
        if sign != 0.0 && sign != cross.signum() {
            return Err(GeometryError::NonConvex);
        }
        sign = cross.signum();
    }
    Ok(())
}
