//! Planar point and line primitives used by the projective frame.

use nalgebra::{Point2, Vector2};

/// Image-space point in pixels.
pub type Point = Point2<f64>;

/// Relative tolerance on `sin(angle)` below which two lines count as parallel.
const PARALLEL_EPS: f64 = 1e-12;

/// Linear blend `(1 - f) * a + f * b`.
#[inline]
pub fn mix(a: Point, b: Point, f: f64) -> Point {
    Point::new((1.0 - f) * a.x + f * b.x, (1.0 - f) * a.y + f * b.y)
}

/// Infinite line in implicit form `a * x + b * y = c`.
///
/// The normal length `sqrt(a² + b²)` is computed once on construction since
/// every distance query needs it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    norm: f64,
}

impl Line {
    /// Line through two points. Returns `None` when the points coincide.
    pub fn through(p0: Point, p1: Point) -> Option<Self> {
        let a = p1.y - p0.y;
        let b = p0.x - p1.x;
        Self::from_coefficients(a, b, a * p0.x + b * p0.y)
    }

    /// Line through `p` running along `dir`.
    pub fn with_direction(p: Point, dir: Vector2<f64>) -> Option<Self> {
        Self::through(p, p + dir)
    }

    pub fn from_coefficients(a: f64, b: f64, c: f64) -> Option<Self> {
        let norm = (a * a + b * b).sqrt();
        if norm == 0.0 || !norm.is_finite() || !c.is_finite() {
            return None;
        }
        Some(Self { a, b, c, norm })
    }

    /// Length of the normal vector `(a, b)`.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.norm
    }

    /// Direction vector along the line (not normalized).
    #[inline]
    pub fn direction(&self) -> Vector2<f64> {
        Vector2::new(-self.b, self.a)
    }

    /// Intersection point via Cramer's rule, `None` for (near) parallel lines.
    pub fn intersect(&self, other: &Line) -> Option<Point> {
        let det = self.a * other.b - other.a * self.b;
        if det.abs() <= PARALLEL_EPS * self.norm * other.norm {
            return None;
        }
        Some(Point::new(
            (other.b * self.c - self.b * other.c) / det,
            (self.a * other.c - other.a * self.c) / det,
        ))
    }

    /// Perpendicular distance from `p` to this line.
    #[inline]
    pub fn distance_to(&self, p: Point) -> f64 {
        (self.a * p.x + self.b * p.y - self.c).abs() / self.norm
    }
}
