//! Core geometry types for inkloom.
//!
//! ## Rust Lesson #3: Operator Overloading
//!
//! In JS, `a + b` on two objects gives you `"[object Object][object Object]"`.
//! In Rust, you opt in to operators by implementing traits from `std::ops`:
//! - `Add` = `a + b`
//! - `Sub` = `a - b`
//! - `Mul<f64>` = `a * 2.0`
//!
//! The compiler turns `a + b` into `Add::add(a, b)` - zero runtime cost.

use std::ops::{Add, Mul, Neg, Sub};

use crate::error::{DoodleError, Result};

/// Cross products with a magnitude below this are treated as parallel.
const PARALLEL_EPSILON: f64 = 1e-10;

/// A 2D point or vector.
///
/// `Copy` because it's two floats - passing it around is as cheap as
/// passing a number.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// A directed line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

/// A closed polygon boundary that has passed validation.
///
/// The ring is implicitly closed: the last vertex connects back to the
/// first. Every edge, including the closing one, has non-zero length.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    vertices: Vec<Vec2>,
}

// ============================================================================
// Vec2
// ============================================================================

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `angle` radians. Scale it as needed.
    #[inline]
    pub fn from_angle(angle: f64) -> Self {
        Self::new(angle.cos(), angle.sin())
    }

    #[inline]
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Angle from the positive x axis, in radians.
    #[inline]
    pub fn angle(self) -> f64 {
        self.y.atan2(self.x)
    }

    /// Z component of the 3D cross product of `self` and `other`.
    #[inline]
    pub fn cross(self, other: Vec2) -> f64 {
        self.x * other.y - self.y * other.x
    }

    #[inline]
    pub fn distance(self, other: Vec2) -> f64 {
        (other - self).length()
    }

    /// Linear interpolation: `t = 0` gives `self`, `t = 1` gives `other`.
    #[inline]
    pub fn lerp(self, other: Vec2, t: f64) -> Vec2 {
        self + (other - self) * t
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

// ============================================================================
// Segment
// ============================================================================

impl Segment {
    #[inline]
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    /// Vector from start to end.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.direction().length()
    }

    /// Direction angle in radians.
    #[inline]
    pub fn angle(&self) -> f64 {
        self.direction().angle()
    }

    /// Point at parameter `t` along the segment (0 = start, 1 = end).
    #[inline]
    pub fn point_at(&self, t: f64) -> Vec2 {
        self.start + self.direction() * t
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        self.point_at(0.5)
    }

    /// Find where two segments cross.
    ///
    /// Solves `a.start + t * da = b.start + u * db` with cross products.
    /// Only crossings strictly inside both segments count: touching at an
    /// endpoint is not an intersection, and parallel or collinear segments
    /// never intersect (even when they overlap).
    ///
    /// The point is traced from `a`, so `intersection(a, b)` and
    /// `intersection(b, a)` agree up to rounding.
    pub fn intersection(a: &Segment, b: &Segment) -> Option<Vec2> {
        let da = a.direction();
        let db = b.direction();
        let offset = b.start - a.start;

        let denom = da.cross(db);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }

        let t = offset.cross(db) / denom;
        let u = offset.cross(da) / denom;

        if (0.0 < t && t < 1.0) && (0.0 < u && u < 1.0) {
            Some(a.start + da * t)
        } else {
            None
        }
    }
}

// ============================================================================
// Boundary
// ============================================================================

impl Boundary {
    /// Validate a vertex ring.
    ///
    /// Fails on fewer than 3 vertices, non-finite coordinates, or any
    /// zero-length edge (including the closing edge from last to first).
    pub fn new(vertices: Vec<Vec2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(DoodleError::TooFewVertices {
                count: vertices.len(),
            });
        }

        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(DoodleError::NonFiniteVertex { index });
        }

        let n = vertices.len();
        for i in 0..n {
            if vertices[i] == vertices[(i + 1) % n] {
                return Err(DoodleError::DegenerateEdge { index: i });
            }
        }

        Ok(Self { vertices })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Number of vertices, which is also the number of edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false for a validated boundary; here to pair with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The boundary ring as segments, in vertex order, closing edge last.
    pub fn edges(&self) -> Vec<Segment> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| Segment::new(self.vertices[i], self.vertices[(i + 1) % n]))
            .collect()
    }

    /// Bounding box as (min_x, min_y, max_x, max_y).
    pub fn bounding_box(&self) -> (f64, f64, f64, f64) {
        let min_x = self.vertices.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = self.vertices.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = self.vertices.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = self.vertices.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        (min_x, min_y, max_x, max_y)
    }

    /// Signed area using the shoelace formula.
    ///
    /// Positive for counter-clockwise winding in a y-up frame. Screen space
    /// is y-down, so the sign flips there.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.vertices[i].cross(self.vertices[j]);
        }
        area / 2.0
    }

    pub fn perimeter(&self) -> f64 {
        self.edges().iter().map(Segment::length).sum()
    }
}

// ============================================================================
// TESTS
// ============================================================================
