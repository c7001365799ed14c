//! Geometry primitives shared by the vision and timeline engines.
//!
//! World coordinates are map units. View angles are degrees: yaw 0° = east,
//! 90° = north; pitch 90° = straight down, 270° = straight up.

use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn to_vector(self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn distance_to(self, other: Position) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }

    /// False for NaN/infinite coordinates from malformed telemetry.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Where a player is looking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewAngles {
    /// Degrees left/right (0 = east, 90 = north, 180 = west, 270 = south).
    pub yaw: f64,
    /// Degrees above/below horizon (90 = straight down, 270 = straight up).
    pub pitch: f64,
}

impl ViewAngles {
    pub fn new(yaw: f64, pitch: f64) -> Self {
        Self { yaw, pitch }
    }
}

impl fmt::Display for ViewAngles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.yaw, self.pitch)
    }
}

/// Vector perpendicular to the given 2D vector (rotated 90° counterclockwise).
#[inline]
pub fn perpendicular(v: (f64, f64)) -> (f64, f64) {
    (-v.1, v.0)
}

/// Intersection point of the infinite lines through two segments.
///
/// Returns `None` when the segments are parallel. The point is not clamped to
/// either segment; callers test perimeter membership themselves.
pub fn line_intersection(a: [(f64, f64); 2], b: [(f64, f64); 2]) -> Option<(f64, f64)> {
    let da = (a[1].0 - a[0].0, a[1].1 - a[0].1);
    let db = (b[1].0 - b[0].0, b[1].1 - b[0].1);
    let dp = (a[0].0 - b[0].0, a[0].1 - b[0].1);
    let dap = perpendicular(da);
    let denom = dap.0 * db.0 + dap.1 * db.1;
    if denom == 0.0 {
        return None;
    }
    let num = dap.0 * dp.0 + dap.1 * dp.1;
    let t = num / denom;
    Some((t * db.0 + b[0].0, t * db.1 + b[0].1))
}

/// Edge-inclusive containment test for an axis-aligned rectangle given by two
/// opposite corners (in either order).
#[inline]
pub fn point_in_rect(p: (f64, f64), corner_a: (f64, f64), corner_b: (f64, f64)) -> bool {
    let (min_x, max_x) = ordered(corner_a.0, corner_b.0);
    let (min_y, max_y) = ordered(corner_a.1, corner_b.1);
    min_x <= p.0 && p.0 <= max_x && min_y <= p.1 && p.1 <= max_y
}

#[inline]
fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Angle between two velocity vectors in degrees.
///
/// A zero vector has no direction, so the angle is undefined and `None` is
/// returned instead of a NaN.
pub fn angle_between_degrees(a: Vector3<f64>, b: Vector3<f64>) -> Option<f64> {
    if a.norm() == 0.0 || b.norm() == 0.0 {
        return None;
    }
    Some(a.angle(&b).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perpendicular() {
        assert_eq!(perpendicular((1.0, 0.0)), (0.0, 1.0));
        assert_eq!(perpendicular((0.0, 2.0)), (-2.0, 0.0));
    }

    #[test]
    fn test_line_intersection_crossing() {
        let p = line_intersection([(0.0, 0.0), (2.0, 2.0)], [(0.0, 2.0), (2.0, 0.0)])
            .expect("crossing segments intersect");
        assert!((p.0 - 1.0).abs() < 1e-9 && (p.1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_line_intersection_parallel() {
        assert!(line_intersection([(0.0, 0.0), (1.0, 0.0)], [(0.0, 1.0), (1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_point_in_rect_edges_inclusive() {
        // Corners given northwest/southeast style (y decreasing).
        assert!(point_in_rect((0.0, 10.0), (0.0, 10.0), (10.0, 0.0)));
        assert!(point_in_rect((10.0, 0.0), (0.0, 10.0), (10.0, 0.0)));
        assert!(point_in_rect((5.0, 5.0), (0.0, 10.0), (10.0, 0.0)));
        assert!(!point_in_rect((10.01, 5.0), (0.0, 10.0), (10.0, 0.0)));
    }

    #[test]
    fn test_angle_between_zero_vector_guarded() {
        let zero = Vector3::zeros();
        let v = Vector3::new(100.0, 0.0, 0.0);
        assert_eq!(angle_between_degrees(zero, v), None);
        assert_eq!(angle_between_degrees(v, zero), None);
    }

    #[test]
    fn test_angle_between_right_angle() {
        let a = Vector3::new(1.0, 0.0, 0.0);
        let b = Vector3::new(0.0, 3.0, 0.0);
        let deg = angle_between_degrees(a, b).unwrap();
        assert!((deg - 90.0).abs() < 1e-9, "expected 90 degrees, got {}", deg);
    }

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_position_finite() {
        assert!(Position::new(1.0, 2.0, 3.0).is_finite());
        assert!(!Position::new(f64::NAN, 0.0, 0.0).is_finite());
        assert!(!Position::new(0.0, f64::INFINITY, 0.0).is_finite());
    }
}
