//! Axis-aligned-box obstacle
//!
//! The single obstacle primitive used by the path formulation. Clearance is
//! the Euclidean distance from a point to the box boundary, zero for points
//! inside the box.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::Point2;

/// Axis-aligned box defined by a center and per-axis half-extents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxObstacle {
    /// Center of the box
    pub center: Point2,
    /// Half-extent along each axis (must be non-negative)
    pub half_extent: Point2,
}

impl BoxObstacle {
    /// Create a box obstacle from its center and half-extents
    pub fn new(center: Point2, half_extent: Point2) -> Self {
        Self {
            center,
            half_extent,
        }
    }

    /// Distance from `p` to the box boundary, zero if `p` is inside
    ///
    /// Computed as the norm of the per-axis penetration clamped to zero:
    /// `‖max(|p - c| - h, 0)‖`.
    pub fn clearance(&self, p: Point2) -> f64 {
        let d = Vector2::new(
            ((p.x - self.center.x).abs() - self.half_extent.x).max(0.0),
            ((p.y - self.center.y).abs() - self.half_extent.y).max(0.0),
        );
        d.norm()
    }

    /// Whether `p` lies inside the box (boundary included)
    pub fn contains(&self, p: Point2) -> bool {
        (p.x - self.center.x).abs() <= self.half_extent.x
            && (p.y - self.center.y).abs() <= self.half_extent.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box_at_origin() -> BoxObstacle {
        BoxObstacle::new(Point2::new(0.0, 0.0), Point2::new(1.0, 1.0))
    }

    #[test]
    fn test_clearance_inside_is_zero() {
        let obstacle = unit_box_at_origin();
        assert_eq!(obstacle.clearance(Point2::new(0.0, 0.0)), 0.0);
        assert_eq!(obstacle.clearance(Point2::new(0.5, -0.5)), 0.0);
        // Boundary points are not outside
        assert_eq!(obstacle.clearance(Point2::new(1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_clearance_outside_single_axis() {
        let obstacle = unit_box_at_origin();
        // At distance d outside one edge, the other axis aligned
        assert_relative_eq!(obstacle.clearance(Point2::new(3.0, 0.0)), 2.0);
        assert_relative_eq!(obstacle.clearance(Point2::new(0.0, -4.5)), 3.5);
    }

    #[test]
    fn test_clearance_outside_corner() {
        let obstacle = unit_box_at_origin();
        // Diagonal from the (1, 1) corner
        let d = obstacle.clearance(Point2::new(4.0, 5.0));
        assert_relative_eq!(d, 5.0); // sqrt(3² + 4²)
    }

    #[test]
    fn test_contains() {
        let obstacle = BoxObstacle::new(Point2::new(5.0, 0.0), Point2::new(1.0, 1.0));
        assert!(obstacle.contains(Point2::new(5.5, -0.5)));
        assert!(obstacle.contains(Point2::new(6.0, 1.0)));
        assert!(!obstacle.contains(Point2::new(6.1, 0.0)));
    }
}
