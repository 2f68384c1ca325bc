//! End-to-end scenario tests
//!
//! Drives both pipelines through their reference scenarios: a 2D path
//! deflected around a box obstacle, and a 1D motion profile under
//! acceleration and jerk limits.

use approx::assert_relative_eq;

use corridor_core::obstacle::BoxObstacle;
use corridor_core::Point2;
use corridor_planner::config::{PathConfig, ProfileConfig};
use corridor_planner::{PathPlanner, ProfilePlanner};

fn reference_obstacle() -> BoxObstacle {
    BoxObstacle::new(Point2::new(5.0, 0.0), Point2::new(1.0, 1.0))
}

mod path_scenarios {
    use super::*;

    #[test]
    fn test_path_deflects_around_box() {
        // Stiff curvature weight keeps the clearance reward from warping
        // the x axis, so the path stays monotone in x
        let planner = PathPlanner::new(PathConfig {
            num_waypoints: 10,
            curvature_weight: 100.0,
            clearance_weight: 1.0,
            ..PathConfig::default()
        });

        let start = Point2::new(0.0, 0.0);
        let end = Point2::new(10.0, 0.0);
        let path = planner.plan(start, end, &reference_obstacle()).unwrap();

        assert_eq!(path.waypoints.len(), 10);

        // Endpoints pinned by the equality constraints
        assert_relative_eq!(path.waypoints[0].x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[0].y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[9].x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[9].y, 0.0, epsilon = 1e-4);

        // Monotonically increasing in x
        for w in path.waypoints.windows(2) {
            assert!(w[1].x > w[0].x, "x not monotone: {} -> {}", w[0].x, w[1].x);
        }

        // Deflected away from the box, peaking at the midpoint waypoints
        for p in &path.waypoints {
            assert!(p.y >= -1e-6, "deflection flipped sign at {p:?}");
        }
        let y_max = path.waypoints.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!(y_max > 0.3, "expected a visible deflection, got {y_max}");
        assert!(path.waypoints[4].y > 0.9 * y_max);
        assert!(path.waypoints[5].y > 0.9 * y_max);
    }

    #[test]
    fn test_path_reference_weights_pin_endpoints() {
        // With the reference weights the clearance reward dominates the
        // curvature term and the arc is large, but the contract still
        // holds: convergence, pinned endpoints, deflection toward larger
        // clearance peaking around the obstacle
        let planner = PathPlanner::new(PathConfig::default());

        let start = Point2::new(0.0, 0.0);
        let end = Point2::new(10.0, 0.0);
        let path = planner.plan(start, end, &reference_obstacle()).unwrap();

        assert_relative_eq!(path.waypoints[0].x, 0.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[0].y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[9].x, 10.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[9].y, 0.0, epsilon = 1e-4);

        let (arg_max, y_max) = path
            .waypoints
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.y))
            .fold((0, f64::MIN), |acc, v| if v.1 > acc.1 { v } else { acc });
        assert!(y_max > 1.0);
        assert!((4..=5).contains(&arg_max), "peak at index {arg_max}");
    }

    #[test]
    fn test_degenerate_path_is_straight_line() {
        // N=2: no curvature entries, the equalities determine everything
        let planner = PathPlanner::new(PathConfig {
            num_waypoints: 2,
            ..PathConfig::default()
        });

        let start = Point2::new(1.0, -2.0);
        let end = Point2::new(4.0, 2.0);
        let path = planner.plan(start, end, &reference_obstacle()).unwrap();

        assert_eq!(path.waypoints.len(), 2);
        assert_relative_eq!(path.waypoints[0].x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[0].y, -2.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[1].x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(path.waypoints[1].y, 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_clearance_sampled_on_straight_line() {
        let planner = PathPlanner::new(PathConfig {
            curvature_weight: 100.0,
            ..PathConfig::default()
        });
        let path = planner
            .plan(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), &reference_obstacle())
            .unwrap();

        assert_eq!(path.clearance.len(), 10);
        // Endpoint (0,0) sits 4 units from the box face at x=4
        assert_relative_eq!(path.clearance[0], 4.0, epsilon = 1e-12);
        // Samples at x ≈ 4.44 and 5.56 are inside the box
        assert_relative_eq!(path.clearance[4], 0.0);
        assert_relative_eq!(path.clearance[5], 0.0);
    }
}

mod profile_scenarios {
    use super::*;

    #[test]
    fn test_profile_respects_limits() {
        // Reference scenario: 50 samples over 5 s from 0 to 10, limits
        // |a| <= 5, |j| <= 3
        let config = ProfileConfig::default();
        let accel_limit = config.accel_limit;
        let jerk_limit = config.jerk_limit;
        let planner = ProfilePlanner::new(config);

        let profile = planner.plan(0.0, 10.0).unwrap();
        assert_eq!(profile.positions.len(), 50);

        // First and last position unchanged from initialization
        assert_relative_eq!(profile.positions[0], 0.0);
        assert_relative_eq!(profile.positions[49], 10.0);

        let tol = 1e-6;
        for sample in profile.samples() {
            if let Some(a) = sample.acceleration {
                assert!(a.abs() <= accel_limit + tol, "accel {a} over limit");
            }
            if let Some(j) = sample.jerk {
                assert!(j.abs() <= jerk_limit + tol, "jerk {j} over limit");
            }
        }
    }

    #[test]
    fn test_profile_reference_scenario_is_constant_velocity() {
        // The linear initialization already has zero jerk and satisfies
        // both limits, so the optimum is the constant-velocity ramp
        let planner = ProfilePlanner::new(ProfileConfig::default());
        let profile = planner.plan(0.0, 10.0).unwrap();

        for sample in profile.samples() {
            if let Some(v) = sample.velocity {
                assert_relative_eq!(v, 2.0, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_profile_derivative_availability() {
        let planner = ProfilePlanner::new(ProfileConfig {
            num_samples: 10,
            duration: 4.5,
            ..ProfileConfig::default()
        });
        let profile = planner.plan(-1.0, 1.0).unwrap();
        let samples = profile.samples();

        assert_relative_eq!(samples[0].time, 0.0);
        assert_relative_eq!(samples[9].time, 4.5, epsilon = 1e-12);

        // The trailing samples cannot fit the stencil windows
        assert!(samples[9].velocity.is_none());
        assert!(samples[8].acceleration.is_none());
        assert!(samples[7].jerk.is_none());
        assert!(samples[6].jerk.is_some());
    }
}
