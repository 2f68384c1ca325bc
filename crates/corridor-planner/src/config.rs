//! Planner configuration
//!
//! Configuration for the two formulation pipelines. Defaults carry the
//! reference scenario constants: a 10-waypoint path around a unit box and a
//! 50-sample, 5-second motion profile.

use serde::{Deserialize, Serialize};

/// Configuration for the QP path formulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    /// Number of waypoints N (must be at least 2)
    pub num_waypoints: usize,
    /// Weight on the squared curvature stencil (must be positive)
    pub curvature_weight: f64,
    /// Weight on the linear clearance reward (must be non-negative)
    pub clearance_weight: f64,
    /// Solver knobs forwarded to the QP solver
    pub solver: QpSolverConfig,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            num_waypoints: 10,
            curvature_weight: 10.0,
            clearance_weight: 1.0,
            solver: QpSolverConfig::default(),
        }
    }
}

/// Knobs forwarded to the QP solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QpSolverConfig {
    /// Maximum interior-point iterations
    pub max_iter: u32,
    /// Absolute/relative gap and feasibility tolerance
    pub tolerance: f64,
    /// Print solver progress to stdout
    pub verbose: bool,
}

impl Default for QpSolverConfig {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tolerance: 1e-8,
            verbose: false,
        }
    }
}

/// Configuration for the NLS motion-profile formulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Number of discrete samples N (must be at least 4 for the jerk stencil)
    pub num_samples: usize,
    /// Total trajectory duration [s] (must be positive)
    pub duration: f64,
    /// Absolute acceleration limit (must be positive)
    pub accel_limit: f64,
    /// Absolute jerk limit (must be positive)
    pub jerk_limit: f64,
    /// Cost term weights
    pub weights: ProfileWeights,
    /// Solver knobs forwarded to the least-squares solver
    pub solver: NlsSolverConfig,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            num_samples: 50,
            duration: 5.0,
            accel_limit: 5.0,
            jerk_limit: 3.0,
            weights: ProfileWeights::default(),
            solver: NlsSolverConfig::default(),
        }
    }
}

impl ProfileConfig {
    /// Time step between consecutive samples
    pub fn dt(&self) -> f64 {
        self.duration / (self.num_samples - 1) as f64
    }
}

/// Weights for the profile cost terms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileWeights {
    /// Weight on the jerk (comfort) residual
    pub comfort: f64,
    /// Weight on the acceleration-limit hinge penalty
    pub accel_penalty: f64,
    /// Weight on the jerk-limit hinge penalty
    pub jerk_penalty: f64,
}

impl Default for ProfileWeights {
    fn default() -> Self {
        Self {
            comfort: 1.0,
            // Penalty weights well above the comfort weight so limit
            // violations dominate the objective
            accel_penalty: 100.0,
            jerk_penalty: 100.0,
        }
    }
}

/// Knobs forwarded to the Levenberg-Marquardt solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NlsSolverConfig {
    /// Iteration budget (see `LevenbergMarquardt::with_patience`)
    pub patience: usize,
    /// Relative reduction tolerance on the objective
    pub ftol: f64,
    /// Relative change tolerance on the parameters
    pub xtol: f64,
    /// Orthogonality tolerance between residuals and Jacobian columns
    pub gtol: f64,
}

impl Default for NlsSolverConfig {
    fn default() -> Self {
        Self {
            patience: 200,
            ftol: 1e-8,
            xtol: 1e-8,
            gtol: 1e-8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_profile_time_step() {
        let config = ProfileConfig::default();
        // 5 seconds over 50 samples -> 49 intervals
        assert_relative_eq!(config.dt(), 5.0 / 49.0);

        let config = ProfileConfig {
            num_samples: 11,
            duration: 2.0,
            ..ProfileConfig::default()
        };
        assert_relative_eq!(config.dt(), 0.2);
    }

    #[test]
    fn test_defaults_match_reference_scenarios() {
        let path = PathConfig::default();
        assert_eq!(path.num_waypoints, 10);
        assert_relative_eq!(path.curvature_weight, 10.0);
        assert_relative_eq!(path.clearance_weight, 1.0);

        let profile = ProfileConfig::default();
        assert_eq!(profile.num_samples, 50);
        assert_relative_eq!(profile.accel_limit, 5.0);
        assert_relative_eq!(profile.jerk_limit, 3.0);
        assert_relative_eq!(profile.weights.accel_penalty, 100.0);
    }
}
