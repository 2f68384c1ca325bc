//! QP path formulation
//!
//! Encodes "minimize path curvature while rewarding obstacle clearance,
//! subject to fixed endpoints" as a convex QP and hands it to the
//! interior-point solver:
//!
//! ```text
//! minimize    ½ xᵀ P x + qᵀ x
//! subject to  A x = b          (pinned start/end waypoints)
//! ```
//!
//! The decision vector interleaves waypoint coordinates as
//! `[x0, y0, ..., xN-1, yN-1]`. The curvature term expands the squared
//! second difference per interior waypoint and axis into `P`; the clearance
//! reward is purely linear and lands in `q`.

use std::time::Instant;

use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT::ZeroConeT,
};
use log::debug;
use thiserror::Error;

use corridor_core::obstacle::BoxObstacle;
use corridor_core::{stencil, Point2};

use crate::config::PathConfig;
use crate::qp::{csc_from_triplets, flat_index, QuadraticForm};

/// Errors from the path formulation pipeline
#[derive(Debug, Error)]
pub enum PathError {
    #[error("waypoint count must be at least 2, got {0}")]
    TooFewWaypoints(usize),
    #[error("curvature weight must be positive, got {0}")]
    NonPositiveCurvatureWeight(f64),
    #[error("clearance weight must be non-negative, got {0}")]
    NegativeClearanceWeight(f64),
    #[error("clearance vector length {got} does not match waypoint count {expected}")]
    ClearanceLengthMismatch { expected: usize, got: usize },
    #[error("QP solver rejected the problem: {0}")]
    Setup(String),
    #[error("QP solver terminated without an optimal solution: {0:?}")]
    NotSolved(SolverStatus),
    #[error("solution contains non-finite values")]
    NonFiniteSolution,
}

/// A solved path
#[derive(Debug, Clone)]
pub struct PlannedPath {
    /// Optimized waypoints, start to end
    pub waypoints: Vec<Point2>,
    /// Per-waypoint clearance used in the objective
    pub clearance: Vec<f64>,
    /// Objective value reported by the solver
    pub objective: f64,
    /// Wall-clock solve time [µs]
    pub solve_time_us: u64,
}

impl PlannedPath {
    /// Central second difference at each waypoint, `None` at the endpoints.
    pub fn curvatures(&self) -> Vec<Option<Point2>> {
        let n = self.waypoints.len();
        (0..n)
            .map(|i| {
                if i == 0 || i + 1 == n {
                    return None;
                }
                let (prev, mid, next) =
                    (self.waypoints[i - 1], self.waypoints[i], self.waypoints[i + 1]);
                Some(Point2::new(
                    stencil::second_difference(prev.x, mid.x, next.x),
                    stencil::second_difference(prev.y, mid.y, next.y),
                ))
            })
            .collect()
    }
}

/// QP path formulator
///
/// Pure function of its inputs; each [`PathPlanner::plan`] call formulates,
/// solves, and decodes with no state carried across calls.
#[derive(Debug, Clone)]
pub struct PathPlanner {
    config: PathConfig,
}

impl PathPlanner {
    /// Create a planner with the given configuration
    pub fn new(config: PathConfig) -> Self {
        Self { config }
    }

    /// Access the planner configuration
    pub fn config(&self) -> &PathConfig {
        &self.config
    }

    /// Plan a path from `start` to `end` around `obstacle`
    ///
    /// Clearance is sampled at the straight-line interpolation between the
    /// endpoints, one value per waypoint.
    pub fn plan(
        &self,
        start: Point2,
        end: Point2,
        obstacle: &BoxObstacle,
    ) -> Result<PlannedPath, PathError> {
        self.validate()?;
        let n = self.config.num_waypoints;
        let clearance: Vec<f64> = (0..n)
            .map(|i| {
                let alpha = i as f64 / (n - 1) as f64;
                obstacle.clearance(start + (end - start) * alpha)
            })
            .collect();
        self.plan_with_clearance(start, end, &clearance)
    }

    /// Plan with caller-supplied per-waypoint clearance values
    pub fn plan_with_clearance(
        &self,
        start: Point2,
        end: Point2,
        clearance: &[f64],
    ) -> Result<PlannedPath, PathError> {
        self.validate()?;
        let n = self.config.num_waypoints;
        if clearance.len() != n {
            return Err(PathError::ClearanceLengthMismatch {
                expected: n,
                got: clearance.len(),
            });
        }

        let (hessian, gradient) = self.build_objective(clearance);
        let (constraints, bounds) = self.build_constraints(start, end);

        let settings = DefaultSettingsBuilder::default()
            .max_iter(self.config.solver.max_iter)
            .verbose(self.config.solver.verbose)
            .tol_gap_abs(self.config.solver.tolerance)
            .tol_gap_rel(self.config.solver.tolerance)
            .tol_feas(self.config.solver.tolerance)
            .build()
            .map_err(|e| PathError::Setup(format!("{e:?}")))?;

        let p = hessian.to_upper_csc();
        let a = csc_from_triplets(4, 2 * n, &constraints);
        let cones = [ZeroConeT(4)];

        let start_time = Instant::now();
        let mut solver = DefaultSolver::new(&p, &gradient, &a, &bounds, &cones, settings)
            .map_err(|e| PathError::Setup(format!("{e:?}")))?;
        solver.solve();
        let solve_time_us = u64::try_from(start_time.elapsed().as_micros()).unwrap_or(u64::MAX);

        let solution = &solver.solution;
        debug!(
            "path QP solved: status={:?}, objective={:.6}, time={}us",
            solution.status, solution.obj_val, solve_time_us
        );

        if !matches!(
            solution.status,
            SolverStatus::Solved | SolverStatus::AlmostSolved
        ) {
            return Err(PathError::NotSolved(solution.status));
        }

        let waypoints = decode_waypoints(&solution.x, n)?;

        Ok(PlannedPath {
            waypoints,
            clearance: clearance.to_vec(),
            objective: solution.obj_val,
            solve_time_us,
        })
    }

    fn validate(&self) -> Result<(), PathError> {
        let config = &self.config;
        if config.num_waypoints < 2 {
            return Err(PathError::TooFewWaypoints(config.num_waypoints));
        }
        if !(config.curvature_weight > 0.0) {
            return Err(PathError::NonPositiveCurvatureWeight(
                config.curvature_weight,
            ));
        }
        if !(config.clearance_weight >= 0.0) {
            return Err(PathError::NegativeClearanceWeight(config.clearance_weight));
        }
        Ok(())
    }

    /// Build the quadratic form `P` and the gradient `q`
    ///
    /// The squared curvature stencil `p[i-1] - 2p[i] + p[i+1]` contributes,
    /// per interior waypoint and per axis, diagonal weights `w`/`4w`/`w` and
    /// the `-2w`/`+w` symmetric cross terms. The x and y axes never mix.
    fn build_objective(&self, clearance: &[f64]) -> (QuadraticForm, Vec<f64>) {
        let n = self.config.num_waypoints;
        let w = self.config.curvature_weight;
        let mut hessian = QuadraticForm::new(2 * n);
        let mut gradient = vec![0.0; 2 * n];

        for i in 1..n - 1 {
            for axis in 0..2 {
                let prev = flat_index(i - 1, axis);
                let mid = flat_index(i, axis);
                let next = flat_index(i + 1, axis);

                hessian.add(prev, prev, w);
                hessian.add(mid, mid, 4.0 * w);
                hessian.add(next, next, w);
                hessian.add_symmetric_pair(prev, mid, -2.0 * w);
                hessian.add_symmetric_pair(mid, next, -2.0 * w);
                hessian.add_symmetric_pair(prev, next, w);
            }
        }

        // Linear clearance reward: lowers the objective where clearance is
        // large. Deliberately not a quadratic term.
        for (i, &c) in clearance.iter().enumerate() {
            for axis in 0..2 {
                gradient[flat_index(i, axis)] -= self.config.clearance_weight * c;
            }
        }

        (hessian, gradient)
    }

    /// Build the 4 equality rows pinning the first and last waypoint
    fn build_constraints(&self, start: Point2, end: Point2) -> (Vec<(usize, usize, f64)>, Vec<f64>) {
        let last = self.config.num_waypoints - 1;
        let triplets = vec![
            (0, flat_index(0, 0), 1.0),
            (1, flat_index(0, 1), 1.0),
            (2, flat_index(last, 0), 1.0),
            (3, flat_index(last, 1), 1.0),
        ];
        let bounds = vec![start.x, start.y, end.x, end.y];
        (triplets, bounds)
    }
}

/// Decode the flat solution vector back into waypoints
///
/// Rejects any non-finite entry; a partially valid path is never returned.
fn decode_waypoints(x: &[f64], n: usize) -> Result<Vec<Point2>, PathError> {
    if x.len() != 2 * n || x.iter().any(|v| !v.is_finite()) {
        return Err(PathError::NonFiniteSolution);
    }
    Ok((0..n)
        .map(|i| Point2::new(x[flat_index(i, 0)], x[flat_index(i, 1)]))
        .collect())
}
