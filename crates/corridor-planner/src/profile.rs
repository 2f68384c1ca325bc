//! Nonlinear least-squares motion-profile formulation
//!
//! Encodes "minimize jerk while softly penalizing acceleration and jerk
//! beyond absolute limits" over a 1D position sequence with fixed start and
//! end, and hands it to the Levenberg-Marquardt solver.
//!
//! The first and last samples are not parameters of the solver at all: the
//! parameter vector holds only the N-2 interior samples, which is how
//! "fixed parameter block" renders on this solver. Interior samples start
//! from the linear interpolation between the endpoints.

use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::debug;
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};
use thiserror::Error;

use corridor_core::stencil;

use crate::config::ProfileConfig;
use crate::residuals::{AccelLimitBlock, ComfortBlock, CostBlock, JerkLimitBlock};

/// Errors from the profile formulation pipeline
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("sample count must be at least 4, got {0}")]
    TooFewSamples(usize),
    #[error("duration must be positive, got {0}")]
    NonPositiveDuration(f64),
    #[error("{0} limit must be positive, got {1}")]
    NonPositiveLimit(&'static str, f64),
    #[error("{0} weight must be non-negative, got {1}")]
    NegativeWeight(&'static str, f64),
    #[error("solver did not converge: {reason}")]
    NotConverged { reason: String },
}

/// The least-squares problem handed to the solver
///
/// Owns the full position sequence (fixed endpoints included) and the cost
/// blocks referencing windows of it. Parameters seen by the solver are the
/// interior positions only.
#[derive(Debug, Clone)]
pub struct TrajectoryProblem {
    positions: Vec<f64>,
    blocks: Vec<CostBlock>,
    residual_count: usize,
}

impl TrajectoryProblem {
    /// Build a problem over `positions` with the given cost blocks
    pub fn new(positions: Vec<f64>, blocks: Vec<CostBlock>) -> Self {
        debug_assert!(positions.len() >= 4);
        let residual_count = blocks.iter().map(CostBlock::residual_count).sum();
        Self {
            positions,
            blocks,
            residual_count,
        }
    }

    /// The full position sequence, fixed endpoints included
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    fn interior_len(&self) -> usize {
        self.positions.len() - 2
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for TrajectoryProblem {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        let end = self.positions.len() - 1;
        self.positions[1..end].copy_from_slice(x.as_slice());
    }

    fn params(&self) -> DVector<f64> {
        let end = self.positions.len() - 1;
        DVector::from_column_slice(&self.positions[1..end])
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let mut out = Vec::with_capacity(self.residual_count);
        for block in &self.blocks {
            block.evaluate(&self.positions, &mut out);
        }
        Some(DVector::from_vec(out))
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        // Assemble against all sample columns, then keep the interior ones;
        // the fixed endpoint columns are simply never exposed to the solver.
        let mut full = DMatrix::zeros(self.residual_count, self.positions.len());
        let mut row = 0;
        for block in &self.blocks {
            block.fill_jacobian(&self.positions, row, &mut full);
            row += block.residual_count();
        }
        Some(full.columns(1, self.interior_len()).into_owned())
    }
}

/// One reported trajectory sample
///
/// Derivatives are `None` where the finite-difference window does not fit
/// the sequence, which is expected near the end and never coerced to zero.
#[derive(Debug, Clone, Copy)]
pub struct ProfileSample {
    /// Sample time [s]
    pub time: f64,
    /// Position
    pub position: f64,
    /// Forward-difference velocity
    pub velocity: Option<f64>,
    /// Second-difference acceleration
    pub acceleration: Option<f64>,
    /// Third-difference jerk
    pub jerk: Option<f64>,
}

/// An optimized motion profile
#[derive(Debug, Clone)]
pub struct MotionProfile {
    /// Time step between samples [s]
    pub dt: f64,
    /// Optimized position sequence
    pub positions: Vec<f64>,
}

impl MotionProfile {
    /// Derive per-sample velocity/acceleration/jerk by the same stencils
    /// the residual blocks optimize
    pub fn samples(&self) -> Vec<ProfileSample> {
        (0..self.positions.len())
            .map(|i| ProfileSample {
                time: i as f64 * self.dt,
                position: self.positions[i],
                velocity: stencil::velocity(&self.positions, i, self.dt),
                acceleration: stencil::acceleration(&self.positions, i, self.dt),
                jerk: stencil::jerk(&self.positions, i, self.dt),
            })
            .collect()
    }
}

/// NLS motion-profile formulator
#[derive(Debug, Clone)]
pub struct ProfilePlanner {
    config: ProfileConfig,
}

impl ProfilePlanner {
    /// Create a planner with the given configuration
    pub fn new(config: ProfileConfig) -> Self {
        Self { config }
    }

    /// Access the planner configuration
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Plan a profile from `p_start` to `p_end`
    pub fn plan(&self, p_start: f64, p_end: f64) -> Result<MotionProfile, ProfileError> {
        self.validate()?;

        let problem = self.build_problem(p_start, p_end);
        let solver_config = &self.config.solver;
        let lm = LevenbergMarquardt::new()
            .with_patience(solver_config.patience)
            .with_ftol(solver_config.ftol)
            .with_xtol(solver_config.xtol)
            .with_gtol(solver_config.gtol);

        let (problem, report) = lm.minimize(problem);
        debug!(
            "profile NLS solved: termination={:?}, evaluations={}, objective={:.6e}",
            report.termination, report.number_of_evaluations, report.objective_function
        );

        if !report.termination.was_successful() {
            return Err(ProfileError::NotConverged {
                reason: format!("{:?}", report.termination),
            });
        }

        Ok(MotionProfile {
            dt: self.config.dt(),
            positions: problem.positions,
        })
    }

    fn validate(&self) -> Result<(), ProfileError> {
        let config = &self.config;
        if config.num_samples < 4 {
            return Err(ProfileError::TooFewSamples(config.num_samples));
        }
        if !(config.duration > 0.0) {
            return Err(ProfileError::NonPositiveDuration(config.duration));
        }
        if !(config.accel_limit > 0.0) {
            return Err(ProfileError::NonPositiveLimit(
                "acceleration",
                config.accel_limit,
            ));
        }
        if !(config.jerk_limit > 0.0) {
            return Err(ProfileError::NonPositiveLimit("jerk", config.jerk_limit));
        }
        let weights = &config.weights;
        if !(weights.comfort >= 0.0) {
            return Err(ProfileError::NegativeWeight("comfort", weights.comfort));
        }
        if !(weights.accel_penalty >= 0.0) {
            return Err(ProfileError::NegativeWeight(
                "acceleration penalty",
                weights.accel_penalty,
            ));
        }
        if !(weights.jerk_penalty >= 0.0) {
            return Err(ProfileError::NegativeWeight(
                "jerk penalty",
                weights.jerk_penalty,
            ));
        }
        Ok(())
    }

    /// Assemble the initialized position sequence and the cost blocks
    fn build_problem(&self, p_start: f64, p_end: f64) -> TrajectoryProblem {
        let n = self.config.num_samples;
        let dt = self.config.dt();
        let weights = &self.config.weights;

        // Linear interpolation as the optimizer's starting guess
        let positions: Vec<f64> = (0..n)
            .map(|i| p_start + (p_end - p_start) * i as f64 / (n - 1) as f64)
            .collect();

        let mut blocks = Vec::with_capacity(3 * n);
        for start in 0..n - 3 {
            blocks.push(CostBlock::Comfort {
                start,
                term: ComfortBlock {
                    dt,
                    weight: weights.comfort,
                },
            });
        }
        for start in 0..n - 2 {
            blocks.push(CostBlock::AccelLimit {
                start,
                term: AccelLimitBlock {
                    dt,
                    limit: self.config.accel_limit,
                    weight: weights.accel_penalty,
                },
            });
        }
        for start in 0..n - 3 {
            blocks.push(CostBlock::JerkLimit {
                start,
                term: JerkLimitBlock {
                    dt,
                    limit: self.config.jerk_limit,
                    weight: weights.jerk_penalty,
                },
            });
        }

        TrajectoryProblem::new(positions, blocks)
    }
}
