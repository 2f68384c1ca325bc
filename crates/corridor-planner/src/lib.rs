//! # Corridor Planner
//!
//! Trajectory formulation for two optimization pipelines that share one
//! shape: formulate, hand to an external solver, decode.
//!
//! - **QP path**: a 2D waypoint path minimizing curvature while rewarding
//!   obstacle clearance, with pinned endpoints, solved as a convex QP.
//! - **NLS profile**: a 1D motion profile minimizing jerk with hinge
//!   penalties on acceleration/jerk limits, solved by Levenberg-Marquardt.
//!
//! Both pipelines are single-shot and stateless across calls; the solvers
//! own their internal iteration.
//!
//! # Components
//!
//! - [`config`]: Configuration for both pipelines
//! - [`qp`]: Sparse quadratic-form assembly and decision-vector layout
//! - [`path`]: QP path formulation and solve
//! - [`residuals`]: Residual blocks for the profile cost terms
//! - [`profile`]: NLS profile formulation and solve

pub mod config;
pub mod path;
pub mod profile;
pub mod qp;
pub mod residuals;

// Re-exports
pub use config::{PathConfig, ProfileConfig};
pub use path::{PathError, PathPlanner, PlannedPath};
pub use profile::{MotionProfile, ProfileError, ProfilePlanner};
