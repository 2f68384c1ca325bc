//! # Corridor Core
//!
//! Shared numerics for the Corridor trajectory formulation crates.
//!
//! ## Modules
//!
//! - [`obstacle`]: Axis-aligned-box obstacle and clearance queries
//! - [`stencil`]: Finite-difference stencils for trajectory derivatives

pub mod obstacle;
pub mod stencil;

use nalgebra::Vector2;

/// 2D point/vector type used throughout the path formulation
pub type Point2 = Vector2<f64>;
