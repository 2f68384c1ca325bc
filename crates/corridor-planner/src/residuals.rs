//! Residual blocks for the motion-profile formulation
//!
//! Each block binds a cost term to a fixed window of consecutive position
//! samples:
//!
//! - comfort: one residual, `weight * jerk` (window of 4)
//! - acceleration limit: two one-sided hinge residuals (window of 3)
//! - jerk limit: two one-sided hinge residuals (window of 4)
//!
//! The hinge `max(0, value - limit)` is zero inside the limit and grows
//! linearly beyond it. Blocks expose analytic Jacobian rows; the stencils
//! are linear in the window, so each row is the stencil scaled by the
//! weight, gated by whether the hinge is active. At the kink the
//! subgradient 0 is used.

use nalgebra::DMatrix;

use corridor_core::stencil;

/// One-sided hinge `max(0, x)`
pub fn hinge(x: f64) -> f64 {
    x.max(0.0)
}

/// Jerk-minimization (comfort) term over a window of 4 samples
#[derive(Debug, Clone, Copy)]
pub struct ComfortBlock {
    pub dt: f64,
    pub weight: f64,
}

impl ComfortBlock {
    /// The single residual `weight * jerk`
    pub fn residual(&self, w: [f64; 4], out: &mut Vec<f64>) {
        out.push(self.weight * stencil::jerk_window(w[0], w[1], w[2], w[3], self.dt));
    }

    /// Derivative of the residual with respect to the window
    pub fn jacobian(&self) -> [f64; 4] {
        let s = self.weight / self.dt.powi(3);
        [-s, 3.0 * s, -3.0 * s, s]
    }
}

/// Acceleration-limit hinge penalty over a window of 3 samples
#[derive(Debug, Clone, Copy)]
pub struct AccelLimitBlock {
    pub dt: f64,
    pub limit: f64,
    pub weight: f64,
}

impl AccelLimitBlock {
    /// Two residuals: `weight * max(0, a - limit)` and `weight * max(0, -a - limit)`
    pub fn residuals(&self, w: [f64; 3], out: &mut Vec<f64>) {
        let a = stencil::acceleration_window(w[0], w[1], w[2], self.dt);
        out.push(self.weight * hinge(a - self.limit));
        out.push(self.weight * hinge(-a - self.limit));
    }

    /// Jacobian rows for the two hinge residuals
    pub fn jacobian(&self, w: [f64; 3]) -> [[f64; 3]; 2] {
        let a = stencil::acceleration_window(w[0], w[1], w[2], self.dt);
        let s = self.weight / (self.dt * self.dt);
        let upper = if a - self.limit > 0.0 {
            [s, -2.0 * s, s]
        } else {
            [0.0; 3]
        };
        let lower = if -a - self.limit > 0.0 {
            [-s, 2.0 * s, -s]
        } else {
            [0.0; 3]
        };
        [upper, lower]
    }
}

/// Jerk-limit hinge penalty over a window of 4 samples
#[derive(Debug, Clone, Copy)]
pub struct JerkLimitBlock {
    pub dt: f64,
    pub limit: f64,
    pub weight: f64,
}

impl JerkLimitBlock {
    /// Two residuals: `weight * max(0, j - limit)` and `weight * max(0, -j - limit)`
    pub fn residuals(&self, w: [f64; 4], out: &mut Vec<f64>) {
        let j = stencil::jerk_window(w[0], w[1], w[2], w[3], self.dt);
        out.push(self.weight * hinge(j - self.limit));
        out.push(self.weight * hinge(-j - self.limit));
    }

    /// Jacobian rows for the two hinge residuals
    pub fn jacobian(&self, w: [f64; 4]) -> [[f64; 4]; 2] {
        let j = stencil::jerk_window(w[0], w[1], w[2], w[3], self.dt);
        let s = self.weight / self.dt.powi(3);
        let upper = if j - self.limit > 0.0 {
            [-s, 3.0 * s, -3.0 * s, s]
        } else {
            [0.0; 4]
        };
        let lower = if -j - self.limit > 0.0 {
            [s, -3.0 * s, 3.0 * s, -s]
        } else {
            [0.0; 4]
        };
        [upper, lower]
    }
}

/// A cost term bound to its window start in the position sequence
#[derive(Debug, Clone, Copy)]
pub enum CostBlock {
    Comfort { start: usize, term: ComfortBlock },
    AccelLimit { start: usize, term: AccelLimitBlock },
    JerkLimit { start: usize, term: JerkLimitBlock },
}

impl CostBlock {
    /// Number of residuals this block produces
    pub fn residual_count(&self) -> usize {
        match self {
            CostBlock::Comfort { .. } => 1,
            CostBlock::AccelLimit { .. } | CostBlock::JerkLimit { .. } => 2,
        }
    }

    /// Evaluate the block's residuals, appending to `out`
    pub fn evaluate(&self, positions: &[f64], out: &mut Vec<f64>) {
        match *self {
            CostBlock::Comfort { start, term } => term.residual(window4(positions, start), out),
            CostBlock::AccelLimit { start, term } => term.residuals(window3(positions, start), out),
            CostBlock::JerkLimit { start, term } => term.residuals(window4(positions, start), out),
        }
    }

    /// Write the block's Jacobian rows into `jac`, starting at `row`
    ///
    /// Columns of `jac` are global sample indices; the caller restricts to
    /// the free (interior) columns afterwards.
    pub fn fill_jacobian(&self, positions: &[f64], row: usize, jac: &mut DMatrix<f64>) {
        match *self {
            CostBlock::Comfort { start, term } => {
                let coeffs = term.jacobian();
                for (k, &c) in coeffs.iter().enumerate() {
                    jac[(row, start + k)] = c;
                }
            }
            CostBlock::AccelLimit { start, term } => {
                let rows = term.jacobian(window3(positions, start));
                for (r, coeffs) in rows.iter().enumerate() {
                    for (k, &c) in coeffs.iter().enumerate() {
                        jac[(row + r, start + k)] = c;
                    }
                }
            }
            CostBlock::JerkLimit { start, term } => {
                let rows = term.jacobian(window4(positions, start));
                for (r, coeffs) in rows.iter().enumerate() {
                    for (k, &c) in coeffs.iter().enumerate() {
                        jac[(row + r, start + k)] = c;
                    }
                }
            }
        }
    }
}

fn window3(p: &[f64], start: usize) -> [f64; 3] {
    [p[start], p[start + 1], p[start + 2]]
}

fn window4(p: &[f64], start: usize) -> [f64; 4] {
    [p[start], p[start + 1], p[start + 2], p[start + 3]]
}
