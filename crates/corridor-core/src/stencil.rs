//! Finite-difference stencils
//!
//! Forward-difference stencils over a sampled trajectory. These are the
//! single source of truth for the derivative definitions: the residual
//! blocks of the profile formulation and the reporting utilities both use
//! them, so the optimized and the reported quantities always agree.
//!
//! Each sample-indexed query returns `None` when the stencil window does not
//! fit the sequence; the caller decides how to surface "not available".

/// Second difference `a - 2b + c` reordered for a window `[a, b, c]`
///
/// Used as the curvature proxy of the path formulation, where it is applied
/// per axis over three consecutive waypoints.
pub fn second_difference(p_prev: f64, p_mid: f64, p_next: f64) -> f64 {
    p_prev - 2.0 * p_mid + p_next
}

/// Acceleration over an explicit 3-sample window
pub fn acceleration_window(p0: f64, p1: f64, p2: f64, dt: f64) -> f64 {
    (p2 - 2.0 * p1 + p0) / (dt * dt)
}

/// Jerk over an explicit 4-sample window
pub fn jerk_window(p0: f64, p1: f64, p2: f64, p3: f64, dt: f64) -> f64 {
    (p3 - 3.0 * p2 + 3.0 * p1 - p0) / (dt * dt * dt)
}

/// Velocity at sample `i`: `(p[i+1] - p[i]) / dt`
pub fn velocity(p: &[f64], i: usize, dt: f64) -> Option<f64> {
    if i + 1 < p.len() {
        Some((p[i + 1] - p[i]) / dt)
    } else {
        None
    }
}

/// Acceleration at sample `i`: `(p[i+2] - 2p[i+1] + p[i]) / dt²`
pub fn acceleration(p: &[f64], i: usize, dt: f64) -> Option<f64> {
    if i + 2 < p.len() {
        Some(acceleration_window(p[i], p[i + 1], p[i + 2], dt))
    } else {
        None
    }
}

/// Jerk at sample `i`: `(p[i+3] - 3p[i+2] + 3p[i+1] - p[i]) / dt³`
pub fn jerk(p: &[f64], i: usize, dt: f64) -> Option<f64> {
    if i + 3 < p.len() {
        Some(jerk_window(p[i], p[i + 1], p[i + 2], p[i + 3], dt))
    } else {
        None
    }
}
