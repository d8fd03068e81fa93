//! Common utilities for discretization arithmetic.

use crate::error::{PipeError, PipeResult};
use gl_core::numeric::ensure_finite;

/// Ensure a value is finite, returning PipeError if not.
pub fn check_finite(value: f64, what: &'static str) -> PipeResult<f64> {
    ensure_finite(value, what).map_err(|_| PipeError::NonPhysical { what })
}

/// Ensure a pressure-like divisor is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> PipeResult<f64> {
    let value = check_finite(value, what)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(PipeError::NonPhysical { what })
    }
}

/// `q·|q|`: keeps the sign of dissipation for reversed flow.
#[inline]
pub fn signed_square(q: f64) -> f64 {
    q * q.abs()
}
