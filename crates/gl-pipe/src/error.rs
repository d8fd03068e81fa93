//! Error types for pipe discretization and evaluation.

use gl_core::error::GlError;
use gl_fluids::FluidError;
use thiserror::Error;

/// Errors raised while building or evaluating a discretized pipe.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipeError {
    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Initial profile length mismatch for {what}: expected {expected}, got {actual}")]
    ProfileLength {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("State vector length mismatch: expected {expected}, got {actual}")]
    StateLength { expected: usize, actual: usize },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: &'static str },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),
}

pub type PipeResult<T> = Result<T, PipeError>;

impl From<GlError> for PipeError {
    fn from(e: GlError) -> Self {
        match e {
            GlError::NonFinite { what, .. } => PipeError::NonPhysical { what },
            GlError::InvalidArg { what } => PipeError::InvalidArg { what },
            GlError::Invariant { what } => PipeError::NonPhysical { what },
        }
    }
}

impl From<PipeError> for GlError {
    fn from(e: PipeError) -> Self {
        match e {
            PipeError::NonPhysical { what } => GlError::Invariant { what },
            PipeError::InvalidArg { what } => GlError::InvalidArg { what },
            PipeError::ProfileLength { what, .. } => GlError::InvalidArg { what },
            PipeError::StateLength { .. } => GlError::InvalidArg {
                what: "state vector length",
            },
            PipeError::ConvergenceFailed { what } => GlError::Invariant { what },
            PipeError::Fluid(f) => f.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = PipeError::ProfileLength {
            what: "pressure",
            expected: 11,
            actual: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("pressure"));
        assert!(msg.contains("11"));
    }

    #[test]
    fn error_conversion() {
        let pipe_err = PipeError::InvalidArg { what: "cells" };
        let gl_err: GlError = pipe_err.into();
        assert!(matches!(gl_err, GlError::InvalidArg { .. }));

        let back: PipeError = GlError::NonFinite {
            what: "length",
            value: f64::NAN,
        }
        .into();
        assert!(matches!(back, PipeError::NonPhysical { what: "length" }));
    }
}
