//! Fluid property errors.

use gl_core::GlError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur during fluid property calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

impl From<FluidError> for GlError {
    fn from(err: FluidError) -> Self {
        match err {
            FluidError::NonPhysical { what } => GlError::Invariant { what },
            FluidError::InvalidArg { what } => GlError::InvalidArg { what },
        }
    }
}
