//! Error types for solver operations.

use gl_core::error::GlError;
use gl_pipe::PipeError;
use thiserror::Error;

/// Errors that can occur while solving for a steady state.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Problem setup error: {what}")]
    ProblemSetup { what: String },

    #[error("Convergence failed: {what}")]
    ConvergenceFailed { what: String },

    #[error("Pipe error: {0}")]
    Pipe(#[from] PipeError),

    #[error("Numeric error: {what}")]
    Numeric { what: String },
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for GlError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::ProblemSetup { .. } => GlError::InvalidArg {
                what: "problem setup",
            },
            SolverError::ConvergenceFailed { .. } => GlError::Invariant {
                what: "convergence",
            },
            SolverError::Pipe(p) => p.into(),
            SolverError::Numeric { .. } => GlError::Invariant { what: "numeric" },
        }
    }
}
