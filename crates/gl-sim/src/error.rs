//! Error types for simulation operations.

use gl_pipe::PipeError;
use thiserror::Error;

/// Errors encountered during transient simulation or network assembly.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Invalid network: {what}")]
    Topology { what: String },

    #[error("Pipe error: {0}")]
    Pipe(#[from] PipeError),
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_errors_pass_through() {
        let err: SimError = PipeError::InvalidArg { what: "cells" }.into();
        assert!(matches!(err, SimError::Pipe(PipeError::InvalidArg { .. })));
        assert!(err.to_string().contains("cells"));
    }
}
