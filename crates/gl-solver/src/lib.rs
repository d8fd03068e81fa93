//! Steady-state solver for discretized gas systems.
//!
//! Drives the residual of any [`gl_pipe::DaeSystem`] to zero with all time
//! derivatives set to zero, using Newton's method with a finite-difference
//! Jacobian and a positivity-preserving line search.

pub mod error;
pub mod jacobian;
pub mod newton;
pub mod steady;

pub use error::{SolverError, SolverResult};
pub use newton::{NewtonConfig, NewtonResult};
pub use steady::{JacobianScheme, SteadyConfig, SteadySolution, solve_steady, solve_steady_from};
