//! Steady states of a `DaeSystem`: `F(t, y, 0) = 0`.

use crate::error::{SolverError, SolverResult};
use crate::jacobian::{central_difference_jacobian, finite_difference_jacobian};
use crate::newton::{NewtonConfig, newton_solve};
use gl_pipe::DaeSystem;
use nalgebra::DVector;

/// Finite-difference scheme for the steady Jacobian.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JacobianScheme {
    /// One extra residual per column.
    #[default]
    Forward,
    /// Two extra residuals per column, second-order accurate.
    Central,
}

/// Steady solve configuration.
#[derive(Debug, Clone)]
pub struct SteadyConfig {
    pub newton: NewtonConfig,
    pub jacobian: JacobianScheme,
    /// Relative perturbation for the finite-difference Jacobian
    pub fd_epsilon: f64,
    /// Time at which port sources are sampled
    pub time: f64,
}

impl Default for SteadyConfig {
    fn default() -> Self {
        Self {
            newton: NewtonConfig::default(),
            jacobian: JacobianScheme::default(),
            fd_epsilon: 1e-7,
            time: 0.0,
        }
    }
}

/// Converged steady state.
#[derive(Clone, Debug)]
pub struct SteadySolution {
    pub state: Vec<f64>,
    pub residual_norm: f64,
    pub iterations: usize,
}

/// Solve from the system's own initial state.
pub fn solve_steady<S>(system: &S, config: &SteadyConfig) -> SolverResult<SteadySolution>
where
    S: DaeSystem + ?Sized,
{
    solve_steady_from(system, system.initial_state(), config)
}

/// Solve from an explicit initial guess.
pub fn solve_steady_from<S>(
    system: &S,
    guess: Vec<f64>,
    config: &SteadyConfig,
) -> SolverResult<SteadySolution>
where
    S: DaeSystem + ?Sized,
{
    let dim = system.dim();
    if guess.len() != dim {
        return Err(SolverError::ProblemSetup {
            what: format!("initial guess has {} entries, system has {dim}", guess.len()),
        });
    }

    let zero = vec![0.0; dim];
    let residual = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
        let mut out = vec![0.0; dim];
        system.residual(config.time, x.as_slice(), &zero, &mut out)?;
        Ok(DVector::from_vec(out))
    };
    let jacobian = |x: &DVector<f64>| match config.jacobian {
        JacobianScheme::Forward => finite_difference_jacobian(x, residual, config.fd_epsilon),
        JacobianScheme::Central => central_difference_jacobian(x, residual, config.fd_epsilon),
    };

    tracing::debug!(unknowns = dim, scheme = ?config.jacobian, "steady solve started");
    let result = newton_solve(
        DVector::from_vec(guess),
        &system.positive_mask(),
        residual,
        jacobian,
        &config.newton,
    )?;
    tracing::debug!(
        iterations = result.iterations,
        residual = result.residual_norm,
        "steady solve converged"
    );

    Ok(SteadySolution {
        state: result.x.as_slice().to_vec(),
        residual_norm: result.residual_norm,
        iterations: result.iterations,
    })
}
