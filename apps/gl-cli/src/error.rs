//! Error type for the command-line front end.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Scenario error: {0}")]
    Project(#[from] gl_project::ProjectError),

    #[error("Solver error: {0}")]
    Solver(#[from] gl_solver::SolverError),

    #[error("Simulation error: {0}")]
    Sim(#[from] gl_sim::SimError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
