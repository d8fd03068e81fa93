//! Interface between discretized models and external integrators/solvers.

use crate::error::PipeResult;
use crate::layout::UnknownKind;

/// A differential-algebraic system `F(t, y, ẏ) = 0` over a flat state vector.
///
/// Implementations are pure functions of their arguments, so independent
/// systems may be evaluated in parallel.
pub trait DaeSystem: Send + Sync {
    /// Number of unknowns (and residual rows).
    fn dim(&self) -> usize;

    /// Initial values of all unknowns.
    fn initial_state(&self) -> Vec<f64>;

    /// Differential/algebraic classification of every unknown.
    fn unknown_kinds(&self) -> Vec<UnknownKind>;

    /// Unknowns that must stay strictly positive (pressures, densities).
    fn positive_mask(&self) -> Vec<bool>;

    /// Evaluate `F(t, y, ẏ)` into `out`.
    ///
    /// Differential rows are `ẏ − f(t, y)`; algebraic rows are constraint
    /// residuals and ignore `ẏ`.
    fn residual(&self, t: f64, y: &[f64], ydot: &[f64], out: &mut [f64]) -> PipeResult<()>;

    /// Human-readable unknown names, in state order.
    fn unknown_names(&self) -> Vec<String> {
        (0..self.dim()).map(|i| format!("y[{i}]")).collect()
    }
}
