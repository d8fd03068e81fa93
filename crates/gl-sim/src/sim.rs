//! Simulation runner and result recording.

use crate::error::{SimError, SimResult};
use crate::integrator::{ForwardEuler, Integrator, RK4};
use crate::model::TransientModel;

/// Integrator selection for simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IntegratorType {
    /// 4th-order Runge-Kutta (default, most accurate, 4 rhs calls per step).
    #[default]
    RK4,
    /// Forward Euler (1st-order, faster, 1 rhs call per step).
    ForwardEuler,
}

/// Options for simulation runs.
#[derive(Clone, Debug)]
pub struct SimOptions {
    /// Fixed time step (seconds)
    pub dt: f64,
    /// Final simulation time (seconds)
    pub t_end: f64,
    /// Maximum number of steps (safety limit)
    pub max_steps: usize,
    /// Record every N-th step (decimation)
    pub record_every: usize,
    /// Integrator type (default: RK4)
    pub integrator: IntegratorType,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            dt: 1e-2,
            t_end: 1.0,
            max_steps: 1_000_000,
            record_every: 10,
            integrator: IntegratorType::default(),
        }
    }
}

impl SimOptions {
    fn validate(&self) -> SimResult<()> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidArg {
                what: "dt must be positive",
            });
        }
        if !self.t_end.is_finite() || self.t_end < 0.0 {
            return Err(SimError::InvalidArg {
                what: "t_end must be non-negative",
            });
        }
        if self.max_steps == 0 {
            return Err(SimError::InvalidArg {
                what: "max_steps must be positive",
            });
        }
        if self.record_every == 0 {
            return Err(SimError::InvalidArg {
                what: "record_every must be positive",
            });
        }
        Ok(())
    }

    /// Steps needed to reach `t_end`, with a small tolerance so that
    /// `t_end = k·dt` does not round up to an extra step.
    fn step_count(&self) -> usize {
        let steps = (self.t_end / self.dt - 1e-9).ceil().max(0.0) as usize;
        if steps > self.max_steps {
            tracing::warn!(
                steps,
                max_steps = self.max_steps,
                "run truncated at the step limit"
            );
        }
        steps.min(self.max_steps)
    }
}

/// Record of simulation results.
#[derive(Clone, Debug)]
pub struct SimRecord<S> {
    /// Time points (seconds)
    pub t: Vec<f64>,
    /// State snapshots
    pub x: Vec<S>,
}

impl<S> SimRecord<S> {
    /// Last recorded state.
    pub fn last(&self) -> Option<(f64, &S)> {
        self.t.last().copied().zip(self.x.last())
    }
}

/// Run a transient simulation with a fixed step.
///
/// The initial state and every stepped state pass through
/// [`TransientModel::project`] before being used or recorded.
pub fn run_sim<M: TransientModel>(
    model: &mut M,
    opts: &SimOptions,
) -> SimResult<SimRecord<M::State>> {
    opts.validate()?;
    let steps = opts.step_count();
    tracing::debug!(steps, dt = opts.dt, integrator = ?opts.integrator, "transient run started");

    let mut t = 0.0;
    let mut x = model.project(t, model.initial_state())?;

    let mut t_record = vec![t];
    let mut x_record = vec![x.clone()];

    for step in 1..=steps {
        x = match opts.integrator {
            IntegratorType::RK4 => RK4.step(model, t, &x, opts.dt)?,
            IntegratorType::ForwardEuler => ForwardEuler.step(model, t, &x, opts.dt)?,
        };
        t = step as f64 * opts.dt;
        x = model.project(t, x)?;

        if step % opts.record_every == 0 || step == steps {
            t_record.push(t);
            x_record.push(x.clone());
        }
    }

    tracing::debug!(t_final = t, records = t_record.len(), "transient run finished");
    Ok(SimRecord {
        t: t_record,
        x: x_record,
    })
}
