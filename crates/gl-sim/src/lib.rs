//! Time integration and network assembly for gasline pipes.
//!
//! Provides:
//! - `TransientModel` with fixed-step RK4 and forward Euler integrators
//! - `PipeTransient`, a single pipe driven by time-dependent port schedules
//! - `PipeNetwork`, pipes joined at junctions as one `DaeSystem`

pub mod error;
pub mod integrator;
pub mod model;
pub mod network;
pub mod pipe_model;
pub mod sim;

pub use error::{SimError, SimResult};
pub use integrator::{ForwardEuler, Integrator, RK4};
pub use model::TransientModel;
pub use network::{Boundary, Junction, NetworkBuilder, PipeEnd, PipeNetwork};
pub use pipe_model::{BoundarySchedule, DriveKind, PipeSchedules, PipeTransient, Schedule};
pub use sim::{IntegratorType, SimOptions, SimRecord, run_sim};
