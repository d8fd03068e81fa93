//! gl-pipe: one-dimensional compressible gas pipe on a staggered grid.
//!
//! A pipe of length `L` is split into `n` control volumes. Pressures live on
//! the `n+1` cell faces, mass fluxes on the cell centres (two nodes for a
//! single-cell pipe). Interior faces carry continuity, every flux node
//! carries momentum, and the two boundary pressures are bound to the pipe's
//! flow ports.
//!
//! The crate does not integrate in time. It exposes the discretization as a
//! [`DaeSystem`] residual `F(t, y, ẏ)` plus an explicit right-hand side for
//! ODE-style integrators.
//!
//! # Example
//!
//! ```
//! use gl_core::units::{k, m};
//! use gl_pipe::{InitialProfile, PipeParams, PipeSegment, PortDrives, PortVariant};
//!
//! let params = PipeParams::new(10, m(100.0), m(0.2), 0.016, k(300.0)).unwrap();
//! let profile = InitialProfile::Uniform { pressure: 0.56e6, mass_flow: 0.0 };
//! let pipe = PipeSegment::new("main", params, PortVariant::Insulated, &profile).unwrap();
//!
//! let y = pipe.initial_state();
//! let dydt = pipe.rhs(0.0, &y, &PortDrives::pressures(0.56e6, 0.56e6)).unwrap();
//! assert!(dydt.iter().all(|v| *v == 0.0));
//! ```

pub mod common;
pub mod coupling;
pub mod discretize;
pub mod error;
pub mod layout;
pub mod params;
pub mod profile;
pub mod segment;
pub mod traits;

pub use coupling::{
    PortDrive, PortDrives, PortSource, binding_residuals, drive_residual, flux_to_port,
    port_to_flux,
};
pub use error::{PipeError, PipeResult};
pub use layout::{End, Equation, MomentumForm, PortVariant, StateLayout, Unknown, UnknownKind};
pub use params::{Coefficients, PipeParams, ScaleFactors};
pub use profile::{InitialProfile, quasi_steady_mass_flow};
pub use segment::{BoundPipe, PipeSegment};
pub use traits::DaeSystem;
