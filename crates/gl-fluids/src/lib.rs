//! gl-fluids: gas properties and flow ports for gasline.
//!
//! Provides:
//! - The ideal-gas equation-of-state adapter used by the pipe discretizer
//!   (`R_g·T` coefficient, density, EOS residual, Sutherland viscosity)
//! - `FlowPort`, the shared connection state at a pipe end
//!
//! # Example
//!
//! ```
//! use gl_fluids::{IdealGas, FlowPort};
//! use gl_core::units::{k, kgps, pa};
//!
//! let gas = IdealGas::air();
//! let rt = gas.rt(k(300.0));
//! assert!((rt - 287.11 * 300.0).abs() < 1e-9);
//!
//! let port = FlowPort::compressible(&gas, pa(0.56e6), k(300.0), kgps(1.5));
//! assert!(port.eos_residual(&gas).unwrap().abs() < 1e-6);
//! ```

pub mod eos;
pub mod error;
pub mod port;

// Re-exports for ergonomics
pub use eos::{IdealGas, R_AIR};
pub use error::{FluidError, FluidResult};
pub use port::FlowPort;
