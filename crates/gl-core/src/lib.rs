//! gl-core: shared foundation for gasline.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for pipes, junctions and boundaries)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{GlError, GlResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
