//! Ideal-gas equation-of-state adapter.
//!
//! The discretized pipe only ever needs the product `R_g·T`: it scales the
//! continuity equation (`c1 = R_g·T/A`) and, through `c1`, the friction
//! coefficient. The species constant is fixed to dry air.

use crate::error::{FluidError, FluidResult};
use gl_core::units::{Density, DynVisc, Pressure, Temperature, kg_per_m3, pa_s};

/// Specific gas constant of dry air [J/(kg·K)].
pub const R_AIR: f64 = 287.11;

// Sutherland's law constants for air.
const MU_REF: f64 = 1.716e-5;
const T_REF: f64 = 273.15;
const SUTHERLAND: f64 = 110.4;

/// Ideal gas `p = ρ·R_g·T` with a fixed species constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdealGas {
    r_specific: f64,
}

impl Default for IdealGas {
    fn default() -> Self {
        Self::air()
    }
}

impl IdealGas {
    /// Dry air.
    pub const fn air() -> Self {
        Self { r_specific: R_AIR }
    }

    /// Specific gas constant [J/(kg·K)].
    pub fn r_specific(&self) -> f64 {
        self.r_specific
    }

    /// `R_g·T` [m²/s²] for a uniform gas temperature.
    pub fn rt(&self, t: Temperature) -> f64 {
        self.r_specific * t.value
    }

    /// `R_g·T` implied by a `(p, ρ)` pair, independent of any stored temperature.
    pub fn rt_from_pressure_density(&self, p: Pressure, rho: Density) -> FluidResult<f64> {
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(p.value / rho.value)
    }

    /// Density from pressure and temperature.
    pub fn density(&self, p: Pressure, t: Temperature) -> Density {
        kg_per_m3(p.value / self.rt(t))
    }

    /// Residual `p − ρ·R_g·T` [Pa]; zero on the equation of state.
    pub fn eos_residual(&self, p: Pressure, rho: Density, t: Temperature) -> f64 {
        p.value - rho.value * self.rt(t)
    }

    /// Dynamic viscosity from Sutherland's law.
    pub fn viscosity(&self, t: Temperature) -> DynVisc {
        let tk = t.value;
        pa_s(MU_REF * (tk / T_REF).powf(1.5) * (T_REF + SUTHERLAND) / (tk + SUTHERLAND))
    }

    /// Reject states outside the adapter's validity region.
    pub fn check_state(&self, p: Pressure, t: Temperature) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::units::{k, pa};

    #[test]
    fn rt_for_air_at_300k() {
        let gas = IdealGas::air();
        assert!((gas.rt(k(300.0)) - 86_133.0).abs() < 1e-9);
    }

    #[test]
    fn density_satisfies_eos() {
        let gas = IdealGas::air();
        let rho = gas.density(pa(0.56e6), k(300.0));
        assert!((rho.value - 0.56e6 / 86_133.0).abs() < 1e-12);
        assert!(gas.eos_residual(pa(0.56e6), rho, k(300.0)).abs() < 1e-6);
    }

    #[test]
    fn rt_from_pressure_density_rejects_zero_density() {
        let gas = IdealGas::air();
        assert!(gas.rt_from_pressure_density(pa(1e5), kg_per_m3(0.0)).is_err());
    }

    #[test]
    fn sutherland_reference_point() {
        let gas = IdealGas::air();
        let mu = gas.viscosity(k(T_REF));
        assert!((mu.value - MU_REF).abs() < 1e-12);
        // Gas viscosity grows with temperature.
        assert!(gas.viscosity(k(400.0)).value > gas.viscosity(k(300.0)).value);
    }

    #[test]
    fn check_state_rejects_nonpositive_pressure() {
        let gas = IdealGas::air();
        assert!(gas.check_state(pa(0.0), k(300.0)).is_err());
        assert!(gas.check_state(pa(1e5), k(-1.0)).is_err());
        assert!(gas.check_state(pa(1e5), k(300.0)).is_ok());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use gl_core::units::{k, pa};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rt_recovered_from_density(p in 1.0e3_f64..1.0e7, t in 150.0_f64..900.0) {
            let gas = IdealGas::air();
            let rho = gas.density(pa(p), k(t));
            let rt = gas.rt_from_pressure_density(pa(p), rho).unwrap();
            prop_assert!((rt - gas.rt(k(t))).abs() <= 1e-9 * gas.rt(k(t)));
        }
    }
}
