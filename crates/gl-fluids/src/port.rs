//! Flow port: the shared connection state at a pipe end.

use crate::eos::IdealGas;
use gl_core::units::{Density, DynVisc, MassRate, Pressure, Temperature};

/// Compressible-flow connection point.
///
/// `mass_flow` is signed: positive when gas enters the component the port is
/// attached to. Density and viscosity are only carried by the compressible
/// variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowPort {
    pub pressure: Pressure,
    pub temperature: Temperature,
    pub mass_flow: MassRate,
    pub density: Option<Density>,
    pub viscosity: Option<DynVisc>,
}

impl FlowPort {
    /// Port carrying only pressure, temperature and mass flow.
    pub fn new(pressure: Pressure, temperature: Temperature, mass_flow: MassRate) -> Self {
        Self {
            pressure,
            temperature,
            mass_flow,
            density: None,
            viscosity: None,
        }
    }

    /// Port with density and viscosity filled from the gas model.
    pub fn compressible(
        gas: &IdealGas,
        pressure: Pressure,
        temperature: Temperature,
        mass_flow: MassRate,
    ) -> Self {
        Self {
            pressure,
            temperature,
            mass_flow,
            density: Some(gas.density(pressure, temperature)),
            viscosity: Some(gas.viscosity(temperature)),
        }
    }

    /// `p − ρ·R_g·T`, or `None` when the port carries no density.
    pub fn eos_residual(&self, gas: &IdealGas) -> Option<f64> {
        self.density
            .map(|rho| gas.eos_residual(self.pressure, rho, self.temperature))
    }

    /// `R_g·T` at this port.
    pub fn rt(&self, gas: &IdealGas) -> f64 {
        gas.rt(self.temperature)
    }
}
