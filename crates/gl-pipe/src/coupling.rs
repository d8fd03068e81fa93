//! Binding of the pipe's boundary unknowns to its two flow ports.
//!
//! Port flow is positive when gas enters the attached component. Inside the
//! pipe, flux is positive downstream. So at the inlet the boundary flux
//! equals the port flow, and at the outlet it equals the negated port flow:
//!
//! ```text
//! p[0] = inlet.p      qm[0]    =  inlet.qm
//! p[n] = outlet.p     qm[last] = −outlet.qm
//! ```

use crate::layout::{End, StateLayout};
use gl_fluids::FlowPort;

/// Pipe-internal flux corresponding to a port flow at `end`.
#[inline]
pub fn port_to_flux(end: End, port_mass_flow: f64) -> f64 {
    match end {
        End::Inlet => port_mass_flow,
        End::Outlet => -port_mass_flow,
    }
}

/// Port flow corresponding to a pipe-internal boundary flux at `end`.
#[inline]
pub fn flux_to_port(end: End, flux: f64) -> f64 {
    // The sign flip is its own inverse.
    port_to_flux(end, flux)
}

/// What the outside world imposes at one pipe end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortDrive {
    /// Port pressure [Pa] is imposed; the boundary flux is a pipe result.
    Pressure(f64),
    /// Port mass flow [kg/s], in port sign convention, is imposed; the
    /// boundary pressure is a pipe result.
    MassFlow(f64),
}

impl PortDrive {
    /// A closed end.
    pub const CLOSED: PortDrive = PortDrive::MassFlow(0.0);

    /// Whether the boundary flux, rather than the pressure, is imposed.
    pub fn is_flow(&self) -> bool {
        matches!(self, PortDrive::MassFlow(_))
    }
}

/// Drives at both ends at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortDrives {
    pub inlet: PortDrive,
    pub outlet: PortDrive,
}

impl PortDrives {
    pub fn new(inlet: PortDrive, outlet: PortDrive) -> Self {
        Self { inlet, outlet }
    }

    /// Imposed pressures at both ends.
    pub fn pressures(p_in: f64, p_out: f64) -> Self {
        Self::new(PortDrive::Pressure(p_in), PortDrive::Pressure(p_out))
    }

    /// Both ends closed.
    pub fn closed() -> Self {
        Self::new(PortDrive::CLOSED, PortDrive::CLOSED)
    }

    pub fn at(&self, end: End) -> PortDrive {
        match end {
            End::Inlet => self.inlet,
            End::Outlet => self.outlet,
        }
    }

    /// Ends whose boundary flux is imposed.
    pub fn flow_driven(&self) -> Vec<End> {
        [End::Inlet, End::Outlet]
            .into_iter()
            .filter(|&end| self.at(end).is_flow())
            .collect()
    }
}

/// Source of port drives as a function of time.
///
/// The drive kind at each end (pressure or mass flow) must not change with
/// `t`; only its value may.
pub trait PortSource: Send + Sync {
    fn drives(&self, t: f64) -> PortDrives;
}

impl PortSource for PortDrives {
    fn drives(&self, _t: f64) -> PortDrives {
        *self
    }
}

/// Algebraic residual of the binding at `end` under `drive`.
pub fn drive_residual(layout: &StateLayout, y: &[f64], end: End, drive: PortDrive) -> f64 {
    match drive {
        PortDrive::Pressure(p) => y[layout.boundary_pressure(end)] - p,
        PortDrive::MassFlow(qm) => y[layout.boundary_flux(end)] - port_to_flux(end, qm),
    }
}

/// All four binding residuals against fully specified ports:
/// `[p_in − inlet.p, p_out − outlet.p, qm_first − inlet.qm, qm_last + outlet.qm]`.
pub fn binding_residuals(
    layout: &StateLayout,
    y: &[f64],
    inlet: &FlowPort,
    outlet: &FlowPort,
) -> [f64; 4] {
    [
        y[layout.boundary_pressure(End::Inlet)] - inlet.pressure.value,
        y[layout.boundary_pressure(End::Outlet)] - outlet.pressure.value,
        y[layout.boundary_flux(End::Inlet)] - port_to_flux(End::Inlet, inlet.mass_flow.value),
        y[layout.boundary_flux(End::Outlet)] - port_to_flux(End::Outlet, outlet.mass_flow.value),
    ]
}
