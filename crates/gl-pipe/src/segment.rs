//! The discretized pipe and its residual assembly.

use crate::common::check_finite;
use crate::coupling::{PortDrive, PortDrives, PortSource, drive_residual, flux_to_port, port_to_flux};
use crate::discretize::{self, momentum};
use crate::error::{PipeError, PipeResult};
use crate::layout::{End, PortVariant, StateLayout, UnknownKind};
use crate::params::{Coefficients, PipeParams};
use crate::profile::InitialProfile;
use crate::traits::DaeSystem;
use gl_core::units::{kg_per_m3, kgps, pa};
use gl_fluids::{FlowPort, IdealGas};

/// Newton iterations allowed when solving for a flow-driven boundary pressure.
const BOUNDARY_MAX_ITER: usize = 50;
/// Relative step size at which the boundary pressure is considered converged.
const BOUNDARY_TOL: f64 = 1e-10;

/// One pipe discretized into `n` control volumes.
///
/// Holds parameters, derived coefficients and the initial state; the state
/// vector itself belongs to whoever integrates it.
#[derive(Debug, Clone)]
pub struct PipeSegment {
    name: String,
    params: PipeParams,
    gas: IdealGas,
    coef: Coefficients,
    layout: StateLayout,
    initial: Vec<f64>,
}

impl PipeSegment {
    /// Discretize a pipe and assign its initial state from `profile`.
    pub fn new(
        name: impl Into<String>,
        params: PipeParams,
        variant: PortVariant,
        profile: &InitialProfile,
    ) -> PipeResult<Self> {
        params.validate()?;
        let gas = IdealGas::air();
        let layout = StateLayout::new(params.cells, variant)?;
        let coef = params.coefficients(&gas);
        let (pressure, mass_flow) = profile.build(&layout, &coef, params.length.value)?;

        let mut initial = Vec::with_capacity(layout.len());
        initial.extend_from_slice(&pressure);
        initial.extend_from_slice(&mass_flow);
        for end in [End::Inlet, End::Outlet] {
            if layout.density(end).is_some() {
                initial.push(pressure[layout.boundary_pressure(end)] / coef.rt);
            }
        }

        let name = name.into();
        tracing::debug!(
            pipe = %name,
            cells = params.cells,
            unknowns = layout.len(),
            dx = coef.dx,
            "discretized pipe segment"
        );

        Ok(Self {
            name,
            params,
            gas,
            coef,
            layout,
            initial,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &PipeParams {
        &self.params
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coef
    }

    pub fn layout(&self) -> &StateLayout {
        &self.layout
    }

    pub fn gas(&self) -> &IdealGas {
        &self.gas
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn initial_state(&self) -> Vec<f64> {
        self.initial.clone()
    }

    pub fn unknown_names(&self) -> Vec<String> {
        (0..self.len()).map(|i| self.layout.name(i)).collect()
    }

    /// Differential/algebraic split under `drives`: a flow-driven end holds
    /// its boundary flux, so that flux is algebraic.
    pub fn unknown_kinds(&self, drives: PortDrives) -> Vec<UnknownKind> {
        self.layout.kinds_with_flow_driven(&drives.flow_driven())
    }

    pub fn pressures<'a>(&self, y: &'a [f64]) -> &'a [f64] {
        &y[self.layout.pressures()]
    }

    pub fn fluxes<'a>(&self, y: &'a [f64]) -> &'a [f64] {
        &y[self.layout.fluxes()]
    }

    /// Raw discretization: time derivatives of the differential unknowns,
    /// zero for algebraic ones. No port binding is applied.
    pub fn derivatives(&self, _t: f64, y: &[f64], dydt: &mut [f64]) -> PipeResult<()> {
        discretize::evaluate(&self.layout, &self.coef, y, dydt)
    }

    /// Explicit right-hand side for ODE integrators.
    ///
    /// The algebraic entries of `y` are first made consistent with the port
    /// drives at `t`; entries held by a drive get a zero derivative.
    pub fn rhs(&self, t: f64, y: &[f64], ports: &dyn PortSource) -> PipeResult<Vec<f64>> {
        self.layout.check_len(y.len())?;
        let drives = ports.drives(t);
        let mut state = y.to_vec();
        self.project(&mut state, drives)?;

        let mut dydt = vec![0.0; self.len()];
        self.derivatives(t, &state, &mut dydt)?;
        for end in drives.flow_driven() {
            dydt[self.layout.boundary_flux(end)] = 0.0;
        }
        Ok(dydt)
    }

    /// Full DAE residual `F(t, y, ẏ)`.
    ///
    /// Rows follow the unknown order: port binding at the two boundary
    /// pressure slots, continuity at interior faces, momentum at flux nodes,
    /// and the equation of state at the port density slots. Flow-driven ends
    /// rearrange their two rows, see [`PipeSegment::apply_drive`].
    pub fn residual(
        &self,
        t: f64,
        y: &[f64],
        ydot: &[f64],
        ports: &dyn PortSource,
        out: &mut [f64],
    ) -> PipeResult<()> {
        self.balance_residual(t, y, ydot, out)?;
        let drives = ports.drives(t);
        for end in [End::Inlet, End::Outlet] {
            self.apply_drive(y, end, drives.at(end), out)?;
        }
        Ok(())
    }

    /// Write the port rows of `end` into `out`, on top of
    /// [`PipeSegment::balance_residual`].
    ///
    /// A pressure drive binds the boundary pressure and leaves the boundary
    /// momentum row differential. A flow drive binds the boundary flux in its
    /// own row and puts the stationary boundary momentum balance `0 = f` in
    /// the boundary pressure row, the same balance [`PipeSegment::project`]
    /// solves.
    pub fn apply_drive(
        &self,
        y: &[f64],
        end: End,
        drive: PortDrive,
        out: &mut [f64],
    ) -> PipeResult<()> {
        let pressure_row = self.layout.boundary_pressure(end);
        match drive {
            PortDrive::Pressure(_) => {
                out[pressure_row] = drive_residual(&self.layout, y, end, drive);
            }
            PortDrive::MassFlow(_) => {
                out[pressure_row] = momentum(
                    &self.layout,
                    &self.coef,
                    &y[self.layout.pressures()],
                    &y[self.layout.fluxes()],
                    self.layout.boundary_node(end),
                )?;
                out[self.layout.boundary_flux(end)] = drive_residual(&self.layout, y, end, drive);
            }
        }
        Ok(())
    }

    /// Every residual row that does not depend on the ports: continuity,
    /// momentum and equation of state. The two port-binding rows are left
    /// at zero for [`PipeSegment::apply_drive`].
    pub fn balance_residual(
        &self,
        t: f64,
        y: &[f64],
        ydot: &[f64],
        out: &mut [f64],
    ) -> PipeResult<()> {
        self.layout.check_len(ydot.len())?;
        self.derivatives(t, y, out)?;
        for (k, value) in out.iter_mut().enumerate() {
            if self.layout.kind(k) == UnknownKind::Differential {
                *value = ydot[k] - *value;
            }
        }
        for end in [End::Inlet, End::Outlet] {
            if let Some(d) = self.layout.density(end) {
                out[d] = y[self.layout.boundary_pressure(end)] - y[d] * self.coef.rt;
            }
        }
        Ok(())
    }

    /// Make the algebraic entries of `y` consistent with `drives`.
    ///
    /// Pressure-driven ends copy the port pressure. Flow-driven ends copy the
    /// port flow (sign-flipped at the outlet) and solve the boundary momentum
    /// balance, taken as stationary, for the boundary pressure.
    pub fn project(&self, y: &mut [f64], drives: PortDrives) -> PipeResult<()> {
        self.layout.check_len(y.len())?;
        let ends = [End::Inlet, End::Outlet];

        for end in ends {
            match drives.at(end) {
                PortDrive::Pressure(p) => {
                    self.gas.check_state(pa(p), self.params.temperature)?;
                    y[self.layout.boundary_pressure(end)] = p;
                }
                PortDrive::MassFlow(qm) => {
                    let qm = check_finite(qm, "imposed port mass flow")?;
                    y[self.layout.boundary_flux(end)] = port_to_flux(end, qm);
                }
            }
        }

        let flow_driven = drives.flow_driven();
        if self.layout.cells() == 1 && flow_driven.len() == 2 {
            return Err(PipeError::InvalidArg {
                what: "a single-cell pipe needs at least one pressure-driven end",
            });
        }
        for end in flow_driven {
            self.solve_boundary_pressure(y, end)?;
        }

        for end in ends {
            if let Some(d) = self.layout.density(end) {
                y[d] = y[self.layout.boundary_pressure(end)] / self.coef.rt;
            }
        }
        Ok(())
    }

    /// Scalar Newton on the boundary momentum equation, starting from the
    /// neighbouring face pressure.
    fn solve_boundary_pressure(&self, y: &mut [f64], end: End) -> PipeResult<f64> {
        let slot = self.layout.boundary_pressure(end);
        let node = self.layout.boundary_node(end);
        let neighbour = match end {
            End::Inlet => self.layout.p(1),
            End::Outlet => self.layout.p(self.layout.cells() - 1),
        };
        let balance = |y: &[f64]| {
            momentum(
                &self.layout,
                &self.coef,
                &y[self.layout.pressures()],
                &y[self.layout.fluxes()],
                node,
            )
        };

        let mut pb = y[neighbour];
        for _ in 0..BOUNDARY_MAX_ITER {
            y[slot] = pb;
            let g = balance(&*y)?;
            let h = 1e-7 * pb.abs().max(1.0);
            y[slot] = pb + h;
            let slope = (balance(&*y)? - g) / h;
            if !slope.is_finite() || slope == 0.0 {
                return Err(PipeError::ConvergenceFailed {
                    what: "boundary pressure: singular momentum balance",
                });
            }

            let mut next = pb - g / slope;
            if !next.is_finite() || next <= 0.0 {
                next = 0.5 * pb;
            }
            if (next - pb).abs() <= BOUNDARY_TOL * pb {
                y[slot] = next;
                return Ok(next);
            }
            pb = next;
        }

        Err(PipeError::ConvergenceFailed {
            what: "boundary pressure: iteration limit reached",
        })
    }

    /// Port values this pipe writes at both ends, in port sign convention.
    pub fn boundary_ports(&self, y: &[f64]) -> (FlowPort, FlowPort) {
        let port = |end: End| {
            let pressure = pa(y[self.layout.boundary_pressure(end)]);
            let mass_flow = kgps(flux_to_port(end, y[self.layout.boundary_flux(end)]));
            let temperature = self.params.temperature;
            match self.layout.density(end) {
                Some(d) => FlowPort {
                    pressure,
                    temperature,
                    mass_flow,
                    density: Some(kg_per_m3(y[d])),
                    viscosity: Some(self.gas.viscosity(temperature)),
                },
                None => FlowPort::new(pressure, temperature, mass_flow),
            }
        };
        (port(End::Inlet), port(End::Outlet))
    }

    /// Gas mass [kg] held by the interior control volumes, `Σ p[i]·dx / c1`.
    ///
    /// Only the interior faces carry a continuity equation, so this is the
    /// inventory that is conserved when both ends are closed.
    pub fn mass_inventory(&self, y: &[f64]) -> f64 {
        (1..self.layout.cells())
            .map(|i| y[self.layout.p(i)] * self.coef.dx / self.coef.c1)
            .sum()
    }

    /// Pair this segment with a port source for solvers that take a `DaeSystem`.
    pub fn bind<S: PortSource>(&self, ports: S) -> BoundPipe<'_, S> {
        BoundPipe {
            segment: self,
            ports,
        }
    }
}

/// A segment with fixed port sources.
pub struct BoundPipe<'a, S: PortSource> {
    segment: &'a PipeSegment,
    ports: S,
}

impl<S: PortSource> DaeSystem for BoundPipe<'_, S> {
    fn dim(&self) -> usize {
        self.segment.len()
    }

    fn initial_state(&self) -> Vec<f64> {
        self.segment.initial_state()
    }

    fn unknown_kinds(&self) -> Vec<UnknownKind> {
        self.segment.unknown_kinds(self.ports.drives(0.0))
    }

    fn positive_mask(&self) -> Vec<bool> {
        let layout = self.segment.layout();
        (0..layout.len())
            .map(|i| !layout.fluxes().contains(&i))
            .collect()
    }

    fn residual(&self, t: f64, y: &[f64], ydot: &[f64], out: &mut [f64]) -> PipeResult<()> {
        self.segment.residual(t, y, ydot, &self.ports, out)
    }

    fn unknown_names(&self) -> Vec<String> {
        self.segment.unknown_names()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::units::{k, m};

    fn reference(cells: usize, profile: InitialProfile) -> PipeSegment {
        let params = PipeParams::new(cells, m(100.0), m(0.2), 0.016, k(300.0)).unwrap();
        PipeSegment::new("test", params, PortVariant::Insulated, &profile).unwrap()
    }

    #[test]
    fn initial_state_layout() {
        let seg = reference(
            4,
            InitialProfile::Linear {
                p_in: 5.0e5,
                p_out: 4.6e5,
                mass_flow: 1.0,
            },
        );
        let y = seg.initial_state();
        assert_eq!(y.len(), 9);
        assert_eq!(seg.pressures(&y), &[5.0e5, 4.9e5, 4.8e5, 4.7e5, 4.6e5]);
        assert_eq!(seg.fluxes(&y), &[1.0; 4]);
        assert_eq!(seg.unknown_names()[5], "qm[0]");
    }

    #[test]
    fn project_applies_pressure_drives() {
        let seg = reference(
            4,
            InitialProfile::Uniform {
                pressure: 5.0e5,
                mass_flow: 0.0,
            },
        );
        let mut y = seg.initial_state();
        seg.project(&mut y, PortDrives::pressures(5.5e5, 4.5e5))
            .unwrap();
        assert_eq!(y[0], 5.5e5);
        assert_eq!(y[4], 4.5e5);
    }

    #[test]
    fn project_closed_end_matches_neighbour_pressure() {
        let seg = reference(
            4,
            InitialProfile::Linear {
                p_in: 5.0e5,
                p_out: 4.6e5,
                mass_flow: 0.3,
            },
        );
        let mut y = seg.initial_state();
        seg.project(&mut y, PortDrives::closed()).unwrap();
        let layout = seg.layout();
        assert_eq!(y[layout.boundary_flux(End::Inlet)], 0.0);
        assert_eq!(y[layout.boundary_flux(End::Outlet)], 0.0);
        // With zero boundary flux the stationary momentum balance reduces to
        // a zero pressure gradient across the boundary cell.
        assert!((y[0] - y[1]).abs() < 1e-3);
        assert!((y[4] - y[3]).abs() < 1e-3);
    }

    #[test]
    fn project_rejects_nonpositive_port_pressure() {
        let seg = reference(
            3,
            InitialProfile::Uniform {
                pressure: 5.0e5,
                mass_flow: 0.0,
            },
        );
        let mut y = seg.initial_state();
        let err = seg
            .project(&mut y, PortDrives::pressures(0.0, 5.0e5))
            .unwrap_err();
        assert!(matches!(err, PipeError::Fluid(_)));
    }

    #[test]
    fn single_cell_cannot_be_flow_driven_at_both_ends() {
        let seg = reference(
            1,
            InitialProfile::Uniform {
                pressure: 5.0e5,
                mass_flow: 0.0,
            },
        );
        let mut y = seg.initial_state();
        let err = seg.project(&mut y, PortDrives::closed()).unwrap_err();
        assert!(matches!(err, PipeError::InvalidArg { .. }));
    }

    #[test]
    fn rhs_zeroes_held_entries() {
        let seg = reference(
            5,
            InitialProfile::Linear {
                p_in: 5.0e5,
                p_out: 4.5e5,
                mass_flow: 0.0,
            },
        );
        let drives = PortDrives::new(PortDrive::Pressure(5.0e5), PortDrive::MassFlow(-1.0));
        let y = seg.initial_state();
        let dydt = seg.rhs(0.0, &y, &drives).unwrap();
        let layout = seg.layout();
        assert_eq!(dydt[layout.boundary_pressure(End::Inlet)], 0.0);
        assert_eq!(dydt[layout.boundary_pressure(End::Outlet)], 0.0);
        assert_eq!(dydt[layout.boundary_flux(End::Outlet)], 0.0);
        assert!(dydt[layout.boundary_flux(End::Inlet)] > 0.0);
    }

    #[test]
    fn residual_vanishes_on_steady_uniform_state() {
        let seg = reference(
            10,
            InitialProfile::Uniform {
                pressure: 0.56e6,
                mass_flow: 0.0,
            },
        );
        let y = seg.initial_state();
        let ydot = vec![0.0; y.len()];
        let mut out = vec![1.0; y.len()];
        seg.residual(
            0.0,
            &y,
            &ydot,
            &PortDrives::pressures(0.56e6, 0.56e6),
            &mut out,
        )
        .unwrap();
        assert!(out.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn residual_agrees_with_projection_on_closed_pipe() {
        let seg = reference(
            6,
            InitialProfile::Linear {
                p_in: 5.6e5,
                p_out: 5.5e5,
                mass_flow: 0.4,
            },
        );
        let drives = PortDrives::closed();
        let mut y = seg.initial_state();
        seg.project(&mut y, drives).unwrap();
        let ydot = seg.rhs(0.0, &y, &drives).unwrap();

        let mut out = vec![1.0; y.len()];
        seg.residual(0.0, &y, &ydot, &drives, &mut out).unwrap();
        for (k, r) in out.iter().enumerate() {
            assert!(r.abs() < 1e-6, "row {k} = {r}");
        }

        let kinds = seg.unknown_kinds(drives);
        assert_eq!(kinds[seg.layout().boundary_flux(End::Inlet)], UnknownKind::Algebraic);
        assert_eq!(kinds[seg.layout().boundary_flux(End::Outlet)], UnknownKind::Algebraic);
    }

    #[test]
    fn boundary_ports_flip_outlet_sign() {
        let seg = reference(
            3,
            InitialProfile::Linear {
                p_in: 5.0e5,
                p_out: 4.7e5,
                mass_flow: 2.0,
            },
        );
        let y = seg.initial_state();
        let (inlet, outlet) = seg.boundary_ports(&y);
        assert_eq!(inlet.mass_flow.value, 2.0);
        assert_eq!(outlet.mass_flow.value, -2.0);
        assert_eq!(inlet.pressure.value, 5.0e5);
        assert_eq!(outlet.pressure.value, 4.7e5);
        assert!(inlet.density.is_none());
    }

    #[test]
    fn compressible_variant_emits_eos_rows() {
        let params = PipeParams::new(4, m(100.0), m(0.2), 0.016, k(300.0)).unwrap();
        let seg = PipeSegment::new(
            "compressible",
            params,
            PortVariant::Compressible,
            &InitialProfile::Uniform {
                pressure: 4.0e5,
                mass_flow: 0.0,
            },
        )
        .unwrap();
        let mut y = seg.initial_state();
        let layout = *seg.layout();
        let rho_in = layout.density(End::Inlet).unwrap();
        assert!((y[rho_in] - 4.0e5 / 86_133.0).abs() < 1e-9);

        let ydot = vec![0.0; y.len()];
        let mut out = vec![0.0; y.len()];
        let drives = PortDrives::pressures(4.0e5, 4.0e5);
        seg.residual(0.0, &y, &ydot, &drives, &mut out).unwrap();
        assert!(out[rho_in].abs() < 1e-6);

        y[rho_in] *= 1.01;
        seg.residual(0.0, &y, &ydot, &drives, &mut out).unwrap();
        assert!(out[rho_in] < -1.0e3);

        let (inlet, _) = seg.boundary_ports(&y);
        assert!(inlet.density.is_some());
        assert!(inlet.viscosity.is_some());
    }

    #[test]
    fn mass_inventory_counts_interior_faces() {
        let seg = reference(
            4,
            InitialProfile::Uniform {
                pressure: 86_133.0,
                mass_flow: 0.0,
            },
        );
        let y = seg.initial_state();
        let area = std::f64::consts::PI * 0.04 / 4.0;
        // Three interior faces, each 25 m of pipe at 1 kg/m³.
        let expected = 3.0 * 25.0 * area;
        assert!((seg.mass_inventory(&y) - expected).abs() < 1e-9);
    }
}
