//! Staggered-grid layout of the pipe state vector.
//!
//! Pressures sit on the `n+1` cell faces, mass fluxes at cell centers.
//! The vector is ordered as all pressures (inlet to outlet), then all fluxes,
//! then the two port densities when the compressible port variant is used.
//!
//! A single-cell pipe has no interior face, so it carries one flux at each
//! face instead of one at the center.

use crate::error::{PipeError, PipeResult};
use std::ops::Range;

/// Pipe end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum End {
    Inlet,
    Outlet,
}

/// Whether the port densities are free unknowns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PortVariant {
    /// Ports carry pressure, temperature and mass flow only.
    #[default]
    Insulated,
    /// Ports also carry density, tied to pressure by the equation of state.
    Compressible,
}

/// One entry of the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unknown {
    Pressure(usize),
    MassFlow(usize),
    PortDensity(End),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownKind {
    Differential,
    Algebraic,
}

/// Which self-advection difference a momentum equation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumForm {
    Interior,
    InletBoundary,
    OutletBoundary,
}

/// One row of the equation system, listed in state-vector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equation {
    /// Algebraic binding of a boundary unknown to its port.
    PortBinding(End),
    /// `dp/dt` at an interior pressure face.
    Continuity(usize),
    /// `dqm/dt` at a flux node.
    Momentum { node: usize, form: MomentumForm },
    /// `0 = p − ρ·R_g·T` at a port.
    Eos(End),
}

/// Index bookkeeping for one pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateLayout {
    cells: usize,
    variant: PortVariant,
}

impl StateLayout {
    pub fn new(cells: usize, variant: PortVariant) -> PipeResult<Self> {
        if cells == 0 {
            return Err(PipeError::InvalidArg {
                what: "cell count must be at least 1",
            });
        }
        Ok(Self { cells, variant })
    }

    pub fn cells(&self) -> usize {
        self.cells
    }

    pub fn variant(&self) -> PortVariant {
        self.variant
    }

    pub fn pressure_count(&self) -> usize {
        self.cells + 1
    }

    pub fn flux_count(&self) -> usize {
        self.cells.max(2)
    }

    /// Total number of unknowns. Never zero, since `cells ≥ 1`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        let densities = match self.variant {
            PortVariant::Insulated => 0,
            PortVariant::Compressible => 2,
        };
        self.pressure_count() + self.flux_count() + densities
    }

    pub fn pressures(&self) -> Range<usize> {
        0..self.pressure_count()
    }

    pub fn fluxes(&self) -> Range<usize> {
        let start = self.pressure_count();
        start..start + self.flux_count()
    }

    /// Index of face pressure `i` (0-based).
    pub fn p(&self, i: usize) -> usize {
        debug_assert!(i < self.pressure_count());
        i
    }

    /// Index of flux node `j` (0-based).
    pub fn q(&self, j: usize) -> usize {
        debug_assert!(j < self.flux_count());
        self.pressure_count() + j
    }

    pub fn boundary_pressure(&self, end: End) -> usize {
        match end {
            End::Inlet => self.p(0),
            End::Outlet => self.p(self.cells),
        }
    }

    /// Flux node at `end`: 0 at the inlet, the last node at the outlet.
    pub fn boundary_node(&self, end: End) -> usize {
        match end {
            End::Inlet => 0,
            End::Outlet => self.flux_count() - 1,
        }
    }

    pub fn boundary_flux(&self, end: End) -> usize {
        self.q(self.boundary_node(end))
    }

    /// Index of a port density, if the variant carries one.
    pub fn density(&self, end: End) -> Option<usize> {
        let base = self.pressure_count() + self.flux_count();
        match (self.variant, end) {
            (PortVariant::Insulated, _) => None,
            (PortVariant::Compressible, End::Inlet) => Some(base),
            (PortVariant::Compressible, End::Outlet) => Some(base + 1),
        }
    }

    /// Cell whose faces bracket flux node `j`.
    pub fn cell_of_flux(&self, j: usize) -> usize {
        j.min(self.cells - 1)
    }

    /// Position of flux node `j` along the pipe, for a cell length `dx`.
    pub fn flux_position(&self, j: usize, dx: f64) -> f64 {
        if self.cells == 1 {
            j as f64 * dx
        } else {
            (j as f64 + 0.5) * dx
        }
    }

    pub fn momentum_form(&self, j: usize) -> MomentumForm {
        if j == 0 {
            MomentumForm::InletBoundary
        } else if j + 1 == self.flux_count() {
            MomentumForm::OutletBoundary
        } else {
            MomentumForm::Interior
        }
    }

    pub fn unknown(&self, index: usize) -> Option<Unknown> {
        if self.pressures().contains(&index) {
            Some(Unknown::Pressure(index))
        } else if self.fluxes().contains(&index) {
            Some(Unknown::MassFlow(index - self.pressure_count()))
        } else if Some(index) == self.density(End::Inlet) {
            Some(Unknown::PortDensity(End::Inlet))
        } else if Some(index) == self.density(End::Outlet) {
            Some(Unknown::PortDensity(End::Outlet))
        } else {
            None
        }
    }

    pub fn unknowns(&self) -> Vec<Unknown> {
        (0..self.len()).filter_map(|i| self.unknown(i)).collect()
    }

    /// Boundary pressures and port densities are algebraic; everything else
    /// carries a time derivative. A flow-driven end also makes its boundary
    /// flux algebraic, see [`StateLayout::kinds_with_flow_driven`].
    pub fn kind(&self, index: usize) -> UnknownKind {
        match self.unknown(index) {
            Some(Unknown::Pressure(i)) if i == 0 || i == self.cells => UnknownKind::Algebraic,
            Some(Unknown::PortDensity(_)) | None => UnknownKind::Algebraic,
            Some(_) => UnknownKind::Differential,
        }
    }

    pub fn kinds(&self) -> Vec<UnknownKind> {
        (0..self.len()).map(|i| self.kind(i)).collect()
    }

    /// Kinds when the boundary flux is imposed at each end in `flow_driven`.
    pub fn kinds_with_flow_driven(&self, flow_driven: &[End]) -> Vec<UnknownKind> {
        let mut kinds = self.kinds();
        for &end in flow_driven {
            kinds[self.boundary_flux(end)] = UnknownKind::Algebraic;
        }
        kinds
    }

    /// Human-readable unknown name, e.g. `p[3]` or `qm[0]`.
    pub fn name(&self, index: usize) -> String {
        match self.unknown(index) {
            Some(Unknown::Pressure(i)) => format!("p[{i}]"),
            Some(Unknown::MassFlow(j)) => format!("qm[{j}]"),
            Some(Unknown::PortDensity(End::Inlet)) => "rho_inlet".to_string(),
            Some(Unknown::PortDensity(End::Outlet)) => "rho_outlet".to_string(),
            None => format!("?[{index}]"),
        }
    }

    /// Full equation list; row `k` is paired with unknown `k`.
    pub fn equations(&self) -> Vec<Equation> {
        self.unknowns()
            .into_iter()
            .map(|u| match u {
                Unknown::Pressure(0) => Equation::PortBinding(End::Inlet),
                Unknown::Pressure(i) if i == self.cells => Equation::PortBinding(End::Outlet),
                Unknown::Pressure(i) => Equation::Continuity(i),
                Unknown::MassFlow(j) => Equation::Momentum {
                    node: j,
                    form: self.momentum_form(j),
                },
                Unknown::PortDensity(end) => Equation::Eos(end),
            })
            .collect()
    }

    /// The discretized balance equations (continuity and momentum) only.
    pub fn balance_equations(&self) -> Vec<Equation> {
        self.equations()
            .into_iter()
            .filter(|e| matches!(e, Equation::Continuity(_) | Equation::Momentum { .. }))
            .collect()
    }

    pub fn check_len(&self, actual: usize) -> PipeResult<()> {
        if actual == self.len() {
            Ok(())
        } else {
            Err(PipeError::StateLength {
                expected: self.len(),
                actual,
            })
        }
    }
}
