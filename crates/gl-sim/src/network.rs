//! Pipes joined at junctions, assembled into one residual system.
//!
//! Unknowns are the pipes' state vectors back to back, followed by one
//! pressure per junction. Each pipe contributes its balance rows; each pipe
//! end is bound either to a boundary drive or to a junction:
//!
//! ```text
//! pressure end:   p_end − p_imposed
//! flow end:       qm_end − qm_imposed, plus the stationary boundary momentum
//!                 balance in the p_end row
//! junction end:   p_end − p_junction
//! junction row:   Σ port qm over attached ends = 0
//! ```

use crate::error::{SimError, SimResult};
use gl_core::{JunctionId, PipeId};
use gl_fluids::FlowPort;
use gl_pipe::{
    DaeSystem, End, PipeError, PipeResult, PipeSegment, PortDrive, UnknownKind, flux_to_port,
};
use rayon::prelude::*;
use std::ops::Range;

/// One end of one pipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeEnd {
    pub pipe: PipeId,
    pub end: End,
}

impl PipeEnd {
    pub fn inlet(pipe: PipeId) -> Self {
        Self {
            pipe,
            end: End::Inlet,
        }
    }

    pub fn outlet(pipe: PipeId) -> Self {
        Self {
            pipe,
            end: End::Outlet,
        }
    }
}

/// An externally imposed drive at a pipe end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub at: PipeEnd,
    pub drive: PortDrive,
}

/// A zero-volume node joining several pipe ends at a common pressure.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    pub name: String,
    pub ends: Vec<PipeEnd>,
    /// Starting value of the junction pressure [Pa].
    pub initial_pressure: f64,
}

/// Builder for a [`PipeNetwork`].
///
/// Add pipes, boundaries and junctions, then call `build()` to check that
/// every pipe end is bound exactly once.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    pipes: Vec<PipeSegment>,
    boundaries: Vec<Boundary>,
    junctions: Vec<Junction>,
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pipe(&mut self, pipe: PipeSegment) -> PipeId {
        let id = PipeId::from_index(self.pipes.len() as u32);
        self.pipes.push(pipe);
        id
    }

    pub fn add_boundary(&mut self, at: PipeEnd, drive: PortDrive) {
        self.boundaries.push(Boundary { at, drive });
    }

    pub fn add_junction(
        &mut self,
        name: impl Into<String>,
        ends: Vec<PipeEnd>,
        initial_pressure: f64,
    ) -> JunctionId {
        let id = JunctionId::from_index(self.junctions.len() as u32);
        self.junctions.push(Junction {
            name: name.into(),
            ends,
            initial_pressure,
        });
        id
    }

    pub fn build(self) -> SimResult<PipeNetwork> {
        if self.pipes.is_empty() {
            return Err(SimError::Topology {
                what: "network has no pipes".to_string(),
            });
        }

        let mut bound = vec![[0usize; 2]; self.pipes.len()];
        let mut attach = |at: PipeEnd| -> SimResult<()> {
            let slot = bound
                .get_mut(at.pipe.index() as usize)
                .ok_or_else(|| SimError::Topology {
                    what: format!("pipe {} does not exist", at.pipe),
                })?;
            slot[end_slot(at.end)] += 1;
            Ok(())
        };

        for b in &self.boundaries {
            match b.drive {
                PortDrive::Pressure(p) if !p.is_finite() || p <= 0.0 => {
                    return Err(SimError::InvalidArg {
                        what: "boundary pressure must be positive",
                    });
                }
                PortDrive::MassFlow(qm) if !qm.is_finite() => {
                    return Err(SimError::InvalidArg {
                        what: "boundary mass flow must be finite",
                    });
                }
                _ => {}
            }
            attach(b.at)?;
        }
        for j in &self.junctions {
            if j.ends.is_empty() {
                return Err(SimError::Topology {
                    what: format!("junction '{}' has no pipe ends", j.name),
                });
            }
            if !j.initial_pressure.is_finite() || j.initial_pressure <= 0.0 {
                return Err(SimError::InvalidArg {
                    what: "junction initial pressure must be positive",
                });
            }
            for &at in &j.ends {
                attach(at)?;
            }
        }

        for (k, counts) in bound.iter().enumerate() {
            for (end, count) in [End::Inlet, End::Outlet].into_iter().zip(counts) {
                if *count != 1 {
                    return Err(SimError::Topology {
                        what: format!(
                            "{end:?} of pipe '{}' is bound {count} times, expected once",
                            self.pipes[k].name()
                        ),
                    });
                }
            }
        }

        let mut offsets = Vec::with_capacity(self.pipes.len());
        let mut next = 0;
        for pipe in &self.pipes {
            offsets.push(next);
            next += pipe.len();
        }

        tracing::info!(
            pipes = self.pipes.len(),
            junctions = self.junctions.len(),
            boundaries = self.boundaries.len(),
            unknowns = next + self.junctions.len(),
            "network assembled"
        );

        Ok(PipeNetwork {
            pipes: self.pipes,
            offsets,
            junction_offset: next,
            boundaries: self.boundaries,
            junctions: self.junctions,
        })
    }
}

fn end_slot(end: End) -> usize {
    match end {
        End::Inlet => 0,
        End::Outlet => 1,
    }
}

/// Validated network of pipes, boundaries and junctions.
#[derive(Debug, Clone)]
pub struct PipeNetwork {
    pipes: Vec<PipeSegment>,
    offsets: Vec<usize>,
    junction_offset: usize,
    boundaries: Vec<Boundary>,
    junctions: Vec<Junction>,
}

impl PipeNetwork {
    pub fn pipes(&self) -> &[PipeSegment] {
        &self.pipes
    }

    pub fn junctions(&self) -> &[Junction] {
        &self.junctions
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn pipe(&self, id: PipeId) -> Option<&PipeSegment> {
        self.pipes.get(id.index() as usize)
    }

    /// Index range of pipe `k`'s unknowns in the network state.
    fn block(&self, k: usize) -> Range<usize> {
        self.offsets[k]..self.offsets[k] + self.pipes[k].len()
    }

    /// Slice of the network state belonging to `id`.
    pub fn pipe_state<'a>(&self, y: &'a [f64], id: PipeId) -> SimResult<&'a [f64]> {
        let k = id.index() as usize;
        if k >= self.pipes.len() {
            return Err(SimError::Topology {
                what: format!("pipe {id} does not exist"),
            });
        }
        Ok(&y[self.block(k)])
    }

    /// Every pipe with its slice of the network state.
    pub fn pipe_states<'a>(
        &'a self,
        y: &'a [f64],
    ) -> impl Iterator<Item = (&'a PipeSegment, &'a [f64])> {
        self.pipes
            .iter()
            .enumerate()
            .map(move |(k, pipe)| (pipe, &y[self.block(k)]))
    }

    /// All junction pressures, in junction order.
    pub fn junction_pressures<'a>(&self, y: &'a [f64]) -> &'a [f64] {
        &y[self.junction_offset..self.junction_offset + self.junctions.len()]
    }

    /// Pressure unknown of junction `id`.
    pub fn junction_pressure(&self, y: &[f64], id: JunctionId) -> Option<f64> {
        let k = id.index() as usize;
        (k < self.junctions.len()).then(|| y[self.junction_offset + k])
    }

    /// Net port mass flow into the pipes at every junction [kg/s].
    /// Zero at a consistent state.
    pub fn junction_imbalance(&self, y: &[f64]) -> Vec<f64> {
        self.junctions
            .iter()
            .map(|j| j.ends.iter().map(|&at| self.end_port_flow(y, at)).sum())
            .collect()
    }

    /// Port values every pipe writes at its inlet and outlet.
    pub fn port_values(&self, y: &[f64]) -> Vec<(FlowPort, FlowPort)> {
        (0..self.pipes.len())
            .map(|k| self.pipes[k].boundary_ports(&y[self.block(k)]))
            .collect()
    }

    fn end_indices(&self, at: PipeEnd) -> (usize, usize) {
        let k = at.pipe.index() as usize;
        let layout = self.pipes[k].layout();
        (
            self.offsets[k] + layout.boundary_pressure(at.end),
            self.offsets[k] + layout.boundary_flux(at.end),
        )
    }

    /// Ends of pipe `k` whose boundary flux a boundary imposes.
    fn flow_driven_ends(&self, k: usize) -> Vec<End> {
        self.boundaries
            .iter()
            .filter(|b| b.at.pipe.index() as usize == k && b.drive.is_flow())
            .map(|b| b.at.end)
            .collect()
    }

    fn end_port_flow(&self, y: &[f64], at: PipeEnd) -> f64 {
        let (_, flux) = self.end_indices(at);
        flux_to_port(at.end, y[flux])
    }
}

impl DaeSystem for PipeNetwork {
    fn dim(&self) -> usize {
        self.junction_offset + self.junctions.len()
    }

    fn initial_state(&self) -> Vec<f64> {
        let mut y = Vec::with_capacity(self.dim());
        for pipe in &self.pipes {
            y.extend(pipe.initial_state());
        }
        y.extend(self.junctions.iter().map(|j| j.initial_pressure));
        y
    }

    fn unknown_kinds(&self) -> Vec<UnknownKind> {
        let mut kinds = Vec::with_capacity(self.dim());
        for (k, pipe) in self.pipes.iter().enumerate() {
            kinds.extend(pipe.layout().kinds_with_flow_driven(&self.flow_driven_ends(k)));
        }
        kinds.extend(self.junctions.iter().map(|_| UnknownKind::Algebraic));
        kinds
    }

    fn positive_mask(&self) -> Vec<bool> {
        let mut mask = Vec::with_capacity(self.dim());
        for pipe in &self.pipes {
            let fluxes = pipe.layout().fluxes();
            mask.extend((0..pipe.len()).map(|i| !fluxes.contains(&i)));
        }
        mask.extend(self.junctions.iter().map(|_| true));
        mask
    }

    fn residual(&self, t: f64, y: &[f64], ydot: &[f64], out: &mut [f64]) -> PipeResult<()> {
        let dim = self.dim();
        for len in [y.len(), ydot.len(), out.len()] {
            if len != dim {
                return Err(PipeError::StateLength {
                    expected: dim,
                    actual: len,
                });
            }
        }

        // Pipes only read their own block, so they are evaluated in parallel.
        let blocks = self
            .pipes
            .par_iter()
            .enumerate()
            .map(|(k, pipe)| {
                let range = self.block(k);
                let mut rows = vec![0.0; pipe.len()];
                pipe.balance_residual(t, &y[range.clone()], &ydot[range], &mut rows)?;
                Ok(rows)
            })
            .collect::<PipeResult<Vec<_>>>()?;
        for (k, rows) in blocks.iter().enumerate() {
            out[self.block(k)].copy_from_slice(rows);
        }

        for b in &self.boundaries {
            let k = b.at.pipe.index() as usize;
            let block = self.block(k);
            self.pipes[k].apply_drive(&y[block.clone()], b.at.end, b.drive, &mut out[block])?;
        }

        for (jk, junction) in self.junctions.iter().enumerate() {
            let p_junction = y[self.junction_offset + jk];
            let mut net_flow = 0.0;
            for &at in &junction.ends {
                let (row, flux) = self.end_indices(at);
                out[row] = y[row] - p_junction;
                net_flow += flux_to_port(at.end, y[flux]);
            }
            out[self.junction_offset + jk] = net_flow;
        }
        Ok(())
    }

    fn unknown_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dim());
        for pipe in &self.pipes {
            names.extend(
                pipe.unknown_names()
                    .into_iter()
                    .map(|n| format!("{}.{n}", pipe.name())),
            );
        }
        names.extend(self.junctions.iter().map(|j| format!("{}.p", j.name)));
        names
    }
}
