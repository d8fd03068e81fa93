//! Initial pressure/flux profiles and the quasi-steady flow relation.

use crate::common::check_finite;
use crate::error::{PipeError, PipeResult};
use crate::layout::StateLayout;
use crate::params::Coefficients;

/// Initial pressure/flux assignment for a new segment.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialProfile {
    /// Same pressure on every face and same flux on every node.
    Uniform { pressure: f64, mass_flow: f64 },
    /// Pressure linear between the boundary values, uniform flux.
    Linear {
        p_in: f64,
        p_out: f64,
        mass_flow: f64,
    },
    /// Quasi-steady friction-dominated solution between two pressures:
    /// `p(x)² = p_in² − (p_in² − p_out²)·x/L` with the closed-form flux.
    SteadyState { p_in: f64, p_out: f64 },
    /// Explicit arrays of length `n+1` (pressures) and the flux count.
    Explicit {
        pressure: Vec<f64>,
        mass_flow: Vec<f64>,
    },
}

/// Closed-form quasi-steady mass flow between two pressures:
///
/// ```text
/// qm = sign(p_in² − p_out²)·sqrt(|p_in² − p_out²|·A/(2·c2·L))
/// ```
///
/// With unit scale factors `A/(2·c2·L) = D·A²/(f·L·R_g·T)`. Kinetic energy
/// is neglected, so the relation holds at low Mach number.
pub fn quasi_steady_mass_flow(
    coef: &Coefficients,
    length: f64,
    p_in: f64,
    p_out: f64,
) -> PipeResult<f64> {
    let dp2 = p_in * p_in - p_out * p_out;
    if dp2 == 0.0 {
        return Ok(0.0);
    }
    if coef.c2 <= 0.0 {
        return Err(PipeError::InvalidArg {
            what: "quasi-steady flow needs a positive friction factor",
        });
    }
    let resistance = 2.0 * coef.c2 * length / coef.area;
    check_finite(
        dp2.signum() * (dp2.abs() / resistance).sqrt(),
        "quasi-steady mass flow",
    )
}

impl InitialProfile {
    /// Pressures on the faces and fluxes on the nodes of `layout`.
    pub fn build(
        &self,
        layout: &StateLayout,
        coef: &Coefficients,
        length: f64,
    ) -> PipeResult<(Vec<f64>, Vec<f64>)> {
        let np = layout.pressure_count();
        let nq = layout.flux_count();
        let fraction = |i: usize| i as f64 / layout.cells() as f64;

        let (pressure, mass_flow) = match self {
            InitialProfile::Uniform {
                pressure,
                mass_flow,
            } => (vec![*pressure; np], vec![*mass_flow; nq]),
            InitialProfile::Linear {
                p_in,
                p_out,
                mass_flow,
            } => (
                (0..np)
                    .map(|i| p_in + (p_out - p_in) * fraction(i))
                    .collect(),
                vec![*mass_flow; nq],
            ),
            InitialProfile::SteadyState { p_in, p_out } => {
                let qm = quasi_steady_mass_flow(coef, length, *p_in, *p_out)?;
                let dp2 = p_in * p_in - p_out * p_out;
                (
                    (0..np)
                        .map(|i| (p_in * p_in - dp2 * fraction(i)).sqrt())
                        .collect(),
                    vec![qm; nq],
                )
            }
            InitialProfile::Explicit {
                pressure,
                mass_flow,
            } => {
                if pressure.len() != np {
                    return Err(PipeError::ProfileLength {
                        what: "pressure",
                        expected: np,
                        actual: pressure.len(),
                    });
                }
                if mass_flow.len() != nq {
                    return Err(PipeError::ProfileLength {
                        what: "mass flow",
                        expected: nq,
                        actual: mass_flow.len(),
                    });
                }
                (pressure.clone(), mass_flow.clone())
            }
        };

        for &p in &pressure {
            if !p.is_finite() || p <= 0.0 {
                return Err(PipeError::InvalidArg {
                    what: "initial pressures must be positive and finite",
                });
            }
        }
        for &q in &mass_flow {
            check_finite(q, "initial mass flow")?;
        }
        Ok((pressure, mass_flow))
    }
}
