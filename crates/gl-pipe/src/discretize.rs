//! Finite-difference continuity and momentum equations.
//!
//! With `p̄ = ½(p[i+1] + p[i])` for the cell around flux node `i`:
//!
//! ```text
//! dp[i]/dt  = c1·(qm[i-1] − qm[i])/dx
//! dqm[i]/dt = (c1·qm²/p̄² − A)·(p[i+1] − p[i])/dx
//!           + c1·qm/p̄ · Δadv(qm)
//!           − c2·qm·|qm|/p̄
//! ```
//!
//! `Δadv` is a central difference in the interior and a one-sided
//! three-point difference at the first and last flux nodes. Both already
//! include the factor 2 of `∂(qm²)/∂x`, which is why neither divides by `2·dx`.

use crate::common::{check_finite, check_positive, signed_square};
use crate::error::PipeResult;
use crate::layout::{MomentumForm, StateLayout};
use crate::params::Coefficients;

/// `(qm[i-1] − qm[i+1])/dx`, equal to `−2·∂qm/∂x` to second order.
#[inline]
pub fn central_advection(q_prev: f64, q_next: f64, dx: f64) -> f64 {
    (q_prev - q_next) / dx
}

/// `(3·qm[0] − 4·qm[1] + qm[2])/dx`, equal to `−2·∂qm/∂x` at node 0 to
/// second order.
///
/// With only two flux nodes the first-order `2·(qm[0] − qm[1])/dx` is used.
#[inline]
pub fn inlet_advection(q: &[f64], dx: f64) -> f64 {
    match q {
        [q0, q1, q2, ..] => (3.0 * q0 - 4.0 * q1 + q2) / dx,
        [q0, q1] => 2.0 * (q0 - q1) / dx,
        _ => 0.0,
    }
}

/// Mirror of [`inlet_advection`] at the last flux node:
/// `(−3·qm[n] + 4·qm[n-1] − qm[n-2])/dx`.
#[inline]
pub fn outlet_advection(q: &[f64], dx: f64) -> f64 {
    match q {
        [.., qa, qb, qc] => (-3.0 * qc + 4.0 * qb - qa) / dx,
        [q0, q1] => 2.0 * (q0 - q1) / dx,
        _ => 0.0,
    }
}

/// `dp/dt` at interior pressure face `i` (`1 ≤ i ≤ n−1`).
#[inline]
pub fn continuity(coef: &Coefficients, q: &[f64], i: usize) -> f64 {
    coef.c1 * (q[i - 1] - q[i]) / coef.dx
}

/// `dqm/dt` at flux node `j`.
///
/// Fails with `NonPhysical` when the cell-averaged pressure is not strictly
/// positive or the result is not finite.
pub fn momentum(
    layout: &StateLayout,
    coef: &Coefficients,
    p: &[f64],
    q: &[f64],
    j: usize,
) -> PipeResult<f64> {
    let cell = layout.cell_of_flux(j);
    let (p_left, p_right) = (p[cell], p[cell + 1]);
    let p_bar = check_positive(0.5 * (p_left + p_right), "cell-averaged pressure")?;

    let qj = q[j];
    let advection = match layout.momentum_form(j) {
        MomentumForm::Interior => central_advection(q[j - 1], q[j + 1], coef.dx),
        MomentumForm::InletBoundary => inlet_advection(q, coef.dx),
        MomentumForm::OutletBoundary => outlet_advection(q, coef.dx),
    };

    let gradient = (p_right - p_left) / coef.dx;
    let convective = (coef.c1 * qj * qj / (p_bar * p_bar) - coef.area) * gradient;
    let self_advection = coef.c1 * qj / p_bar * advection;
    let friction = coef.c2 * signed_square(qj) / p_bar;

    check_finite(
        convective + self_advection - friction,
        "momentum right-hand side",
    )
}

/// Fill `dydt` with the time derivatives of every differential unknown.
///
/// Algebraic entries (boundary pressures, port densities) are set to zero;
/// their values come from port binding, not from this function.
pub fn evaluate(
    layout: &StateLayout,
    coef: &Coefficients,
    y: &[f64],
    dydt: &mut [f64],
) -> PipeResult<()> {
    layout.check_len(y.len())?;
    layout.check_len(dydt.len())?;
    dydt.fill(0.0);

    let p = &y[layout.pressures()];
    let q = &y[layout.fluxes()];

    for i in 1..layout.cells() {
        dydt[layout.p(i)] = check_finite(continuity(coef, q, i), "continuity right-hand side")?;
    }
    for j in 0..layout.flux_count() {
        dydt[layout.q(j)] = momentum(layout, coef, p, q, j)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipeError;
    use crate::layout::PortVariant;
    use crate::params::PipeParams;
    use gl_core::units::{k, m};
    use gl_fluids::IdealGas;

    fn setup(cells: usize, friction: f64) -> (StateLayout, Coefficients) {
        let params = PipeParams::new(cells, m(100.0), m(0.2), friction, k(300.0)).unwrap();
        let layout = StateLayout::new(cells, PortVariant::Insulated).unwrap();
        (layout, params.coefficients(&IdealGas::air()))
    }

    #[test]
    fn one_sided_stencils_are_exact_for_quadratics() {
        // q(x) = 1 + 2x + 3x², dq/dx = 2 + 6x.
        let dx = 0.1;
        let q: Vec<f64> = (0..5)
            .map(|i| {
                let x = i as f64 * dx;
                1.0 + 2.0 * x + 3.0 * x * x
            })
            .collect();
        let inlet = inlet_advection(&q, dx);
        assert!((inlet - (-2.0 * 2.0)).abs() < 1e-10);

        let x_last = 4.0 * dx;
        let outlet = outlet_advection(&q, dx);
        assert!((outlet - (-2.0 * (2.0 + 6.0 * x_last))).abs() < 1e-10);

        let central = central_advection(q[1], q[3], dx);
        assert!((central - (-2.0 * (2.0 + 6.0 * 2.0 * dx))).abs() < 1e-10);
    }

    #[test]
    fn two_node_stencils_fall_back_to_first_order() {
        let q = [3.0, 1.0];
        assert_eq!(inlet_advection(&q, 0.5), 8.0);
        assert_eq!(outlet_advection(&q, 0.5), 8.0);
    }

    #[test]
    fn uniform_state_is_stationary() {
        let (layout, coef) = setup(10, 0.016);
        let mut y = vec![0.56e6; layout.len()];
        for j in 0..layout.flux_count() {
            y[layout.q(j)] = 0.0;
        }
        let mut dydt = vec![1.0; layout.len()];
        evaluate(&layout, &coef, &y, &mut dydt).unwrap();
        assert!(dydt.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn pressure_gradient_accelerates_downstream() {
        let (layout, coef) = setup(4, 0.016);
        let mut y = vec![0.0; layout.len()];
        for i in 0..layout.pressure_count() {
            y[layout.p(i)] = 6.0e5 - 1.0e4 * i as f64;
        }
        let mut dydt = vec![0.0; layout.len()];
        evaluate(&layout, &coef, &y, &mut dydt).unwrap();
        for j in 0..layout.flux_count() {
            assert!(dydt[layout.q(j)] > 0.0);
        }
    }

    #[test]
    fn friction_opposes_reversed_flow() {
        let (layout, coef) = setup(4, 0.016);
        let mut y = vec![5.0e5; layout.len()];
        for j in 0..layout.flux_count() {
            y[layout.q(j)] = -2.0;
        }
        let p = &y[layout.pressures()];
        let q = &y[layout.fluxes()];
        let dq = momentum(&layout, &coef, p, q, 1).unwrap();
        // Uniform pressure and flux: only friction acts, pushing flow back to zero.
        assert!(dq > 0.0);
        assert!((dq - coef.c2 * 4.0 / 5.0e5).abs() < 1e-9);
    }

    #[test]
    fn nonpositive_pressure_is_reported() {
        let (layout, coef) = setup(3, 0.016);
        let mut y = vec![1.0e5; layout.len()];
        y[layout.p(1)] = -1.0e5;
        y[layout.p(0)] = -1.0e5;
        let mut dydt = vec![0.0; layout.len()];
        let err = evaluate(&layout, &coef, &y, &mut dydt).unwrap_err();
        assert!(matches!(err, PipeError::NonPhysical { .. }));
    }

    #[test]
    fn continuity_differences_neighbouring_fluxes() {
        let (layout, coef) = setup(10, 0.016);
        let q = [2.0, 1.5, 1.0];
        let dp = continuity(&coef, &q, 1);
        assert!((dp - coef.c1 * 0.5 / coef.dx).abs() < 1e-9);
        assert_eq!(layout.cells(), 10);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::layout::PortVariant;
    use crate::params::PipeParams;
    use gl_core::units::{k, m};
    use gl_fluids::IdealGas;
    use proptest::prelude::*;

    proptest! {
        /// The continuity stencil telescopes: interior storage changes only
        /// through the two boundary fluxes.
        #[test]
        fn continuity_telescopes(q in prop::collection::vec(-50.0_f64..50.0, 3..40)) {
            let cells = q.len();
            let params = PipeParams::new(cells, m(100.0), m(0.2), 0.016, k(300.0)).unwrap();
            let coef = params.coefficients(&IdealGas::air());
            let layout = StateLayout::new(cells, PortVariant::Insulated).unwrap();

            let total: f64 = (1..layout.cells()).map(|i| continuity(&coef, &q, i)).sum();
            let expected = coef.c1 * (q[0] - q[cells - 1]) / coef.dx;
            prop_assert!((total - expected).abs() <= 1e-9 * expected.abs().max(coef.c1));
        }
    }
}
