//! Transient runs of a single pipe.

use gl_core::numeric::{Tolerances, nearly_equal};
use gl_core::units::{k, m};
use gl_pipe::{InitialProfile, PipeParams, PipeSegment, PortVariant, quasi_steady_mass_flow};
use gl_sim::{
    BoundarySchedule, IntegratorType, PipeSchedules, PipeTransient, Schedule, SimOptions, run_sim,
};

fn segment(profile: InitialProfile) -> PipeSegment {
    let params = PipeParams::new(10, m(100.0), m(0.2), 0.016, k(300.0)).unwrap();
    PipeSegment::new("pipe", params, PortVariant::Insulated, &profile).unwrap()
}

fn pressures(p_in: f64, p_out: f64) -> PipeSchedules {
    PipeSchedules {
        inlet: BoundarySchedule::pressure(Schedule::Constant(p_in)),
        outlet: BoundarySchedule::pressure(Schedule::Constant(p_out)),
    }
}

#[test]
fn closed_pipe_conserves_mass() {
    let seg = segment(InitialProfile::Linear {
        p_in: 0.56e6,
        p_out: 0.5e6,
        mass_flow: 0.0,
    });
    let closed = PipeSchedules {
        inlet: BoundarySchedule::closed(),
        outlet: BoundarySchedule::closed(),
    };
    let mut model = PipeTransient::new(seg, closed).unwrap();
    let opts = SimOptions {
        dt: 0.01,
        t_end: 5.0,
        record_every: 50,
        ..SimOptions::default()
    };
    let record = run_sim(&mut model, &opts).unwrap();

    let m0 = model.mass_inventory(&record.x[0]);
    let tol = Tolerances {
        abs: 0.0,
        rel: 1e-9,
    };
    for x in &record.x {
        let m = model.mass_inventory(x);
        assert!(nearly_equal(m, m0, tol), "inventory drifted to {m}");
    }
    let (_, last) = record.last().unwrap();
    let layout = model.segment().layout();
    assert!(last[layout.q(0)].abs() < 1e-15);
    assert!(last[layout.q(9)].abs() < 1e-15);
}

#[test]
fn integration_settles_on_closed_form_flow() {
    let (p_in, p_out) = (0.56e6, 0.558e6);
    let seg = segment(InitialProfile::Linear {
        p_in,
        p_out,
        mass_flow: 0.0,
    });
    let expected = quasi_steady_mass_flow(seg.coefficients(), 100.0, p_in, p_out).unwrap();
    let mut model = PipeTransient::new(seg, pressures(p_in, p_out)).unwrap();
    let opts = SimOptions {
        dt: 0.01,
        t_end: 40.0,
        record_every: 1000,
        ..SimOptions::default()
    };
    let record = run_sim(&mut model, &opts).unwrap();

    let (t, last) = record.last().unwrap();
    assert!((t - 40.0).abs() < 1e-9);
    for q in model.segment().fluxes(last) {
        assert!(
            ((q - expected) / expected).abs() < 2e-3,
            "flux {q} vs closed form {expected}"
        );
    }
}

#[test]
fn equal_port_pressures_stay_at_rest() {
    let seg = segment(InitialProfile::Uniform {
        pressure: 0.56e6,
        mass_flow: 0.0,
    });
    let mut model = PipeTransient::new(seg, pressures(0.56e6, 0.56e6)).unwrap();
    let opts = SimOptions {
        dt: 0.01,
        t_end: 1.0,
        integrator: IntegratorType::ForwardEuler,
        ..SimOptions::default()
    };
    let record = run_sim(&mut model, &opts).unwrap();
    let (_, last) = record.last().unwrap();
    let seg = model.segment();
    assert!(seg.fluxes(last).iter().all(|q| q.abs() < 1e-9));
    assert!(seg.pressures(last).iter().all(|p| (p - 0.56e6).abs() < 1e-6));
}

#[test]
fn inlet_pressure_step_fills_a_dead_end_pipe() {
    let seg = segment(InitialProfile::Uniform {
        pressure: 0.5e6,
        mass_flow: 0.0,
    });
    let ports = PipeSchedules {
        inlet: BoundarySchedule::pressure(Schedule::Step {
            at: 0.5,
            before: 0.5e6,
            after: 0.56e6,
        }),
        outlet: BoundarySchedule::closed(),
    };
    let mut model = PipeTransient::new(seg, ports).unwrap();
    let opts = SimOptions {
        dt: 0.01,
        t_end: 3.0,
        record_every: 10,
        ..SimOptions::default()
    };
    let record = run_sim(&mut model, &opts).unwrap();

    let m0 = model.mass_inventory(&record.x[0]);
    // Nothing moves before the step.
    let before = model.mass_inventory(&record.x[4]);
    assert!((before - m0).abs() < 1e-9 * m0);
    let (_, last) = record.last().unwrap();
    assert!(model.mass_inventory(last) > m0);
    assert_eq!(model.segment().pressures(last)[0], 0.56e6);
}
