//! Compile a validated scenario into core simulation objects.

use crate::schema::{
    DriveDef, EndDef, InitialDef, IntegratorDef, PipeDef, PipeEndDef, PortVariantDef, RunDef,
    ScenarioFile, ScheduleDef,
};
use crate::validate::{ValidationError, validate_scenario};
use crate::{ProjectError, ProjectResult};
use gl_core::PipeId;
use gl_core::units::{k, m};
use gl_pipe::{End, InitialProfile, PipeParams, PipeSegment, PortVariant, ScaleFactors};
use gl_sim::{
    BoundarySchedule, IntegratorType, NetworkBuilder, PipeEnd, PipeNetwork, PipeSchedules,
    PipeTransient, Schedule, SimOptions,
};
use std::collections::HashMap;

fn end_of(def: EndDef) -> End {
    match def {
        EndDef::Inlet => End::Inlet,
        EndDef::Outlet => End::Outlet,
    }
}

fn schedule_of(def: &ScheduleDef) -> Schedule {
    match *def {
        ScheduleDef::Constant { value } => Schedule::Constant(value),
        ScheduleDef::Step {
            at_s,
            before,
            after,
        } => Schedule::Step {
            at: at_s,
            before,
            after,
        },
        ScheduleDef::Ramp {
            start_s,
            end_s,
            from,
            to,
        } => Schedule::Ramp {
            start: start_s,
            end: end_s,
            from,
            to,
        },
    }
}

fn boundary_schedule(def: &DriveDef) -> BoundarySchedule {
    match def {
        DriveDef::Pressure { schedule } => BoundarySchedule::pressure(schedule_of(schedule)),
        DriveDef::MassFlow { schedule } => BoundarySchedule::mass_flow(schedule_of(schedule)),
        DriveDef::Closed => BoundarySchedule::closed(),
    }
}

/// Discretize one pipe definition.
pub fn build_segment(def: &PipeDef) -> ProjectResult<PipeSegment> {
    let scale = ScaleFactors::new(def.scale.area, def.scale.compressibility, def.scale.friction);
    let params = PipeParams::new(
        def.cells,
        m(def.length_m),
        m(def.diameter_m),
        def.friction_factor,
        k(def.temperature_k),
    )?
    .with_scale(scale)?;

    let variant = match def.port_variant {
        PortVariantDef::Insulated => PortVariant::Insulated,
        PortVariantDef::Compressible => PortVariant::Compressible,
    };
    let profile = match &def.initial {
        InitialDef::Uniform {
            pressure_pa,
            mass_flow_kgps,
        } => InitialProfile::Uniform {
            pressure: *pressure_pa,
            mass_flow: *mass_flow_kgps,
        },
        InitialDef::Linear {
            p_in_pa,
            p_out_pa,
            mass_flow_kgps,
        } => InitialProfile::Linear {
            p_in: *p_in_pa,
            p_out: *p_out_pa,
            mass_flow: *mass_flow_kgps,
        },
        InitialDef::SteadyState { p_in_pa, p_out_pa } => InitialProfile::SteadyState {
            p_in: *p_in_pa,
            p_out: *p_out_pa,
        },
        InitialDef::Explicit {
            pressure_pa,
            mass_flow_kgps,
        } => InitialProfile::Explicit {
            pressure: pressure_pa.clone(),
            mass_flow: mass_flow_kgps.clone(),
        },
    };

    Ok(PipeSegment::new(def.id.clone(), params, variant, &profile)?)
}

/// Network compiled from a scenario, with the scenario's pipe ids.
#[derive(Debug, Clone)]
pub struct CompiledNetwork {
    pub network: PipeNetwork,
    pub pipe_ids: HashMap<String, PipeId>,
}

/// Compile every pipe, boundary and junction into a `PipeNetwork`.
///
/// Boundary schedules are sampled at `t = 0`.
pub fn compile_network(scenario: &ScenarioFile) -> ProjectResult<CompiledNetwork> {
    validate_scenario(scenario)?;

    let mut builder = NetworkBuilder::new();
    let mut pipe_ids = HashMap::new();
    for def in &scenario.pipes {
        let id = builder.add_pipe(build_segment(def)?);
        pipe_ids.insert(def.id.clone(), id);
    }

    let resolve = |end: &PipeEndDef| -> ProjectResult<PipeEnd> {
        let pipe = pipe_ids
            .get(&end.pipe_id)
            .copied()
            .ok_or_else(|| ValidationError::MissingReference {
                id: end.pipe_id.clone(),
                context: "compile".to_string(),
            })?;
        Ok(PipeEnd {
            pipe,
            end: end_of(end.end),
        })
    };

    for boundary in &scenario.boundaries {
        let drive = boundary_schedule(&boundary.drive).drive(0.0);
        builder.add_boundary(resolve(&boundary.at)?, drive);
    }
    for junction in &scenario.junctions {
        let ends = junction
            .ends
            .iter()
            .map(resolve)
            .collect::<ProjectResult<Vec<_>>>()?;
        builder.add_junction(junction.id.clone(), ends, junction.initial_pressure_pa);
    }

    let network = builder.build()?;
    tracing::info!(scenario = %scenario.name, pipes = pipe_ids.len(), "compiled network");
    Ok(CompiledNetwork { network, pipe_ids })
}

/// Compile a single-pipe scenario into a transient model.
///
/// Transient runs are limited to one pipe with both ends on boundaries;
/// junctions add algebraic constraints the explicit integrators cannot carry.
pub fn compile_transient(scenario: &ScenarioFile) -> ProjectResult<PipeTransient> {
    validate_scenario(scenario)?;
    let [pipe] = scenario.pipes.as_slice() else {
        return Err(unsupported_transient("exactly one pipe is required"));
    };
    if !scenario.junctions.is_empty() {
        return Err(unsupported_transient("junctions are not supported"));
    }

    let schedule_at = |end: EndDef| {
        scenario
            .boundaries
            .iter()
            .find(|b| b.at.end == end)
            .map(|b| boundary_schedule(&b.drive))
            .ok_or_else(|| unsupported_transient("both pipe ends need a boundary"))
    };
    let ports = PipeSchedules {
        inlet: schedule_at(EndDef::Inlet)?,
        outlet: schedule_at(EndDef::Outlet)?,
    };

    let model = PipeTransient::new(build_segment(pipe)?, ports)?;
    tracing::info!(scenario = %scenario.name, pipe = %pipe.id, "compiled transient model");
    Ok(model)
}

fn unsupported_transient(reason: &str) -> ProjectError {
    ValidationError::Unsupported {
        feature: "transient run".to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Integrator options from the scenario's run section.
pub fn sim_options(run: &RunDef) -> SimOptions {
    SimOptions {
        dt: run.dt_s,
        t_end: run.t_end_s,
        record_every: run.record_every,
        integrator: match run.integrator {
            IntegratorDef::Rk4 => IntegratorType::RK4,
            IntegratorDef::ForwardEuler => IntegratorType::ForwardEuler,
        },
        ..SimOptions::default()
    }
}
