//! Scenario validation logic.

use crate::schema::{
    BoundaryDef, DriveDef, InitialDef, JunctionDef, PipeDef, PipeEndDef, RunDef, ScenarioFile,
    ScheduleDef,
};
use std::collections::{HashMap, HashSet};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Pipe end {end} bound {count} times, expected once")]
    EndBinding { end: String, count: usize },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

fn require_finite(field: impl Into<String>, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

pub fn validate_scenario(scenario: &ScenarioFile) -> Result<(), ValidationError> {
    if scenario.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.pipes.is_empty() {
        return Err(ValidationError::Unsupported {
            feature: "empty scenario".to_string(),
            reason: "at least one pipe is required".to_string(),
        });
    }

    let mut pipe_ids = HashSet::new();
    for pipe in &scenario.pipes {
        if !pipe_ids.insert(pipe.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: pipe.id.clone(),
                context: "pipes".to_string(),
            });
        }
        validate_pipe(pipe)?;
    }

    let mut bindings: HashMap<&PipeEndDef, usize> = HashMap::new();
    for boundary in &scenario.boundaries {
        validate_boundary(boundary)?;
        check_end(&boundary.at, &pipe_ids, "boundary")?;
        *bindings.entry(&boundary.at).or_default() += 1;
    }

    let mut junction_ids = HashSet::new();
    for junction in &scenario.junctions {
        if !junction_ids.insert(junction.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: junction.id.clone(),
                context: "junctions".to_string(),
            });
        }
        validate_junction(junction)?;
        for end in &junction.ends {
            check_end(end, &pipe_ids, &format!("junction '{}'", junction.id))?;
            *bindings.entry(end).or_default() += 1;
        }
    }

    for pipe in &scenario.pipes {
        for end in [crate::schema::EndDef::Inlet, crate::schema::EndDef::Outlet] {
            let key = PipeEndDef {
                pipe_id: pipe.id.clone(),
                end,
            };
            let count = bindings.get(&key).copied().unwrap_or(0);
            if count != 1 {
                return Err(ValidationError::EndBinding {
                    end: format!("{}.{end:?}", pipe.id),
                    count,
                });
            }
        }
    }

    validate_run(&scenario.run)
}

fn check_end(
    end: &PipeEndDef,
    pipe_ids: &HashSet<&str>,
    context: &str,
) -> Result<(), ValidationError> {
    if pipe_ids.contains(end.pipe_id.as_str()) {
        Ok(())
    } else {
        Err(ValidationError::MissingReference {
            id: end.pipe_id.clone(),
            context: context.to_string(),
        })
    }
}

fn validate_pipe(pipe: &PipeDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("pipe '{}' {name}", pipe.id);
    if pipe.cells == 0 {
        return Err(invalid(field("cells"), 0.0, "must be at least 1"));
    }
    require_positive(field("length_m"), pipe.length_m)?;
    require_positive(field("diameter_m"), pipe.diameter_m)?;
    require_positive(field("temperature_k"), pipe.temperature_k)?;
    if !pipe.friction_factor.is_finite() || pipe.friction_factor < 0.0 {
        return Err(invalid(
            field("friction_factor"),
            pipe.friction_factor,
            "must be finite and non-negative",
        ));
    }
    require_positive(field("scale.area"), pipe.scale.area)?;
    require_positive(field("scale.compressibility"), pipe.scale.compressibility)?;
    require_positive(field("scale.friction"), pipe.scale.friction)?;

    match &pipe.initial {
        InitialDef::Uniform {
            pressure_pa,
            mass_flow_kgps,
        } => {
            require_positive(field("initial.pressure_pa"), *pressure_pa)?;
            require_finite(field("initial.mass_flow_kgps"), *mass_flow_kgps)?;
        }
        InitialDef::Linear {
            p_in_pa,
            p_out_pa,
            mass_flow_kgps,
        } => {
            require_positive(field("initial.p_in_pa"), *p_in_pa)?;
            require_positive(field("initial.p_out_pa"), *p_out_pa)?;
            require_finite(field("initial.mass_flow_kgps"), *mass_flow_kgps)?;
        }
        InitialDef::SteadyState { p_in_pa, p_out_pa } => {
            require_positive(field("initial.p_in_pa"), *p_in_pa)?;
            require_positive(field("initial.p_out_pa"), *p_out_pa)?;
        }
        InitialDef::Explicit {
            pressure_pa,
            mass_flow_kgps,
        } => {
            let faces = pipe.cells + 1;
            let nodes = pipe.cells.max(2);
            if pressure_pa.len() != faces {
                return Err(invalid(
                    field("initial.pressure_pa length"),
                    pressure_pa.len() as f64,
                    &format!("expected {faces}"),
                ));
            }
            if mass_flow_kgps.len() != nodes {
                return Err(invalid(
                    field("initial.mass_flow_kgps length"),
                    mass_flow_kgps.len() as f64,
                    &format!("expected {nodes}"),
                ));
            }
            for p in pressure_pa {
                require_positive(field("initial.pressure_pa"), *p)?;
            }
            for q in mass_flow_kgps {
                require_finite(field("initial.mass_flow_kgps"), *q)?;
            }
        }
    }
    Ok(())
}

fn validate_schedule(schedule: &ScheduleDef, field: &str, positive: bool) -> Result<(), ValidationError> {
    for level in schedule.levels() {
        if positive {
            require_positive(field, level)?;
        } else {
            require_finite(field, level)?;
        }
    }
    match schedule {
        ScheduleDef::Step { at_s, .. } => require_finite(format!("{field} at_s"), *at_s),
        ScheduleDef::Ramp { start_s, end_s, .. } => {
            require_finite(format!("{field} start_s"), *start_s)?;
            require_finite(format!("{field} end_s"), *end_s)?;
            if end_s <= start_s {
                return Err(invalid(
                    format!("{field} end_s"),
                    *end_s,
                    "ramp must end after it starts",
                ));
            }
            Ok(())
        }
        ScheduleDef::Constant { .. } => Ok(()),
    }
}

fn validate_boundary(boundary: &BoundaryDef) -> Result<(), ValidationError> {
    let field = format!("boundary {}.{:?}", boundary.at.pipe_id, boundary.at.end);
    match &boundary.drive {
        DriveDef::Pressure { schedule } => validate_schedule(schedule, &field, true),
        DriveDef::MassFlow { schedule } => validate_schedule(schedule, &field, false),
        DriveDef::Closed => Ok(()),
    }
}

fn validate_junction(junction: &JunctionDef) -> Result<(), ValidationError> {
    if junction.ends.is_empty() {
        return Err(ValidationError::Unsupported {
            feature: format!("junction '{}'", junction.id),
            reason: "a junction needs at least one pipe end".to_string(),
        });
    }
    require_positive(
        format!("junction '{}' initial_pressure_pa", junction.id),
        junction.initial_pressure_pa,
    )
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    require_positive("run.dt_s", run.dt_s)?;
    if !run.t_end_s.is_finite() || run.t_end_s < 0.0 {
        return Err(invalid("run.t_end_s", run.t_end_s, "must be non-negative"));
    }
    if run.record_every == 0 {
        return Err(invalid("run.record_every", 0.0, "must be at least 1"));
    }
    Ok(())
}
