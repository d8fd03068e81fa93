//! Scenario file schema definitions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub pipes: Vec<PipeDef>,
    #[serde(default)]
    pub boundaries: Vec<BoundaryDef>,
    #[serde(default)]
    pub junctions: Vec<JunctionDef>,
    #[serde(default)]
    pub run: RunDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipeDef {
    pub id: String,
    pub cells: usize,
    pub length_m: f64,
    pub diameter_m: f64,
    pub friction_factor: f64,
    pub temperature_k: f64,
    #[serde(default)]
    pub scale: ScaleDef,
    #[serde(default)]
    pub port_variant: PortVariantDef,
    pub initial: InitialDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScaleDef {
    #[serde(default = "unit_scale")]
    pub area: f64,
    #[serde(default = "unit_scale")]
    pub compressibility: f64,
    #[serde(default = "unit_scale")]
    pub friction: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Default for ScaleDef {
    fn default() -> Self {
        Self {
            area: 1.0,
            compressibility: 1.0,
            friction: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PortVariantDef {
    #[default]
    Insulated,
    Compressible,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum InitialDef {
    Uniform {
        pressure_pa: f64,
        #[serde(default)]
        mass_flow_kgps: f64,
    },
    Linear {
        p_in_pa: f64,
        p_out_pa: f64,
        #[serde(default)]
        mass_flow_kgps: f64,
    },
    SteadyState {
        p_in_pa: f64,
        p_out_pa: f64,
    },
    Explicit {
        pressure_pa: Vec<f64>,
        mass_flow_kgps: Vec<f64>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EndDef {
    Inlet,
    Outlet,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PipeEndDef {
    pub pipe_id: String,
    pub end: EndDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoundaryDef {
    pub at: PipeEndDef,
    pub drive: DriveDef,
}

/// What a boundary imposes; values follow the port sign convention
/// (mass flow positive into the pipe).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum DriveDef {
    Pressure { schedule: ScheduleDef },
    MassFlow { schedule: ScheduleDef },
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ScheduleDef {
    Constant {
        value: f64,
    },
    Step {
        at_s: f64,
        before: f64,
        after: f64,
    },
    Ramp {
        start_s: f64,
        end_s: f64,
        from: f64,
        to: f64,
    },
}

impl ScheduleDef {
    /// All values the schedule can take at its breakpoints.
    pub fn levels(&self) -> Vec<f64> {
        match self {
            ScheduleDef::Constant { value } => vec![*value],
            ScheduleDef::Step { before, after, .. } => vec![*before, *after],
            ScheduleDef::Ramp { from, to, .. } => vec![*from, *to],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JunctionDef {
    pub id: String,
    pub ends: Vec<PipeEndDef>,
    pub initial_pressure_pa: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IntegratorDef {
    #[default]
    Rk4,
    ForwardEuler,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default = "default_dt")]
    pub dt_s: f64,
    #[serde(default = "default_t_end")]
    pub t_end_s: f64,
    #[serde(default = "default_record_every")]
    pub record_every: usize,
    #[serde(default)]
    pub integrator: IntegratorDef,
}

fn default_dt() -> f64 {
    0.01
}

fn default_t_end() -> f64 {
    10.0
}

fn default_record_every() -> usize {
    10
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            dt_s: default_dt(),
            t_end_s: default_t_end(),
            record_every: default_record_every(),
            integrator: IntegratorDef::default(),
        }
    }
}
