//! Transient model of a single pipe driven by time-dependent port schedules.

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use gl_pipe::{PipeSegment, PortDrive, PortDrives, PortSource};

/// Scalar value as a function of time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Schedule {
    Constant(f64),
    /// `before` until `at`, `after` from `at` on.
    Step { at: f64, before: f64, after: f64 },
    /// Linear from `from` at `start` to `to` at `end`, constant outside.
    Ramp {
        start: f64,
        end: f64,
        from: f64,
        to: f64,
    },
}

impl Schedule {
    pub fn value(&self, t: f64) -> f64 {
        match *self {
            Schedule::Constant(v) => v,
            Schedule::Step { at, before, after } => {
                if t < at {
                    before
                } else {
                    after
                }
            }
            Schedule::Ramp {
                start,
                end,
                from,
                to,
            } => {
                if t <= start {
                    from
                } else if t >= end {
                    to
                } else {
                    from + (to - from) * (t - start) / (end - start)
                }
            }
        }
    }

    fn values(&self) -> [f64; 2] {
        match *self {
            Schedule::Constant(v) => [v, v],
            Schedule::Step { before, after, .. } => [before, after],
            Schedule::Ramp { from, to, .. } => [from, to],
        }
    }
}

/// Which port quantity a schedule imposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveKind {
    Pressure,
    MassFlow,
}

/// Time-dependent drive at one pipe end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundarySchedule {
    pub kind: DriveKind,
    pub schedule: Schedule,
}

impl BoundarySchedule {
    pub fn pressure(schedule: Schedule) -> Self {
        Self {
            kind: DriveKind::Pressure,
            schedule,
        }
    }

    pub fn mass_flow(schedule: Schedule) -> Self {
        Self {
            kind: DriveKind::MassFlow,
            schedule,
        }
    }

    pub fn closed() -> Self {
        Self::mass_flow(Schedule::Constant(0.0))
    }

    pub fn drive(&self, t: f64) -> PortDrive {
        let value = self.schedule.value(t);
        match self.kind {
            DriveKind::Pressure => PortDrive::Pressure(value),
            DriveKind::MassFlow => PortDrive::MassFlow(value),
        }
    }

    /// Reject schedules that can never produce a valid drive.
    pub fn validate(&self) -> SimResult<()> {
        let values = self.schedule.values();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SimError::InvalidArg {
                what: "boundary schedule values must be finite",
            });
        }
        if self.kind == DriveKind::Pressure && values.iter().any(|v| *v <= 0.0) {
            return Err(SimError::InvalidArg {
                what: "boundary pressure must be positive",
            });
        }
        if let Schedule::Ramp { start, end, .. } = self.schedule
            && (!start.is_finite() || !end.is_finite() || end <= start)
        {
            return Err(SimError::InvalidArg {
                what: "ramp must end after it starts",
            });
        }
        Ok(())
    }
}

/// Schedules at both ends of a pipe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeSchedules {
    pub inlet: BoundarySchedule,
    pub outlet: BoundarySchedule,
}

impl PortSource for PipeSchedules {
    fn drives(&self, t: f64) -> PortDrives {
        PortDrives::new(self.inlet.drive(t), self.outlet.drive(t))
    }
}

/// A pipe segment integrated as an ODE in its differential unknowns.
#[derive(Debug, Clone)]
pub struct PipeTransient {
    segment: PipeSegment,
    ports: PipeSchedules,
}

impl PipeTransient {
    pub fn new(segment: PipeSegment, ports: PipeSchedules) -> SimResult<Self> {
        ports.inlet.validate()?;
        ports.outlet.validate()?;
        Ok(Self { segment, ports })
    }

    pub fn segment(&self) -> &PipeSegment {
        &self.segment
    }

    pub fn ports(&self) -> &PipeSchedules {
        &self.ports
    }

    /// Gas mass held by the pipe's interior control volumes [kg].
    pub fn mass_inventory(&self, x: &[f64]) -> f64 {
        self.segment.mass_inventory(x)
    }
}

impl TransientModel for PipeTransient {
    type State = Vec<f64>;

    fn initial_state(&self) -> Vec<f64> {
        self.segment.initial_state()
    }

    fn rhs(&mut self, t: f64, x: &Vec<f64>) -> SimResult<Vec<f64>> {
        Ok(self.segment.rhs(t, x, &self.ports)?)
    }

    fn add(&self, a: &Vec<f64>, b: &Vec<f64>) -> Vec<f64> {
        a.iter().zip(b).map(|(x, y)| x + y).collect()
    }

    fn scale(&self, a: &Vec<f64>, scale: f64) -> Vec<f64> {
        a.iter().map(|x| x * scale).collect()
    }

    fn project(&mut self, t: f64, mut x: Vec<f64>) -> SimResult<Vec<f64>> {
        self.segment.project(&mut x, self.ports.drives(t))?;
        Ok(x)
    }
}
