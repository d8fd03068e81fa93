//! Static pipe parameters and the coefficients derived from them.

use crate::error::{PipeError, PipeResult};
use gl_core::numeric::ensure_positive;
use gl_core::units::{Length, Temperature};
use gl_fluids::IdealGas;

/// Calibration multipliers `λ1, λ2, λ3` on `A`, `c1` and `c2`.
///
/// They change coefficient values only; grid layout and equation structure
/// are unaffected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    /// λ1, multiplies the flow area `A`.
    pub area: f64,
    /// λ2, multiplies `c1 = R_g·T/A`.
    pub compressibility: f64,
    /// λ3, multiplies `c2 = c1·f/(2D)`.
    pub friction: f64,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            area: 1.0,
            compressibility: 1.0,
            friction: 1.0,
        }
    }
}

impl ScaleFactors {
    pub fn new(area: f64, compressibility: f64, friction: f64) -> Self {
        Self {
            area,
            compressibility,
            friction,
        }
    }

    fn validate(&self) -> PipeResult<()> {
        ensure_positive(self.area, "scale factor for area must be positive")?;
        ensure_positive(
            self.compressibility,
            "scale factor for c1 must be positive",
        )?;
        ensure_positive(self.friction, "scale factor for c2 must be positive")?;
        Ok(())
    }
}

/// Geometry, friction and temperature of one pipe.
#[derive(Debug, Clone, PartialEq)]
pub struct PipeParams {
    /// Number of control volumes `n`
    pub cells: usize,
    /// Pipe length `L`
    pub length: Length,
    /// Inner diameter `D`
    pub diameter: Length,
    /// Darcy friction factor `f`
    pub friction_factor: f64,
    /// Uniform gas temperature `T`
    pub temperature: Temperature,
    pub scale: ScaleFactors,
}

impl PipeParams {
    /// Validated parameters with unit scale factors.
    pub fn new(
        cells: usize,
        length: Length,
        diameter: Length,
        friction_factor: f64,
        temperature: Temperature,
    ) -> PipeResult<Self> {
        let params = Self {
            cells,
            length,
            diameter,
            friction_factor,
            temperature,
            scale: ScaleFactors::default(),
        };
        params.validate()?;
        Ok(params)
    }

    /// Replace the calibration scale factors.
    pub fn with_scale(mut self, scale: ScaleFactors) -> PipeResult<Self> {
        self.scale = scale;
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> PipeResult<()> {
        if self.cells == 0 {
            return Err(PipeError::InvalidArg {
                what: "cell count must be at least 1",
            });
        }
        ensure_positive(self.length.value, "length must be positive")?;
        ensure_positive(self.diameter.value, "diameter must be positive")?;
        ensure_positive(self.temperature.value, "temperature must be positive")?;
        if !self.friction_factor.is_finite() || self.friction_factor < 0.0 {
            return Err(PipeError::InvalidArg {
                what: "friction factor must be finite and non-negative",
            });
        }
        self.scale.validate()
    }

    /// Derive the discretization coefficients for this pipe.
    pub fn coefficients(&self, gas: &IdealGas) -> Coefficients {
        Coefficients::new(self, gas)
    }
}

/// Coefficients that appear in the discretized equations.
///
/// `area`, `c1` and `c2` already include the scale factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// `R_g·T` [m²/s²]
    pub rt: f64,
    /// Effective flow area `λ1·A` [m²]
    pub area: f64,
    /// `λ2·R_g·T/A`
    pub c1: f64,
    /// `λ3·c1·f/(2D)` with the unscaled `c1`
    pub c2: f64,
    /// Cell length `L/n` [m]
    pub dx: f64,
}

impl Coefficients {
    fn new(params: &PipeParams, gas: &IdealGas) -> Self {
        let d = params.diameter.value;
        let area = std::f64::consts::PI * d * d / 4.0;
        let rt = gas.rt(params.temperature);
        let c1 = rt / area;
        let c2 = c1 * params.friction_factor / (2.0 * d);
        Self {
            rt,
            area: params.scale.area * area,
            c1: params.scale.compressibility * c1,
            c2: params.scale.friction * c2,
            dx: params.length.value / params.cells as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::units::{k, m};

    fn reference() -> PipeParams {
        PipeParams::new(10, m(100.0), m(0.2), 0.016, k(300.0)).unwrap()
    }

    #[test]
    fn coefficients_match_closed_forms() {
        let coef = reference().coefficients(&IdealGas::air());
        let area = std::f64::consts::PI * 0.04 / 4.0;
        assert!((coef.area - area).abs() < 1e-15);
        assert!((coef.c1 - 287.11 * 300.0 / area).abs() < 1e-6);
        assert!((coef.c2 - coef.c1 * 0.016 / 0.4).abs() < 1e-6);
        assert!((coef.dx - 10.0).abs() < 1e-12);
    }

    #[test]
    fn scale_factors_apply_independently() {
        let base = reference().coefficients(&IdealGas::air());
        let scaled = reference()
            .with_scale(ScaleFactors::new(2.0, 3.0, 5.0))
            .unwrap()
            .coefficients(&IdealGas::air());
        assert!((scaled.area - 2.0 * base.area).abs() < 1e-12);
        assert!((scaled.c1 - 3.0 * base.c1).abs() < 1e-6);
        assert!((scaled.c2 - 5.0 * base.c2).abs() < 1e-6);
        assert_eq!(scaled.dx, base.dx);
    }

    #[test]
    fn rejects_zero_cells() {
        let err = PipeParams::new(0, m(100.0), m(0.2), 0.016, k(300.0)).unwrap_err();
        assert!(matches!(err, PipeError::InvalidArg { .. }));
    }

    #[test]
    fn rejects_nonpositive_geometry() {
        assert!(PipeParams::new(10, m(0.0), m(0.2), 0.016, k(300.0)).is_err());
        assert!(PipeParams::new(10, m(100.0), m(-0.2), 0.016, k(300.0)).is_err());
        assert!(PipeParams::new(10, m(100.0), m(0.2), -0.1, k(300.0)).is_err());
        assert!(PipeParams::new(10, m(100.0), m(0.2), 0.016, k(0.0)).is_err());
    }

    #[test]
    fn rejects_nonpositive_scale() {
        let err = reference()
            .with_scale(ScaleFactors::new(1.0, 0.0, 1.0))
            .unwrap_err();
        assert!(matches!(err, PipeError::InvalidArg { .. }));
    }
}
