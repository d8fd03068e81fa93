use crate::GlError;

/// Floating point type used throughout system
pub type Real = f64;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

/// |a - b| / max(|b|, floor). `b` is the reference value.
pub fn relative_error(a: Real, b: Real, floor: Real) -> Real {
    (a - b).abs() / b.abs().max(floor)
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, GlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(GlError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive, otherwise `InvalidArg`.
pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, GlError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(GlError::InvalidArg { what })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_positive_rejects_zero_and_negative() {
        assert!(ensure_positive(0.0, "length").is_err());
        assert!(ensure_positive(-1.0, "length").is_err());
        assert!(ensure_positive(Real::INFINITY, "length").is_err());
        assert_eq!(ensure_positive(2.5, "length").unwrap(), 2.5);
    }

    #[test]
    fn relative_error_uses_floor_near_zero() {
        assert_eq!(relative_error(1e-12, 0.0, 1.0), 1e-12);
        assert!((relative_error(1.01, 1.0, 1e-12) - 0.01).abs() < 1e-12);
    }
}
