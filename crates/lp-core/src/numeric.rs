use crate::LpError;

/// Floating point type used throughout the engine
pub type Real = f64;

/// Elevation value TUFLOW-style result files write to mean "no data".
pub const ELEVATION_SENTINEL: Real = -99999.0;

/// Convert a raw elevation into an optional one.
///
/// The `-99999` sentinel and non-finite values both map to `None` so that
/// downstream code never does arithmetic on a sentinel by accident.
pub fn elevation(raw: Real) -> Option<Real> {
    if raw.is_finite() && raw != ELEVATION_SENTINEL {
        Some(raw)
    } else {
        None
    }
}

/// Linear interpolation between `a` and `b` at parameter `t` in [0, 1].
pub fn lerp(a: Real, b: Real, t: Real) -> Real {
    a + (b - a) * t
}

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-9,
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

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, LpError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(LpError::NonFinite { what, value: v })
    }
}
