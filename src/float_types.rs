// Re-export parry for the active float size
pub use parry3d_f64 as parry3d;

// Our Real scalar type:
pub type Real = f64;

/// Plane classification tolerance used by the BSP engine.
pub const EPSILON: Real = 1e-8;

use core::str::FromStr;
use std::sync::OnceLock;

/// Lazily-initialized weld tolerance used across the crate.
/// The default can be overridden:
///  1) **Build-time**: set env var `STLBOOL_TOLERANCE` (e.g. `STLBOOL_TOLERANCE=1e-5 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

#[inline]
const fn default_tolerance() -> Real {
    1e-6
}

/// Returns the current weld tolerance.
/// If not set yet, it tries `STLBOOL_TOLERANCE` (parsed as `Real`) and
/// falls back to the default.
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("STLBOOL_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        default_tolerance()
    })
}

/// Set the weld tolerance programmatically once (subsequent calls are ignored).
/// Returns `false` if a value was already in place.
pub fn set_tolerance(value: Real) -> bool {
    TOLERANCE_CELL.set(value.max(Real::EPSILON)).is_ok()
}

/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;
