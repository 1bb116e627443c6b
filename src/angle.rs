//! Angle wrapping helpers
use std::f64::consts::{PI, TAU};

/// Folds an angle expressed in degrees into [0, 360).
pub fn wrap_360(deg: f64) -> f64 {
    ((deg % 360.0) + 360.0) % 360.0
}

/// Folds an angle expressed in degrees into (-180, 180].
pub fn wrap_180(deg: f64) -> f64 {
    let wrapped = wrap_360(deg);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Folds an angle expressed in radians into (-π, π].
pub fn wrap_pi(rad: f64) -> f64 {
    let wrapped = ((rad % TAU) + TAU) % TAU;
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Shortest signed rotation (degrees) that brings `from` onto `to`.
pub fn shortest_delta_deg(from: f64, to: f64) -> f64 {
    wrap_180(to - from)
}

/// Shortest signed rotation (radians) that brings `from` onto `to`.
pub fn shortest_delta_rad(from: f64, to: f64) -> f64 {
    wrap_pi(to - from)
}
