//! Map view and marker collaborators
use std::f64::consts::PI;

use crate::prelude::Duration;

/// Animation timing function
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    /// Slow start, slow end
    #[default]
    EaseInOut,
}

impl Easing {
    /// Evaluates this [Easing] at normalized time `t` within [0, 1].
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => 0.5 - 0.5 * (PI * t).cos(),
        }
    }
}

/// Rotation animation the map view is asked to perform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    /// Final view rotation [rad], within (-π, π]
    pub target_rad: f64,
    /// Animation [Duration]
    pub duration: Duration,
    /// [Easing] to apply
    pub easing: Easing,
}

impl AnimationRequest {
    /// Rotation [rad] at `elapsed` time, starting from `from_rad`,
    /// along the shortest arc.
    pub fn interpolate(&self, from_rad: f64, elapsed: Duration) -> f64 {
        let total = self.duration.to_seconds();
        let t = if total > 0.0 {
            elapsed.to_seconds() / total
        } else {
            1.0
        };
        let delta = crate::angle::shortest_delta_rad(from_rad, self.target_rad);
        from_rad + delta * self.easing.eval(t)
    }
}

/// [MapView] is implemented by the map rendering collaborator.
pub trait MapView {
    /// Current (possibly in flight) view rotation [rad].
    fn rotation(&self) -> f64;

    /// Starts animating the view rotation. A new request supersedes the
    /// pending one. Implementations should follow the shortest arc.
    fn animate_rotation(&mut self, request: AnimationRequest);
}

/// Marker icon variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Plain location dot
    Neutral,
    /// Arrow pointing towards the heading
    Directional,
}

/// [MarkerView] is implemented by the location marker collaborator.
pub trait MarkerView {
    /// Sets the marker icon rotation [rad], clockwise.
    fn set_rotation(&mut self, rotation_rad: f64);

    /// Selects the marker icon variant.
    fn set_style(&mut self, style: MarkerStyle);
}
