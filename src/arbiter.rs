//! Heading source arbitration
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::Config;

/// [HeadingSource] designates the signal the heading is currently derived from.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HeadingSource {
    /// No reliable source: tracking is off or the position fix is too coarse.
    /// The heading freezes at its latest value.
    #[default]
    None,
    /// Course over ground, derived from consecutive satellite fixes.
    /// Trusted when moving with a good fix.
    SatelliteCourse,
    /// Magnetic compass (device orientation).
    /// Trusted when static or slow moving.
    MagneticCompass,
}

impl std::fmt::Display for HeadingSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::SatelliteCourse => write!(f, "course"),
            Self::MagneticCompass => write!(f, "compass"),
        }
    }
}

/// [PositionFix] as delivered by the positioning collaborator.
/// Any field may be missing.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct PositionFix {
    /// Horizontal accuracy [m]
    pub accuracy_m: Option<f64>,
    /// Ground speed [m/s]
    pub speed_m_s: Option<f64>,
    /// Course over ground [°], 0° being north, clockwise
    pub course_deg: Option<f64>,
}

impl PositionFix {
    /// Builds a [PositionFix] where all fields are known.
    pub fn new(accuracy_m: f64, speed_m_s: f64, course_deg: f64) -> Self {
        Self {
            accuracy_m: Some(accuracy_m),
            speed_m_s: Some(speed_m_s),
            course_deg: Some(course_deg),
        }
    }

    /// Copies and returns [PositionFix] without course information.
    pub fn without_course(&self) -> Self {
        let mut s = *self;
        s.course_deg = None;
        s
    }
}

/// Resolves the authoritative [HeadingSource] for this [PositionFix].
/// - no tracking, unknown or poor accuracy: [HeadingSource::None]
/// - known course while moving fast enough: [HeadingSource::SatelliteCourse]
/// - otherwise: [HeadingSource::MagneticCompass]
pub fn arbitrate(cfg: &Config, tracking: bool, fix: &PositionFix) -> HeadingSource {
    if !tracking {
        return HeadingSource::None;
    }

    // NaN accuracy is as good as no accuracy
    match fix.accuracy_m {
        Some(accuracy) if accuracy < cfg.max_accuracy_m => {},
        _ => return HeadingSource::None,
    }

    match (fix.course_deg, fix.speed_m_s) {
        (Some(course), Some(speed)) if course.is_finite() && speed > cfg.min_course_speed_m_s => {
            HeadingSource::SatelliteCourse
        },
        _ => HeadingSource::MagneticCompass,
    }
}

/// [Arbiter] holds the current [HeadingSource].
#[derive(Debug, Default, Clone)]
pub struct Arbiter {
    current: HeadingSource,
}

impl Arbiter {
    /// Current [HeadingSource]
    pub fn current(&self) -> HeadingSource {
        self.current
    }

    /// Runs the arbitration for this new [PositionFix].
    /// Returns the previous [HeadingSource] when it changed.
    pub fn update(
        &mut self,
        cfg: &Config,
        tracking: bool,
        fix: &PositionFix,
    ) -> Option<HeadingSource> {
        let source = arbitrate(cfg, tracking, fix);
        if source == self.current {
            return None;
        }

        debug!(
            "heading source: {} -> {} (accuracy={:?}m speed={:?}m/s)",
            self.current, source, fix.accuracy_m, fix.speed_m_s
        );

        let previous = self.current;
        self.current = source;
        Some(previous)
    }

    /// Back to [HeadingSource::None]
    pub fn reset(&mut self) {
        self.current = HeadingSource::None;
    }
}
