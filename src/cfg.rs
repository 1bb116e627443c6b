use log::warn;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::{Duration, Error};

use std::f64::consts::PI;

fn default_satellite_window() -> usize {
    6
}

fn default_compass_window() -> usize {
    10
}

fn default_max_accuracy() -> f64 {
    20.0
}

fn default_min_course_speed() -> f64 {
    0.5
}

fn default_publish_interval() -> f64 {
    33.0
}

fn default_compass_interval() -> f64 {
    80.0
}

fn default_hysteresis() -> f64 {
    0.087
}

fn default_animation() -> f64 {
    250.0
}

fn default_reset_animation() -> f64 {
    500.0
}

fn default_upright_epsilon() -> f64 {
    1.0E-3
}

/// Map view rotation behavior
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RotationOpts {
    /// Minimal view rotation change (in radians) before we animate.
    /// The default value (~5°) hides compass noise.
    #[cfg_attr(feature = "serde", serde(default = "default_hysteresis"))]
    pub hysteresis_rad: f64,
    /// Heading-up animation duration [ms]
    #[cfg_attr(feature = "serde", serde(default = "default_animation"))]
    pub animation_ms: f64,
    /// Duration [ms] of the animation that brings the view back north-up
    #[cfg_attr(feature = "serde", serde(default = "default_reset_animation"))]
    pub reset_animation_ms: f64,
    /// Residual rotation [rad] below which the view is considered north-up already
    #[cfg_attr(feature = "serde", serde(default = "default_upright_epsilon"))]
    pub upright_epsilon_rad: f64,
}

impl Default for RotationOpts {
    fn default() -> Self {
        Self {
            hysteresis_rad: default_hysteresis(),
            animation_ms: default_animation(),
            reset_animation_ms: default_reset_animation(),
            upright_epsilon_rad: default_upright_epsilon(),
        }
    }
}

impl RotationOpts {
    /// Heading-up animation [Duration]
    pub fn animation(&self) -> Duration {
        Duration::from_milliseconds(self.animation_ms)
    }

    /// North-up animation [Duration]
    pub fn reset_animation(&self) -> Duration {
        Duration::from_milliseconds(self.reset_animation_ms)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Number of course samples averaged on the satellite path.
    #[cfg_attr(feature = "serde", serde(default = "default_satellite_window"))]
    pub satellite_window: usize,
    /// Number of orientation samples averaged on the compass path.
    /// Compass readings are noisier than course, hence a longer window.
    #[cfg_attr(feature = "serde", serde(default = "default_compass_window"))]
    pub compass_window: usize,
    /// Fixes with an accuracy [m] equal or worse than this freeze the heading.
    #[cfg_attr(feature = "serde", serde(default = "default_max_accuracy"))]
    pub max_accuracy_m: f64,
    /// Minimal speed [m/s] for the course over ground to be trusted.
    #[cfg_attr(feature = "serde", serde(default = "default_min_course_speed"))]
    pub min_course_speed_m_s: f64,
    /// Minimal interval [ms] between two published headings, whatever the source.
    #[cfg_attr(feature = "serde", serde(default = "default_publish_interval"))]
    pub publish_interval_ms: f64,
    /// Minimal interval [ms] between two orientation samples we consider.
    #[cfg_attr(feature = "serde", serde(default = "default_compass_interval"))]
    pub compass_interval_ms: f64,
    /// Clears the smoothing window of a source when it stops being authoritative.
    /// When false, its content is kept until tracking stops.
    #[cfg_attr(feature = "serde", serde(default))]
    pub clear_on_source_switch: bool,
    /// Map view [RotationOpts]
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: RotationOpts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            satellite_window: default_satellite_window(),
            compass_window: default_compass_window(),
            max_accuracy_m: default_max_accuracy(),
            min_course_speed_m_s: default_min_course_speed(),
            publish_interval_ms: default_publish_interval(),
            compass_interval_ms: default_compass_interval(),
            clear_on_source_switch: false,
            rotation: RotationOpts::default(),
        }
    }
}

impl Config {
    /// Global publication [Duration] floor
    pub fn publish_interval(&self) -> Duration {
        Duration::from_milliseconds(self.publish_interval_ms)
    }

    /// Orientation pre-filter [Duration]
    pub fn compass_interval(&self) -> Duration {
        Duration::from_milliseconds(self.compass_interval_ms)
    }

    /// Copies and returns [Config] with updated smoothing windows.
    pub fn with_windows(&self, satellite: usize, compass: usize) -> Self {
        let mut s = self.clone();
        s.satellite_window = satellite;
        s.compass_window = compass;
        s
    }

    /// Copies and returns [Config] with updated rate limiting intervals [ms].
    pub fn with_intervals(&self, publish_ms: f64, compass_ms: f64) -> Self {
        let mut s = self.clone();
        s.publish_interval_ms = publish_ms;
        s.compass_interval_ms = compass_ms;
        s
    }

    /// Copies and returns [Config] with source switch clearing enabled or not.
    pub fn with_source_switch_clearing(&self, enabled: bool) -> Self {
        let mut s = self.clone();
        s.clear_on_source_switch = enabled;
        s
    }

    /// Copies and returns [Config] with updated [RotationOpts].
    pub fn with_rotation(&self, rotation: RotationOpts) -> Self {
        let mut s = self.clone();
        s.rotation = rotation;
        s
    }

    /// Verifies this [Config] is physically meaningful.
    pub fn validate(&self) -> Result<(), Error> {
        let err = if self.satellite_window == 0 || self.compass_window == 0 {
            Some(Error::NullWindow)
        } else if !(self.max_accuracy_m.is_finite() && self.max_accuracy_m > 0.0) {
            Some(Error::InvalidAccuracyThreshold(self.max_accuracy_m))
        } else if !(self.min_course_speed_m_s.is_finite() && self.min_course_speed_m_s >= 0.0) {
            Some(Error::InvalidSpeedThreshold(self.min_course_speed_m_s))
        } else if !(self.publish_interval_ms.is_finite() && self.publish_interval_ms >= 0.0) {
            Some(Error::InvalidInterval(self.publish_interval_ms))
        } else if !(self.compass_interval_ms.is_finite() && self.compass_interval_ms >= 0.0) {
            Some(Error::InvalidInterval(self.compass_interval_ms))
        } else {
            self.rotation.validate().err()
        };

        match err {
            Some(e) => {
                warn!("rejected configuration: {}", e);
                Err(e)
            },
            None => Ok(()),
        }
    }
}

impl RotationOpts {
    fn validate(&self) -> Result<(), Error> {
        let hysteresis = self.hysteresis_rad;
        if !(hysteresis.is_finite() && (0.0..PI).contains(&hysteresis)) {
            return Err(Error::InvalidHysteresis(hysteresis));
        }
        for duration in [self.animation_ms, self.reset_animation_ms] {
            if !(duration.is_finite() && duration >= 0.0) {
                return Err(Error::InvalidAnimationDuration(duration));
            }
        }
        if !(self.upright_epsilon_rad.is_finite() && self.upright_epsilon_rad >= 0.0) {
            return Err(Error::InvalidHysteresis(self.upright_epsilon_rad));
        }
        Ok(())
    }
}
