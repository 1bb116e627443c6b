use log::trace;

use crate::angle::wrap_360;

/// [OrientationEvent] as delivered by the device orientation collaborator.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct OrientationEvent {
    /// Rotation around the vertical axis [°], counter clockwise, within [0, 360).
    pub alpha: Option<f64>,
    /// True when `alpha` is referenced to north.
    /// Otherwise it is relative to an arbitrary initial orientation.
    pub absolute: bool,
    /// Heading [°] already referenced to north, when the platform provides it natively.
    pub compass_heading: Option<f64>,
}

impl OrientationEvent {
    /// Builds an absolute (north referenced) [OrientationEvent]
    pub fn absolute(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha),
            absolute: true,
            compass_heading: None,
        }
    }

    /// Builds a relative [OrientationEvent]
    pub fn relative(alpha: f64) -> Self {
        Self {
            alpha: Some(alpha),
            absolute: false,
            compass_heading: None,
        }
    }

    /// Builds an [OrientationEvent] from a native compass heading
    pub fn native(heading_deg: f64) -> Self {
        Self {
            alpha: None,
            absolute: false,
            compass_heading: Some(heading_deg),
        }
    }

    /// Resolves the north referenced heading [°], within [0, 360).
    /// - the native compass heading always prevails
    /// - absolute events convert `alpha` (counter clockwise) to clockwise heading
    /// - relative events carry no north reference and are dropped, so the
    ///   absolute variant of a same physical change is the only one that counts.
    pub fn heading(&self) -> Option<f64> {
        if let Some(heading) = self.compass_heading.filter(|h| h.is_finite()) {
            return Some(wrap_360(heading));
        }

        let alpha = match self.alpha.filter(|a| a.is_finite()) {
            Some(alpha) => alpha,
            None => {
                trace!("orientation event without usable alpha");
                return None;
            },
        };

        if self.absolute {
            Some(wrap_360(360.0 - alpha))
        } else {
            trace!("dropped relative orientation event");
            None
        }
    }
}
