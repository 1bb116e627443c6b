use log::trace;

use crate::prelude::{Change, HeadingObserver, MarkerStyle, MarkerView, Snapshot};

/// [MarkerController] orients the location marker icon along the heading.
/// Unlike the map view, the icon is rotated immediately on every heading
/// change, without hysteresis nor animation.
pub struct MarkerController<M: MarkerView> {
    marker: M,
    style: Option<MarkerStyle>,
    applied: Option<f64>,
}

impl<M: MarkerView> MarkerController<M> {
    pub fn new(marker: M) -> Self {
        Self {
            marker,
            style: None,
            applied: None,
        }
    }

    pub fn marker(&self) -> &M {
        &self.marker
    }

    /// Releases the [MarkerView]
    pub fn into_marker(self) -> M {
        self.marker
    }

    /// Current [MarkerStyle], once it has been applied
    pub fn style(&self) -> Option<MarkerStyle> {
        self.style
    }

    fn set_style(&mut self, style: MarkerStyle) {
        if self.style != Some(style) {
            self.marker.set_style(style);
            self.style = Some(style);
        }
    }

    /// Reacts to a new [Snapshot] of the shared heading state.
    pub fn update(&mut self, snapshot: &Snapshot) {
        match (snapshot.tracking, snapshot.heading) {
            (true, Some(heading)) => {
                if self.applied != Some(heading) {
                    trace!("marker heading {:.2}°", heading);
                    self.marker.set_rotation(heading.to_radians());
                    self.applied = Some(heading);
                }
                self.set_style(MarkerStyle::Directional);
            },
            _ => {
                self.applied = None;
                self.set_style(MarkerStyle::Neutral);
            },
        }
    }
}

impl<M: MarkerView> HeadingObserver for MarkerController<M> {
    fn notify(&mut self, snapshot: &Snapshot, _: Change) {
        self.update(snapshot);
    }
}
