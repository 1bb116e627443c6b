//! Heading-up map view rotation
use log::{debug, trace};

use crate::{
    angle::{shortest_delta_rad, wrap_pi},
    prelude::{
        AnimationRequest, Change, Duration, Easing, HeadingObserver, MapView, NavigationMode,
        RotationOpts, Snapshot,
    },
};

/// [RotationController] rotates the [MapView] so the heading points up,
/// while in [NavigationMode::HeadingUp] and tracking.
/// Otherwise the view is brought back north-up.
///
/// Changes smaller than the hysteresis threshold are ignored, so compass
/// noise does not make the view tremble. Each issued target becomes the
/// baseline the next heading is compared to, rather than the in-flight
/// rotation of the view.
pub struct RotationController<V: MapView> {
    view: V,
    opts: RotationOpts,
    baseline: Option<f64>,
    in_flight: Option<AnimationRequest>,
}

impl<V: MapView> RotationController<V> {
    pub fn new(view: V, opts: RotationOpts) -> Self {
        Self {
            view,
            opts,
            baseline: None,
            in_flight: None,
        }
    }

    /// Latest issued rotation target [rad]
    pub fn baseline(&self) -> Option<f64> {
        self.baseline
    }

    /// Latest [AnimationRequest]
    pub fn in_flight(&self) -> Option<&AnimationRequest> {
        self.in_flight.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Releases the [MapView]
    pub fn into_view(self) -> V {
        self.view
    }

    /// View rotation [rad] matching this heading [°]
    pub fn target_rotation(heading_deg: f64) -> f64 {
        wrap_pi(-heading_deg.to_radians())
    }

    fn animate(&mut self, target_rad: f64, duration: Duration) {
        let request = AnimationRequest {
            target_rad,
            duration,
            easing: Easing::EaseInOut,
        };
        self.view.animate_rotation(request);
        self.in_flight = Some(request);
    }

    /// True while our latest request is the north-up animation
    fn returning_north(&self) -> bool {
        match self.in_flight {
            Some(request) => {
                request.target_rad == 0.0 && request.duration == self.opts.reset_animation()
            },
            None => false,
        }
    }

    fn north_up(&mut self) {
        self.baseline = None;
        let rotation = wrap_pi(self.view.rotation());
        if rotation.abs() <= self.opts.upright_epsilon_rad {
            self.in_flight = None;
            return;
        }
        if self.returning_north() {
            trace!("north-up animation in progress ({:.3} rad)", rotation);
            return;
        }
        debug!("back to north-up (from {:.3} rad)", rotation);
        self.animate(0.0, self.opts.reset_animation());
    }

    fn heading_up(&mut self, heading_deg: f64) {
        let target = Self::target_rotation(heading_deg);
        let reference = self.baseline.unwrap_or_else(|| self.view.rotation());
        let delta = shortest_delta_rad(reference, target);

        if delta.abs() < self.opts.hysteresis_rad {
            trace!("rotation change {:.4} rad below threshold", delta);
            return;
        }

        trace!("rotating view to {:.4} rad", target);
        self.animate(target, self.opts.animation());
        self.baseline = Some(target);
    }

    /// Reacts to a new [Snapshot] of the shared heading state.
    pub fn update(&mut self, snapshot: &Snapshot) {
        match (snapshot.mode, snapshot.tracking, snapshot.heading) {
            (NavigationMode::Free, _, _) | (_, false, _) => self.north_up(),
            (NavigationMode::HeadingUp, true, None) => {},
            (NavigationMode::HeadingUp, true, Some(heading)) => self.heading_up(heading),
        }
    }
}

impl<V: MapView> HeadingObserver for RotationController<V> {
    fn notify(&mut self, snapshot: &Snapshot, _: Change) {
        self.update(snapshot);
    }
}
