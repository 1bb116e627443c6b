//! Heading pipeline
use log::debug;

use crate::prelude::{
    Clock, Config, Error, HeadingObserver, HeadingSource, HeadingState, MapView,
    MarkerController, MarkerView, NavigationMode, ObserverId, OrientationEvent, PositionFix,
    Publisher, RotationController, Snapshot,
};

/// [HeadingPipeline] turns position fixes and device orientation events
/// into one smoothed heading, and keeps the map view and location marker
/// oriented accordingly.
///
/// It is meant to be created once, at application start up, then fed
/// from the sensor callbacks. Every method returns immediately: samples
/// arriving too soon are dropped, never queued.
///
/// ```
/// use heading_up::prelude::*;
///
/// let mut pipeline = HeadingPipeline::new(Config::default(), MonotonicClock::new())
///     .unwrap();
///
/// pipeline.start_tracking();
/// pipeline.on_position(PositionFix::new(5.0, 3.0, 42.0));
///
/// assert_eq!(pipeline.source(), HeadingSource::SatelliteCourse);
/// assert_eq!(pipeline.heading(), Some(42.0));
/// ```
pub struct HeadingPipeline<C: Clock> {
    cfg: Config,
    clock: C,
    publisher: Publisher,
    state: HeadingState,
}

impl<C: Clock> HeadingPipeline<C> {
    /// Builds a new [HeadingPipeline].
    /// ## Input
    /// - cfg: [Config]uration, which is verified first
    /// - clock: monotonic [Clock], driving the rate limiters
    pub fn new(cfg: Config, clock: C) -> Result<Self, Error> {
        cfg.validate()?;
        let publisher = Publisher::new(&cfg)?;
        debug!(
            "heading pipeline: windows={}/{} floor={} compass={}",
            cfg.satellite_window,
            cfg.compass_window,
            cfg.publish_interval(),
            cfg.compass_interval()
        );
        Ok(Self {
            cfg,
            clock,
            publisher,
            state: HeadingState::default(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Heading [Publisher], exposing both smoothing windows
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Shared [HeadingState]
    pub fn state(&self) -> &HeadingState {
        &self.state
    }

    /// Current [Snapshot] of the shared state
    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Smoothed heading [°], within [0, 360)
    pub fn heading(&self) -> Option<f64> {
        self.state.heading()
    }

    /// Currently authoritative [HeadingSource]
    pub fn source(&self) -> HeadingSource {
        self.publisher.source()
    }

    pub fn is_tracking(&self) -> bool {
        self.state.tracking()
    }

    pub fn navigation_mode(&self) -> NavigationMode {
        self.state.mode()
    }

    /// Registers a [HeadingObserver]
    pub fn subscribe(&mut self, observer: Box<dyn HeadingObserver>) -> ObserverId {
        self.state.subscribe(observer)
    }

    /// Unregisters a [HeadingObserver]
    pub fn unsubscribe(&mut self, id: ObserverId) -> Option<Box<dyn HeadingObserver>> {
        self.state.unsubscribe(id)
    }

    /// Attaches a [MapView] that will be rotated heading-up.
    pub fn attach_map_view<V: MapView + 'static>(&mut self, view: V) -> ObserverId {
        let controller = RotationController::new(view, self.cfg.rotation);
        self.subscribe(Box::new(controller))
    }

    /// Attaches a [MarkerView] that will point towards the heading.
    pub fn attach_marker<M: MarkerView + 'static>(&mut self, marker: M) -> ObserverId {
        self.subscribe(Box::new(MarkerController::new(marker)))
    }

    /// Selects the [NavigationMode]
    pub fn set_navigation_mode(&mut self, mode: NavigationMode) {
        self.state.set_mode(mode);
    }

    /// Starts a new tracking session, from empty smoothing windows.
    pub fn start_tracking(&mut self) {
        if self.state.tracking() {
            return;
        }
        self.publisher.clear();
        self.state.start_tracking();
    }

    /// Ends the tracking session: smoothing windows and heading are cleared,
    /// the view goes back north-up and the marker becomes neutral.
    pub fn stop_tracking(&mut self) {
        self.publisher.clear();
        self.state.reset();
    }

    /// Handles a new [PositionFix]. Returns the published heading, if any.
    pub fn on_position(&mut self, fix: PositionFix) -> Option<f64> {
        if !self.state.tracking() {
            return None;
        }
        let now = self.clock.now();
        self.publisher
            .on_position(&self.cfg, &mut self.state, now, &fix)
    }

    /// Handles a new [OrientationEvent]. Returns the published heading, if any.
    pub fn on_orientation(&mut self, event: &OrientationEvent) -> Option<f64> {
        if !self.state.tracking() {
            return None;
        }
        let now = self.clock.now();
        self.publisher
            .on_compass(&mut self.state, now, event.heading())
    }
}
