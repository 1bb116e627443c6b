//! Heading publication
use log::{debug, trace};

use crate::{
    arbiter::Arbiter,
    prelude::{Config, Epoch, Error, HeadingSource, HeadingState, PositionFix},
    smoothing::SmoothingBuffer,
    time::IntervalGate,
};

/// [RawSample] is one angle reading tagged with the [HeadingSource] it comes from.
/// It is consumed immediately and never retained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    /// Angle [°], if known
    pub angle_deg: Option<f64>,
    /// [HeadingSource] this angle comes from
    pub source: HeadingSource,
    /// Ground speed [m/s], if known
    pub speed_m_s: Option<f64>,
    /// Fix accuracy [m], if known
    pub accuracy_m: Option<f64>,
}

impl RawSample {
    /// Builds a [RawSample] from a [PositionFix] and the [HeadingSource] it resolved to.
    pub fn from_fix(fix: &PositionFix, source: HeadingSource) -> Self {
        let angle_deg = match source {
            HeadingSource::SatelliteCourse => fix.course_deg,
            _ => None,
        };
        Self {
            angle_deg,
            source,
            speed_m_s: fix.speed_m_s,
            accuracy_m: fix.accuracy_m,
        }
    }

    /// Builds a compass [RawSample]
    pub fn compass(heading_deg: Option<f64>) -> Self {
        Self {
            angle_deg: heading_deg,
            source: HeadingSource::MagneticCompass,
            speed_m_s: None,
            accuracy_m: None,
        }
    }
}

/// [Publisher] rate limits raw samples, smooths them and publishes
/// the resulting heading into the [HeadingState].
///
/// Rate limiting drops samples that arrive too soon, nothing is queued:
/// - one publication per `publish_interval`, whatever the source
/// - one compass sample per `compass_interval`, considered before anything else
/// - repeated (bit identical) courses are ignored
#[derive(Debug, Clone)]
pub struct Publisher {
    arbiter: Arbiter,
    clear_on_switch: bool,
    satellite: SmoothingBuffer,
    compass: SmoothingBuffer,
    floor_gate: IntervalGate,
    compass_gate: IntervalGate,
    last_course_bits: Option<u64>,
}

impl Publisher {
    pub fn new(cfg: &Config) -> Result<Self, Error> {
        Ok(Self {
            arbiter: Arbiter::default(),
            clear_on_switch: cfg.clear_on_source_switch,
            satellite: SmoothingBuffer::dedicated(
                HeadingSource::SatelliteCourse,
                cfg.satellite_window,
            )?,
            compass: SmoothingBuffer::dedicated(
                HeadingSource::MagneticCompass,
                cfg.compass_window,
            )?,
            floor_gate: IntervalGate::new(cfg.publish_interval()),
            compass_gate: IntervalGate::new(cfg.compass_interval()),
            last_course_bits: None,
        })
    }

    /// Currently authoritative [HeadingSource]
    pub fn source(&self) -> HeadingSource {
        self.arbiter.current()
    }

    /// Satellite course [SmoothingBuffer]
    pub fn satellite_buffer(&self) -> &SmoothingBuffer {
        &self.satellite
    }

    /// Compass [SmoothingBuffer]
    pub fn compass_buffer(&self) -> &SmoothingBuffer {
        &self.compass
    }

    /// Handles a new [PositionFix]: runs the arbitration,
    /// then publishes the course if it is now authoritative.
    /// Returns the published heading, if any.
    pub fn on_position(
        &mut self,
        cfg: &Config,
        state: &mut HeadingState,
        now: Epoch,
        fix: &PositionFix,
    ) -> Option<f64> {
        if let Some(previous) = self.arbiter.update(cfg, state.tracking(), fix) {
            if self.clear_on_switch {
                self.clear_source(previous);
            }
        }

        let source = self.arbiter.current();
        if source != HeadingSource::SatelliteCourse {
            return None;
        }

        self.submit(state, now, RawSample::from_fix(fix, source))
    }

    /// Handles a new compass heading [°].
    /// Dropped unless the compass is currently authoritative.
    /// Returns the published heading, if any.
    pub fn on_compass(
        &mut self,
        state: &mut HeadingState,
        now: Epoch,
        heading_deg: Option<f64>,
    ) -> Option<f64> {
        if !state.tracking() || self.arbiter.current() != HeadingSource::MagneticCompass {
            return None;
        }
        self.submit(state, now, RawSample::compass(heading_deg))
    }

    /// Submits a [RawSample] to the rate limiters, then to the [SmoothingBuffer]
    /// of its [HeadingSource]. Returns the published heading, if any.
    pub fn submit(
        &mut self,
        state: &mut HeadingState,
        now: Epoch,
        sample: RawSample,
    ) -> Option<f64> {
        let angle = match sample.angle_deg.filter(|a| a.is_finite()) {
            Some(angle) => angle,
            None => {
                trace!("{} sample without usable angle", sample.source);
                return None;
            },
        };

        match sample.source {
            HeadingSource::None => None,
            HeadingSource::SatelliteCourse => {
                if self.last_course_bits == Some(angle.to_bits()) {
                    trace!("repeated course {}", angle);
                    return None;
                }
                if !self.floor_gate.is_open(now) {
                    trace!("{}: course dropped (rate limit)", now);
                    return None;
                }
                self.last_course_bits = Some(angle.to_bits());
                self.satellite.add(angle);
                let smoothed = self.satellite.smoothed()?;
                self.publish(state, now, smoothed)
            },
            HeadingSource::MagneticCompass => {
                if !self.compass_gate.try_pass(now) {
                    return None;
                }
                if !self.floor_gate.is_open(now) {
                    trace!("{}: compass dropped (rate limit)", now);
                    return None;
                }
                self.compass.add(angle);
                let smoothed = self.compass.smoothed()?;
                self.publish(state, now, smoothed)
            },
        }
    }

    fn publish(&mut self, state: &mut HeadingState, now: Epoch, heading: f64) -> Option<f64> {
        self.floor_gate.mark(now);
        trace!("{}: heading={:.2}°", now, heading);
        state.publish(heading);
        Some(heading)
    }

    fn clear_source(&mut self, source: HeadingSource) {
        match source {
            HeadingSource::SatelliteCourse => {
                debug!("clearing course smoothing window");
                self.satellite.clear();
                self.last_course_bits = None;
            },
            HeadingSource::MagneticCompass => {
                debug!("clearing compass smoothing window");
                self.compass.clear();
                self.compass_gate.reset();
            },
            HeadingSource::None => {},
        }
    }

    /// Clears both smoothing windows and rate limiters, for a new tracking session.
    pub fn clear(&mut self) {
        self.arbiter.reset();
        self.satellite.clear();
        self.compass.clear();
        self.floor_gate.reset();
        self.compass_gate.reset();
        self.last_course_bits = None;
    }
}

#[cfg(test)]
mod test {
    use super::{Publisher, RawSample};
    use crate::prelude::{
        Clock, Config, HeadingSource, HeadingState, ManualClock, PositionFix, Unit,
    };
    use crate::tests::init_logger;

    fn tracking_state() -> HeadingState {
        let mut state = HeadingState::default();
        state.start_tracking();
        state
    }

    fn moving(course: f64) -> PositionFix {
        PositionFix::new(5.0, 5.0, course)
    }

    fn standing() -> PositionFix {
        PositionFix {
            accuracy_m: Some(5.0),
            speed_m_s: Some(0.0),
            course_deg: None,
        }
    }

    #[test]
    fn course_publication() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        let published = publisher.on_position(&cfg, &mut state, clock.now(), &moving(45.0));
        assert_eq!(published, Some(45.0));
        assert_eq!(state.heading(), Some(45.0));
        assert_eq!(publisher.source(), HeadingSource::SatelliteCourse);
    }

    #[test]
    fn global_rate_limit() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        assert!(publisher
            .on_position(&cfg, &mut state, clock.now(), &moving(10.0))
            .is_some());

        clock.advance(20 * Unit::Millisecond);
        assert!(publisher
            .on_position(&cfg, &mut state, clock.now(), &moving(20.0))
            .is_none());
        assert_eq!(publisher.satellite_buffer().len(), 1);
        assert_eq!(state.heading(), Some(10.0));

        clock.advance(13 * Unit::Millisecond);
        assert!(publisher
            .on_position(&cfg, &mut state, clock.now(), &moving(20.0))
            .is_some());
        assert_eq!(publisher.satellite_buffer().len(), 2);
    }

    #[test]
    fn repeated_course() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        for _ in 0..5 {
            publisher.on_position(&cfg, &mut state, clock.now(), &moving(90.0));
            clock.advance(100 * Unit::Millisecond);
        }
        assert_eq!(publisher.satellite_buffer().len(), 1);

        publisher.on_position(&cfg, &mut state, clock.now(), &moving(90.5));
        assert_eq!(publisher.satellite_buffer().len(), 2);
    }

    #[test]
    fn compass_rate_limit() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        publisher.on_position(&cfg, &mut state, clock.now(), &standing());
        assert_eq!(publisher.source(), HeadingSource::MagneticCompass);

        // 100 Hz compass stream for one second
        let mut published = 0;
        for i in 0..100 {
            let heading = Some(100.0 + (i % 3) as f64);
            if publisher.on_compass(&mut state, clock.now(), heading).is_some() {
                published += 1;
            }
            clock.advance(10 * Unit::Millisecond);
        }

        // one sample per 80ms
        assert_eq!(published, 13);
        assert_eq!(publisher.compass_buffer().len(), 10);
    }

    #[test]
    fn floor_applies_across_sources() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let t0 = clock.now();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        assert!(publisher
            .on_position(&cfg, &mut state, clock.now(), &moving(45.0))
            .is_some());

        publisher.on_position(&cfg, &mut state, clock.now(), &standing());
        assert_eq!(publisher.source(), HeadingSource::MagneticCompass);

        // within the 33ms floor: dropped, but the compass gate is consumed
        clock.advance(10 * Unit::Millisecond);
        assert!(publisher
            .on_compass(&mut state, clock.now(), Some(200.0))
            .is_none());
        assert!(publisher.compass_buffer().is_empty());

        for ms in 11_i64..90 {
            clock.set(t0 + ms * Unit::Millisecond);
            assert!(
                publisher
                    .on_compass(&mut state, clock.now(), Some(200.0))
                    .is_none(),
                "compass sample accepted at {}ms",
                ms
            );
        }

        clock.set(t0 + 90 * Unit::Millisecond);
        assert_eq!(
            publisher.on_compass(&mut state, clock.now(), Some(200.0)),
            Some(200.0)
        );
        assert_eq!(publisher.compass_buffer().len(), 1);
        assert_eq!(state.heading(), Some(200.0));
    }

    #[test]
    fn compass_requires_authority() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        // no fix yet
        assert!(publisher
            .on_compass(&mut state, clock.now(), Some(10.0))
            .is_none());

        publisher.on_position(&cfg, &mut state, clock.now(), &moving(45.0));
        clock.advance(100 * Unit::Millisecond);
        assert!(publisher
            .on_compass(&mut state, clock.now(), Some(10.0))
            .is_none());
        assert!(publisher.compass_buffer().is_empty());
        assert_eq!(state.heading(), Some(45.0));
    }

    #[test]
    fn poor_fix_freezes_heading() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        publisher.on_position(&cfg, &mut state, clock.now(), &moving(45.0));
        clock.advance(100 * Unit::Millisecond);

        let coarse = PositionFix::new(35.0, 5.0, 90.0);
        assert!(publisher
            .on_position(&cfg, &mut state, clock.now(), &coarse)
            .is_none());
        assert_eq!(publisher.source(), HeadingSource::None);
        assert_eq!(state.heading(), Some(45.0));
        assert_eq!(publisher.satellite_buffer().len(), 1);
    }

    #[test]
    fn missing_angle() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        let sample = RawSample {
            angle_deg: None,
            source: HeadingSource::SatelliteCourse,
            speed_m_s: Some(3.0),
            accuracy_m: Some(3.0),
        };
        assert!(publisher.submit(&mut state, clock.now(), sample).is_none());

        let sample = RawSample {
            angle_deg: Some(10.0),
            source: HeadingSource::None,
            speed_m_s: None,
            accuracy_m: None,
        };
        assert!(publisher.submit(&mut state, clock.now(), sample).is_none());
        assert!(state.heading().is_none());
    }

    #[test]
    fn buffers_survive_source_switch() {
        init_logger();
        let cfg = Config::default();
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        publisher.on_position(&cfg, &mut state, clock.now(), &standing());
        publisher.on_compass(&mut state, clock.now(), Some(200.0));
        clock.advance(100 * Unit::Millisecond);

        publisher.on_position(&cfg, &mut state, clock.now(), &moving(10.0));
        assert_eq!(publisher.source(), HeadingSource::SatelliteCourse);
        assert_eq!(publisher.compass_buffer().len(), 1);
    }

    #[test]
    fn buffers_cleared_on_source_switch() {
        init_logger();
        let cfg = Config::default().with_source_switch_clearing(true);
        let clock = ManualClock::default();
        let mut state = tracking_state();
        let mut publisher = Publisher::new(&cfg).unwrap();

        publisher.on_position(&cfg, &mut state, clock.now(), &standing());
        publisher.on_compass(&mut state, clock.now(), Some(200.0));
        clock.advance(100 * Unit::Millisecond);

        publisher.on_position(&cfg, &mut state, clock.now(), &moving(10.0));
        assert!(publisher.compass_buffer().is_empty());
        assert_eq!(publisher.satellite_buffer().len(), 1);
        clock.advance(100 * Unit::Millisecond);

        publisher.on_position(&cfg, &mut state, clock.now(), &standing());
        assert!(publisher.satellite_buffer().is_empty());

        // compass resumes from scratch
        let published = publisher.on_compass(&mut state, clock.now(), Some(300.0));
        assert_eq!(published, Some(300.0));
    }
}
