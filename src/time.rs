use std::{cell::Cell, rc::Rc, time::Instant};

use crate::prelude::{Duration, Epoch, TimeScale};

/// [Clock] is implemented by monotonic time sources. It drives every rate
/// limiting decision, which makes the pipeline deterministic once a
/// [ManualClock] is used.
pub trait Clock {
    /// Current [Epoch]. Successive calls must never go backwards.
    fn now(&self) -> Epoch;
}

impl<C: Clock> Clock for Rc<C> {
    fn now(&self) -> Epoch {
        self.as_ref().now()
    }
}

impl<C: Clock> Clock for &C {
    fn now(&self) -> Epoch {
        (*self).now()
    }
}

fn origin() -> Epoch {
    Epoch::from_duration(Duration::ZERO, TimeScale::TAI)
}

/// [MonotonicClock] counts time elapsed since its creation, on top of
/// [Instant], expressed as an [Epoch] in [TimeScale::TAI].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    t0: Epoch,
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            t0: origin(),
            start: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Epoch {
        let elapsed = self.start.elapsed();
        self.t0 + Duration::from_total_nanoseconds(elapsed.as_nanos() as i128)
    }
}

/// [ManualClock] only moves when told to. Use it to replay recorded
/// sensor streams, or in tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    t: Cell<Epoch>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(origin())
    }
}

impl ManualClock {
    /// Creates a new [ManualClock] starting at `t0`.
    pub fn new(t0: Epoch) -> Self {
        Self { t: Cell::new(t0) }
    }

    /// Moves this [ManualClock] forward. Negative durations are ignored.
    pub fn advance(&self, dt: Duration) {
        if dt > Duration::ZERO {
            self.t.set(self.t.get() + dt);
        }
    }

    /// Moves this [ManualClock] forward to `t`, if `t` lies in the future.
    pub fn set(&self, t: Epoch) {
        if t > self.t.get() {
            self.t.set(t);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Epoch {
        self.t.get()
    }
}

/// [IntervalGate] lets one event through per `interval`.
/// Events arriving too soon are meant to be dropped, not delayed.
#[derive(Debug, Clone)]
pub struct IntervalGate {
    interval: Duration,
    last: Option<Epoch>,
}

impl IntervalGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Minimal interval between two events
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// [Epoch] of the latest event that went through
    pub fn last(&self) -> Option<Epoch> {
        self.last
    }

    /// True if an event may go through at `now`. Does not modify the gate.
    pub fn is_open(&self, now: Epoch) -> bool {
        match self.last {
            Some(last) => now - last >= self.interval,
            None => true,
        }
    }

    /// Records an event that went through at `now`.
    pub fn mark(&mut self, now: Epoch) {
        self.last = Some(now);
    }

    /// [Self::is_open] followed by [Self::mark] when open.
    pub fn try_pass(&mut self, now: Epoch) -> bool {
        if self.is_open(now) {
            self.mark(now);
            true
        } else {
            false
        }
    }

    /// Forgets the latest event: next one goes through.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
