//! Shared heading state and its observers
use log::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::Error;

/// [NavigationMode] selects whether the map view follows the heading.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NavigationMode {
    /// North stays up, the view is never rotated.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "free"))]
    Free,
    /// The view rotates so the heading points up.
    #[cfg_attr(
        feature = "serde",
        serde(alias = "heading-up", alias = "heading_up", alias = "headingup")
    )]
    HeadingUp,
}

impl std::str::FromStr for NavigationMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        match s.trim() {
            "free" | "north-up" => Ok(Self::Free),
            "heading-up" | "heading_up" | "headingup" => Ok(Self::HeadingUp),
            _ => Err(Error::UnknownNavigationMode(s.trim().to_string())),
        }
    }
}

impl std::fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::HeadingUp => write!(f, "heading-up"),
        }
    }
}

/// What triggered an observer notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Observer was just registered and receives the current [Snapshot]
    Subscribed,
    /// A new heading was published
    Heading,
    /// [NavigationMode] changed
    Mode,
    /// Tracking started
    Tracking,
    /// Tracking stopped: heading was cleared
    Reset,
}

/// [Snapshot] of the shared state, as seen by observers.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// Smoothed heading [°] within [0, 360), if any
    pub heading: Option<f64>,
    /// Current [NavigationMode]
    pub mode: NavigationMode,
    /// True while position tracking is active
    pub tracking: bool,
    /// Incremented on each modification
    pub revision: u64,
}

/// [HeadingObserver] is implemented by anything that reacts to the shared
/// heading state (map view rotation, marker icon..).
pub trait HeadingObserver {
    /// Called synchronously, after each modification.
    fn notify(&mut self, snapshot: &Snapshot, change: Change);
}

/// Identifies a registered [HeadingObserver]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

/// [HeadingState] is the single container of the shared heading state.
/// Every modification replaces the [Snapshot] as a whole,
/// then notifies all observers in registration order.
/// Only the heading publisher may write the heading.
#[derive(Default)]
pub struct HeadingState {
    snapshot: Snapshot,
    next_id: u64,
    observers: Vec<(ObserverId, Box<dyn HeadingObserver>)>,
}

impl std::fmt::Debug for HeadingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadingState")
            .field("snapshot", &self.snapshot)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl HeadingState {
    /// Current [Snapshot]
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot
    }

    /// Smoothed heading [°], if any
    pub fn heading(&self) -> Option<f64> {
        self.snapshot.heading
    }

    pub fn mode(&self) -> NavigationMode {
        self.snapshot.mode
    }

    pub fn tracking(&self) -> bool {
        self.snapshot.tracking
    }

    /// Number of registered observers
    pub fn observers(&self) -> usize {
        self.observers.len()
    }

    /// Registers a new [HeadingObserver], which is immediately notified
    /// with the current [Snapshot].
    pub fn subscribe(&mut self, mut observer: Box<dyn HeadingObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        observer.notify(&self.snapshot, Change::Subscribed);
        self.observers.push((id, observer));
        id
    }

    /// Unregisters and returns a [HeadingObserver].
    pub fn unsubscribe(&mut self, id: ObserverId) -> Option<Box<dyn HeadingObserver>> {
        let index = self.observers.iter().position(|(k, _)| *k == id)?;
        Some(self.observers.remove(index).1)
    }

    /// Updates the [NavigationMode]. Observers are only notified on actual changes.
    pub fn set_mode(&mut self, mode: NavigationMode) {
        if self.snapshot.mode == mode {
            return;
        }
        debug!("navigation mode: {} -> {}", self.snapshot.mode, mode);
        let mut snapshot = self.snapshot;
        snapshot.mode = mode;
        self.commit(snapshot, Change::Mode);
    }

    /// Starts a tracking session.
    pub fn start_tracking(&mut self) {
        if self.snapshot.tracking {
            return;
        }
        info!("tracking started");
        let mut snapshot = self.snapshot;
        snapshot.tracking = true;
        snapshot.heading = None;
        self.commit(snapshot, Change::Tracking);
    }

    /// Publishes a new smoothed heading [°].
    pub(crate) fn publish(&mut self, heading: f64) {
        let mut snapshot = self.snapshot;
        snapshot.heading = Some(heading);
        self.commit(snapshot, Change::Heading);
    }

    /// Ends the tracking session: heading is cleared.
    /// [NavigationMode] is a user choice and is preserved.
    pub fn reset(&mut self) {
        if !self.snapshot.tracking && self.snapshot.heading.is_none() {
            return;
        }
        info!("tracking stopped");
        let mut snapshot = self.snapshot;
        snapshot.tracking = false;
        snapshot.heading = None;
        self.commit(snapshot, Change::Reset);
    }

    fn commit(&mut self, mut snapshot: Snapshot, change: Change) {
        snapshot.revision = self.snapshot.revision.wrapping_add(1);
        self.snapshot = snapshot;
        for (_, observer) in self.observers.iter_mut() {
            observer.notify(&self.snapshot, change);
        }
    }
}
