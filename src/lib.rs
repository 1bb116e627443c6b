#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod arbiter;
mod cfg;
mod error;
mod marker;
mod orientation;
mod pipeline;
mod publisher;
mod rotation;
mod smoothing;
mod state;
mod time;
mod view;

pub mod angle;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::arbiter::{arbitrate, Arbiter, HeadingSource, PositionFix};
    pub use crate::cfg::{Config, RotationOpts};
    pub use crate::error::Error;
    pub use crate::marker::MarkerController;
    pub use crate::orientation::OrientationEvent;
    pub use crate::pipeline::HeadingPipeline;
    pub use crate::publisher::{Publisher, RawSample};
    pub use crate::rotation::RotationController;
    pub use crate::smoothing::SmoothingBuffer;
    pub use crate::state::{
        Change, HeadingObserver, HeadingState, NavigationMode, ObserverId, Snapshot,
    };
    pub use crate::time::{Clock, IntervalGate, ManualClock, MonotonicClock};
    pub use crate::view::{AnimationRequest, Easing, MapView, MarkerStyle, MarkerView};
    // re-export
    pub use hifitime::{Duration, Epoch, TimeScale, Unit};
}

// pub export
pub use error::Error;
