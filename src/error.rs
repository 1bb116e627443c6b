use thiserror::Error;

#[derive(Debug, PartialEq, Error)]
pub enum Error {
    /// A [SmoothingBuffer](crate::prelude::SmoothingBuffer) needs room for at least one sample.
    #[error("smoothing window must hold at least one sample")]
    NullWindow,

    /// Rate limiting intervals are expressed in milliseconds and must be
    /// positive (or null to disable the gate) finite numbers.
    #[error("invalid rate limiting interval: {0} ms")]
    InvalidInterval(f64),

    /// Fix accuracy threshold must be a positive finite number of meters.
    #[error("invalid accuracy threshold: {0} m")]
    InvalidAccuracyThreshold(f64),

    /// Course speed threshold must be a positive (or null) finite number of m/s.
    #[error("invalid course speed threshold: {0} m/s")]
    InvalidSpeedThreshold(f64),

    /// Rotation hysteresis must lie within [0, π) radians.
    #[error("invalid rotation hysteresis: {0} rad")]
    InvalidHysteresis(f64),

    #[error("invalid animation duration: {0} ms")]
    InvalidAnimationDuration(f64),

    #[error("unknown navigation mode \"{0}\"")]
    UnknownNavigationMode(String),
}
