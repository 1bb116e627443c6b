//! Circular smoothing of angle samples
use std::collections::VecDeque;

use log::trace;

use crate::{
    angle::wrap_360,
    prelude::{Error, HeadingSource},
};

/// [SmoothingBuffer] is a rolling window of angle samples (in degrees),
/// producing an exponentially weighted circular mean.
///
/// Samples are stored "unwrapped": each new sample is shifted by a multiple
/// of 360° so it lies within (-180°, +180°] of the previous one.
/// The stored sequence is therefore continuous and can be averaged
/// arithmetically, the result being folded back into [0, 360).
///
/// Two consecutive samples that truly differ by more than 180° (near
/// instant reversal) are unwrapped the wrong way round. Recency weighting
/// makes the output converge anyway, within a few samples.
#[derive(Debug, Clone)]
pub struct SmoothingBuffer {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl SmoothingBuffer {
    /// Creates a new [SmoothingBuffer] that averages up to `capacity` samples.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::NullWindow);
        }
        Ok(Self {
            capacity,
            samples: VecDeque::with_capacity(capacity + 1),
        })
    }

    /// Creates the [SmoothingBuffer] dedicated to this [HeadingSource],
    /// with window sizes defined in [Config](crate::prelude::Config).
    pub(crate) fn dedicated(source: HeadingSource, capacity: usize) -> Result<Self, Error> {
        let buffer = Self::new(capacity)?;
        trace!("{} smoothing window: {} samples", source, capacity);
        Ok(buffer)
    }

    /// Maximal number of samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples currently stored
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Stored (possibly unwrapped) samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &f64> + '_ {
        self.samples.iter()
    }

    /// Pushes a new angle sample (in degrees) into the window.
    /// The oldest sample is dropped once the window is full.
    /// Non finite values are discarded.
    pub fn add(&mut self, angle_deg: f64) {
        if !angle_deg.is_finite() {
            trace!("discarded non finite angle sample");
            return;
        }

        let mut angle = wrap_360(angle_deg);

        if let Some(last) = self.samples.back() {
            let mut delta = angle - last;
            while delta > 180.0 {
                angle -= 360.0;
                delta -= 360.0;
            }
            while delta <= -180.0 {
                angle += 360.0;
                delta += 360.0;
            }
        }

        self.samples.push_back(angle);

        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Returns the weighted circular mean of the window, in [0, 360).
    /// Sample at position `i` (0 being the oldest) weighs `2^i`.
    pub fn smoothed(&self) -> Option<f64> {
        match self.samples.len() {
            0 => None,
            1 => self.samples.front().map(|angle| wrap_360(*angle)),
            _ => {
                let (mut sum, mut total) = (0.0_f64, 0.0_f64);
                for (i, angle) in self.samples.iter().enumerate() {
                    let weight = 2.0_f64.powi(i as i32);
                    sum += weight * angle;
                    total += weight;
                }
                Some(wrap_360(sum / total))
            },
        }
    }

    /// Empties the window.
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod test {
    use super::SmoothingBuffer;
    use crate::prelude::Error;

    fn assert_close(value: f64, expected: f64, tol: f64) {
        assert!(
            (value - expected).abs() < tol,
            "expected {} got {}",
            expected,
            value
        );
    }

    #[test]
    fn null_capacity() {
        assert_eq!(SmoothingBuffer::new(0).err(), Some(Error::NullWindow));
    }

    #[test]
    fn empty_window() {
        let buffer = SmoothingBuffer::new(6).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.smoothed().is_none());
    }

    #[test]
    fn single_sample() {
        let mut buffer = SmoothingBuffer::new(6).unwrap();
        buffer.add(-90.0);
        assert_eq!(buffer.smoothed(), Some(270.0));

        buffer.clear();
        buffer.add(123.4);
        assert_eq!(buffer.smoothed(), Some(123.4));
    }

    #[test]
    fn circular_mean_across_north() {
        let mut buffer = SmoothingBuffer::new(6).unwrap();
        buffer.add(350.0);
        buffer.add(10.0);

        // 10° is stored as 370°: (350 + 2*370) / 3
        let smoothed = buffer.smoothed().unwrap();
        assert_close(smoothed, 1090.0 / 3.0 - 360.0, 1.0E-9);

        // near north, biased towards the latest sample, never the naive 180°
        assert!(smoothed > 0.0 && smoothed < 10.0, "{}", smoothed);
    }

    #[test]
    fn recency_weighting() {
        let mut buffer = SmoothingBuffer::new(3).unwrap();
        for angle in [10.0, 20.0, 30.0] {
            buffer.add(angle);
        }
        // (10 + 2*20 + 4*30) / 7
        assert_close(buffer.smoothed().unwrap(), 170.0 / 7.0, 1.0E-9);
    }

    #[test]
    fn idempotence() {
        for angle in [0.0, 42.0, 180.0, 359.5] {
            let mut buffer = SmoothingBuffer::new(10).unwrap();
            for _ in 0..10 {
                buffer.add(angle);
            }
            assert_close(buffer.smoothed().unwrap(), angle, 1.0E-9);
        }
    }

    #[test]
    fn wraparound_stability() {
        let mut buffer = SmoothingBuffer::new(6).unwrap();
        for i in 0..50 {
            let angle = if i % 2 == 0 { 359.0 } else { 1.0 };
            buffer.add(angle);

            let smoothed = buffer.smoothed().unwrap();
            assert!(
                smoothed <= 2.0 || smoothed >= 358.0,
                "collapsed to {} after {} samples",
                smoothed,
                i + 1
            );
        }
    }

    #[test]
    fn capacity_invariant() {
        let mut buffer = SmoothingBuffer::new(6).unwrap();
        buffer.add(90.0);
        for i in 0..6 {
            buffer.add(200.0 + i as f64);
            assert!(buffer.len() <= 6);
        }
        assert_eq!(buffer.len(), 6);

        let mut reference = SmoothingBuffer::new(6).unwrap();
        for i in 0..6 {
            reference.add(200.0 + i as f64);
        }

        // the 90° sample has been evicted and has no effect
        assert_close(
            buffer.smoothed().unwrap(),
            reference.smoothed().unwrap(),
            1.0E-9,
        );

        for i in 0..100 {
            buffer.add(i as f64 * 7.0);
            assert_eq!(buffer.len(), 6);
        }
    }

    #[test]
    fn insertion_order() {
        let mut buffer = SmoothingBuffer::new(3).unwrap();
        for angle in [1.0, 2.0, 3.0, 4.0] {
            buffer.add(angle);
        }
        let stored = buffer.iter().copied().collect::<Vec<_>>();
        assert_eq!(stored, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn continuous_rotation() {
        let mut buffer = SmoothingBuffer::new(6).unwrap();
        let mut angle = 0.0;
        for _ in 0..200 {
            angle += 10.0;
            buffer.add(angle % 360.0);
        }
        let stored = buffer.iter().copied().collect::<Vec<_>>();
        for pair in stored.windows(2) {
            assert_close(pair[1] - pair[0], 10.0, 1.0E-9);
        }
        // lags behind the latest sample, by less than one step
        let lag = crate::angle::shortest_delta_deg(buffer.smoothed().unwrap(), 2000.0 % 360.0);
        assert!(lag > 0.0 && lag < 10.0, "{}", lag);
    }

    #[test]
    fn non_finite_samples() {
        let mut buffer = SmoothingBuffer::new(6).unwrap();
        buffer.add(f64::NAN);
        buffer.add(f64::INFINITY);
        assert!(buffer.is_empty());
    }

    #[test]
    fn reversal_self_corrects() {
        let mut buffer = SmoothingBuffer::new(6).unwrap();
        for _ in 0..6 {
            buffer.add(0.0);
        }
        for _ in 0..6 {
            buffer.add(190.0);
        }
        assert_close(buffer.smoothed().unwrap(), 190.0, 1.0E-9);
    }
}
