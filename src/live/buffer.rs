use std::collections::VecDeque;

use crate::telemetry::TelemetrySample;

/// Number of samples kept for the live charts.
pub const DEFAULT_CAPACITY: usize = 100;

/// Sliding window over the most recent live samples, oldest first.
///
/// The window never holds more than `capacity` samples: appending to a full window drops
/// the oldest one. Appending never fails and never blocks.
#[derive(Debug, Clone)]
pub struct LiveSampleBuffer {
    samples: VecDeque<TelemetrySample>,
    capacity: usize,
}

impl Default for LiveSampleBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LiveSampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A window of `capacity` samples. A zero capacity is bumped to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, sample: TelemetrySample) -> &VecDeque<TelemetrySample> {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        &self.samples
    }

    /// Read-only view of the window, oldest sample first.
    pub fn snapshot(&self) -> &VecDeque<TelemetrySample> {
        &self.samples
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    pub fn latest(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_with_speed(speed: f32) -> TelemetrySample {
        TelemetrySample {
            speed: Some(speed),
            ..Default::default()
        }
    }

    fn speeds(buffer: &LiveSampleBuffer) -> Vec<f32> {
        buffer.snapshot().iter().map(|s| s.speed_or_zero()).collect()
    }

    #[test]
    fn test_keeps_last_hundred_samples() {
        let mut buffer = LiveSampleBuffer::new();
        for speed in 1..=105 {
            buffer.append(sample_with_speed(speed as f32));
        }

        let expected: Vec<f32> = (6..=105).map(|s| s as f32).collect();
        assert_eq!(buffer.len(), 100);
        assert_eq!(speeds(&buffer), expected);
    }

    #[test]
    fn test_append_returns_updated_window() {
        let mut buffer = LiveSampleBuffer::with_capacity(2);
        buffer.append(sample_with_speed(1.));
        buffer.append(sample_with_speed(2.));
        let window = buffer.append(sample_with_speed(3.));
        assert_eq!(window.len(), 2);
        assert_eq!(window.front().and_then(|s| s.speed), Some(2.));
        assert_eq!(window.back().and_then(|s| s.speed), Some(3.));
    }

    #[test]
    fn test_reset_empties_window() {
        let mut buffer = LiveSampleBuffer::new();
        for speed in 0..150 {
            buffer.append(sample_with_speed(speed as f32));
        }
        buffer.reset();
        assert!(buffer.is_empty());
        assert!(buffer.snapshot().is_empty());
        assert!(buffer.latest().is_none());
    }

    #[test]
    fn test_zero_capacity_holds_one_sample() {
        let mut buffer = LiveSampleBuffer::with_capacity(0);
        buffer.append(sample_with_speed(1.));
        buffer.append(sample_with_speed(2.));
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(speeds(&buffer), vec![2.]);
    }

    #[test]
    fn test_sample_without_throttle_is_accepted() {
        let mut buffer = LiveSampleBuffer::new();
        buffer.append(TelemetrySample {
            speed: Some(200.),
            throttle: None,
            ..Default::default()
        });
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().map(|s| s.throttle_or_zero()), Some(0.));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_window_holds_last_samples_in_order(
            values in prop::collection::vec(0f32..400f32, 0..300),
        ) {
            let mut buffer = LiveSampleBuffer::new();
            for value in &values {
                buffer.append(sample_with_speed(*value));
            }

            // Property: the window is exactly the tail of the appended samples, in order
            let keep = values.len().min(DEFAULT_CAPACITY);
            let expected = values[values.len() - keep..].to_vec();
            prop_assert_eq!(buffer.len(), keep);
            prop_assert_eq!(speeds(&buffer), expected);
        }

        #[test]
        fn prop_snapshot_is_repeatable(
            values in prop::collection::vec(0f32..400f32, 1..150),
        ) {
            let mut buffer = LiveSampleBuffer::new();
            for value in &values {
                buffer.append(sample_with_speed(*value));
            }

            // Property: reading twice without appending yields the same window
            let first = buffer.snapshot().clone();
            let second = buffer.snapshot().clone();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_reset_always_empties(
            values in prop::collection::vec(0f32..400f32, 0..250),
        ) {
            let mut buffer = LiveSampleBuffer::new();
            for value in &values {
                buffer.append(sample_with_speed(*value));
            }
            buffer.reset();
            prop_assert_eq!(buffer.snapshot().len(), 0);
        }
    }
}
