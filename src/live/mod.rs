mod buffer;
mod series;

use std::{
    sync::mpsc::{Receiver, TryRecvError},
    time::Instant,
};

use log::{debug, info};

pub use buffer::{DEFAULT_CAPACITY, LiveSampleBuffer};
pub use series::{LiveReadout, LiveSeries, SeriesPoints};

use crate::telemetry::LiveOutput;

pub(crate) const MAX_SAMPLES_PER_PUMP: usize = 10;
pub(crate) const MAX_TIME_PER_PUMP_MS: u128 = 50;

/// The live mode of the dashboard: a feed subscription plus the window of recent samples.
///
/// A session is created when live mode starts and is the only owner of its buffer.
/// Stopping the session clears the buffer and drops the feed receiver, which makes the
/// producer side stop on its next send.
pub struct LiveSession {
    feed: Option<Receiver<LiveOutput>>,
    buffer: LiveSampleBuffer,
    connected: bool,
}

impl LiveSession {
    pub fn new(feed: Receiver<LiveOutput>, capacity: usize) -> Self {
        info!("Starting live session with a window of {} samples", capacity);
        Self {
            feed: Some(feed),
            buffer: LiveSampleBuffer::with_capacity(capacity),
            connected: true,
        }
    }

    /// Apply whatever the feed has queued up without blocking.
    ///
    /// At most `MAX_SAMPLES_PER_PUMP` samples are taken per call, and the call gives up
    /// after `MAX_TIME_PER_PUMP_MS`, so a fast feed cannot stall the UI thread. Returns
    /// the number of samples appended.
    pub fn pump(&mut self) -> usize {
        let Some(feed) = self.feed.as_ref() else {
            return 0;
        };

        let start = Instant::now();
        let mut samples_processed = 0;
        loop {
            match feed.try_recv() {
                Ok(LiveOutput::Sample(sample)) => {
                    self.buffer.append(*sample);
                    samples_processed += 1;
                }
                Ok(LiveOutput::FeedReset) => {
                    debug!("Live feed reset, dropping {} samples", self.buffer.len());
                    self.buffer.reset();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.connected {
                        info!("Live feed disconnected");
                    }
                    self.connected = false;
                    break;
                }
            }

            if samples_processed >= MAX_SAMPLES_PER_PUMP
                || start.elapsed().as_millis() >= MAX_TIME_PER_PUMP_MS
            {
                break;
            }
        }
        samples_processed
    }

    /// Stop live mode: forget every sample and unsubscribe from the feed.
    pub fn stop(&mut self) {
        self.buffer.reset();
        self.feed = None;
        self.connected = false;
        info!("Live session stopped");
    }

    pub fn buffer(&self) -> &LiveSampleBuffer {
        &self.buffer
    }

    pub fn series(&self) -> LiveSeries {
        LiveSeries::from_snapshot(self.buffer.snapshot())
    }

    pub fn readout(&self) -> LiveReadout {
        LiveReadout::from_sample(self.buffer.latest())
    }

    pub fn has_data(&self) -> bool {
        !self.buffer.is_empty()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::telemetry::TelemetrySample;

    fn sample(speed: f32) -> LiveOutput {
        TelemetrySample {
            speed: Some(speed),
            ..Default::default()
        }
        .into()
    }

    #[test]
    fn test_pump_is_bounded_per_call() {
        let (tx, rx) = mpsc::channel();
        let mut session = LiveSession::new(rx, DEFAULT_CAPACITY);
        for i in 0..25 {
            tx.send(sample(i as f32)).unwrap();
        }

        assert_eq!(session.pump(), MAX_SAMPLES_PER_PUMP);
        assert_eq!(session.pump(), MAX_SAMPLES_PER_PUMP);
        assert_eq!(session.pump(), 5);
        assert_eq!(session.pump(), 0);
        assert_eq!(session.buffer().len(), 25);
        assert!(session.is_connected());
    }

    #[test]
    fn test_pump_without_samples_does_not_block() {
        let (_tx, rx) = mpsc::channel::<LiveOutput>();
        let mut session = LiveSession::new(rx, DEFAULT_CAPACITY);
        assert_eq!(session.pump(), 0);
        assert!(!session.has_data());
    }

    #[test]
    fn test_feed_reset_clears_window() {
        let (tx, rx) = mpsc::channel();
        let mut session = LiveSession::new(rx, DEFAULT_CAPACITY);
        tx.send(sample(1.)).unwrap();
        tx.send(sample(2.)).unwrap();
        tx.send(LiveOutput::FeedReset).unwrap();
        tx.send(sample(3.)).unwrap();

        session.pump();
        let speeds: Vec<f32> = session
            .buffer()
            .snapshot()
            .iter()
            .map(|s| s.speed_or_zero())
            .collect();
        assert_eq!(speeds, vec![3.]);
    }

    #[test]
    fn test_disconnected_feed_keeps_samples() {
        let (tx, rx) = mpsc::channel();
        let mut session = LiveSession::new(rx, DEFAULT_CAPACITY);
        tx.send(sample(42.)).unwrap();
        drop(tx);

        session.pump();
        session.pump();
        assert!(!session.is_connected());
        assert_eq!(session.readout().speed, "42.0");
    }

    #[test]
    fn test_stop_resets_and_unsubscribes() {
        let (tx, rx) = mpsc::channel();
        let mut session = LiveSession::new(rx, DEFAULT_CAPACITY);
        tx.send(sample(1.)).unwrap();
        session.pump();
        assert!(session.has_data());

        session.stop();
        assert!(!session.has_data());
        assert!(tx.send(sample(2.)).is_err());
        assert_eq!(session.pump(), 0);
    }
}
