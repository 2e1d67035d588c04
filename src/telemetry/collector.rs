use std::{
    sync::mpsc::{SendError, Sender, SyncSender},
    thread,
    time::Duration,
};

use log::{error, info};

use crate::PitwallError;

use super::{LiveOutput, producer::SampleProducer};

/// Sending half of a live feed channel. A `SyncSender` makes the feed wait for the live
/// session instead of queueing without bound.
pub trait OutputSender {
    fn send_output(&self, output: LiveOutput) -> Result<(), SendError<LiveOutput>>;
}

impl OutputSender for Sender<LiveOutput> {
    fn send_output(&self, output: LiveOutput) -> Result<(), SendError<LiveOutput>> {
        self.send(output)
    }
}

impl OutputSender for SyncSender<LiveOutput> {
    fn send_output(&self, output: LiveOutput) -> Result<(), SendError<LiveOutput>> {
        self.send(output)
    }
}

/// Pulls samples from `producer` every `refresh_rate_ms` and broadcasts them to the live
/// session and, when recording, to the recorder.
///
/// Returns once the producer is exhausted. A receiver hanging up is an error: it means the
/// consumer went away while the feed was still running.
pub fn collect_samples(
    mut producer: impl SampleProducer,
    sample_sender: impl OutputSender,
    recorder_sender: Option<Sender<LiveOutput>>,
    refresh_rate_ms: u64,
) -> Result<(), PitwallError> {
    producer.start()?;
    info!("Collecting telemetry from {}", producer.source_name());

    while let Some(output) = producer.next_output()? {
        if let Some(ref recorder) = recorder_sender {
            recorder.send(output.clone()).map_err(|e| {
                error!("Could not send telemetry sample to recorder: {}", e);
                PitwallError::from(e)
            })?;
        }
        sample_sender.send_output(output).map_err(|e| {
            info!("Live session closed, stopping {}", producer.source_name());
            PitwallError::from(e)
        })?;

        if refresh_rate_ms > 0 {
            thread::sleep(Duration::from_millis(refresh_rate_ms));
        }
    }

    info!("Telemetry source {} exhausted", producer.source_name());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::telemetry::{ReplayProducer, TelemetrySample};

    fn samples(count: usize) -> Vec<TelemetrySample> {
        (0..count)
            .map(|i| TelemetrySample {
                speed: Some(i as f32),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_collect_forwards_every_sample_in_order() {
        let (tx, rx) = mpsc::channel();
        collect_samples(ReplayProducer::from_samples(samples(5)), tx, None, 0).unwrap();

        let received: Vec<LiveOutput> = rx.iter().collect();
        let expected: Vec<LiveOutput> = samples(5).into_iter().map(LiveOutput::from).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn test_collect_feeds_recorder() {
        let (tx, rx) = mpsc::channel();
        let (recorder_tx, recorder_rx) = mpsc::channel();
        collect_samples(
            ReplayProducer::from_samples(samples(3)),
            tx,
            Some(recorder_tx),
            0,
        )
        .unwrap();

        assert_eq!(rx.iter().count(), 3);
        assert_eq!(recorder_rx.iter().count(), 3);
    }

    #[test]
    fn test_bounded_feed_waits_for_consumer() {
        let (tx, rx) = mpsc::sync_channel(2);
        let producer = ReplayProducer::from_samples(samples(3)).looped(true);
        let feed = thread::spawn(move || collect_samples(producer, tx, None, 0));

        let received: Vec<LiveOutput> = rx.iter().take(5).collect();
        assert_eq!(received[3], LiveOutput::FeedReset);
        drop(rx);

        // an endless replay still ends once the consumer is gone
        assert!(matches!(
            feed.join().unwrap(),
            Err(PitwallError::SampleBroadcastError { .. })
        ));
    }

    #[test]
    fn test_collect_fails_when_receiver_hangs_up() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let result = collect_samples(ReplayProducer::from_samples(samples(2)), tx, None, 0);
        assert!(matches!(
            result,
            Err(PitwallError::SampleBroadcastError { .. })
        ));
    }
}
