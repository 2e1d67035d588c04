use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::mpsc::Receiver,
};

use log::{error, info};

use crate::{PitwallError, telemetry::LiveOutput};

/// Record every live message as one JSON line until the feed hangs up.
/// The output can be replayed with `ReplayProducer`.
pub fn write_samples(
    file: &Path,
    sample_receiver: Receiver<LiveOutput>,
) -> Result<(), PitwallError> {
    let recording = File::create(file).map_err(|e| PitwallError::RecorderError { source: e })?;
    let mut recording_writer = BufWriter::new(recording);
    let mut written = 0usize;
    for output in &sample_receiver {
        let line = match serde_json::to_string(&output) {
            Ok(line) => line,
            Err(e) => {
                error!("Could not serialize telemetry sample: {}", e);
                continue;
            }
        };
        writeln!(recording_writer, "{}", line)
            .map_err(|e| PitwallError::RecorderError { source: e })?;
        written += 1;
    }
    recording_writer
        .flush()
        .map_err(|e| PitwallError::RecorderError { source: e })?;
    info!("Recorded {} messages to {:?}", written, file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::telemetry::{ReplayProducer, SampleProducer, TelemetrySample};
    use tempfile::TempDir;

    #[test]
    fn test_recording_can_be_replayed() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("live.jsonl");

        let outputs = vec![
            LiveOutput::from(TelemetrySample {
                speed: Some(150.),
                throttle: Some(100.),
                gear: Some(4),
                ..Default::default()
            }),
            LiveOutput::FeedReset,
            LiveOutput::from(TelemetrySample {
                speed: Some(20.),
                brake: Some(80.),
                ..Default::default()
            }),
        ];

        let (tx, rx) = mpsc::channel();
        for output in &outputs {
            tx.send(output.clone()).unwrap();
        }
        drop(tx);
        write_samples(&path, rx).unwrap();

        let mut replay = ReplayProducer::from_file(&path);
        replay.start().unwrap();
        let mut replayed = Vec::new();
        while let Some(output) = replay.next_output().unwrap() {
            replayed.push(output);
        }
        assert_eq!(replayed, outputs);
    }
}
