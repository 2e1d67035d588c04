use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;

use crate::PitwallError;

use super::{LiveOutput, TelemetrySample};

#[cfg(windows)]
const CONN_RETRY_WAIT_MS: u64 = 200;

/// A source of live telemetry samples, pulled one message at a time.
///
/// # Lifecycle
///
/// 1. Call `start()` to connect to the source
/// 2. Call `next_output()` repeatedly; `Ok(None)` means the source is exhausted
pub trait SampleProducer {
    /// Connect to the data source.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be opened.
    fn start(&mut self) -> Result<(), PitwallError>;

    /// Get the next message from the source, or `None` once there is nothing left to read.
    ///
    /// # Errors
    ///
    /// Returns an error if the producer is not started or the source failed.
    fn next_output(&mut self) -> Result<Option<LiveOutput>, PitwallError>;

    /// Human readable name of the source, used in logs and window titles.
    fn source_name(&self) -> String;
}

/// One line of a replay file: either a message as written by the recorder or a bare sample.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayLine {
    Output(LiveOutput),
    Sample(TelemetrySample),
}

impl From<ReplayLine> for LiveOutput {
    fn from(value: ReplayLine) -> Self {
        match value {
            ReplayLine::Output(output) => output,
            ReplayLine::Sample(sample) => sample.into(),
        }
    }
}

/// Replays recorded samples, either from a JSON Lines file or from memory.
///
/// When `looped` is set the replay emits a `FeedReset` and starts over once it reaches
/// the end, which is handy for demos.
pub struct ReplayProducer {
    source: Option<PathBuf>,
    outputs: Vec<LiveOutput>,
    cur_tick: usize,
    looped: bool,
    started: bool,
}

impl ReplayProducer {
    pub fn from_samples(samples: Vec<TelemetrySample>) -> Self {
        Self::from_outputs(samples.into_iter().map(LiveOutput::from).collect())
    }

    pub fn from_outputs(outputs: Vec<LiveOutput>) -> Self {
        Self {
            source: None,
            outputs,
            cur_tick: 0,
            looped: false,
            started: false,
        }
    }

    /// Prepare a replay of a JSON Lines file. The file is read when the producer starts.
    pub fn from_file(path: &Path) -> Self {
        Self {
            source: Some(path.to_path_buf()),
            outputs: Vec::new(),
            cur_tick: 0,
            looped: false,
            started: false,
        }
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    fn load_file(path: &Path) -> Result<Vec<LiveOutput>, PitwallError> {
        let lines = serde_jsonlines::json_lines::<ReplayLine, _>(path).map_err(|e| {
            PitwallError::ReplayFileError {
                path: path.display().to_string(),
                source: e,
            }
        })?;

        let mut outputs = Vec::new();
        for (line_no, line) in lines.enumerate() {
            match line {
                Ok(line) => outputs.push(line.into()),
                // a broken line in a recording is not worth aborting the replay for
                Err(e) => warn!("Skipping line {} of {:?}: {}", line_no + 1, path, e),
            }
        }
        info!("Loaded {} messages from {:?}", outputs.len(), path);
        Ok(outputs)
    }
}

impl SampleProducer for ReplayProducer {
    fn start(&mut self) -> Result<(), PitwallError> {
        if let Some(path) = &self.source {
            self.outputs = Self::load_file(path)?;
        }
        self.cur_tick = 0;
        self.started = true;
        Ok(())
    }

    fn next_output(&mut self) -> Result<Option<LiveOutput>, PitwallError> {
        if !self.started {
            return Err(PitwallError::SampleProducerError {
                description: "The replay is not started, call start() first.".to_string(),
            });
        }

        if self.cur_tick >= self.outputs.len() {
            if !self.looped || self.outputs.is_empty() {
                return Ok(None);
            }
            debug!("Replay of {} reached the end, rewinding", self.source_name());
            self.cur_tick = 0;
            return Ok(Some(LiveOutput::FeedReset));
        }

        let output = self.outputs[self.cur_tick].clone();
        self.cur_tick += 1;
        Ok(Some(output))
    }

    fn source_name(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => "in-memory replay".to_string(),
        }
    }
}

/// Reads live telemetry from a running iRacing session.
#[cfg(windows)]
pub struct IRacingProducer {
    runtime: Option<tokio::runtime::Runtime>,
    client: Option<simetry::iracing::Client>,
    retry_wait_ms: u64,
}

#[cfg(windows)]
impl Default for IRacingProducer {
    fn default() -> Self {
        Self {
            runtime: None,
            client: None,
            retry_wait_ms: CONN_RETRY_WAIT_MS,
        }
    }
}

#[cfg(windows)]
impl IRacingProducer {
    fn sample_from_moment(moment: &dyn simetry::Moment) -> TelemetrySample {
        use uom::si::angular_velocity::revolution_per_minute;
        use uom::si::velocity::kilometer_per_hour;

        let pedals = moment.pedals();
        TelemetrySample {
            speed: moment
                .vehicle_velocity()
                .map(|v| v.get::<kilometer_per_hour>().abs() as f32),
            throttle: pedals.as_ref().map(|p| (p.throttle * 100.) as f32),
            brake: pedals.as_ref().map(|p| (p.brake * 100.) as f32),
            gear: moment.vehicle_gear().map(|g| g as i32),
            rpm: moment
                .vehicle_engine_rotation_speed()
                .map(|rpm| rpm.get::<revolution_per_minute>() as f32),
        }
    }
}

#[cfg(windows)]
impl SampleProducer for IRacingProducer {
    fn start(&mut self) -> Result<(), PitwallError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| PitwallError::SampleProducerError {
                description: format!("Could not start async runtime: {}", e),
            })?;
        let retry_delay = std::time::Duration::from_millis(self.retry_wait_ms);
        let client = runtime.block_on(simetry::iracing::Client::connect(retry_delay));

        self.client = Some(client);
        self.runtime = Some(runtime);
        Ok(())
    }

    fn next_output(&mut self) -> Result<Option<LiveOutput>, PitwallError> {
        let (Some(runtime), Some(client)) = (self.runtime.as_ref(), self.client.as_mut()) else {
            return Err(PitwallError::SampleProducerError {
                description: "The iRacing connection is not initialized, call start() first."
                    .to_string(),
            });
        };

        let state = runtime.block_on(client.next_sim_state()).ok_or(
            PitwallError::SampleProducerError {
                description: "Could not retrieve iRacing telemetry".to_string(),
            },
        )?;

        Ok(Some(Self::sample_from_moment(&state).into()))
    }

    fn source_name(&self) -> String {
        "iRacing".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample(speed: f32) -> TelemetrySample {
        TelemetrySample {
            speed: Some(speed),
            ..Default::default()
        }
    }

    #[test]
    fn test_next_output_requires_start() {
        let mut producer = ReplayProducer::from_samples(vec![sample(1.)]);
        assert!(matches!(
            producer.next_output(),
            Err(PitwallError::SampleProducerError { .. })
        ));
    }

    #[test]
    fn test_replay_ends_with_none() {
        let mut producer = ReplayProducer::from_samples(vec![sample(1.), sample(2.)]);
        producer.start().unwrap();
        assert_eq!(producer.next_output().unwrap(), Some(sample(1.).into()));
        assert_eq!(producer.next_output().unwrap(), Some(sample(2.).into()));
        assert_eq!(producer.next_output().unwrap(), None);
    }

    #[test]
    fn test_looped_replay_resets_feed() {
        let mut producer = ReplayProducer::from_samples(vec![sample(1.)]).looped(true);
        producer.start().unwrap();
        assert_eq!(producer.next_output().unwrap(), Some(sample(1.).into()));
        assert_eq!(producer.next_output().unwrap(), Some(LiveOutput::FeedReset));
        assert_eq!(producer.next_output().unwrap(), Some(sample(1.).into()));
    }

    #[test]
    fn test_empty_looped_replay_does_not_spin() {
        let mut producer = ReplayProducer::from_samples(Vec::new()).looped(true);
        producer.start().unwrap();
        assert_eq!(producer.next_output().unwrap(), None);
    }

    #[test]
    fn test_replay_file_accepts_recorded_and_bare_samples() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"Sample":{{"speed":120.0,"gear":4}}}}"#).unwrap();
        writeln!(file, r#""FeedReset""#).unwrap();
        writeln!(file, r#"{{"speed":80,"throttle":55}}"#).unwrap();
        writeln!(file, "this is not json").unwrap();
        writeln!(file, r#"{{"speed":81}}"#).unwrap();
        file.flush().unwrap();

        let mut producer = ReplayProducer::from_file(file.path());
        producer.start().unwrap();

        let mut outputs = Vec::new();
        while let Some(output) = producer.next_output().unwrap() {
            outputs.push(output);
        }

        assert_eq!(
            outputs,
            vec![
                TelemetrySample {
                    speed: Some(120.),
                    gear: Some(4),
                    ..Default::default()
                }
                .into(),
                LiveOutput::FeedReset,
                TelemetrySample {
                    speed: Some(80.),
                    throttle: Some(55.),
                    ..Default::default()
                }
                .into(),
                sample(81.).into(),
            ]
        );
    }

    #[test]
    fn test_missing_replay_file_fails_to_start() {
        let mut producer = ReplayProducer::from_file(Path::new("/definitely/not/here.jsonl"));
        assert!(matches!(
            producer.start(),
            Err(PitwallError::ReplayFileError { .. })
        ));
    }
}
