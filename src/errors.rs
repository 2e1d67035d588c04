// Error types for pitwall

use crate::telemetry::LiveOutput;
use snafu::Snafu;
use std::{io, sync::mpsc::SendError};

#[derive(Debug, Snafu)]
pub enum PitwallError {
    // Errors talking to the telemetry backend
    #[snafu(display("Request to {url} failed"))]
    BackendRequestError {
        url: String,
        source: Box<ureq::Error>,
    },
    #[snafu(display("Could not decode response from {url}"))]
    BackendDecodeError { url: String, source: io::Error },
    #[snafu(display("Backend rejected request to {url}"))]
    BackendRejected { url: String },
    #[snafu(display("At least 2 laps are required for a comparison, got {count}"))]
    NotEnoughLapsToCompare { count: usize },

    // Errors while reading and broadcasting live samples
    #[snafu(display("Unable to open telemetry replay {path}"))]
    ReplayFileError { path: String, source: io::Error },
    #[snafu(display("Telemetry sample producer error"))]
    SampleProducerError { description: String },
    #[snafu(display("Error broadcasting telemetry sample"))]
    SampleBroadcastError { source: Box<SendError<LiveOutput>> },

    // Errors for the sample recorder
    #[snafu(display("Error writing telemetry recording"))]
    RecorderError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // UI errors
    #[snafu(display("No live telemetry source available: {description}"))]
    NoLiveSource { description: String },
    #[snafu(display("Could not start the dashboard window"))]
    WindowError { source: eframe::Error },
}

impl From<SendError<LiveOutput>> for PitwallError {
    fn from(value: SendError<LiveOutput>) -> Self {
        PitwallError::SampleBroadcastError {
            source: Box::new(value),
        }
    }
}
