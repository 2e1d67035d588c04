use std::{
    path::PathBuf,
    sync::mpsc::{self, Receiver},
    thread,
};

use egui::{Color32, Visuals, style::Widgets};
use log::{Level, error, info};

use crate::{
    PitwallError,
    telemetry::{LiveOutput, ReplayProducer, collect_samples},
    writer,
};

pub(crate) mod analysis_view;
pub(crate) mod dashboard_app;
pub(crate) mod live_view;
pub(crate) mod sidebar;

pub use dashboard_app::DashboardApp;

/// Messages the live feed may queue ahead of the live session before it has to wait.
const FEED_QUEUE_CAPACITY: usize = 256;

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);
pub(crate) const PALETTE_ORANGE: Color32 = Color32::from_rgb(242, 97, 63);

pub(crate) const SPEED_COLOR: Color32 = Color32::from_rgb(75, 192, 192);
pub(crate) const THROTTLE_COLOR: Color32 = Color32::from_rgb(34, 197, 94);
pub(crate) const BRAKE_COLOR: Color32 = Color32::from_rgb(239, 68, 68);
pub(crate) const LAP_TIME_COLOR: Color32 = Color32::from_rgb(59, 130, 246);

pub(crate) fn dashboard_visuals() -> Visuals {
    Visuals {
        dark_mode: true,
        hyperlink_color: PALETTE_MAROON,
        faint_bg_color: PALETTE_BLACK,
        extreme_bg_color: PALETTE_BROWN,
        panel_fill: PALETTE_BLACK,
        button_frame: true,
        widgets: Widgets::dark(),
        striped: true,
        ..Default::default()
    }
}

/// Where live mode reads its samples from.
#[derive(Clone, Debug, PartialEq)]
pub enum LiveSource {
    Replay { path: PathBuf, looped: bool },
    #[cfg(windows)]
    IRacing,
}

/// Start the feed thread for `source` (and the recorder thread when `output` is set) and
/// hand back the receiving end for a `LiveSession`.
pub fn spawn_live_feed(
    source: &LiveSource,
    output: Option<PathBuf>,
    refresh_rate_ms: u64,
) -> Receiver<LiveOutput> {
    let (sample_tx, sample_rx) = mpsc::sync_channel::<LiveOutput>(FEED_QUEUE_CAPACITY);

    let recorder_tx = output.map(|output_file| {
        let (recorder_tx, recorder_rx) = mpsc::channel::<LiveOutput>();
        thread::spawn(move || {
            if let Err(e) = writer::write_samples(&output_file, recorder_rx) {
                error!("Error while recording telemetry: {}", e);
            }
        });
        recorder_tx
    });

    match source.clone() {
        LiveSource::Replay { path, looped } => {
            thread::spawn(move || {
                let producer = ReplayProducer::from_file(&path).looped(looped);
                log_feed_end(collect_samples(
                    producer,
                    sample_tx,
                    recorder_tx,
                    refresh_rate_ms,
                ));
            });
        }
        #[cfg(windows)]
        LiveSource::IRacing => {
            thread::spawn(move || {
                let producer = crate::telemetry::producer::IRacingProducer::default();
                log_feed_end(collect_samples(
                    producer,
                    sample_tx,
                    recorder_tx,
                    refresh_rate_ms,
                ));
            });
        }
    }

    sample_rx
}

/// Stopping live mode drops the session's receiver, which ends the feed with a broadcast
/// error. That is a normal stop, anything else is a failure.
fn feed_end_level(result: &Result<(), PitwallError>) -> Level {
    match result {
        Ok(()) | Err(PitwallError::SampleBroadcastError { .. }) => Level::Info,
        Err(_) => Level::Error,
    }
}

fn log_feed_end(result: Result<(), PitwallError>) {
    match (feed_end_level(&result), result) {
        (_, Ok(())) => info!("Live feed finished"),
        (Level::Info, Err(e)) => info!("Live feed stopped: {}", e),
        (_, Err(e)) => error!("Live feed failed: {}", e),
    }
}

/// Blend from `start` to `end`, `y` in 0..=1.
pub(crate) fn stroke_shade(start: Color32, end: Color32, y: f32) -> Color32 {
    let y = y.clamp(0., 1.);
    let blend = |from: u8, to: u8| (from as f32 + y * (to as f32 - from as f32)).round() as u8;
    Color32::from_rgb(
        blend(start.r(), end.r()),
        blend(start.g(), end.g()),
        blend(start.b(), end.b()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopping_live_mode_is_not_a_feed_failure() {
        let (tx, rx) = mpsc::channel::<LiveOutput>();
        drop(rx);
        let hung_up = Err(PitwallError::from(
            tx.send(LiveOutput::FeedReset).unwrap_err(),
        ));
        assert_eq!(feed_end_level(&hung_up), Level::Info);
        assert_eq!(feed_end_level(&Ok(())), Level::Info);

        let missing_replay = Err(PitwallError::SampleProducerError {
            description: "no such file".to_string(),
        });
        assert_eq!(feed_end_level(&missing_replay), Level::Error);
    }

    #[test]
    fn test_stroke_shade_bounds() {
        assert_eq!(stroke_shade(PALETTE_ORANGE, Color32::RED, 0.), PALETTE_ORANGE);
        assert_eq!(
            stroke_shade(PALETTE_ORANGE, Color32::RED, 1.),
            Color32::from_rgb(255, 0, 0)
        );
        // brake values above 100% do not overflow
        assert_eq!(
            stroke_shade(PALETTE_ORANGE, Color32::RED, 1.7),
            Color32::from_rgb(255, 0, 0)
        );
    }
}
