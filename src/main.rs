use std::{path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use egui::Vec2;
use log::{info, warn};
use pitwall::{
    AppConfig, HttpBackend, PitwallError, SessionFilters, TelemetryBackend,
    api::load_sessions,
    dashboard::format::{format_date, format_lap_time, format_laps_count},
    ui::{DashboardApp, LiveSource},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Base URL of the telemetry backend, overrides the saved config
    #[arg(short, long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Browse and analyse recorded sessions
    Dashboard,
    /// Print the sessions matching the filters
    Sessions {
        #[arg(long)]
        game: Option<String>,
        #[arg(long)]
        car: Option<String>,
        #[arg(long)]
        track: Option<String>,
        #[arg(long, value_parser = ["clear", "rain", "overcast"])]
        weather: Option<String>,
    },
    /// Open the dashboard in live mode
    Live {
        /// JSON-lines file to replay instead of reading from the simulator
        #[arg(short, long)]
        replay: Option<PathBuf>,

        /// Record every received sample to this JSON-lines file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of samples kept in the live charts
        #[arg(short, long)]
        capacity: Option<usize>,
    },
}

fn load_config(api_url: Option<String>) -> AppConfig {
    let mut app_config = AppConfig::load_or_default();
    if let Some(api_url) = api_url {
        app_config.api_url = api_url;
    }
    app_config
}

fn run_dashboard(
    app_config: AppConfig,
    live_source: Option<LiveSource>,
    live_output: Option<PathBuf>,
) -> Result<(), PitwallError> {
    info!("Using telemetry backend at {}", app_config.api_url);
    let backend: Arc<dyn TelemetryBackend + Send + Sync> = Arc::new(HttpBackend::new(
        &app_config.api_url,
        app_config.request_timeout_ms,
    ));

    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1280., 800.))
        .with_min_inner_size(Vec2::new(800., 500.));

    eframe::run_native(
        "Pitwall Telemetry",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(DashboardApp::new(
                backend,
                app_config,
                live_source,
                live_output,
                cc,
            )))
        }),
    )
    .map_err(|source| PitwallError::WindowError { source })
}

fn sessions(app_config: &AppConfig, filters: SessionFilters) -> Result<(), PitwallError> {
    let backend = HttpBackend::new(&app_config.api_url, app_config.request_timeout_ms);
    let sessions = load_sessions(&backend, &filters)?;
    if sessions.is_empty() {
        println!("No sessions found");
        return Ok(());
    }
    for session in sessions {
        println!(
            "{:<8} {:<32} {:<10} {:>10} {:>7}  {} {}",
            session.id.to_string(),
            session.session_name,
            format_date(session.created_at.as_deref()),
            format_lap_time(session.best_lap_time),
            format_laps_count(session.valid_laps, session.total_laps),
            session.game_name(),
            session.track_name(),
        );
    }
    Ok(())
}

fn live(
    mut app_config: AppConfig,
    replay: Option<PathBuf>,
    output: Option<PathBuf>,
    capacity: Option<usize>,
) -> Result<(), PitwallError> {
    if let Some(capacity) = capacity {
        app_config.live_capacity = capacity;
    }
    let source = match replay {
        Some(path) => LiveSource::Replay { path, looped: true },
        #[cfg(windows)]
        None => LiveSource::IRacing,
        #[cfg(not(windows))]
        None => {
            return Err(PitwallError::NoLiveSource {
                description: "simulator telemetry is only available on Windows, use --replay"
                    .to_string(),
            });
        }
    };
    run_dashboard(app_config, Some(source), output)
}

fn main() -> Result<(), PitwallError> {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let app_config = load_config(cli.api_url);
    match cli.command {
        Commands::Dashboard => run_dashboard(app_config, None, None),
        Commands::Sessions {
            game,
            car,
            track,
            weather,
        } => {
            let filters = SessionFilters {
                game: game.unwrap_or_default(),
                car: car.unwrap_or_default(),
                track: track.unwrap_or_default(),
                weather: weather.unwrap_or_default(),
            };
            sessions(&app_config, filters)
        }
        Commands::Live {
            replay,
            output,
            capacity,
        } => live(app_config, replay, output, capacity),
    }
}
