// Library interface for pitwall
// This allows integration tests and benches to access internal modules

pub mod api;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod live;
pub mod telemetry;
pub mod ui;
pub mod writer;

// Re-export commonly used types
pub use api::{HttpBackend, SessionFilters, TelemetryBackend};
pub use config::AppConfig;
pub use dashboard::{Action, Dashboard, DashboardState, Effect, MainView};
pub use errors::PitwallError;
pub use live::{LiveSampleBuffer, LiveSession};
pub use telemetry::{LiveOutput, TelemetrySample};
