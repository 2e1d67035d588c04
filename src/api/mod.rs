// Client side of the telemetry backend REST API

mod types;

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::PitwallError;

pub use types::{
    ComparedLap, ComparedSector, ComparisonAnalysis, FilterOptions, Lap, LapComparison,
    LapStatistics, NamedRef, Recommendation, RecordId, SectorLeader, SectorLeaderEntry,
    SectorStats, SessionAnalysis, SessionSummary,
};
use types::{
    AnalysisEnvelope, CarsEnvelope, CompareRequest, ComparisonEnvelope, GamesEnvelope,
    LapsEnvelope, SessionsEnvelope, TracksEnvelope,
};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

const SESSIONS_PATH: &str = "/api/telemetry/sessions";
const ANALYSIS_PATH: &str = "/api/telemetry/analysis";
const COMPARE_PATH: &str = "/api/telemetry/compare";
const GAMES_PATH: &str = "/api/games";
const CARS_PATH: &str = "/api/cars";
const TRACKS_PATH: &str = "/api/tracks";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Weather {
    Clear,
    Rain,
    Overcast,
}

impl Weather {
    pub const ALL: [Weather; 3] = [Weather::Clear, Weather::Rain, Weather::Overcast];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weather::Clear => "clear",
            Weather::Rain => "rain",
            Weather::Overcast => "overcast",
        }
    }
}

/// Session list filters. An empty value means "any".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFilters {
    pub game: String,
    pub car: String,
    pub track: String,
    pub weather: String,
}

impl SessionFilters {
    /// Query parameters for the filters that are set.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("game", self.game.as_str()),
            ("car", self.car.as_str()),
            ("track", self.track.as_str()),
            ("weather", self.weather.as_str()),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }
}

/// Everything the dashboard asks of the telemetry backend.
pub trait TelemetryBackend {
    fn list_sessions(&self, filters: &SessionFilters) -> Result<Vec<SessionSummary>, PitwallError>;

    fn filter_options(&self) -> Result<FilterOptions, PitwallError>;

    fn session_laps(&self, session_id: &RecordId) -> Result<Vec<Lap>, PitwallError>;

    fn session_analysis(&self, session_id: &RecordId) -> Result<SessionAnalysis, PitwallError>;

    /// Compare two or more laps.
    ///
    /// # Errors
    ///
    /// `NotEnoughLapsToCompare` when fewer than 2 laps are given; the request is not sent.
    fn compare_laps(&self, lap_ids: &[RecordId]) -> Result<LapComparison, PitwallError>;
}

/// The explicit "filters changed, fetch again" request.
pub fn load_sessions(
    backend: &dyn TelemetryBackend,
    filters: &SessionFilters,
) -> Result<Vec<SessionSummary>, PitwallError> {
    backend.list_sessions(filters)
}

/// Blocking HTTP implementation of [`TelemetryBackend`].
pub struct HttpBackend {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout_ms: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, PitwallError> {
        let url = self.url(path);
        debug!("GET {} {:?}", url, query);
        let mut request = self.agent.get(&url);
        for (key, value) in query {
            request = request.query(key, value);
        }
        let response = request
            .call()
            .map_err(|e| PitwallError::BackendRequestError {
                url: url.clone(),
                source: Box::new(e),
            })?;
        response
            .into_json::<T>()
            .map_err(|e| PitwallError::BackendDecodeError { url, source: e })
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, PitwallError> {
        let url = self.url(path);
        debug!("POST {}", url);
        let response = self
            .agent
            .post(&url)
            .send_json(body)
            .map_err(|e| PitwallError::BackendRequestError {
                url: url.clone(),
                source: Box::new(e),
            })?;
        response
            .into_json::<T>()
            .map_err(|e| PitwallError::BackendDecodeError { url, source: e })
    }

    fn rejected(&self, path: &str) -> PitwallError {
        let url = self.url(path);
        warn!("Backend answered {} with success = false", url);
        PitwallError::BackendRejected { url }
    }
}

impl TelemetryBackend for HttpBackend {
    fn list_sessions(&self, filters: &SessionFilters) -> Result<Vec<SessionSummary>, PitwallError> {
        let envelope: SessionsEnvelope = self.get_json(SESSIONS_PATH, &filters.query_pairs())?;
        if !envelope.success {
            return Err(self.rejected(SESSIONS_PATH));
        }
        Ok(envelope.sessions)
    }

    fn filter_options(&self) -> Result<FilterOptions, PitwallError> {
        let games: GamesEnvelope = self.get_json(GAMES_PATH, &[])?;
        let cars: CarsEnvelope = self.get_json(CARS_PATH, &[])?;
        let tracks: TracksEnvelope = self.get_json(TRACKS_PATH, &[])?;
        Ok(FilterOptions {
            games: games.games,
            cars: cars.cars,
            tracks: tracks.tracks,
        })
    }

    fn session_laps(&self, session_id: &RecordId) -> Result<Vec<Lap>, PitwallError> {
        let path = format!("{}/{}/laps", SESSIONS_PATH, session_id);
        let envelope: LapsEnvelope = self.get_json(&path, &[])?;
        if !envelope.success {
            return Err(self.rejected(&path));
        }
        Ok(envelope.laps)
    }

    fn session_analysis(&self, session_id: &RecordId) -> Result<SessionAnalysis, PitwallError> {
        let path = format!("{}/{}", ANALYSIS_PATH, session_id);
        let envelope: AnalysisEnvelope = self.get_json(&path, &[])?;
        match envelope.analysis {
            Some(analysis) if envelope.success => Ok(analysis),
            _ => Err(self.rejected(&path)),
        }
    }

    fn compare_laps(&self, lap_ids: &[RecordId]) -> Result<LapComparison, PitwallError> {
        if lap_ids.len() < 2 {
            return Err(PitwallError::NotEnoughLapsToCompare {
                count: lap_ids.len(),
            });
        }
        let envelope: ComparisonEnvelope =
            self.post_json(COMPARE_PATH, &CompareRequest { lap_ids })?;
        match envelope.comparison {
            Some(comparison) if envelope.success => Ok(comparison),
            _ => Err(self.rejected(COMPARE_PATH)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_set_filters_are_sent() {
        let filters = SessionFilters {
            game: "acc".to_string(),
            weather: Weather::Rain.as_str().to_string(),
            ..Default::default()
        };
        assert_eq!(
            filters.query_pairs(),
            vec![("game", "acc"), ("weather", "rain")]
        );
        assert!(SessionFilters::default().is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:5000/", DEFAULT_TIMEOUT_MS);
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(
            backend.url(SESSIONS_PATH),
            "http://localhost:5000/api/telemetry/sessions"
        );
    }

    #[test]
    fn test_compare_needs_two_laps() {
        // nothing listens here, the request must never be sent
        let backend = HttpBackend::new("http://127.0.0.1:9", DEFAULT_TIMEOUT_MS);
        let result = backend.compare_laps(&[RecordId::from(1)]);
        assert!(matches!(
            result,
            Err(PitwallError::NotEnoughLapsToCompare { count: 1 })
        ));
    }
}
