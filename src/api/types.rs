// Payloads returned by the telemetry backend.
//
// Everything here is computed server-side; the dashboard only displays it. Fields the
// backend leaves out or sends as null deserialize to their defaults.

use std::{collections::BTreeMap, fmt::Display};

use serde::{Deserialize, Deserializer, Serialize};

/// Backend record identifier. Some deployments use integer keys, others strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Int(0)
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Text(value.to_string())
    }
}

/// A game, car or track as listed by the backend.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamedRef {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub session_name: String,
    pub created_at: Option<String>,
    pub best_lap_time: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub valid_laps: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_laps: u32,
    pub game: Option<NamedRef>,
    pub car: Option<NamedRef>,
    pub track: Option<NamedRef>,
    pub weather_condition: Option<String>,
    pub track_temperature: Option<f64>,
    pub air_temperature: Option<f64>,
    pub humidity: Option<f64>,
}

impl SessionSummary {
    pub fn game_name(&self) -> &str {
        self.game.as_ref().map(|g| g.name.as_str()).unwrap_or("")
    }

    pub fn track_name(&self) -> &str {
        self.track.as_ref().map(|t| t.name.as_str()).unwrap_or("")
    }
}

fn valid_by_default() -> bool {
    true
}

/// A `null` in a non-optional field reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_valid<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_else(valid_by_default))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lap_number: u32,
    #[serde(default)]
    pub lap_time: Option<f64>,
    #[serde(default)]
    pub sector_1_time: Option<f64>,
    #[serde(default)]
    pub sector_2_time: Option<f64>,
    #[serde(default)]
    pub sector_3_time: Option<f64>,
    #[serde(default)]
    pub top_speed: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_personal_best: bool,
    #[serde(default = "valid_by_default", deserialize_with = "null_as_valid")]
    pub is_valid: bool,
}

impl Default for Lap {
    fn default() -> Self {
        Self {
            id: RecordId::default(),
            lap_number: 0,
            lap_time: None,
            sector_1_time: None,
            sector_2_time: None,
            sector_3_time: None,
            top_speed: None,
            is_personal_best: false,
            is_valid: true,
        }
    }
}

impl Lap {
    pub fn sector_times(&self) -> [Option<f64>; 3] {
        [self.sector_1_time, self.sector_2_time, self.sector_3_time]
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapStatistics {
    pub best_lap_time: Option<f64>,
    pub average_lap_time: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub valid_laps: u32,
    pub average_consistency: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorStats {
    pub best_time: Option<f64>,
    pub average_time: Option<f64>,
    pub worst_time: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Recommendation {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub priority: String,
    #[serde(deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionAnalysis {
    #[serde(deserialize_with = "null_as_default")]
    pub statistics: LapStatistics,
    /// Keyed by sector name, e.g. `sector_1`
    pub sector_analysis: Option<BTreeMap<String, SectorStats>>,
    #[serde(deserialize_with = "null_as_default")]
    pub recommendations: Vec<Recommendation>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparedSector {
    pub sector_time: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparedLap {
    #[serde(deserialize_with = "null_as_default")]
    pub id: RecordId,
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lap_number: u32,
    pub lap_time: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub sectors: Vec<ComparedSector>,
    pub top_speed: Option<f64>,
}

impl ComparedLap {
    pub fn sector_time(&self, idx: usize) -> Option<f64> {
        self.sectors.get(idx).and_then(|s| s.sector_time)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorLeaderEntry {
    #[serde(deserialize_with = "null_as_default")]
    pub username: String,
    pub time: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectorLeader {
    #[serde(deserialize_with = "null_as_default")]
    pub fastest: SectorLeaderEntry,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonAnalysis {
    pub fastest_lap: Option<RecordId>,
    #[serde(deserialize_with = "null_as_default")]
    pub sector_comparison: BTreeMap<String, SectorLeader>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LapComparison {
    #[serde(deserialize_with = "null_as_default")]
    pub laps: Vec<ComparedLap>,
    #[serde(deserialize_with = "null_as_default")]
    pub analysis: ComparisonAnalysis,
}

/// Values offered by the session filter drop-downs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterOptions {
    pub games: Vec<NamedRef>,
    pub cars: Vec<NamedRef>,
    pub tracks: Vec<NamedRef>,
}

// Response envelopes. The backend flags failures with `success: false`.

#[derive(Deserialize)]
pub(crate) struct SessionsEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sessions: Vec<SessionSummary>,
}

#[derive(Deserialize)]
pub(crate) struct LapsEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub laps: Vec<Lap>,
}

#[derive(Deserialize)]
pub(crate) struct AnalysisEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub analysis: Option<SessionAnalysis>,
}

#[derive(Deserialize)]
pub(crate) struct ComparisonEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(default)]
    pub comparison: Option<LapComparison>,
}

#[derive(Deserialize)]
pub(crate) struct GamesEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub games: Vec<NamedRef>,
}

#[derive(Deserialize)]
pub(crate) struct CarsEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub cars: Vec<NamedRef>,
}

#[derive(Deserialize)]
pub(crate) struct TracksEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks: Vec<NamedRef>,
}

#[derive(Serialize)]
pub(crate) struct CompareRequest<'a> {
    pub lap_ids: &'a [RecordId],
}
