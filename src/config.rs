use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    PitwallError,
    api::{DEFAULT_API_URL, DEFAULT_TIMEOUT_MS, SessionFilters},
    live::DEFAULT_CAPACITY,
};

const CONFIG_DIR_NAME: &str = "pitwall";
const CONFIG_FILE_NAME: &str = "config.json";
pub const DEFAULT_REFRESH_RATE_MS: u64 = 100;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout_ms: u64,
    pub refresh_rate_ms: u64,
    pub live_capacity: usize,
    pub filters: SessionFilters,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_ms: DEFAULT_TIMEOUT_MS,
            refresh_rate_ms: DEFAULT_REFRESH_RATE_MS,
            live_capacity: DEFAULT_CAPACITY,
            filters: SessionFilters::default(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> Result<PathBuf, PitwallError> {
        Ok(dirs::config_dir()
            .ok_or(PitwallError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// The saved config, or the defaults when there is none or it cannot be read.
    pub fn load_or_default() -> Self {
        let loaded = Self::default_path().and_then(|path| Self::from_file(&path));
        match loaded {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Option<Self>, PitwallError> {
        if !path.exists() {
            return Ok(None);
        }
        let file =
            std::fs::File::open(path).map_err(|e| PitwallError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| PitwallError::ConfigSerializeError { source: e })
    }

    /// Write only the session filters. Every other saved setting stays as it is on disk.
    pub fn save_filters(filters: &SessionFilters) -> Result<(), PitwallError> {
        Self::save_filters_to(&Self::default_path()?, filters)
    }

    pub fn save_filters_to(path: &Path, filters: &SessionFilters) -> Result<(), PitwallError> {
        let mut saved = Self::from_file(path)?.unwrap_or_default();
        saved.filters = filters.clone();
        saved.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), PitwallError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PitwallError::ConfigIOError { source: e })?;
        }

        let file =
            std::fs::File::create(path).map_err(|e| PitwallError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| PitwallError::ConfigSerializeError { source: e })
    }
}
