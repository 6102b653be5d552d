//! Run settings, loaded from an optional YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) is a valid
//! configuration. Command-line flags are applied on top by
//! [`crate::cli::Cli::apply_overrides`].
//!
//! ```yaml
//! output_dir: ./out
//! candidate_interval_secs: 2
//! search:
//!   max_results: 50
//!   request_interval_secs: 5
//!   region: us
//!   start_date: 2022-01-01
//!   end_date: 2022-12-31
//! fetch:
//!   timeout_secs: 30
//! ```

use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; wiki_backlinks/0.1; +https://github.com/wiki-backlinks)";

pub const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root under which `{category}/{region}/` artifacts and timing logs go.
    pub output_dir: PathBuf,
    /// Minimum spacing between Wikipedia article fetches.
    pub candidate_interval_secs: f64,
    pub search: SearchSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub endpoint: String,
    pub max_results: usize,
    /// Minimum spacing between search page requests.
    pub request_interval_secs: f64,
    /// Two-letter country code passed as `gl`, or none.
    pub region: Option<String>,
    pub lang: String,
    pub safe: String,
    pub wikipedia_host: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            candidate_interval_secs: 2.0,
            search: SearchSettings::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: GOOGLE_SEARCH_URL.to_string(),
            max_results: 50,
            request_interval_secs: 5.0,
            region: Some("us".to_string()),
            lang: "en".to_string(),
            safe: "active".to_string(),
            wikipedia_host: "en.wikipedia.org".to_string(),
            start_date: None,
            end_date: None,
        }
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_yaml_str(&raw)?;
        info!(path = %path.display(), "Loaded settings file");
        Ok(settings)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn candidate_interval(&self) -> Duration {
        secs(self.candidate_interval_secs)
    }
}

impl SearchSettings {
    pub fn request_interval(&self) -> Duration {
        secs(self.request_interval_secs)
    }
}

/// Negative or non-finite values mean "no delay".
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
