//! Command-line interface definitions.
//!
//! Flags override values from the optional settings file; most can also be
//! provided through environment variables.

use crate::config::Settings;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for `wiki_backlinks`.
///
/// # Examples
///
/// ```sh
/// # Basic usage
/// wiki_backlinks -c catalog.json -o ./serp
///
/// # Settings file plus a narrower search
/// wiki_backlinks -c catalog.json --config settings.yaml --max-results 10 --search-region ca
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// JSON catalog of outlets: {region: {media category: [outlet, ...]}}
    #[arg(short, long, env = "WIKI_BACKLINKS_CATALOG")]
    pub catalog: PathBuf,

    /// Root directory for artifacts and timing logs
    #[arg(short, long, env = "WIKI_BACKLINKS_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Optional path to a YAML settings file
    #[arg(long, env = "WIKI_BACKLINKS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Maximum unique search results per outlet
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Country code used to localize the search (e.g. "us")
    #[arg(long)]
    pub search_region: Option<String>,

    /// Interface language for the search backend
    #[arg(long)]
    pub lang: Option<String>,

    /// Seconds between search page requests
    #[arg(long)]
    pub search_interval: Option<f64>,

    /// Seconds between Wikipedia article fetches
    #[arg(long)]
    pub candidate_interval: Option<f64>,

    /// Only return results published on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Only return results published on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// User-Agent sent with Wikipedia requests
    #[arg(long, env = "WIKI_BACKLINKS_USER_AGENT")]
    pub user_agent: Option<String>,
}

impl Cli {
    /// Apply every flag that was given on top of `settings`.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(dir) = &self.output_dir {
            settings.output_dir = dir.clone();
        }
        if let Some(n) = self.max_results {
            settings.search.max_results = n;
        }
        if let Some(region) = &self.search_region {
            settings.search.region = Some(region.clone());
        }
        if let Some(lang) = &self.lang {
            settings.search.lang = lang.clone();
        }
        if let Some(secs) = self.search_interval {
            settings.search.request_interval_secs = secs;
        }
        if let Some(secs) = self.candidate_interval {
            settings.candidate_interval_secs = secs;
        }
        if self.start_date.is_some() {
            settings.search.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            settings.search.end_date = self.end_date;
        }
        if let Some(ua) = &self.user_agent {
            settings.fetch.user_agent = ua.clone();
        }
    }
}
