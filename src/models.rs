//! Data models for search results, extracted links and persisted records.
//!
//! - [`LinkSet`]: outlet links found in one Wikipedia article
//! - [`OutletResult`]: one article URL paired with its [`LinkSet`]
//! - [`SerpRecord`]: everything found for one outlet, one JSON line on disk
//! - [`Batch`]: the records of one (media category, region) pair
//! - [`TimingEntry`]: one line of the execution-time log

use chrono::{DateTime, Local};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Free-form outlet metadata from the catalog, passed through verbatim.
pub type OutletDescriptor = Map<String, Value>;

/// A URL yielded by the search backend for one outlet.
pub type SearchCandidate = String;

/// Deduplicated links pointing at an outlet's domain.
///
/// Stored sorted so the serialized output is stable between runs.
pub type LinkSet = BTreeSet<String>;

/// Links found in one Wikipedia article.
///
/// Serialized as a single-key object: `{"<article url>": ["<link>", ...]}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutletResult {
    pub article_url: String,
    pub links: LinkSet,
}

impl Serialize for OutletResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.article_url, &self.links)?;
        map.end()
    }
}

/// Everything collected for one outlet during a run.
#[derive(Debug, Clone, Serialize)]
pub struct SerpRecord {
    /// The outlet's `website` field as it appears in the catalog.
    pub website: String,
    /// When the record was assembled.
    pub date: DateTime<Local>,
    pub results: Vec<OutletResult>,
    /// The outlet descriptor as listed in the catalog.
    pub media_metadata: OutletDescriptor,
}

impl SerpRecord {
    pub fn new(website: &str, results: Vec<OutletResult>, media_metadata: OutletDescriptor) -> Self {
        Self {
            website: website.to_string(),
            date: Local::now(),
            results,
            media_metadata,
        }
    }
}

/// Records for one (media category, region) pair, in catalog order.
#[derive(Debug, Clone)]
pub struct Batch {
    pub media_category: String,
    pub region: String,
    pub records: Vec<SerpRecord>,
}

impl Batch {
    pub fn new(media_category: &str, region: &str) -> Self {
        Self {
            media_category: media_category.to_string(),
            region: region.to_string(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: SerpRecord) {
        self.records.push(record);
    }

    /// True when no record found any article linking to its outlet.
    ///
    /// Batches in this state are not persisted.
    pub fn has_no_results(&self) -> bool {
        self.records.iter().all(|r| r.results.is_empty())
    }
}

/// Scope name reserved for the whole-run duration.
pub const OVERALL_SCOPE: &str = "Overall";

/// One entry of the execution-time log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingEntry {
    pub media_category: String,
    /// A region name, or [`OVERALL_SCOPE`].
    pub scope: String,
    pub seconds: f64,
}

impl TimingEntry {
    pub fn is_overall(&self) -> bool {
        self.scope == OVERALL_SCOPE
    }

    /// The line written to the log file for this entry.
    pub fn log_line(&self) -> String {
        if self.is_overall() {
            format!("{}: {:.2} seconds", OVERALL_SCOPE, self.seconds)
        } else {
            format!("State {}: {:.2} seconds", self.scope, self.seconds)
        }
    }
}
