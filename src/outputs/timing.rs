//! Execution-time log, one file per media category.
//!
//! Lines are appended to `{output_dir}/{category}_execution_times.txt`:
//!
//! ```text
//! State CA: 12.41 seconds
//! State AK: 3.07 seconds
//! Overall: 15.52 seconds
//! ```
//!
//! The file is never truncated, so it accumulates every run. Remove it
//! before a run to start clean.

use crate::models::{OVERALL_SCOPE, TimingEntry};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

#[derive(Debug)]
pub struct ExecutionTimer {
    root: PathBuf,
    entries: Vec<TimingEntry>,
}

impl ExecutionTimer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    pub fn log_path(&self, media_category: &str) -> PathBuf {
        self.root.join(format!("{media_category}_execution_times.txt"))
    }

    /// Everything recorded by this timer, in order.
    pub fn entries(&self) -> &[TimingEntry] {
        &self.entries
    }

    /// Record how long one region took within `media_category`.
    pub async fn record(&mut self, media_category: &str, region: &str, elapsed: Duration) {
        self.append(TimingEntry {
            media_category: media_category.to_string(),
            scope: region.to_string(),
            seconds: elapsed.as_secs_f64(),
        })
        .await;
    }

    /// Record the whole run's duration in `media_category`'s log.
    pub async fn record_overall(&mut self, media_category: &str, elapsed: Duration) {
        self.append(TimingEntry {
            media_category: media_category.to_string(),
            scope: OVERALL_SCOPE.to_string(),
            seconds: elapsed.as_secs_f64(),
        })
        .await;
    }

    /// Append the entry's line; a failed write is logged and otherwise ignored.
    async fn append(&mut self, entry: TimingEntry) {
        let path = self.log_path(&entry.media_category);
        let line = entry.log_line();

        let written = async {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(format!("{line}\n").as_bytes()).await?;
            file.flush().await
        }
        .await;

        match written {
            Ok(()) => info!(path = %path.display(), %line, "Recorded execution time"),
            Err(e) => error!(path = %path.display(), error = %e, "Failed to append execution time"),
        }
        self.entries.push(entry);
    }
}
