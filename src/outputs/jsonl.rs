//! Gzip-compressed JSON Lines output for batches.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! └── news/
//!     └── CA/
//!         └── news_articles_CA.jsonl.gz
//! ```
//!
//! One [`SerpRecord`](crate::models::SerpRecord) per line, in batch order.
//! A file from an earlier run for the same pair is replaced. There is no
//! protection against an interrupted write leaving a truncated file.

use crate::error::PersistError;
use crate::models::Batch;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Writes batch artifacts under a fixed output root.
#[derive(Debug, Clone)]
pub struct BatchWriter {
    root: PathBuf,
}

impl BatchWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `{root}/{category}/{region}/{category}_articles_{region}.jsonl.gz`
    pub fn artifact_path(&self, media_category: &str, region: &str) -> PathBuf {
        self.root
            .join(media_category)
            .join(region)
            .join(format!("{media_category}_articles_{region}.jsonl.gz"))
    }

    /// Serialize and write `batch`, creating its directory if needed.
    ///
    /// Returns the path written.
    #[instrument(level = "info", skip_all, fields(category = %batch.media_category, region = %batch.region, records = batch.records.len()))]
    pub async fn write(&self, batch: &Batch) -> Result<PathBuf, PersistError> {
        let path = self.artifact_path(&batch.media_category, &batch.region);
        let compressed = encode(batch, &path)?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await.map_err(|source| PersistError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, compressed)
            .await
            .map_err(|source| PersistError::Io {
                path: path.clone(),
                source,
            })?;

        info!(path = %path.display(), "Wrote batch artifact");
        Ok(path)
    }
}

fn encode(batch: &Batch, path: &Path) -> Result<Vec<u8>, PersistError> {
    let io_err = |source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    for record in &batch.records {
        serde_json::to_writer(&mut encoder, record)?;
        encoder.write_all(b"\n").map_err(io_err)?;
    }
    encoder.finish().map_err(io_err)
}
