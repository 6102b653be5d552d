//! # wiki_backlinks
//!
//! Finds the Wikipedia articles that mention each media outlet in a catalog
//! and records which of their links point back at the outlet's own website.
//!
//! ## Usage
//!
//! ```sh
//! wiki_backlinks -c catalog.json -o ./serp
//! ```
//!
//! ## Architecture
//!
//! The run is a single sequential pipeline:
//! 1. **Search**: query `site:en.wikipedia.org <outlet domain>` page by page
//! 2. **Extract**: fetch each candidate article and keep links into the outlet's domain
//! 3. **Batch**: collect one record per outlet for each (region, media category) pair
//! 4. **Output**: write each batch as gzip JSON Lines and log per-region timings
//!
//! Search pages and article fetches each go through their own rate limiter.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod catalog;
mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod throttle;
mod utils;

use catalog::Catalog;
use cli::Cli;
use config::Settings;
use outputs::{jsonl::BatchWriter, timing::ExecutionTimer};
use pipeline::Pipeline;
use scrapers::{HttpFetcher, google::GoogleSearch, query::SearchQueryRunner};
use std::time::Duration;
use utils::ensure_writable_dir;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("wiki_backlinks starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // ---- Settings: defaults, then file, then flags ----
    let mut settings = match &args.config {
        Some(path) => Settings::from_yaml_file(path)?,
        None => Settings::default(),
    };
    args.apply_overrides(&mut settings);
    if let (Some(start), Some(end)) = (settings.search.start_date, settings.search.end_date)
        && start > end
    {
        warn!(%start, %end, "Search start date is after end date; expect no results");
    }
    debug!(?settings, "Effective settings");

    if let Err(e) = ensure_writable_dir(&settings.output_dir).await {
        error!(
            path = %settings.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let catalog = Catalog::from_json_file(&args.catalog)?;
    if catalog.is_empty() {
        warn!(path = %args.catalog.display(), "Catalog has no outlets; nothing to do");
    }

    // ---- Wire the pipeline ----
    let fetcher = HttpFetcher::new(&settings.fetch)?;
    let search = GoogleSearch::new(
        &settings.search,
        Duration::from_secs(settings.fetch.timeout_secs),
    )?;
    let runner = SearchQueryRunner::new(search, fetcher, &settings);
    let mut pipeline = Pipeline::new(
        runner,
        BatchWriter::new(&settings.output_dir),
        ExecutionTimer::new(&settings.output_dir),
    );

    let summary = pipeline.run(&catalog).await;

    info!(
        elapsed = ?summary.elapsed,
        secs = summary.elapsed.as_secs(),
        millis = summary.elapsed.subsec_millis(),
        processed = summary.outlets_processed,
        skipped = summary.outlets_skipped,
        batches = summary.batches_written,
        failed_batches = summary.batches_failed,
        timings = pipeline.timer().entries().len(),
        "Execution complete"
    );

    Ok(())
}
