//! Drives a full run: every outlet of the catalog, one (region, category)
//! pair at a time.
//!
//! For each pair the outlets are searched in catalog order, their records
//! collected into a [`Batch`], the batch persisted (when any outlet found
//! something) and the pair's duration logged. Nothing in here fails the run;
//! component errors are logged and counted in the [`RunSummary`].

use crate::catalog::{Catalog, CatalogPair};
use crate::models::{Batch, SerpRecord};
use crate::outputs::jsonl::BatchWriter;
use crate::outputs::timing::ExecutionTimer;
use crate::scrapers::query::SearchQueryRunner;
use crate::scrapers::{PageFetcher, SearchBackend};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument};

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub outlets_processed: usize,
    pub outlets_skipped: usize,
    pub batches_written: usize,
    pub batches_failed: usize,
    pub elapsed: Duration,
}

pub struct Pipeline<S, F> {
    runner: SearchQueryRunner<S, F>,
    writer: BatchWriter,
    timer: ExecutionTimer,
}

impl<S: SearchBackend, F: PageFetcher> Pipeline<S, F> {
    pub fn new(runner: SearchQueryRunner<S, F>, writer: BatchWriter, timer: ExecutionTimer) -> Self {
        Self {
            runner,
            writer,
            timer,
        }
    }

    pub fn timer(&self) -> &ExecutionTimer {
        &self.timer
    }

    /// Process the whole catalog.
    #[instrument(level = "info", skip_all, fields(outlets = catalog.len()))]
    pub async fn run(&mut self, catalog: &Catalog) -> RunSummary {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        let mut categories: Vec<&str> = Vec::new();

        for pair in catalog.pairs() {
            if !categories.contains(&pair.media_category) {
                categories.push(pair.media_category);
            }
            self.run_pair(&pair, &mut summary).await;
        }

        summary.elapsed = started.elapsed();
        for category in categories {
            self.timer.record_overall(category, summary.elapsed).await;
        }
        summary
    }

    #[instrument(level = "info", skip_all, fields(region = pair.region, category = pair.media_category))]
    async fn run_pair(&mut self, pair: &CatalogPair<'_>, summary: &mut RunSummary) {
        let started = Instant::now();
        let mut batch = Batch::new(pair.media_category, pair.region);

        for entry in &pair.entries {
            let Some(website) = entry.website() else {
                debug!(outlet = ?entry.outlet, "Outlet has no website; skipping");
                summary.outlets_skipped += 1;
                continue;
            };

            let results = self.runner.run(website).await;
            batch.push(SerpRecord::new(website, results, entry.outlet.clone()));
            summary.outlets_processed += 1;
        }

        if batch.has_no_results() {
            info!(records = batch.records.len(), "No results for pair; nothing to write");
        } else {
            match self.writer.write(&batch).await {
                Ok(_) => summary.batches_written += 1,
                Err(e) => {
                    error!(error = %e, "Failed to write batch; continuing");
                    summary.batches_failed += 1;
                }
            }
        }

        self.timer
            .record(pair.media_category, pair.region, started.elapsed())
            .await;
    }
}
