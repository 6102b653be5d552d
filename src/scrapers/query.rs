//! Per-outlet search: find Wikipedia articles mentioning an outlet and pull
//! the outlet links out of each one.
//!
//! Candidates are consumed as soon as they are paged in, so search requests
//! and article fetches interleave on one task. Two [`RateLimiter`]s space the
//! traffic: one for search pages, one for article fetches.

use super::wikipedia::WikipediaLinkExtractor;
use super::{PageFetcher, SearchBackend, SearchRequest};
use crate::config::{SearchSettings, Settings};
use crate::error::SearchError;
use crate::models::{OutletResult, SearchCandidate};
use crate::throttle::RateLimiter;
use crate::utils::normalize_domain;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, instrument, warn};

/// Build the search query restricting results to Wikipedia pages that
/// mention `website`'s domain.
pub fn build_query(wikipedia_host: &str, website: &str) -> String {
    format!("site:{} {}", wikipedia_host, normalize_domain(website))
}

/// Pages through search results, yielding each unique URL once.
///
/// Stops after `max_results` candidates, when a page adds nothing new, or
/// after the first error.
struct ResultPager<'a, S> {
    backend: &'a S,
    request: &'a SearchRequest,
    gate: &'a mut RateLimiter,
    seen: HashSet<String>,
    buffer: VecDeque<String>,
    start: usize,
    yielded: usize,
    exhausted: bool,
}

impl<'a, S: SearchBackend> ResultPager<'a, S> {
    fn new(backend: &'a S, request: &'a SearchRequest, gate: &'a mut RateLimiter) -> Self {
        Self {
            backend,
            request,
            gate,
            seen: HashSet::new(),
            buffer: VecDeque::new(),
            start: 0,
            yielded: 0,
            exhausted: false,
        }
    }

    async fn next(&mut self) -> Option<Result<SearchCandidate, SearchError>> {
        if self.yielded >= self.request.max_results {
            return None;
        }
        while self.buffer.is_empty() {
            if self.exhausted {
                return None;
            }
            self.gate.acquire().await;
            let page = match self.backend.page(self.request, self.start).await {
                Ok(page) => page,
                Err(e) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
            };
            self.start += page.len();

            let before = self.buffer.len();
            for url in page {
                if self.seen.insert(url.clone()) {
                    self.buffer.push_back(url);
                }
            }
            if self.buffer.len() == before {
                self.exhausted = true;
            }
        }

        self.yielded += 1;
        self.buffer.pop_front().map(Ok)
    }
}

/// Runs the search for one outlet and extracts every candidate article.
#[derive(Debug)]
pub struct SearchQueryRunner<S, F> {
    backend: S,
    extractor: WikipediaLinkExtractor<F>,
    search: SearchSettings,
    search_gate: RateLimiter,
    fetch_gate: RateLimiter,
}

impl<S: SearchBackend, F: PageFetcher> SearchQueryRunner<S, F> {
    pub fn new(backend: S, fetcher: F, settings: &Settings) -> Self {
        Self {
            backend,
            extractor: WikipediaLinkExtractor::new(fetcher),
            search: settings.search.clone(),
            search_gate: RateLimiter::new("search", settings.search.request_interval()),
            fetch_gate: RateLimiter::new("article", settings.candidate_interval()),
        }
    }

    fn request_for(&self, website: &str) -> SearchRequest {
        SearchRequest {
            query: build_query(&self.search.wikipedia_host, website),
            max_results: self.search.max_results,
            region: self.search.region.clone(),
            lang: self.search.lang.clone(),
            start_date: self.search.start_date,
            end_date: self.search.end_date,
        }
    }

    /// Search for `website` and return one [`OutletResult`] per article that
    /// links back to it.
    ///
    /// Never fails: search errors end the search early and extraction errors
    /// skip the article, both with a warning.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&mut self, website: &str) -> Vec<OutletResult> {
        let request = self.request_for(website);
        let mut pager = ResultPager::new(&self.backend, &request, &mut self.search_gate);
        let mut results = Vec::new();
        let mut candidates = 0usize;

        while let Some(next) = pager.next().await {
            let article_url = match next {
                Ok(url) => url,
                Err(e) => {
                    warn!(%website, query = %request.query, error = %e, "Search failed; keeping results so far");
                    break;
                }
            };
            candidates += 1;

            self.fetch_gate.acquire().await;
            match self.extractor.extract(website, &article_url).await {
                Ok(links) if links.is_empty() => {
                    debug!(%website, article = %article_url, "No outlet links in article");
                }
                Ok(links) => results.push(OutletResult { article_url, links }),
                Err(e) => {
                    warn!(%website, article = %article_url, error = %e, "Article extraction failed; skipping");
                }
            }
        }

        info!(%website, candidates, articles = results.len(), "Outlet search complete");
        results
    }
}
