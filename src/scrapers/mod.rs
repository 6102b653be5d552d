//! Search and fetch layers used to discover outlet backlinks.
//!
//! The pipeline talks to the network through two traits:
//!
//! | Trait | Default implementation | Role |
//! |-------|------------------------|------|
//! | [`SearchBackend`] | [`google::GoogleSearch`] | Turns a query into pages of candidate URLs |
//! | [`PageFetcher`] | [`HttpFetcher`] | Downloads one article |
//!
//! On top of those:
//! - [`wikipedia`]: extracts outlet links from one article
//! - [`query`]: runs the search for one outlet and extracts every candidate
//!
//! Both traits use native `async fn`; callers are generic over them and run
//! everything on a single task.

pub mod google;
pub mod query;
pub mod wikipedia;

use crate::config::FetchSettings;
use crate::error::{FetchError, SearchError};
use chrono::NaiveDate;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// A downloaded page. Non-success statuses are returned, not raised.
#[derive(Debug, Clone)]
pub struct Page {
    pub status: u16,
    pub body: String,
}

impl Page {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Downloads article markup.
pub trait PageFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

/// Parameters of one search query, independent of the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    pub region: Option<String>,
    pub lang: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Produces search results one page at a time.
///
/// `start` is the zero-based offset of the first wanted result. An empty
/// page means the backend has nothing more.
pub trait SearchBackend {
    async fn page(&self, request: &SearchRequest, start: usize) -> Result<Vec<String>, SearchError>;
}

/// [`PageFetcher`] backed by a shared `reqwest` client with a fixed user agent.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &FetchSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, bytes = body.len(), "Fetched page");
        Ok(Page { status, body })
    }
}
