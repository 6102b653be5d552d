//! Error types for each failure class of the pipeline.
//!
//! Only [`CatalogError`] and [`ConfigError`] ever reach `main`. The other
//! three are returned by the components and absorbed by their callers after
//! logging, so a single bad page, search or write never stops a run.

use std::path::PathBuf;
use thiserror::Error;

/// Failure while retrieving or reading one article.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid article URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure while paging through search results.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search backend returned status {0}")]
    Status(u16),

    #[error("search page for {query:?} had no results and looks blocked")]
    Blocked { query: String },

    #[error("invalid search endpoint {0}")]
    InvalidEndpoint(String),
}

/// Failure while writing a batch artifact.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure while loading the outlet catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected catalog shape: {0}")]
    Shape(String),
}

/// Failure while loading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file is not valid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let e = FetchError::Status {
            url: "https://en.wikipedia.org/wiki/X".to_string(),
            status: 404,
        };
        assert_eq!(
            e.to_string(),
            "https://en.wikipedia.org/wiki/X returned status 404"
        );
    }

    #[test]
    fn test_persist_error_includes_path() {
        let e = PersistError::Io {
            path: PathBuf::from("news/CA/news_articles_CA.jsonl.gz"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("news/CA/news_articles_CA.jsonl.gz"));
    }
}
