//! Utility functions for domain comparison and log formatting.
//!
//! - Domain normalization used to decide whether a link points at an outlet
//! - String truncation for logging response bodies
//! - File system validation for the output directory

use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Reduce a URL or bare host to the domain used for outlet comparison.
///
/// The input is parsed as a URL. When that yields no host (a bare
/// `example.com`, a `mailto:` link, a fragment), the path component is used
/// instead. The result is lowercased, then one leading `www.` and one
/// trailing `/` are removed.
///
/// The result is only meant for substring checks: a link belongs to an
/// outlet when its normalized domain contains the outlet's. Malformed input
/// never errors, it just produces a string that is unlikely to match anything.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_domain("https://www.sfgate.com/article?x=1"), "sfgate.com");
/// assert_eq!(normalize_domain("sfgate.com/"), "sfgate.com");
/// ```
pub fn normalize_domain(url_or_host: &str) -> String {
    let trimmed = url_or_host.trim();
    let location = match parse_absolute(trimmed) {
        Some(url) => match url.host_str() {
            Some(host) if !host.is_empty() => match url.port() {
                Some(port) => format!("{host}:{port}"),
                None => host.to_string(),
            },
            _ => url.path().to_string(),
        },
        None => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let location = location.to_ascii_lowercase();
    let location = location.strip_prefix("www.").unwrap_or(&location);
    location.strip_suffix('/').unwrap_or(location).to_string()
}

fn parse_absolute(s: &str) -> Option<Url> {
    if s.starts_with("//") {
        return Url::parse(&format!("https:{s}")).ok();
    }
    Url::parse(s).ok()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backing off to a char boundary) with
/// an ellipsis and byte count appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a probe file.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let probe = path.join("..__probe_write__");
    fs::write(&probe, b"").await?;
    let _ = fs::remove_file(&probe).await;
    info!("Output directory is writable");
    Ok(())
}
