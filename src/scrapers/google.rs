//! Google web search as a [`SearchBackend`].
//!
//! Uses the plain HTML results page. Each organic result links through a
//! `/url?q=<target>&...` redirect, which is decoded back to the target URL.
//!
//! # Request parameters
//!
//! | Param | Source |
//! |-------|--------|
//! | `q` | query, e.g. `site:en.wikipedia.org sfgate.com` |
//! | `num` | `max_results + 2` |
//! | `hl` | interface language |
//! | `start` | result offset |
//! | `safe` | safe-search mode |
//! | `gl` | country code, when a region is set |
//! | `tbs` | `cdr:1,cd_min:..,cd_max:..` when a date range is set |

use super::{SearchBackend, SearchRequest};
use crate::config::SearchSettings;
use crate::error::SearchError;
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use reqwest::Client;
use reqwest::header::COOKIE;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

static RESULT_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Pre-accepted consent cookie; without it EU clients get an interstitial.
const CONSENT_COOKIE: &str = "CONSENT=PENDING+987; SOCS=CAESHAgBEhIaAB";

/// Text-mode browsers get the lightweight results page that carries plain
/// `/url?q=` links.
const USER_AGENTS: &[&str] = &[
    "Lynx/2.8.9rel.1 libwww-FM/2.14 SSL-MM/1.4.1 GNUTLS/3.6.5",
    "Lynx/2.9.0dev.10 libwww-FM/2.14 SSL-MM/1.4.1 GNUTLS/3.7.1",
    "Lynx/2.9.0dev.12 libwww-FM/2.14 SSL-MM/1.4.1 GNUTLS/3.7.8",
    "Links (2.29; Linux 6.1.0-13-amd64 x86_64; GNU C 12.2; text)",
];

#[derive(Debug, Clone)]
pub struct GoogleSearch {
    client: Client,
    endpoint: Url,
    safe: String,
}

impl GoogleSearch {
    pub fn new(settings: &SearchSettings, timeout: Duration) -> Result<Self, SearchError> {
        let endpoint = Url::parse(&settings.endpoint)
            .map_err(|_| SearchError::InvalidEndpoint(settings.endpoint.clone()))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            safe: settings.safe.clone(),
        })
    }

    fn params(&self, request: &SearchRequest, start: usize) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", request.query.clone()),
            ("num", request.max_results.saturating_add(2).to_string()),
            ("hl", request.lang.clone()),
            ("start", start.to_string()),
            ("safe", self.safe.clone()),
        ];
        if let Some(region) = &request.region {
            params.push(("gl", region.clone()));
        }
        if let Some(tbs) = date_range(request.start_date, request.end_date) {
            params.push(("tbs", tbs));
        }
        params
    }
}

impl SearchBackend for GoogleSearch {
    #[instrument(level = "info", skip(self, request), fields(query = %request.query))]
    async fn page(&self, request: &SearchRequest, start: usize) -> Result<Vec<String>, SearchError> {
        let user_agent = USER_AGENTS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&self.params(request, start))
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(COOKIE, CONSENT_COOKIE)
            .send()
            .await?;

        let status = response.status();
        let landed_on = response.url().path().to_string();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let body = response.text().await?;

        let urls = parse_results(&body);
        if landed_on.starts_with("/sorry") || (urls.is_empty() && body.contains("unusual traffic")) {
            warn!(
                body_preview = %truncate_for_log(&body, 200),
                "Search backend is rate limiting us"
            );
            return Err(SearchError::Blocked {
                query: request.query.clone(),
            });
        }

        debug!(start, count = urls.len(), "Parsed search page");
        Ok(urls)
    }
}

/// Extract organic result URLs from a results page, in page order.
pub fn parse_results(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&RESULT_LINK)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(decode_redirect)
        .collect()
}

/// `/url?q=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FX&sa=U` -> the target URL.
fn decode_redirect(href: &str) -> Option<String> {
    let encoded = href.strip_prefix("/url?q=")?;
    let encoded = encoded.split('&').next().unwrap_or_default();
    let decoded = urlencoding::decode(encoded).ok()?;
    let target = Url::parse(&decoded).ok()?;
    matches!(target.scheme(), "http" | "https").then(|| decoded.into_owned())
}

fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<String> {
    if start.is_none() && end.is_none() {
        return None;
    }
    let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%m/%d/%Y").to_string()).unwrap_or_default();
    Some(format!("cdr:1,cd_min:{},cd_max:{}", fmt(start), fmt(end)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="ezO2md"><a href="/url?q=https://en.wikipedia.org/wiki/SFGate&amp;sa=U&amp;ved=1">SFGate</a></div>
          <div class="ezO2md"><a href="/url?q=https%3A%2F%2Fen.wikipedia.org%2Fwiki%2FSan_Francisco_Chronicle&amp;sa=U">Chronicle</a></div>
          <a href="/search?q=next&amp;start=10">Next</a>
          <a href="https://accounts.google.com/ServiceLogin">Sign in</a>
          <a href="/url?q=/settings&amp;sa=U">Settings</a>
        </body></html>"#;

    fn request() -> SearchRequest {
        SearchRequest {
            query: "site:en.wikipedia.org sfgate.com".to_string(),
            max_results: 10,
            region: Some("us".to_string()),
            lang: "en".to_string(),
            start_date: None,
            end_date: None,
        }
    }

    fn backend(server: &MockServer) -> GoogleSearch {
        let settings = SearchSettings {
            endpoint: format!("{}/search", server.uri()),
            ..SearchSettings::default()
        };
        GoogleSearch::new(&settings, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_parse_results_decodes_redirects() {
        let urls = parse_results(RESULTS_PAGE);
        assert_eq!(
            urls,
            vec![
                "https://en.wikipedia.org/wiki/SFGate".to_string(),
                "https://en.wikipedia.org/wiki/San_Francisco_Chronicle".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_results_empty_page() {
        assert!(parse_results("<html><body>No results</body></html>").is_empty());
    }

    #[test]
    fn test_date_range() {
        assert_eq!(date_range(None, None), None);
        assert_eq!(
            date_range(
                NaiveDate::from_ymd_opt(2022, 1, 1),
                NaiveDate::from_ymd_opt(2022, 12, 31)
            ),
            Some("cdr:1,cd_min:01/01/2022,cd_max:12/31/2022".to_string())
        );
        assert_eq!(
            date_range(NaiveDate::from_ymd_opt(2022, 1, 1), None),
            Some("cdr:1,cd_min:01/01/2022,cd_max:".to_string())
        );
    }

    #[test]
    fn test_invalid_endpoint() {
        let settings = SearchSettings {
            endpoint: "not a url".to_string(),
            ..SearchSettings::default()
        };
        let err = GoogleSearch::new(&settings, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_num_saturates_on_huge_max_results() {
        let search = GoogleSearch::new(&SearchSettings::default(), Duration::from_secs(1)).unwrap();
        let mut req = request();
        req.max_results = usize::MAX;
        let params = search.params(&req, 0);
        assert!(params.contains(&("num", usize::MAX.to_string())));
    }

    #[tokio::test]
    async fn test_page_sends_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "site:en.wikipedia.org sfgate.com"))
            .and(query_param("num", "12"))
            .and(query_param("hl", "en"))
            .and(query_param("start", "10"))
            .and(query_param("safe", "active"))
            .and(query_param("gl", "us"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let urls = backend(&server).page(&request(), 10).await.unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_page_sends_date_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("tbs", "cdr:1,cd_min:01/01/2022,cd_max:12/31/2022"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let mut req = request();
        req.start_date = NaiveDate::from_ymd_opt(2022, 1, 1);
        req.end_date = NaiveDate::from_ymd_opt(2022, 12, 31);
        let urls = backend(&server).page(&req, 0).await.unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_page_rate_limited_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = backend(&server).page(&request(), 0).await.unwrap_err();
        assert!(matches!(err, SearchError::Status(429)));
    }

    #[tokio::test]
    async fn test_page_captcha_is_blocked() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html>Our systems have detected unusual traffic from your computer</html>",
            ))
            .mount(&server)
            .await;

        let err = backend(&server).page(&request(), 0).await.unwrap_err();
        assert!(matches!(err, SearchError::Blocked { .. }));
    }

    #[tokio::test]
    async fn test_results_mentioning_unusual_traffic_are_kept() {
        let server = MockServer::start().await;
        let body = RESULTS_PAGE.replace("SFGate</a>", "SFGate saw unusual traffic on election night</a>");
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let urls = backend(&server).page(&request(), 0).await.unwrap();
        assert_eq!(urls.len(), 2);
    }
}
