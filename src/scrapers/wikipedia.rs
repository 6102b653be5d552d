//! Outlet link extraction from Wikipedia articles.
//!
//! Given an article and an outlet website, collect every anchor that points
//! into the outlet's domain. Site-relative hrefs (`/wiki/...`, `//host/...`)
//! are resolved against the article URL first, so internal Wikipedia links
//! fall out naturally and protocol-relative outlet links are kept.

use super::PageFetcher;
use crate::error::FetchError;
use crate::models::LinkSet;
use crate::utils::normalize_domain;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static ANCHOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// Fetches articles and keeps the links that belong to an outlet.
#[derive(Debug, Clone)]
pub struct WikipediaLinkExtractor<F> {
    fetcher: F,
}

impl<F: PageFetcher> WikipediaLinkExtractor<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Fetch `article_url` and return the links pointing at `website`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Status`] for non-success responses, or whatever the
    /// fetcher reports for transport failures. The caller decides whether to
    /// skip the article.
    #[instrument(level = "info", skip(self))]
    pub async fn extract(&self, website: &str, article_url: &str) -> Result<LinkSet, FetchError> {
        let base = Url::parse(article_url).map_err(|source| FetchError::InvalidUrl {
            url: article_url.to_string(),
            source,
        })?;

        let page = self.fetcher.fetch(article_url).await?;
        if !page.is_success() {
            return Err(FetchError::Status {
                url: article_url.to_string(),
                status: page.status,
            });
        }

        let links = extract_links(&page.body, &base, website);
        debug!(count = links.len(), "Extracted outlet links");
        Ok(links)
    }
}

/// Collect the hrefs in `html` whose domain contains `website`'s domain.
pub fn extract_links(html: &str, article_url: &Url, website: &str) -> LinkSet {
    let target = normalize_domain(website);
    if target.is_empty() {
        return LinkSet::new();
    }
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve(article_url, href.trim()))
        .filter(|href| normalize_domain(href).contains(&target))
        .collect()
}

/// Resolve site-relative hrefs against the article; leave the rest as written.
fn resolve(article_url: &Url, href: &str) -> Option<String> {
    if href.is_empty() {
        return None;
    }
    if href.starts_with('/') {
        return article_url.join(href).ok().map(String::from);
    }
    Some(href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::Page;
    use std::collections::HashMap;

    const SFGATE_ARTICLE: &str = r#"
        <html><body>
          <a href="/wiki/San_Francisco">San Francisco</a>
          <a href="https://sfgate.com/article">SFGate story</a>
        </body></html>"#;

    struct StaticFetcher {
        pages: HashMap<String, Page>,
    }

    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            Ok(self.pages.get(url).cloned().unwrap_or(Page {
                status: 404,
                body: String::new(),
            }))
        }
    }

    fn article() -> Url {
        Url::parse("https://en.wikipedia.org/wiki/SFGate").unwrap()
    }

    #[test]
    fn test_extract_links_sfgate_scenario() {
        let links = extract_links(SFGATE_ARTICLE, &article(), "https://sfgate.com");
        assert_eq!(
            links.into_iter().collect::<Vec<_>>(),
            vec!["https://sfgate.com/article".to_string()]
        );
    }

    #[test]
    fn test_site_relative_links_resolve_to_article_origin() {
        let html = r#"<a href="/wiki/Main_Page">x</a>"#;
        let links = extract_links(html, &article(), "wikipedia.org");
        assert!(links.contains("https://en.wikipedia.org/wiki/Main_Page"));
    }

    #[test]
    fn test_protocol_relative_outlet_link_is_kept() {
        let html = r#"<a href="//www.sfgate.com/news">x</a>"#;
        let links = extract_links(html, &article(), "sfgate.com");
        assert!(links.contains("https://www.sfgate.com/news"));
    }

    #[test]
    fn test_subdomains_and_duplicates() {
        let html = r##"
            <a href="https://blog.sfgate.com/post">a</a>
            <a href="https://blog.sfgate.com/post">b</a>
            <a href="http://www.sfgate.com/">c</a>
            <a href="https://example.com/?ref=sfgate.com">d</a>
            <a href="#cite_note-1">e</a>
            <a href="mailto:desk@sfgate.com">f</a>
            <a>no href</a>"##;
        let links = extract_links(html, &article(), "https://www.sfgate.com/");

        assert_eq!(links.len(), 3);
        assert!(links.contains("https://blog.sfgate.com/post"));
        assert!(links.contains("http://www.sfgate.com/"));
        // Only the href's domain is compared, never its query string.
        assert!(!links.contains("https://example.com/?ref=sfgate.com"));
        // Host-less hrefs fall back to their path, which can contain the domain.
        assert!(links.contains("mailto:desk@sfgate.com"));
    }

    #[test]
    fn test_domain_match_is_substring() {
        let html = r#"<a href="https://notsfgate.com/a">a</a><a href="https://sfgate.co/b">b</a>"#;
        let links = extract_links(html, &article(), "sfgate.com");
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://notsfgate.com/a"));
    }

    #[test]
    fn test_mixed_case_bare_website() {
        let html = r#"<a href="https://SFGate.com/a">a</a><a href="https://www.sfgate.com/b">b</a>"#;
        let bare = extract_links(html, &article(), "SFGate.com");
        let full = extract_links(html, &article(), "https://SFGate.com");
        assert_eq!(bare.len(), 2);
        assert_eq!(bare, full);
    }

    #[test]
    fn test_every_link_matches_target_domain() {
        let html = r#"
            <a href="https://adn.com/alaska">1</a>
            <a href="https://www.adn.com">2</a>
            <a href="/wiki/Anchorage">3</a>
            <a href="https://web.archive.org/web/2020/https://adn.com/">4</a>
            <a href="https://twitter.com/adndotcom">5</a>"#;
        let links = extract_links(html, &article(), "adn.com");
        assert_eq!(links.len(), 2);
        for link in &links {
            assert!(normalize_domain(link).contains("adn.com"), "{link}");
        }
    }

    #[test]
    fn test_empty_website_matches_nothing() {
        assert!(extract_links(SFGATE_ARTICLE, &article(), "").is_empty());
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let links = extract_links("<a href='https://sfgate.com/x'><div></a", &article(), "sfgate.com");
        assert!(links.contains("https://sfgate.com/x"));
    }

    #[tokio::test]
    async fn test_extract_fetches_article() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://en.wikipedia.org/wiki/SFGate".to_string(),
            Page {
                status: 200,
                body: SFGATE_ARTICLE.to_string(),
            },
        );
        let extractor = WikipediaLinkExtractor::new(StaticFetcher { pages });

        let links = extractor
            .extract("https://sfgate.com", "https://en.wikipedia.org/wiki/SFGate")
            .await
            .unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.contains("https://sfgate.com/article"));
    }

    #[tokio::test]
    async fn test_extract_non_success_status() {
        let extractor = WikipediaLinkExtractor::new(StaticFetcher {
            pages: HashMap::new(),
        });
        let err = extractor
            .extract("https://sfgate.com", "https://en.wikipedia.org/wiki/Gone")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_extract_invalid_article_url() {
        let extractor = WikipediaLinkExtractor::new(StaticFetcher {
            pages: HashMap::new(),
        });
        let err = extractor
            .extract("https://sfgate.com", "not a url")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
