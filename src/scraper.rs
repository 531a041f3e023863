//! Extracts image references from a web page.

use select::{document::Document, predicate::Name};
use url::{Position, Url};

use crate::Result;

/// Fetches `url` and returns every image it references, in document order.
///
/// The status code is not inspected: whatever body the server sends back is
/// parsed as HTML.
pub async fn scrape_website(client: &reqwest::Client, url: &str) -> Result<Vec<String>> {
    tracing::info!("Scraping: {url}");
    let body = client.get(url).send().await?.text().await?;
    let urls = extract_image_urls(&body, url)?;
    tracing::info!("  Found {} images", urls.len());
    Ok(urls)
}

/// Collects the `src` of every `img` element in `html`.
///
/// Inline `data:` sources and empty sources are skipped. Anything not
/// starting with `http` is resolved against the origin of `page_url`.
/// Duplicates are kept.
pub fn extract_image_urls(html: &str, page_url: &str) -> Result<Vec<String>> {
    let page = Url::parse(page_url)?;

    Ok(Document::from(html)
        .find(Name("img"))
        .filter_map(|node| node.attr("src"))
        .filter(|src| !src.is_empty() && !src.starts_with("data:"))
        .map(|src| resolve_src(src, &page))
        .collect())
}

/// Rewrites a non-absolute `src` as `{scheme}://{netloc}/{src}`.
///
/// Leading slashes are stripped from `src`, so a path is always taken from
/// the root of the page's origin, never relative to the page itself.
pub fn resolve_src(src: &str, page: &Url) -> String {
    if src.starts_with("http") {
        return src.to_string();
    }

    let netloc = &page[Position::BeforeUsername..Position::AfterPort];
    format!(
        "{}://{netloc}/{}",
        page.scheme(),
        src.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::{Router, response::Html, routing::get};

    const PAGE: &str = "http://example.com/page";

    #[test]
    fn test_absolute_sources_kept_in_order() {
        let html = r#"
            <html><body>
              <img src="https://cdn.example.org/one.png">
              <p><img src="http://example.com/two.jpg"></p>
              <img src="https://other.net/three.gif?v=2">
            </body></html>
        "#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example.org/one.png",
                "http://example.com/two.jpg",
                "https://other.net/three.gif?v=2",
            ]
        );
    }

    #[test]
    fn test_root_relative_source() {
        let urls = extract_image_urls(r#"<img src="/a/b.png">"#, PAGE).unwrap();
        assert_eq!(urls, vec!["http://example.com/a/b.png"]);
    }

    #[test]
    fn test_relative_source_resolves_against_origin() {
        let urls = extract_image_urls(r#"<img src="img/x.png">"#, "https://example.com/blog/post")
            .unwrap();
        assert_eq!(urls, vec!["https://example.com/img/x.png"]);
    }

    #[test]
    fn test_data_sources_skipped() {
        let html = r#"
            <img src="data:image/png;base64,iVBORw0KGgo=">
            <img src="/real.png">
            <img src="data:">
        "#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls, vec!["http://example.com/real.png"]);
    }

    #[test]
    fn test_missing_and_empty_sources_skipped() {
        let html = r#"<img alt="none"><img src=""><img src="/x.png">"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls, vec!["http://example.com/x.png"]);
    }

    #[test]
    fn test_duplicates_kept() {
        let html = r#"<img src="/x.png"><img src="/x.png">"#;
        let urls = extract_image_urls(html, PAGE).unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[test]
    fn test_port_and_scheme_preserved() {
        let page = Url::parse("https://localhost:8443/gallery/").unwrap();
        assert_eq!(
            resolve_src("//pic.png", &page),
            "https://localhost:8443/pic.png"
        );
    }

    #[test]
    fn test_protocol_relative_resolves_against_page_host() {
        let page = Url::parse(PAGE).unwrap();
        assert_eq!(
            resolve_src("//cdn.example.org/x.png", &page),
            "http://example.com/cdn.example.org/x.png"
        );
    }

    #[test]
    fn test_invalid_page_url() {
        let result = extract_image_urls("<img src=\"/x.png\">", "not a url");
        assert!(matches!(result, Err(crate::Error::Url(_))));
    }

    #[tokio::test]
    async fn test_scrape_website_fetches_page() {
        let app = Router::new().route(
            "/page",
            get(|| async { Html(r#"<img src="/a.png"><img src="data:x"><img src="b/c.jpg">"#) }),
        );
        let base = spawn_server(app).await;

        let client = reqwest::Client::new();
        let urls = scrape_website(&client, &format!("{base}/page")).await.unwrap();
        assert_eq!(urls, vec![format!("{base}/a.png"), format!("{base}/b/c.jpg")]);
    }
}
