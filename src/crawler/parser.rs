//! HTML link extraction

use crate::url::resolve_link;
use scraper::{Html, Selector};
use url::Url;

/// Extracts anchor links from HTML content, resolved against the base URL
///
/// Only links that resolve to valid absolute http(s) URLs are returned;
/// `mailto:`, `javascript:`, fragments-only, and malformed hrefs are
/// dropped. Duplicate hrefs on a page are returned as-is — the frontier's
/// seen-set deduplicates on enqueue.
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base_url, href))
        .collect()
}
