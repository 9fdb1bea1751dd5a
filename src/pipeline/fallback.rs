//! Fallback link extraction for pages without a usable direct link.

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::compile_static_selector;
use super::links::resolve_on_page;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("a[href]"));

/// Substrings that mark a hyperlink as a likely file or mirror link.
pub const FALLBACK_MARKERS: &[&str] = &["/pdf/", "gateway", "sci-hub", "doi.org", "ipfs"];

/// Returns true when an `href` looks like a file or mirror link.
#[must_use]
pub fn is_fallback_href(href: &str) -> bool {
    href.ends_with(".pdf") || FALLBACK_MARKERS.iter().any(|marker| href.contains(marker))
}

/// Returns the first matching hyperlink in document order, resolved against
/// the page URL.
#[must_use]
pub fn first_fallback_link(document: &Html, page_url: &Url) -> Option<Url> {
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && is_fallback_href(href))
        .find_map(|href| resolve_on_page(href, page_url))
}
