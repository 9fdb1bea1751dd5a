//! Availability classification of a terminal (unwrapped) page.
//!
//! Classification is pure: it looks only at the parsed document and the URL
//! it was served from.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use super::compile_static_selector;
use super::links::CandidateFile;

static PDF_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("#pdf"));
static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("body"));

/// Phrases mirrors use to say the document is not available, in the
/// languages they are served in.
pub const NOT_FOUND_PHRASES: &[&str] = &[
    "please try to search again using doi",
    "статья не найдена в базе",
    "article not found",
    "sci-hub has no access to this paper",
    "no paper with this doi",
    "not found in database",
];

static NOT_FOUND_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = NOT_FOUND_PHRASES
        .iter()
        .map(|phrase| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:{alternation})"))
        .unwrap_or_else(|e| panic!("invalid not-found phrase regex: {e}"))
});

/// Result of classifying one page. Exactly one is produced per page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// The page names a direct file link.
    DirectLink(CandidateFile),
    /// The page says the document is not available.
    NotFound,
    /// Neither a file link nor a recognized "not found" message; usually a
    /// bot challenge or a transient outage page.
    Ambiguous,
}

/// Classifies a fetched page.
///
/// A missing document, an empty body, or a body containing any of
/// [`NOT_FOUND_PHRASES`] is `NotFound`, even when a direct link element is
/// present. Otherwise a resolvable link on the `#pdf` element is a
/// `DirectLink`, and anything else is `Ambiguous`.
#[must_use]
pub fn classify(document: Option<&Html>, page_url: &Url, upgrade_insecure: bool) -> Classification {
    let Some(document) = document else {
        return Classification::NotFound;
    };

    let body = document
        .select(&BODY_SELECTOR)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default();

    if body.trim().is_empty() || body_reports_not_found(&body) {
        return Classification::NotFound;
    }

    match direct_link(document, page_url, upgrade_insecure) {
        Some(candidate) => Classification::DirectLink(candidate),
        None => Classification::Ambiguous,
    }
}

/// Returns true when `body` contains a known "not found" phrase.
#[must_use]
pub fn body_reports_not_found(body: &str) -> bool {
    NOT_FOUND_RE.is_match(body)
}

fn direct_link(document: &Html, page_url: &Url, upgrade_insecure: bool) -> Option<CandidateFile> {
    let element = document.select(&PDF_SELECTOR).next()?;
    let raw = element
        .value()
        .attr("src")
        .or_else(|| element.value().attr("href"))?;
    CandidateFile::from_direct_link(raw, page_url, upgrade_insecure)
}
