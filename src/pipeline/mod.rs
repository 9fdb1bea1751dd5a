//! Retrieval pipeline: page fetch, frame unwrapping, availability
//! classification and fallback link extraction.
//!
//! # Architecture
//!
//! - [`Retriever`] - Drives the bounded fetch → unwrap → classify loop for one item
//! - [`frame_target`] - Detects aggregator pages embedding the real page in a frame
//! - [`classify`] - Pure page classification into [`Classification`]
//! - [`first_fallback_link`] - Heuristic mirror/file link for pages without a direct link
//! - [`CandidateFile`] - Absolute, HTTPS-normalized file URL handed to download
//!
//! Frame unwrapping is an explicit loop with a hop counter and a visited set;
//! a page that re-embeds itself fails with [`RetrievalError::RedirectLoop`]
//! instead of recursing.

mod classify;
mod error;
mod fallback;
mod links;
mod unwrap;

pub use classify::{Classification, NOT_FOUND_PHRASES, body_reports_not_found, classify};
pub use error::RetrievalError;
pub use fallback::{FALLBACK_MARKERS, first_fallback_link, is_fallback_href};
pub use links::{CandidateFile, origin_of, resolve_on_page};
pub use unwrap::frame_target;

use std::collections::HashSet;

use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

use crate::fetch::{FetchResult, PageClient};

/// Default maximum number of frame hops followed per item.
pub const DEFAULT_MAX_UNWRAP_DEPTH: usize = 5;

/// Compiles a CSS selector at static init; panics on invalid pattern.
pub(crate) fn compile_static_selector(pattern: &str) -> Selector {
    Selector::parse(pattern).unwrap_or_else(|e| panic!("invalid static selector '{pattern}': {e}"))
}

/// Tuning for the retrieval loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Maximum frame hops before failing with `RedirectLoop`.
    pub max_unwrap_depth: usize,
    /// Rewrite `http:` direct links to `https:`.
    ///
    /// Only loopback test setups turn this off.
    pub upgrade_insecure_links: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_unwrap_depth: DEFAULT_MAX_UNWRAP_DEPTH,
            upgrade_insecure_links: true,
        }
    }
}

/// Successful retrieval outcome for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// A direct file link to download.
    Direct {
        /// The normalized file URL.
        candidate: CandidateFile,
        /// The terminal page the link was found on.
        page_url: Url,
    },
    /// No direct link, but a likely mirror/file link exists; the user has to
    /// complete the item in a browser.
    FallbackAvailable {
        /// The heuristically chosen link.
        link: Url,
        /// The terminal page the link was found on.
        page_url: Url,
    },
}

enum PageStep {
    Unwrap(Url),
    Settled(Result<Availability, RetrievalError>),
}

/// Runs the per-item retrieval loop against one [`PageClient`].
#[derive(Debug, Clone)]
pub struct Retriever {
    client: PageClient,
    config: PipelineConfig,
}

impl Retriever {
    /// Creates a retriever.
    #[must_use]
    pub fn new(client: PageClient, config: PipelineConfig) -> Self {
        Self { client, config }
    }

    /// Returns the underlying client, shared with the download step.
    #[must_use]
    pub fn client(&self) -> &PageClient {
        &self.client
    }

    /// Returns the loop configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Resolves an item page to a direct file link or a fallback link.
    ///
    /// # Errors
    ///
    /// - `FetchFailed` when any page request fails or answers non-200
    /// - `RedirectLoop` when frames revisit a page or exceed `max_unwrap_depth`
    /// - `NotFound` / `Ambiguous` when the terminal page has no usable link
    #[instrument(skip(self), fields(start = %start))]
    pub async fn retrieve(&self, start: &Url) -> Result<Availability, RetrievalError> {
        let mut current = start.clone();
        let mut visited: HashSet<String> = HashSet::new();
        let mut hops: usize = 0;

        loop {
            visited.insert(current.to_string());

            let page = self
                .client
                .fetch_page(&current)
                .await
                .and_then(FetchResult::ensure_success)
                .map_err(|e| RetrievalError::fetch_failed(current.as_str(), e))?;

            match self.inspect_page(&page) {
                PageStep::Unwrap(next) => {
                    hops += 1;
                    if hops > self.config.max_unwrap_depth || visited.contains(next.as_str()) {
                        return Err(RetrievalError::redirect_loop(start.as_str(), hops));
                    }
                    debug!(from = %current, to = %next, hops, "Unwrapping embedded frame");
                    current = next;
                }
                PageStep::Settled(result) => {
                    match &result {
                        Ok(Availability::Direct { candidate, .. }) => {
                            info!(candidate = %candidate, hops, "Direct link found");
                        }
                        Ok(Availability::FallbackAvailable { link, .. }) => {
                            info!(link = %link, hops, "Fallback link found");
                        }
                        Err(error) => debug!(error = %error, hops, "No document link"),
                    }
                    return result;
                }
            }
        }
    }

    // Parsing stays in this synchronous helper so the non-Send document
    // never lives across an await point.
    fn inspect_page(&self, page: &FetchResult) -> PageStep {
        let document = page.document.as_deref().map(Html::parse_document);

        if let Some(next) = document
            .as_ref()
            .and_then(|doc| frame_target(doc, &page.url))
        {
            return PageStep::Unwrap(next);
        }

        let classification = classify(
            document.as_ref(),
            &page.url,
            self.config.upgrade_insecure_links,
        );
        let fallback = || {
            document
                .as_ref()
                .and_then(|doc| first_fallback_link(doc, &page.url))
        };

        PageStep::Settled(match classification {
            Classification::DirectLink(candidate) => Ok(Availability::Direct {
                candidate,
                page_url: page.url.clone(),
            }),
            Classification::NotFound => match fallback() {
                Some(link) => Ok(Availability::FallbackAvailable {
                    link,
                    page_url: page.url.clone(),
                }),
                None => Err(RetrievalError::not_found(page.url.as_str())),
            },
            Classification::Ambiguous => match fallback() {
                Some(link) => Ok(Availability::FallbackAvailable {
                    link,
                    page_url: page.url.clone(),
                }),
                None => Err(RetrievalError::ambiguous(page.url.as_str())),
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fetch::HttpTimeouts;

    fn retriever() -> Retriever {
        Retriever::new(
            PageClient::new(HttpTimeouts::default()).unwrap(),
            PipelineConfig::default(),
        )
    }

    fn page(html: &str) -> FetchResult {
        FetchResult {
            status: 200,
            url: Url::parse("https://sci-hub.ru/10.1/x").unwrap(),
            document: Some(html.to_string()),
        }
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.max_unwrap_depth, 5);
        assert!(config.upgrade_insecure_links);
    }

    #[tokio::test]
    async fn test_inspect_page_frame_takes_precedence() {
        let step = retriever().inspect_page(&page(
            r#"<body><iframe src="https://inner.example/10.1/x"></iframe><embed id="pdf" src="/a.pdf"></body>"#,
        ));
        let PageStep::Unwrap(next) = step else {
            panic!("expected unwrap step");
        };
        assert_eq!(next.as_str(), "https://inner.example/10.1/x");
    }

    #[tokio::test]
    async fn test_inspect_page_not_found_escalates_to_fallback() {
        let step = retriever().inspect_page(&page(
            r#"<body><p>Article not found</p><a href="https://library.example/x.pdf">mirror</a></body>"#,
        ));
        let PageStep::Settled(Ok(Availability::FallbackAvailable { link, .. })) = step else {
            panic!("expected fallback");
        };
        assert_eq!(link.as_str(), "https://library.example/x.pdf");
    }

    #[tokio::test]
    async fn test_inspect_page_not_found_without_links() {
        let step = retriever().inspect_page(&page("<body><p>Article not found</p></body>"));
        assert!(matches!(
            step,
            PageStep::Settled(Err(RetrievalError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_inspect_page_ambiguous_without_links() {
        let step = retriever().inspect_page(&page("<body><p>Are you a robot?</p></body>"));
        assert!(matches!(
            step,
            PageStep::Settled(Err(RetrievalError::Ambiguous { .. }))
        ));
    }
}
