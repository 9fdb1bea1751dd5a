//! Error types for per-item retrieval.
//!
//! Every variant is caught at the item boundary by the batch orchestrator and
//! turned into one progress line plus a continue-or-abort decision
//! ([`RetrievalError::aborts_batch`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that end the processing of a single item.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The record carries no identifier; no request is made.
    #[error("no identifier for '{title}'\n  Suggestion: Add a DOI to the record and retry")]
    MissingIdentifier {
        /// Display title of the record.
        title: String,
    },

    /// The configured endpoint cannot be used as a base URL.
    #[error(
        "invalid endpoint '{endpoint}'\n  Suggestion: Set the endpoint to an absolute URL such as https://sci-hub.ru/"
    )]
    InvalidEndpoint {
        /// The rejected endpoint value.
        endpoint: String,
    },

    /// A page request failed or returned a status other than 200.
    #[error("failed to fetch page {url}: {source}")]
    FetchFailed {
        /// The page URL being fetched.
        url: String,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },

    /// Frame unwrapping revisited a page or exceeded the hop limit.
    #[error(
        "redirect loop unwrapping frames from {url} after {hops} hop(s)\n  Suggestion: The mirror is embedding itself; open the page in a browser"
    )]
    RedirectLoop {
        /// The URL the item started from.
        url: String,
        /// Number of frame hops taken before giving up.
        hops: usize,
    },

    /// The mirror reports the document as unavailable.
    #[error("document not found at {url}")]
    NotFound {
        /// The terminal page URL.
        url: String,
    },

    /// The page is neither a file link nor a "not found" message.
    #[error(
        "no document link at {url}\n  Suggestion: A captcha may be required; complete it in a browser"
    )]
    Ambiguous {
        /// The terminal page URL.
        url: String,
    },

    /// The file request failed or returned a status other than 200.
    #[error("failed to download {url}: {source}")]
    DownloadFailed {
        /// The candidate file URL.
        url: String,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },

    /// The file request succeeded but returned no content.
    #[error("download from {url} returned an empty body")]
    EmptyPayload {
        /// The candidate file URL.
        url: String,
    },

    /// Writing the temporary file failed.
    #[error("IO error writing {path}: {source}")]
    Persist {
        /// The temporary file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The attachment collaborator rejected the file.
    #[error("failed to attach '{title}': {source}")]
    Attach {
        /// The attachment title.
        title: String,
        /// The collaborator's error.
        #[source]
        source: std::io::Error,
    },
}

impl RetrievalError {
    /// Creates a `MissingIdentifier` error.
    pub fn missing_identifier(title: impl Into<String>) -> Self {
        Self::MissingIdentifier {
            title: title.into(),
        }
    }

    /// Creates an `InvalidEndpoint` error.
    pub fn invalid_endpoint(endpoint: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
        }
    }

    /// Creates a `FetchFailed` error.
    pub fn fetch_failed(url: impl Into<String>, source: FetchError) -> Self {
        Self::FetchFailed {
            url: url.into(),
            source,
        }
    }

    /// Creates a `RedirectLoop` error.
    pub fn redirect_loop(url: impl Into<String>, hops: usize) -> Self {
        Self::RedirectLoop {
            url: url.into(),
            hops,
        }
    }

    /// Creates a `NotFound` error.
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Creates an `Ambiguous` error.
    pub fn ambiguous(url: impl Into<String>) -> Self {
        Self::Ambiguous { url: url.into() }
    }

    /// Creates a `DownloadFailed` error.
    pub fn download_failed(url: impl Into<String>, source: FetchError) -> Self {
        Self::DownloadFailed {
            url: url.into(),
            source,
        }
    }

    /// Returns true when the remaining batch must stop after this error.
    ///
    /// Only a missing identifier and a clean "not found" let the batch move
    /// on; anything else is treated as a sign the mirror will keep
    /// challenging requests.
    #[must_use]
    pub fn aborts_batch(&self) -> bool {
        !matches!(self, Self::MissingIdentifier { .. } | Self::NotFound { .. })
    }
}
