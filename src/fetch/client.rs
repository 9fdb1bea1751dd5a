//! HTTP client wrapper for page fetches and file downloads.
//!
//! A single [`PageClient`] is built per run and reused for every request so
//! connections are pooled. Every request carries [`MOBILE_USER_AGENT`] and is
//! bounded by [`HttpTimeouts`]; nothing at this layer retries.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, ClientBuilder, Proxy, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::FetchError;
use crate::user_agent::MOBILE_USER_AGENT;

/// Default connect timeout in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Per-request time budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    /// Connection establishment timeout.
    pub connect: Duration,
    /// Whole request timeout, including reading the body.
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            request: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Outcome of a page request.
///
/// Only status 200 counts as success; `document` holds the HTML source and
/// is `None` for any other status.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// HTTP status code returned by the server.
    pub status: u16,
    /// Final URL after transport-level redirects; relative links resolve against it.
    pub url: Url,
    /// HTML source of the page.
    pub document: Option<String>,
}

impl FetchResult {
    /// Returns true when the server answered 200.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == StatusCode::OK.as_u16()
    }

    /// Converts a non-200 result into [`FetchError::HttpStatus`].
    ///
    /// # Errors
    ///
    /// Returns `FetchError::HttpStatus` when `status` is not 200.
    pub fn ensure_success(self) -> Result<Self, FetchError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FetchError::http_status(self.url.as_str(), self.status))
        }
    }
}

/// HTTP client with the fixed outbound identity.
#[derive(Debug, Clone)]
pub struct PageClient {
    client: Client,
}

impl PageClient {
    /// Creates a client with the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] when the TLS backend or proxy
    /// configuration cannot be initialized.
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_client(timeouts)?,
        })
    }

    /// Fetches a page expecting an HTML body.
    ///
    /// Non-200 answers are returned as a [`FetchResult`] without a document;
    /// callers convert them with [`FetchResult::ensure_success`].
    ///
    /// # Errors
    ///
    /// Returns `FetchError` for invalid URLs, transport failures, timeouts,
    /// or an unreadable body.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_page(&self, url: &Url) -> Result<FetchResult, FetchError> {
        ensure_http_url(url)?;
        debug!("fetching page");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, HTML_ACCEPT)
            .send()
            .await
            .map_err(|e| FetchError::from_transport(url.as_str(), e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        if status != StatusCode::OK.as_u16() {
            debug!(status, "page request returned non-success status");
            return Ok(FetchResult {
                status,
                url: final_url,
                document: None,
            });
        }

        let document = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        debug!(bytes = document.len(), final_url = %final_url, "page fetched");
        Ok(FetchResult {
            status,
            url: final_url,
            document: Some(document),
        })
    }

    /// Fetches a binary body, fully buffered.
    ///
    /// The status is checked before the body is read, so a non-200 answer
    /// never yields content.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::HttpStatus` for non-200 answers, plus the same
    /// transport errors as [`fetch_page`](Self::fetch_page).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        ensure_http_url(url)?;
        debug!("fetching file");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_transport(url.as_str(), e))?;

        let status = response.status().as_u16();
        if status != StatusCode::OK.as_u16() {
            return Err(FetchError::http_status(url.as_str(), status));
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Body {
                    url: url.to_string(),
                    source: e,
                }
            }
        })?;

        debug!(bytes = bytes.len(), "file fetched");
        Ok(bytes.to_vec())
    }
}

fn ensure_http_url(url: &Url) -> Result<(), FetchError> {
    if matches!(url.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(FetchError::invalid_url(url.as_str()))
    }
}

fn build_client(timeouts: HttpTimeouts) -> Result<Client, FetchError> {
    match try_build_client(timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic while reading system proxy
            // settings; env proxies still apply on the fallback path.
            warn!("HTTP client builder panicked loading system proxy settings; using env-proxy fallback");
            match try_build_client(timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Build(source)) => Err(FetchError::ClientBuild { source }),
                Err(BuildClientFailure::Panic) => {
                    panic!("HTTP client builder panicked while applying env-proxy fallback")
                }
            }
        }
        Err(BuildClientFailure::Build(source)) => Err(FetchError::ClientBuild { source }),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    timeouts: HttpTimeouts,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(timeouts);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(timeouts: HttpTimeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .user_agent(MOBILE_USER_AGENT)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = first_env_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = first_env_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"])
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn first_env_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
