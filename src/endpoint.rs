//! Endpoint resolution and per-item URL construction.
//!
//! The endpoint is the base URL of the mirror that is queried for every
//! identifier. It comes from host preferences and falls back to
//! [`DEFAULT_ENDPOINT`] whenever the preference is unset or blank.

use tracing::debug;
use url::Url;

use crate::pipeline::RetrievalError;

/// Built-in mirror used when no endpoint preference is configured.
///
/// This is the only default; configuration display and pipeline
/// initialization both read it from here.
pub const DEFAULT_ENDPOINT: &str = "https://sci-hub.ru/";

/// Host-owned source of configuration values.
///
/// Read once at the start of each batch run.
pub trait Preferences: Send + Sync {
    /// Returns the configured endpoint base URL, if any.
    fn endpoint(&self) -> Option<String>;
}

/// Preferences backed by a fixed, explicitly constructed value.
#[derive(Debug, Clone, Default)]
pub struct StaticPreferences {
    endpoint: Option<String>,
}

impl StaticPreferences {
    /// Creates preferences with an optional endpoint override.
    #[must_use]
    pub fn new(endpoint: Option<String>) -> Self {
        Self { endpoint }
    }
}

impl Preferences for StaticPreferences {
    fn endpoint(&self) -> Option<String> {
        self.endpoint.clone()
    }
}

/// Returns the endpoint to query: the configured value when non-empty,
/// otherwise [`DEFAULT_ENDPOINT`]. Never fails.
#[must_use]
pub fn resolve_endpoint(preferences: &dyn Preferences) -> String {
    match preferences.endpoint() {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => {
            debug!(
                default = DEFAULT_ENDPOINT,
                "No endpoint configured; using built-in default"
            );
            DEFAULT_ENDPOINT.to_string()
        }
    }
}

/// Builds the initial page URL for an identifier by resolving it relative to
/// the endpoint.
///
/// # Errors
///
/// Returns [`RetrievalError::InvalidEndpoint`] when the endpoint is not an
/// absolute URL or the identifier cannot be joined onto it.
pub fn build_item_url(endpoint: &str, identifier: &str) -> Result<Url, RetrievalError> {
    let base = Url::parse(endpoint).map_err(|_| RetrievalError::invalid_endpoint(endpoint))?;
    base.join(identifier.trim())
        .map_err(|_| RetrievalError::invalid_endpoint(endpoint))
}
