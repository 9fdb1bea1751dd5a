//! Link resolution helpers: origin-relative joins and HTTPS normalization.

use std::fmt;

use url::Url;

/// A resolved, absolute file URL believed to point at document content.
///
/// Constructed only through [`CandidateFile::from_direct_link`], which
/// guarantees an absolute `http(s)` URL (HTTPS unless upgrading is disabled).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    url: Url,
}

impl CandidateFile {
    /// Resolves a raw direct-link attribute value found on `page_url`.
    ///
    /// - `//host/path` is prefixed with `https:`
    /// - values without a scheme resolve against the page origin (scheme + host)
    /// - `http:` is rewritten to `https:` when `upgrade_insecure` is set
    ///
    /// Returns `None` when the value cannot form an `http(s)` URL.
    #[must_use]
    pub fn from_direct_link(raw: &str, page_url: &Url, upgrade_insecure: bool) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let mut url = if let Some(rest) = raw.strip_prefix("//") {
            let scheme = if upgrade_insecure {
                "https"
            } else {
                page_url.scheme()
            };
            Url::parse(&format!("{scheme}://{rest}")).ok()?
        } else if has_scheme(raw) {
            Url::parse(raw).ok()?
        } else {
            origin_of(page_url)?.join(raw).ok()?
        };

        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if upgrade_insecure && url.scheme() == "http" {
            url.set_scheme("https").ok()?;
        }
        Some(Self { url })
    }

    /// Returns the candidate URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the candidate URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for CandidateFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Returns `scheme://host[:port]/` for a page URL.
#[must_use]
pub fn origin_of(page_url: &Url) -> Option<Url> {
    let host = page_url.host_str()?;
    let origin = match page_url.port() {
        Some(port) => format!("{}://{host}:{port}/", page_url.scheme()),
        None => format!("{}://{host}/", page_url.scheme()),
    };
    Url::parse(&origin).ok()
}

/// Resolves an `href`/`src` value found on `page_url` the way a browser
/// would (relative to the page itself).
#[must_use]
pub fn resolve_on_page(raw: &str, page_url: &Url) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    page_url.join(raw).ok()
}

fn has_scheme(value: &str) -> bool {
    let Some((scheme, _)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
