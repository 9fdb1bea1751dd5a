//! Identifier normalization for host-supplied input.
//!
//! Identifiers are opaque to the pipeline, but hosts commonly hand over DOIs
//! wrapped in a resolver URL or a `doi:` label. Those wrappers are stripped so
//! the mirror receives the bare token.

/// Resolver URL prefixes stripped from identifiers.
const DOI_URL_PREFIXES: &[&str] = &[
    "https://doi.org/",
    "http://doi.org/",
    "https://dx.doi.org/",
    "http://dx.doi.org/",
];

/// Normalizes an identifier, returning `None` when nothing usable remains.
///
/// Strips DOI resolver prefixes and a case-insensitive `doi:` label,
/// URL-decodes, and trims whitespace.
#[must_use]
pub fn normalize_identifier(raw: &str) -> Option<String> {
    let mut value = raw.trim();

    for prefix in DOI_URL_PREFIXES {
        if let Some(stripped) = value.strip_prefix(prefix) {
            value = stripped;
            break;
        }
    }

    if value.len() >= 4 && value.is_char_boundary(4) && value[..4].eq_ignore_ascii_case("doi:") {
        value = value[4..].trim_start();
    }

    let decoded = match urlencoding::decode(value) {
        Ok(decoded) => decoded.trim().to_string(),
        Err(_) => value.trim().to_string(),
    };

    if decoded.is_empty() { None } else { Some(decoded) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier_bare_doi_unchanged() {
        assert_eq!(
            normalize_identifier("10.1038/nature14539").as_deref(),
            Some("10.1038/nature14539")
        );
    }

    #[test]
    fn test_normalize_identifier_strips_resolver_url() {
        assert_eq!(
            normalize_identifier("https://doi.org/10.1000/xyz").as_deref(),
            Some("10.1000/xyz")
        );
        assert_eq!(
            normalize_identifier("http://dx.doi.org/10.1000/xyz").as_deref(),
            Some("10.1000/xyz")
        );
    }

    #[test]
    fn test_normalize_identifier_strips_doi_label_any_case() {
        assert_eq!(
            normalize_identifier("DOI: 10.1000/xyz").as_deref(),
            Some("10.1000/xyz")
        );
        assert_eq!(
            normalize_identifier("doi:10.1000/xyz").as_deref(),
            Some("10.1000/xyz")
        );
    }

    #[test]
    fn test_normalize_identifier_url_decodes() {
        assert_eq!(
            normalize_identifier("10.1000%2Fxyz").as_deref(),
            Some("10.1000/xyz")
        );
    }

    #[test]
    fn test_normalize_identifier_blank_is_none() {
        assert_eq!(normalize_identifier(""), None);
        assert_eq!(normalize_identifier("   "), None);
        assert_eq!(normalize_identifier("doi:  "), None);
    }

    #[test]
    fn test_normalize_identifier_non_ascii_prefix_does_not_panic() {
        assert_eq!(normalize_identifier("статья").as_deref(), Some("статья"));
    }
}
