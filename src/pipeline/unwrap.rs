//! Redirect unwrapping: detects aggregator pages that embed the real source
//! page in a frame.
//!
//! Only the frame reference is extracted here. Following it, with the hop
//! bound and visited-set check, is driven by [`super::Retriever`].

use std::sync::LazyLock;

use scraper::{Html, Selector};
use url::Url;

use super::compile_static_selector;
use super::links::resolve_on_page;

static FRAME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| compile_static_selector("iframe[src]"));

/// Returns the target of the first frame carrying a `src` attribute.
///
/// A frame with `id="pdf"` is the document viewer, not a wrapped page, and is
/// left for the classifier. An empty `src` on the first frame means there is
/// nothing to unwrap.
#[must_use]
pub fn frame_target(document: &Html, page_url: &Url) -> Option<Url> {
    let frame = document
        .select(&FRAME_SELECTOR)
        .find(|element| element.value().id() != Some("pdf"))?;
    let src = frame.value().attr("src")?.trim();
    if src.is_empty() {
        return None;
    }
    resolve_on_page(src, page_url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("https://annas-archive.example/scidb/10.1/x").unwrap()
    }

    #[test]
    fn test_frame_target_absolute_src() {
        let doc = Html::parse_document(
            r#"<html><body><iframe src="https://sci-hub.ru/10.1/x"></iframe></body></html>"#,
        );
        assert_eq!(
            frame_target(&doc, &page()).unwrap().as_str(),
            "https://sci-hub.ru/10.1/x"
        );
    }

    #[test]
    fn test_frame_target_first_frame_wins() {
        let doc = Html::parse_document(
            r#"<body><iframe src="https://a.example/1"></iframe><iframe src="https://b.example/2"></iframe></body>"#,
        );
        assert_eq!(
            frame_target(&doc, &page()).unwrap().as_str(),
            "https://a.example/1"
        );
    }

    #[test]
    fn test_frame_target_relative_src_resolves_on_page() {
        let doc = Html::parse_document(r#"<body><iframe src="/inner/10.1/x"></iframe></body>"#);
        assert_eq!(
            frame_target(&doc, &page()).unwrap().as_str(),
            "https://annas-archive.example/inner/10.1/x"
        );
    }

    #[test]
    fn test_frame_target_empty_src_is_none() {
        let doc = Html::parse_document(r#"<body><iframe src="  "></iframe></body>"#);
        assert!(frame_target(&doc, &page()).is_none());
    }

    #[test]
    fn test_frame_target_no_frame_is_none() {
        let doc = Html::parse_document(r#"<body><embed id="pdf" src="/x.pdf"></body>"#);
        assert!(frame_target(&doc, &page()).is_none());
    }

    #[test]
    fn test_frame_target_skips_pdf_viewer_frame() {
        let doc = Html::parse_document(r#"<body><iframe id="pdf" src="/x.pdf"></iframe></body>"#);
        assert!(frame_target(&doc, &page()).is_none());
    }
}
