use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Selector patterns probed for image elements, broad to narrow.
///
/// Result pages vary their markup between layouts; an element matched by
/// more than one pattern is fine since deduplication happens on the URL.
const IMAGE_SELECTORS: [&str; 6] = [
    "img.lazyimg",
    "img.image",
    "img._image",
    "a.thumb img",
    "div.thumb img",
    "img[alt]",
];

/// Marker identifying an embedded image URL inside an anchor's href
const EMBEDDED_IMAGE_MARKER: &str = "imgurl=";

/// Extracts candidate image URLs from a rendered result page
#[derive(Debug)]
pub struct UrlExtractor {
    selectors: Vec<Selector>,
    scheme: Regex,
}

impl Default for UrlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlExtractor {
    /// Create an extractor with the selector patterns compiled
    pub fn new() -> Self {
        let selectors = IMAGE_SELECTORS
            .iter()
            .map(|s| Selector::parse(s).expect("Invalid image selector"))
            .collect();
        let scheme = Regex::new(r"https?://").expect("Invalid scheme pattern");

        Self { selectors, scheme }
    }

    /// Collect the unique candidate image URLs visible in the page source.
    ///
    /// URLs are emitted in first-seen order; the seen-set lives only for
    /// this pass, so a later page may surface the same URL again. An empty
    /// result is valid and drives the caller's empty-page accounting.
    pub fn extract(&self, html: &str) -> Vec<String> {
        let doc = Html::parse_document(html);

        let mut elements = Vec::new();
        for selector in &self.selectors {
            elements.extend(doc.select(selector));
        }

        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for element in elements {
            let Some(src) = resolve_source(&element) else {
                continue;
            };
            if !self.scheme.is_match(&src) {
                continue;
            }
            if seen.insert(src.clone()) {
                urls.push(src);
            }
        }

        ::log::debug!("Extractor found {} unique image URLs", urls.len());
        urls
    }
}

/// Resolve an element's image URL: direct `src`, then lazy-load `data-src`,
/// then the nearest ancestor anchor carrying an embedded image URL.
fn resolve_source(element: &ElementRef) -> Option<String> {
    if let Some(src) = element.value().attr("src") {
        if !src.is_empty() {
            return Some(src.to_string());
        }
    }

    if let Some(src) = element.value().attr("data-src") {
        if !src.is_empty() {
            return Some(src.to_string());
        }
    }

    for node in element.ancestors() {
        let Some(ancestor) = ElementRef::wrap(node) else {
            continue;
        };
        if ancestor.value().name() != "a" {
            continue;
        }
        if let Some(href) = ancestor.value().attr("href") {
            if href.contains(EMBEDDED_IMAGE_MARKER) {
                return Some(href.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_src_attribute() {
        let extractor = UrlExtractor::new();
        let html = r#"<img class="lazyimg" src="https://img.example.com/a.jpg">"#;
        assert_eq!(extractor.extract(html), vec!["https://img.example.com/a.jpg"]);
    }

    #[test]
    fn test_empty_src_falls_back_to_data_src() {
        let extractor = UrlExtractor::new();
        let html =
            r#"<img class="lazyimg" src="" data-src="https://img.example.com/lazy.png">"#;
        assert_eq!(
            extractor.extract(html),
            vec!["https://img.example.com/lazy.png"]
        );
    }

    #[test]
    fn test_ancestor_anchor_with_embedded_marker() {
        let extractor = UrlExtractor::new();
        let html = r#"
            <a href="https://search.example.com/view?imgurl=https://img.example.com/real.jpg">
                <span><img class="lazyimg"></span>
            </a>
        "#;
        assert_eq!(
            extractor.extract(html),
            vec!["https://search.example.com/view?imgurl=https://img.example.com/real.jpg"]
        );
    }

    #[test]
    fn test_ancestor_anchor_without_marker_is_skipped() {
        let extractor = UrlExtractor::new();
        let html = r#"
            <a href="https://search.example.com/detail/123">
                <img class="lazyimg">
            </a>
        "#;
        assert!(extractor.extract(html).is_empty());
    }

    #[test]
    fn test_non_http_sources_rejected() {
        let extractor = UrlExtractor::new();
        let html = r#"
            <img class="lazyimg" src="/relative/path.jpg">
            <img class="image" src="data:image/png;base64,AAAA">
            <img class="_image" src="https://img.example.com/ok.jpg">
        "#;
        assert_eq!(extractor.extract(html), vec!["https://img.example.com/ok.jpg"]);
    }

    #[test]
    fn test_overlapping_selectors_emit_url_once() {
        let extractor = UrlExtractor::new();
        // Matches img.lazyimg, img[alt], and a.thumb img at the same time
        let html = r##"
            <a class="thumb" href="#">
                <img class="lazyimg" alt="cat" src="https://img.example.com/cat.jpg">
            </a>
        "##;
        assert_eq!(extractor.extract(html), vec!["https://img.example.com/cat.jpg"]);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let extractor = UrlExtractor::new();
        let html = r#"
            <img class="lazyimg" src="https://img.example.com/1.jpg">
            <img class="image" src="https://img.example.com/2.jpg">
            <img class="lazyimg" src="https://img.example.com/1.jpg">
            <img alt="three" src="https://img.example.com/3.jpg">
        "#;
        assert_eq!(
            extractor.extract(html),
            vec![
                "https://img.example.com/1.jpg",
                "https://img.example.com/2.jpg",
                "https://img.example.com/3.jpg",
            ]
        );
    }

    #[test]
    fn test_empty_page_yields_empty_sequence() {
        let extractor = UrlExtractor::new();
        assert!(extractor.extract("<html><body></body></html>").is_empty());
        assert!(extractor.extract("").is_empty());
    }
}
