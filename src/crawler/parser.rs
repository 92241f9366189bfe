//! HTML parser for extracting candidate links
//!
//! This module handles parsing HTML content to extract every `href`/`src`
//! attribute that may point at another resource, then classifying each one
//! against the page URL.

use crate::url::{classify, Link, LinkKind};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements and the attribute that carries their link
const LINK_ATTRIBUTES: &[(&str, &str)] = &[
    ("a", "href"),
    ("link", "href"),
    ("img", "src"),
    ("script", "src"),
    ("iframe", "src"),
];

/// Extracts the raw link attribute values from an HTML document
///
/// # Extraction Rules
///
/// **Include:**
/// - `<a href>`, `<link href>`
/// - `<img src>`, `<script src>`, `<iframe src>`
///
/// Values are returned in document order, unmodified.
///
/// # Example
///
/// ```
/// use deadlink_scraper::crawler::extract_hrefs;
///
/// let html = r#"<a href="/a">A</a><img src="logo.png">"#;
/// assert_eq!(extract_hrefs(html), vec!["/a", "logo.png"]);
/// ```
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut hrefs = Vec::new();

    let selectors = selector_list();
    let Ok(selector) = Selector::parse(&selectors) else {
        return hrefs;
    };

    for element in document.select(&selector) {
        let element = element.value();
        let attribute = LINK_ATTRIBUTES
            .iter()
            .find(|(tag, _)| *tag == element.name())
            .map(|(_, attribute)| *attribute);

        if let Some(value) = attribute.and_then(|attribute| element.attr(attribute)) {
            hrefs.push(value.to_string());
        }
    }

    hrefs
}

/// Extracts and classifies the links of a page
///
/// Ignored links (empty, non-http, malformed) are dropped. Each canonical
/// URL appears once; the first occurrence in the document wins.
///
/// # Arguments
///
/// * `html` - The HTML content
/// * `base_url` - The page URL after redirects, used to resolve hrefs
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Link> {
    let mut seen = HashSet::new();

    extract_hrefs(html)
        .iter()
        .map(|href| classify(href, base_url))
        .filter(|link| link.kind != LinkKind::Ignored)
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

fn selector_list() -> String {
    LINK_ATTRIBUTES
        .iter()
        .map(|(tag, attribute)| format!("{}[{}]", tag, attribute))
        .collect::<Vec<_>>()
        .join(", ")
}
