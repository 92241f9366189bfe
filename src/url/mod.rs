//! URL handling module for deadlink-scraper
//!
//! This module provides URL normalization, host comparison, and link
//! classification functionality.

mod domain;
mod normalize;

use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

// Re-export main functions
pub use domain::{extract_authority, same_host};
pub use normalize::normalize;

/// Schemes that are never checked or crawled
const IGNORED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "ftp:"];

/// Link classification types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// Same host as the page it was found on - crawled and checked
    Internal,
    /// Different host - checked but never crawled
    External,
    /// Same-page fragment link - counted as skipped, never fetched
    PageAnchor,
    /// Empty, non-http or malformed href - dropped
    Ignored,
}

impl LinkKind {
    /// Returns true if links of this kind are scheduled through the frontier
    pub fn is_schedulable(&self) -> bool {
        matches!(self, Self::Internal | Self::PageAnchor)
    }

    /// Returns true if checking this kind requires a network call
    pub fn needs_network_check(&self) -> bool {
        matches!(self, Self::Internal | Self::External)
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::PageAnchor => "anchor",
            Self::Ignored => "ignored",
        };
        f.write_str(name)
    }
}

/// A discovered link
///
/// Identity is the canonical URL alone: two links with the same URL are
/// equal and hash identically whatever their kind.
#[derive(Debug, Clone)]
pub struct Link {
    /// Canonical URL (or the raw href for ignored links)
    pub url: String,
    pub kind: LinkKind,
}

impl Link {
    pub fn new(url: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            url: url.into(),
            kind,
        }
    }

    fn ignored(href: &str) -> Self {
        Self::new(href, LinkKind::Ignored)
    }
}

impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Eq for Link {}

impl Hash for Link {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
    }
}

/// Classifies an href found on the page at `base`
///
/// Classification rules, in order:
/// 1. Empty href → Ignored
/// 2. `mailto:`, `tel:`, `javascript:`, `ftp:` → Ignored
/// 3. Leading `#` → PageAnchor (base without fragment + the anchor)
/// 4. Otherwise resolve and normalize; failure → Ignored
/// 5. Same host and port as `base` → Internal, else External
///
/// # Examples
///
/// ```
/// use deadlink_scraper::url::{classify, LinkKind};
/// use url::Url;
///
/// let base = Url::parse("http://a.test/p").unwrap();
/// let link = classify("#section", &base);
/// assert_eq!(link.kind, LinkKind::PageAnchor);
/// assert_eq!(link.url, "http://a.test/p#section");
/// ```
pub fn classify(href: &str, base: &Url) -> Link {
    let href = href.trim();

    if href.is_empty() {
        return Link::ignored(href);
    }

    if has_ignored_scheme(href) {
        return Link::ignored(href);
    }

    if href.starts_with('#') {
        let mut page = base.clone();
        page.set_fragment(None);
        return Link::new(format!("{}{}", page, href), LinkKind::PageAnchor);
    }

    let normalized = match normalize(base, href) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!("Skipping invalid URL {}: {}", href, e);
            return Link::ignored(href);
        }
    };

    let kind = if same_host(&normalized, base) {
        LinkKind::Internal
    } else {
        LinkKind::External
    };

    Link::new(normalized.as_str(), kind)
}

fn has_ignored_scheme(href: &str) -> bool {
    IGNORED_SCHEMES.iter().any(|scheme| {
        href.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}
