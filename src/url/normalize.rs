use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves `raw` against `base` and canonicalizes the result
///
/// # Normalization Steps
///
/// 1. Resolve `raw` against `base` (standard relative-reference rules)
/// 2. Remove fragment (everything after #)
/// 3. Reject anything that is not http or https
/// 4. Lowercase the host
/// 5. Drop the port if it is the scheme's default (80 / 443)
/// 6. Clean the path:
///    - Remove dot segments (. and ..) and empty segments
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
///
/// The query string is kept as-is. Normalizing an already normalized URL
/// returns the same string.
///
/// # Arguments
///
/// * `base` - The URL of the page the link appeared on
/// * `raw` - The href as written in the document
///
/// # Returns
///
/// * `Ok(Url)` - Canonical absolute URL
/// * `Err(UrlError)` - The href could not be resolved or is not http(s)
///
/// # Examples
///
/// ```
/// use deadlink_scraper::url::normalize;
/// use url::Url;
///
/// let base = Url::parse("http://a.test/docs/").unwrap();
/// let url = normalize(&base, "HTTP://A.TEST:80/x/../y/#top").unwrap();
/// assert_eq!(url.as_str(), "http://a.test/y");
/// ```
pub fn normalize(base: &Url, raw: &str) -> UrlResult<Url> {
    // Step 1: Resolve against the page URL
    let mut url = base
        .join(raw)
        .map_err(|e| UrlError::Resolution(format!("{}: {}", raw, e)))?;

    // Step 2: Remove fragment
    url.set_fragment(None);

    // Step 3: Validate scheme
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    // Step 4: Lowercase the host
    let host = url.host_str().ok_or(UrlError::MissingHost)?;
    if host.chars().any(|c| c.is_ascii_uppercase()) {
        let lowered = host.to_ascii_lowercase();
        url.set_host(Some(&lowered))
            .map_err(|e| UrlError::Resolution(format!("failed to set host: {}", e)))?;
    }

    // Step 5: Strip default port
    if url.port().is_some() && url.port() == default_port(url.scheme()) {
        // set_port only fails for cannot-be-a-base URLs, which http(s) never are
        let _ = url.set_port(None);
    }

    // Step 6: Clean path
    let cleaned = clean_path(url.path());
    url.set_path(&cleaned);

    Ok(url)
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// Lexically cleans a URL path by removing dot segments and trailing slashes
fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}
