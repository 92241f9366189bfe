use url::Url;

/// Extracts the lowercase host and explicit port of a URL
///
/// A scheme's default port is never explicit, so `http://a.test/` and
/// `http://a.test:80/` yield the same authority, and so do
/// `http://a.test/` and `https://a.test/`.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use deadlink_scraper::url::extract_authority;
///
/// let url = Url::parse("https://EXAMPLE.COM:8443/path").unwrap();
/// assert_eq!(extract_authority(&url), Some(("example.com".to_string(), Some(8443))));
/// ```
pub fn extract_authority(url: &Url) -> Option<(String, Option<u16>)> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some((host, url.port()))
}

/// Returns true if both URLs point at the same host and port
pub fn same_host(a: &Url, b: &Url) -> bool {
    match (extract_authority(a), extract_authority(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
