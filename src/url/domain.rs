use url::Url;

/// Extracts the domain (host, plus port if non-default) from a URL
///
/// The domain string keys the robots cache and the per-domain throttle, so
/// two URLs on the same host but different ports are treated as separate
/// domains.
pub fn extract_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host.to_string()),
    }
}
