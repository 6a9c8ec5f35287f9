use crate::UrlError;
use url::Url;

/// Normalizes a URL into its canonical frontier form
///
/// Two URLs that normalize identically are the same frontier entry, so this
/// is deliberately light-touch:
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme
/// 3. Lowercase the scheme and host (the `url` crate does this on parse)
/// 4. Strip the fragment
/// 5. Preserve path and query as-is
///
/// The function is idempotent: normalizing an already-normalized URL yields
/// the same result.
///
/// # Examples
///
/// ```
/// use meshcrawl::url::normalize_url;
///
/// let url = normalize_url("HTTP://Example.com/Path#frag").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/Path");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}
