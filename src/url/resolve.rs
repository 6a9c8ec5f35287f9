use crate::url::normalize_url;
use url::Url;

/// Resolves a possibly relative link against a base URL
///
/// Handles the full range of link shapes found in anchor tags:
///
/// - Absolute links (`https://host/path`) pass straight to normalization
/// - Protocol-relative links (`//host/path`) inherit the base's scheme
/// - Root-relative links (`/path`) inherit the base's scheme and host
/// - Relative links (`path`, `../path`) resolve against the base's
///   directory, with `.` segments removed and `..` segments popping the
///   preceding segment
///
/// Returns `None` for anything that cannot be resolved to a valid http(s)
/// URL; callers discard such links without enqueuing them.
pub fn resolve_link(base: &Url, link: &str) -> Option<Url> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }

    let joined = base.join(link).ok()?;
    if joined.scheme() != "http" && joined.scheme() != "https" {
        return None;
    }

    normalize_url(joined.as_str()).ok()
}
