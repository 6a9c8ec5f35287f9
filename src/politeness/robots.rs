//! Robots.txt rules: parsing, matching, and the per-domain cache

use crate::crawler::Fetcher;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use url::Url;

/// Allow/disallow path-prefix rules for one domain
///
/// Only the `User-agent: *` (or blank-agent) section of robots.txt is
/// honored. Matching is a literal string-prefix test on the URL path, and
/// Allow rules take precedence over Disallow rules.
#[derive(Debug, Clone, Default)]
pub struct RobotsRules {
    allow: Vec<String>,
    disallow: Vec<String>,
}

impl RobotsRules {
    /// Parses robots.txt content, honoring only the wildcard agent section
    ///
    /// Comments (`#`) and blank lines are ignored. A `User-agent:` line for
    /// a different agent ends the relevant section; a later wildcard line
    /// re-opens it.
    pub fn parse(content: &str) -> Self {
        let mut rules = RobotsRules::default();
        let mut relevant = false;

        for raw_line in content.lines() {
            let line = match raw_line.find('#') {
                Some(pos) => &raw_line[..pos],
                None => raw_line,
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(agent) = strip_directive(line, "User-agent:") {
                relevant = agent == "*" || agent.is_empty();
            } else if relevant {
                if let Some(path) = strip_directive(line, "Disallow:") {
                    if !path.is_empty() {
                        rules.disallow.push(path.to_string());
                    }
                } else if let Some(path) = strip_directive(line, "Allow:") {
                    if !path.is_empty() {
                        rules.allow.push(path.to_string());
                    }
                }
            }
        }

        rules
    }

    /// Checks whether a URL path is allowed by these rules
    ///
    /// A path matching any allow-prefix is allowed; otherwise a path
    /// matching any disallow-prefix is denied; otherwise allowed by
    /// default.
    pub fn is_allowed(&self, path: &str) -> bool {
        if self.allow.iter().any(|prefix| path.starts_with(prefix)) {
            return true;
        }
        !self.disallow.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Returns whether the rules contain no directives at all
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.disallow.is_empty()
    }
}

fn strip_directive<'a>(line: &'a str, directive: &str) -> Option<&'a str> {
    match (line.get(..directive.len()), line.get(directive.len()..)) {
        (Some(head), Some(tail)) if head.eq_ignore_ascii_case(directive) => Some(tail.trim()),
        _ => None,
    }
}

/// Lazily-populated robots.txt cache keyed by domain
///
/// Rules are fetched on first access to a domain (`http://` first, then
/// `https://` on failure) and cached for the process lifetime — there is no
/// TTL or refresh, a recorded limitation. If both fetches fail, no policy
/// is available and the answer defaults to allow without caching, so the
/// next URL for that domain retries the fetch.
pub struct RobotsCache {
    fetcher: Arc<dyn Fetcher>,
    cache: Mutex<HashMap<String, RobotsRules>>,
}

impl RobotsCache {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RobotsRules>> {
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Checks whether a URL is allowed by its domain's robots.txt
    pub async fn is_allowed(&self, url: &Url) -> bool {
        let domain = match crate::url::extract_domain(url) {
            Some(d) => d,
            None => return false,
        };

        let cached = self.lock().get(&domain).cloned();
        let rules = match cached {
            Some(rules) => rules,
            None => match self.fetch_rules(&domain).await {
                Some(rules) => {
                    self.lock().insert(domain.clone(), rules.clone());
                    rules
                }
                None => {
                    tracing::debug!("No robots.txt reachable for {}, allowing", domain);
                    return true;
                }
            },
        };

        let path = if url.path().is_empty() { "/" } else { url.path() };
        rules.is_allowed(path)
    }

    async fn fetch_rules(&self, domain: &str) -> Option<RobotsRules> {
        for scheme in ["http", "https"] {
            let robots_url = format!("{}://{}/robots.txt", scheme, domain);
            match self.fetcher.fetch(&robots_url).await {
                Ok(body) => {
                    let content = String::from_utf8_lossy(&body);
                    tracing::debug!("Fetched robots.txt for {} via {}", domain, scheme);
                    return Some(RobotsRules::parse(&content));
                }
                Err(e) => {
                    tracing::debug!("robots.txt fetch failed ({}): {}", robots_url, e);
                }
            }
        }
        None
    }
}
