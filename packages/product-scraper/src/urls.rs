//! URL normalization and content-addressed index keys.

use sha2::{Digest, Sha256};
use url::Url;

/// Normalize a URL for deduplication.
///
/// Lowercases scheme and host, drops default ports and fragments, and
/// removes a trailing slash from non-root paths. Query strings are kept
/// because they can select a different product variant.
pub fn normalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Some(url.to_string())
}

/// SHA-256 hex digest of the normalized URL.
///
/// Unparseable input is hashed as trimmed text so lookups stay total.
pub fn url_hash(raw: &str) -> String {
    let normalized = normalize_url(raw).unwrap_or_else(|| raw.trim().to_string());
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve an href against a site origin.
pub fn resolve_href(origin: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let base = Url::parse(origin).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}
