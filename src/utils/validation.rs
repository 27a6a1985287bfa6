//! Validity predicates for target URLs and short codes.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Shape of every short code, generated or custom.
static CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,8}$").expect("code pattern is valid"));

/// Returns true iff `s` is an absolute URL with an `http` or `https` scheme.
///
/// # Examples
///
/// ```
/// use link_registry::utils::validation::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/path?q=1"));
/// assert!(!is_valid_url("ftp://example.com"));
/// assert!(!is_valid_url("/relative/path"));
/// ```
pub fn is_valid_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

/// Returns true iff `s` is 6 to 8 ASCII letters or digits.
///
/// Codes are case-sensitive: `Ab3dE7` and `ab3de7` are different keys.
pub fn is_valid_code(s: &str) -> bool {
    CODE_REGEX.is_match(s)
}
