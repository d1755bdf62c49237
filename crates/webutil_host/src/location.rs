//! Page-location snapshot and query/fragment variable lookup.
//!
//! Parameters may travel in the query string (`?host=example.com`) or, to keep them off the
//! server, in the fragment (`#password=secret`). Both can be mixed in one URL; the fragment wins
//! when a name appears in both.

use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Snapshot of the parts of `window.location` used for parameter lookup.
pub struct LocationView {
    /// Full URL, including query and fragment.
    pub href: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
    /// Scheme including the trailing `:` (`https:`).
    pub protocol: String,
}

impl LocationView {
    /// Builds a snapshot from a full URL, deriving `hash` and `protocol` from it.
    pub fn from_href(href: &str) -> Self {
        let hash = href
            .find('#')
            .map(|i| href[i..].to_string())
            .unwrap_or_default();
        let protocol = href
            .find(':')
            .filter(|&i| is_scheme(&href[..i]))
            .map(|i| href[..=i].to_ascii_lowercase())
            .unwrap_or_default();
        Self {
            href: href.to_string(),
            hash,
            protocol,
        }
    }

    /// Returns `true` when the page was served over TLS.
    pub fn is_secure(&self) -> bool {
        self.protocol == "https:"
    }

    /// Reads `name` from the query string.
    pub fn query_var(&self, name: &str, default: Option<&str>) -> Option<String> {
        let query = self.href.split('#').next().unwrap_or_default();
        last_value(query, "[?&]", "[^&#]*", name).or_else(|| default.map(str::to_string))
    }

    /// Reads `name` from the fragment.
    pub fn hash_var(&self, name: &str, default: Option<&str>) -> Option<String> {
        last_value(&self.hash, "[&#]", "[^&]*", name).or_else(|| default.map(str::to_string))
    }

    /// Reads `name` from the fragment, falling back to the query string.
    pub fn config_var(&self, name: &str, default: Option<&str>) -> Option<String> {
        self.hash_var(name, None)
            .or_else(|| self.query_var(name, default))
    }
}

fn is_scheme(candidate: &str) -> bool {
    candidate.starts_with(|c: char| c.is_ascii_alphabetic())
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Finds the last `<sep>name=<value>` in `haystack` and percent-decodes the value.
fn last_value(haystack: &str, separator: &str, value: &str, name: &str) -> Option<String> {
    let pattern = format!(".*{separator}{}=({value})", regex::escape(name));
    let re = Regex::new(&pattern).ok()?;
    let raw = re.captures(haystack)?.get(1)?.as_str();
    Some(percent_decode(raw))
}

fn percent_decode(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
