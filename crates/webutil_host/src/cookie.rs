//! Cookie assembly and lookup over a host cookie jar.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::time::unix_time_ms_now;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";
/// 9999-12-31T23:59:59Z, the last instant a four-digit cookie date can name.
const LATEST_EXPIRY_MS: i64 = 253_402_300_799_000;

/// Host cookie surface with `document.cookie` semantics.
pub trait CookieJar {
    /// Returns every visible cookie as `name=value` pairs joined by `"; "`.
    ///
    /// # Errors
    ///
    /// Returns an error when the host refuses cookie access.
    fn cookie_header(&self) -> Result<String, String>;

    /// Applies one `name=value; attr...` assignment.
    ///
    /// # Errors
    ///
    /// Returns an error when the host refuses cookie access.
    fn store_cookie(&self, assignment: &str) -> Result<(), String>;
}

/// Renders a cookie assignment string.
///
/// `days` of `None` or `0` produce a session cookie; otherwise the cookie expires `days` days
/// after `now_ms` (negative values produce an already-expired cookie). Expiries are clamped to
/// the unix epoch and the end of year 9999.
pub fn cookie_assignment(
    name: &str,
    value: &str,
    days: Option<i64>,
    secure: bool,
    now_ms: i64,
) -> String {
    let expires = days
        .filter(|&days| days != 0)
        .map(|days| {
            now_ms
                .saturating_add(days.saturating_mul(DAY_MS))
                .clamp(0, LATEST_EXPIRY_MS)
        })
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|at| format!("; expires={}", at.format(EXPIRES_FORMAT)))
        .unwrap_or_default();
    let secure = if secure { "; secure" } else { "" };
    format!("{name}={value}{expires}; path=/{secure}")
}

/// Creates (or replaces) a cookie valid for the whole site.
///
/// # Errors
///
/// Returns an error when the jar refuses the assignment.
pub fn create_cookie<J: CookieJar + ?Sized>(
    jar: &J,
    name: &str,
    value: &str,
    days: Option<i64>,
    secure: bool,
) -> Result<(), String> {
    let now_ms = i64::try_from(unix_time_ms_now()).unwrap_or(i64::MAX / 2);
    jar.store_cookie(&cookie_assignment(name, value, days, secure, now_ms))
}

/// Reads a cookie value, returning `default` when it is not set.
///
/// # Errors
///
/// Returns an error when the jar cannot be read.
pub fn read_cookie<J: CookieJar + ?Sized>(
    jar: &J,
    name: &str,
    default: Option<&str>,
) -> Result<Option<String>, String> {
    let header = jar.cookie_header()?;
    Ok(find_cookie(&header, name).or_else(|| default.map(str::to_string)))
}

/// Expires a cookie.
///
/// # Errors
///
/// Returns an error when the jar refuses the assignment.
pub fn erase_cookie<J: CookieJar + ?Sized>(
    jar: &J,
    name: &str,
    secure: bool,
) -> Result<(), String> {
    create_cookie(jar, name, "", Some(-1), secure)
}

fn find_cookie(header: &str, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    header
        .split(';')
        .map(|pair| pair.trim_start_matches(' '))
        .find_map(|pair| pair.strip_prefix(prefix.as_str()))
        .map(str::to_string)
}

#[derive(Debug, Clone, Default)]
/// In-memory jar applying assignments the way a browser does: an expiry in the past deletes.
pub struct MemoryCookieJar {
    inner: Rc<RefCell<BTreeMap<String, MemoryCookie>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Cookie held by a [`MemoryCookieJar`].
pub struct MemoryCookie {
    /// Raw value.
    pub value: String,
    /// Expiry in unix milliseconds; `None` for session cookies.
    pub expires_ms: Option<i64>,
    /// Whether the `secure` attribute was present.
    pub secure: bool,
    /// `path` attribute, if any.
    pub path: Option<String>,
}

impl MemoryCookieJar {
    /// Returns the stored cookie record for `name`.
    pub fn cookie(&self, name: &str) -> Option<MemoryCookie> {
        self.inner.borrow().get(name).cloned()
    }

    /// Number of live cookies.
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    /// Returns `true` when no cookie is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_header(&self) -> Result<String, String> {
        let pairs: Vec<String> = self
            .inner
            .borrow()
            .iter()
            .map(|(name, cookie)| format!("{name}={}", cookie.value))
            .collect();
        Ok(pairs.join("; "))
    }

    fn store_cookie(&self, assignment: &str) -> Result<(), String> {
        let mut parts = assignment.split(';');
        let pair = parts.next().unwrap_or_default().trim();
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("malformed cookie assignment: {assignment}"))?;

        let mut cookie = MemoryCookie {
            value: value.to_string(),
            expires_ms: None,
            secure: false,
            path: None,
        };
        for attr in parts.map(str::trim) {
            let (key, val) = attr.split_once('=').unwrap_or((attr, ""));
            match key.to_ascii_lowercase().as_str() {
                "expires" => {
                    let at = NaiveDateTime::parse_from_str(val, EXPIRES_FORMAT)
                        .map_err(|e| format!("invalid cookie expiry '{val}': {e}"))?;
                    cookie.expires_ms = Some(at.and_utc().timestamp_millis());
                }
                "secure" => cookie.secure = true,
                "path" => cookie.path = Some(val.to_string()),
                _ => {}
            }
        }

        let now_ms = i64::try_from(unix_time_ms_now()).unwrap_or(i64::MAX);
        let mut jar = self.inner.borrow_mut();
        if cookie.expires_ms.is_some_and(|at| at <= now_ms) {
            jar.remove(name);
        } else {
            jar.insert(name.to_string(), cookie);
        }
        Ok(())
    }
}
