//! `document.cookie` jar and page-aware cookie helpers.

use webutil_host::CookieJar;

use crate::location::current_location;

#[derive(Debug, Clone, Copy, Default)]
/// Cookie jar backed by `document.cookie`.
pub struct DocumentCookieJar;

#[cfg(target_arch = "wasm32")]
fn html_document() -> Result<web_sys::HtmlDocument, String> {
    use wasm_bindgen::JsCast;

    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| "document unavailable".to_string())?
        .dyn_into::<web_sys::HtmlDocument>()
        .map_err(|_| "document is not an HTML document".to_string())
}

impl CookieJar for DocumentCookieJar {
    fn cookie_header(&self) -> Result<String, String> {
        #[cfg(target_arch = "wasm32")]
        {
            html_document()?
                .cookie()
                .map_err(|e| format!("document.cookie read failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            Ok(String::new())
        }
    }

    fn store_cookie(&self, assignment: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            html_document()?
                .set_cookie(assignment)
                .map_err(|e| format!("document.cookie write failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = assignment;
            Ok(())
        }
    }
}

/// Creates a site-wide cookie, marked `secure` when the page is served over HTTPS.
///
/// `days` of `None` keeps the cookie for the browser session only.
///
/// # Errors
///
/// Returns an error when the browser refuses cookie access.
pub fn create_cookie(name: &str, value: &str, days: Option<i64>) -> Result<(), String> {
    let secure = current_location().is_secure();
    webutil_host::create_cookie(&DocumentCookieJar, name, value, days, secure)
}

/// Reads a cookie from `document.cookie`.
///
/// # Errors
///
/// Returns an error when the browser refuses cookie access.
pub fn read_cookie(name: &str, default: Option<&str>) -> Result<Option<String>, String> {
    webutil_host::read_cookie(&DocumentCookieJar, name, default)
}

/// Expires a cookie.
///
/// # Errors
///
/// Returns an error when the browser refuses cookie access.
pub fn erase_cookie(name: &str) -> Result<(), String> {
    let secure = current_location().is_secure();
    webutil_host::erase_cookie(&DocumentCookieJar, name, secure)
}
