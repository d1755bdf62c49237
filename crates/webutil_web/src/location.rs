//! Current page location snapshot.

use webutil_host::LocationView;

/// Captures `window.location`. Off-wasm, or when the location is unreadable, the snapshot is
/// empty.
pub fn current_location() -> LocationView {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(location) = web_sys::window().map(|w| w.location()) else {
            return LocationView::default();
        };
        LocationView {
            href: location.href().unwrap_or_default(),
            hash: location.hash().unwrap_or_default(),
            protocol: location.protocol().unwrap_or_default(),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        LocationView::default()
    }
}

/// Reads `name` from the current URL fragment, falling back to the query string.
pub fn config_var(name: &str, default: Option<&str>) -> Option<String> {
    current_location().config_var(name, default)
}

/// Reads `name` from the current query string.
pub fn query_var(name: &str, default: Option<&str>) -> Option<String> {
    current_location().query_var(name, default)
}

/// Reads `name` from the current URL fragment.
pub fn hash_var(name: &str, default: Option<&str>) -> Option<String> {
    current_location().hash_var(name, default)
}
