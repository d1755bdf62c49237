//! Browser (`wasm32`) implementations of the [`webutil_host`] contracts.
//!
//! This crate wires the host-independent settings cache, cookie helpers, location lookup and
//! logging setup to the real browser surfaces: `localStorage`, extension synchronized storage,
//! `document.cookie`, `window.location` and the console. Non-wasm builds compile to inert
//! fallbacks so the crate can be unit tested natively.
//!
//! Bridge bindings to extension storage live under `bridge/` (`bridge::interop` selects the
//! wasm or non-wasm transport).

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// One-time settings store selection and cache construction.
pub mod adapters;
mod bridge;
pub mod cookies;
pub mod location;
pub mod logging;
pub mod session;
pub mod storage;

pub use adapters::{initialize_settings, settings_backend, settings_cache, SettingsBackendAdapter};
pub use cookies::{create_cookie, erase_cookie, read_cookie, DocumentCookieJar};
pub use location::{config_var, current_location, hash_var, query_var};
pub use logging::{init_logging, ConsoleMakeWriter, ConsoleWriter};
pub use session::{api_client, session_key};
pub use storage::extension_sync::ExtensionSyncBackend;
pub use storage::local_storage::LocalStorageBackend;
