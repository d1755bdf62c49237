//! Host-independent contracts and logic for the web console utility layer.
//!
//! This crate holds everything that does not need a browser: the settings cache and its
//! backing-store contract, message deduplication, log level resolution, URL parameter lookup,
//! cookie assembly and management API request routing. Browser adapters for these contracts live
//! in `webutil_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod api;
pub mod cookie;
pub mod location;
pub mod log_once;
pub mod logging;
pub mod storage;
pub mod time;

pub use api::{
    is_get_command, resolve_session_key, ApiClient, ApiError, ApiFuture, ApiMethod, ApiRequest,
    ApiTransport, LoginCredentials, OAuthCredentials, SessionKeySource, ACCESS_TOKEN_KEY,
    ADDITIONAL_GET_COMMANDS, SESSION_KEY_COOKIE,
};
pub use cookie::{
    cookie_assignment, create_cookie, erase_cookie, read_cookie, CookieJar, MemoryCookie,
    MemoryCookieJar,
};
pub use location::LocationView;
pub use log_once::{LogOnce, LogSeverity};
pub use logging::{
    install_subscriber, logging_param, resolve_log_level, LogLevel, LoggingError,
    DEFAULT_LOG_LEVEL,
};
pub use storage::backend::{
    BackendKind, InjectedFailure, MemorySettingsBackend, SettingsBackend, StorageError,
};
pub use storage::settings::{SettingsCache, STORAGE_DENIED_WARNING};
pub use time::unix_time_ms_now;
