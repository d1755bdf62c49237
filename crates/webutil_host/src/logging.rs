//! Log level resolution and `tracing` subscriber installation.

use std::{fmt, str::FromStr, sync::OnceLock};

use regex::Regex;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Level used when neither the caller nor the page URL names one.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Warn;

/// Console log level, from quietest to noisiest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Nothing is logged.
    None,
    /// Errors only.
    Error,
    /// Errors and warnings.
    Warn,
    /// Adds informational messages.
    Info,
    /// Everything.
    Debug,
}

impl LogLevel {
    /// Converts to the equivalent `tracing` filter.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::None => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::None => "none",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(name)
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(LogLevel::None),
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(LoggingError::InvalidLevel(other.to_string())),
        }
    }
}

/// Logging setup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoggingError {
    /// The level string is not one of `none`, `error`, `warn`, `info`, `debug`.
    #[error("invalid logging type '{0}'")]
    InvalidLevel(String),
    /// A global subscriber is already installed.
    #[error("logging already initialized")]
    AlreadyInitialized,
}

fn logging_param_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"logging=([A-Za-z0-9._-]*)").expect("invalid logging regex"))
}

/// Extracts the first `logging=` value from a page URL.
pub fn logging_param(href: &str) -> Option<&str> {
    logging_param_pattern()
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Picks the effective level: explicit argument, then the URL's `logging=` value, then
/// [`DEFAULT_LOG_LEVEL`].
///
/// # Errors
///
/// Returns [`LoggingError::InvalidLevel`] when the chosen string is not a known level.
pub fn resolve_log_level(explicit: Option<&str>, href: &str) -> Result<LogLevel, LoggingError> {
    match explicit.or_else(|| logging_param(href)) {
        Some(raw) => raw.parse(),
        None => Ok(DEFAULT_LOG_LEVEL),
    }
}

/// Installs a global plain-text subscriber filtered at `level`, writing through `make_writer`.
///
/// # Errors
///
/// Returns [`LoggingError::AlreadyInitialized`] when a global subscriber already exists.
pub fn install_subscriber<W>(level: LogLevel, make_writer: W) -> Result<(), LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_max_level(level.to_level_filter())
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(make_writer)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;
    tracing::debug!(%level, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_strings_parse_and_display() {
        for level in [
            LogLevel::None,
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
        ] {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(LoggingError::InvalidLevel("verbose".into()))
        );
    }

    #[test]
    fn url_parameter_is_found_anywhere_in_href() {
        assert_eq!(
            logging_param("https://console.example/vnc.html?host=a&logging=debug#token=x"),
            Some("debug")
        );
        assert_eq!(
            logging_param("https://console.example/vnc.html#logging=info"),
            Some("info")
        );
        assert_eq!(logging_param("https://console.example/vnc.html"), None);
    }

    #[test]
    fn explicit_level_beats_url_beats_default() {
        let href = "https://console.example/?logging=info";
        assert_eq!(resolve_log_level(Some("error"), href), Ok(LogLevel::Error));
        assert_eq!(resolve_log_level(None, href), Ok(LogLevel::Info));
        assert_eq!(
            resolve_log_level(None, "https://console.example/"),
            Ok(DEFAULT_LOG_LEVEL)
        );
        assert!(resolve_log_level(None, "https://console.example/?logging=loud").is_err());
    }

    #[test]
    fn levels_map_to_tracing_filters() {
        assert_eq!(LogLevel::None.to_level_filter(), LevelFilter::OFF);
        assert_eq!(LogLevel::Debug.to_level_filter(), LevelFilter::DEBUG);
        assert!(LogLevel::Warn < LogLevel::Info);
    }
}
