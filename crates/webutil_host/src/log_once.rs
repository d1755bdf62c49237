//! Message deduplication for noisy, repeatable warnings.

/// Severity used when a [`LogOnce`] message is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSeverity {
    /// `tracing::error!`
    Error,
    /// `tracing::warn!`
    Warn,
    /// `tracing::debug!`
    Debug,
    /// `tracing::info!`
    #[default]
    Info,
}

#[derive(Debug, Clone, Default)]
/// Emits each distinct message text at most once for the lifetime of the instance.
///
/// Seen messages are kept in emission order and never evicted, so memory grows with the number
/// of distinct texts. Callers feed it a small, bounded vocabulary of storage warnings.
pub struct LogOnce {
    seen: Vec<String>,
}

impl LogOnce {
    /// Creates an empty deduplicator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `message` at `severity` unless the same text was logged before.
    ///
    /// Returns `true` when the message was emitted by this call.
    pub fn log(&mut self, message: &str, severity: LogSeverity) -> bool {
        if self.seen.iter().any(|seen| seen == message) {
            return false;
        }
        match severity {
            LogSeverity::Error => tracing::error!("{message}"),
            LogSeverity::Warn => tracing::warn!("{message}"),
            LogSeverity::Debug => tracing::debug!("{message}"),
            LogSeverity::Info => tracing::info!("{message}"),
        }
        self.seen.push(message.to_string());
        true
    }

    /// Messages emitted so far, oldest first.
    pub fn emitted(&self) -> &[String] {
        &self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_text_is_emitted_once() {
        let mut log = LogOnce::new();
        assert!(log.log("settings unavailable", LogSeverity::Warn));
        assert!(!log.log("settings unavailable", LogSeverity::Warn));
        assert!(!log.log("settings unavailable", LogSeverity::Error));
        assert!(log.log("other", LogSeverity::default()));
        assert_eq!(log.emitted(), ["settings unavailable", "other"]);
    }
}
