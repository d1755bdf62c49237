//! Browser console sink for `tracing` and page-driven logging setup.

use std::io;

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use webutil_host::{install_subscriber, resolve_log_level, LogLevel, LoggingError};

use crate::location::current_location;

#[derive(Debug, Clone, Copy, Default)]
/// [`MakeWriter`] that routes each formatted event to the console method matching its level.
pub struct ConsoleMakeWriter;

/// Buffers one formatted event and flushes it to the console on drop.
#[derive(Debug)]
pub struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }

    fn emit(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = line.trim_end();

        #[cfg(target_arch = "wasm32")]
        {
            let value = wasm_bindgen::JsValue::from_str(line);
            match self.level {
                Level::ERROR => web_sys::console::error_1(&value),
                Level::WARN => web_sys::console::warn_1(&value),
                Level::INFO => web_sys::console::info_1(&value),
                _ => web_sys::console::debug_1(&value),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write as _;

            let _ = self.level;
            let _ = writeln!(io::stderr(), "{line}");
        }

        self.buf.clear();
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        self.emit();
    }
}

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Installs console logging at `level`, or at the page URL's `logging=` value when `level` is
/// `None`, or at the default level.
///
/// # Errors
///
/// Returns an error for an unknown level name or when logging is already initialized.
pub fn init_logging(level: Option<&str>) -> Result<LogLevel, LoggingError> {
    let level = resolve_log_level(level, &current_location().href)?;
    install_subscriber(level, ConsoleMakeWriter)?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn writer_buffers_until_flush() {
        let mut writer = ConsoleMakeWriter.make_writer();
        writer.write_all(b"WARN settings unavailable\n").expect("write");
        assert!(!writer.buf.is_empty());
        writer.flush().expect("flush");
        assert!(writer.buf.is_empty());
    }

    #[test]
    fn unknown_level_is_rejected_before_installing() {
        assert_eq!(
            init_logging(Some("chatty")),
            Err(LoggingError::InvalidLevel("chatty".to_string()))
        );
    }
}
