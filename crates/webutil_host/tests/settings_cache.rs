use std::{
    io,
    sync::{Arc, Mutex},
};

use futures::executor::block_on;
use pretty_assertions::assert_eq;
use tracing::level_filters::LevelFilter;
use webutil_host::{
    InjectedFailure, LocationView, MemorySettingsBackend, SettingsCache, StorageError,
    STORAGE_DENIED_WARNING,
};

#[derive(Debug, Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn text(&self) -> String {
        let bytes = self.0.lock().expect("log buffer").clone();
        String::from_utf8(bytes).expect("utf8 log output")
    }
}

impl io::Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("log buffer").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_log<R>(f: impl FnOnce() -> R) -> (R, String) {
    let log = CapturedLog::default();
    let writer = log.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, log.text())
}

#[test]
fn unwritten_names_read_as_default_or_none() {
    for store in [
        MemorySettingsBackend::local(),
        MemorySettingsBackend::synchronized(),
    ] {
        let mut cache = SettingsCache::new(store);
        assert_eq!(
            cache.read("view_clip", Some("false")).expect("read"),
            Some("false".to_string())
        );
        assert_eq!(cache.read("bell", None).expect("read"), None);
    }
}

#[test]
fn synchronized_write_then_read_needs_no_store_round_trip() {
    let store = MemorySettingsBackend::synchronized();
    let mut cache = SettingsCache::new(store.clone());

    cache.write("show_dot", "true").expect("write");
    assert_eq!(
        cache.read("show_dot", None).expect("read"),
        Some("true".to_string())
    );
    assert_eq!(store.get_count(), 0);
    assert_eq!(store.peek("show_dot"), Some("true".to_string()));
}

#[test]
fn repeated_identical_write_hits_the_store_once() {
    for store in [
        MemorySettingsBackend::local(),
        MemorySettingsBackend::synchronized(),
    ] {
        let mut cache = SettingsCache::new(store.clone());
        cache.write("reconnect_delay", "5000").expect("write");
        cache.write("reconnect_delay", "5000").expect("write");
        assert_eq!(store.set_count(), 1);

        cache.write("reconnect_delay", "3000").expect("write");
        assert_eq!(store.set_count(), 2);
    }
}

#[test]
fn erase_refetches_from_the_store() {
    let store = MemorySettingsBackend::local();
    let mut cache = SettingsCache::new(store.clone());

    cache.write("repeaterID", "42").expect("write");
    cache.erase("repeaterID").expect("erase");
    assert_eq!(store.peek("repeaterID"), None);
    assert_eq!(store.remove_count(), 1);
    assert_eq!(
        cache.read("repeaterID", Some("none")).expect("read"),
        Some("none".to_string())
    );

    cache.erase("repeaterID").expect("erase");
    store.put_external("repeaterID", "7");
    assert_eq!(
        cache.read("repeaterID", Some("none")).expect("read"),
        Some("7".to_string())
    );
}

#[test]
fn fragment_variables_take_precedence_over_query() {
    let location = LocationView::from_href(
        "https://console.example/vnc.html?user=alice#password=secret&user=bob",
    );
    assert_eq!(location.config_var("user", None), Some("bob".to_string()));
    assert_eq!(
        location.config_var("password", None),
        Some("secret".to_string())
    );
}

#[test]
fn denied_storage_warns_once_across_repeated_writes() {
    let store = MemorySettingsBackend::local();
    store.inject_failure(Some(InjectedFailure::AccessDenied(
        "SecurityError: The operation is insecure.".into(),
    )));
    let mut cache = SettingsCache::new(store.clone());

    let (results, output) = with_captured_log(|| {
        (0..5)
            .map(|i| cache.write("quality", &i.to_string()))
            .collect::<Vec<_>>()
    });

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(store.set_count(), 5);
    assert_eq!(output.matches(STORAGE_DENIED_WARNING).count(), 1);
    assert_eq!(output.matches("'set(quality, 3)' failed").count(), 1);
    assert_eq!(
        cache.read("quality", None).expect("cache stays authoritative"),
        Some("4".to_string())
    );
}

#[test]
fn non_access_failures_reach_the_caller() {
    let store = MemorySettingsBackend::local();
    store.inject_failure(Some(InjectedFailure::Host("QuotaExceededError".into())));
    let mut cache = SettingsCache::new(store);

    let (result, output) = with_captured_log(|| cache.write("quality", "9"));
    assert_eq!(
        result,
        Err(StorageError::Host("QuotaExceededError".to_string()))
    );
    assert!(!output.contains(STORAGE_DENIED_WARNING));
}

#[test]
fn initialize_forces_a_fresh_fetch() {
    let store = MemorySettingsBackend::local();
    store.put_external("resize", "remote");
    let mut cache = SettingsCache::new(store.clone());

    assert_eq!(
        cache.read("resize", None).expect("read"),
        Some("remote".to_string())
    );
    store.put_external("resize", "scale");
    assert_eq!(
        cache.read("resize", None).expect("read"),
        Some("remote".to_string())
    );
    assert_eq!(store.get_count(), 1);

    block_on(cache.initialize());
    block_on(cache.initialize());
    assert_eq!(
        cache.read("resize", None).expect("read"),
        Some("scale".to_string())
    );
    assert_eq!(store.get_count(), 2);
}

#[test]
fn synchronized_erase_removes_without_refetching() {
    let store = MemorySettingsBackend::synchronized();
    let mut cache = SettingsCache::new(store.clone());

    cache.write("shared", "1").expect("write");
    cache.erase("shared").expect("erase");
    assert_eq!(store.peek("shared"), None);
    assert_eq!(store.remove_count(), 1);

    store.put_external("shared", "from-another-device");
    assert_eq!(
        cache.read("shared", Some("0")).expect("read"),
        Some("0".to_string())
    );
    assert_eq!(store.get_count(), 0);
}

#[test]
fn denied_erase_is_absorbed_and_warns_once() {
    let store = MemorySettingsBackend::local();
    let mut cache = SettingsCache::new(store.clone());
    cache.write("path", "websockify").expect("write");
    store.inject_failure(Some(InjectedFailure::AccessDenied(
        "SecurityError: The operation is insecure.".into(),
    )));

    let (results, output) = with_captured_log(|| [cache.erase("path"), cache.erase("path")]);

    assert_eq!(results, [Ok(()), Ok(())]);
    assert_eq!(store.remove_count(), 2);
    assert_eq!(output.matches(STORAGE_DENIED_WARNING).count(), 1);
    assert_eq!(output.matches("'remove(path)' failed").count(), 1);
    assert_eq!(store.peek("path"), Some("websockify".to_string()));
}
