//! Extension-storage bridge for `webutil_web` settings adapters.
//!
//! The synchronized store is only reachable through the extension host's JavaScript API, so
//! calls are routed through `interop`, which picks the wasm binding or an inert non-wasm shim.

use std::collections::BTreeMap;

mod interop;

pub(crate) fn extension_storage_available() -> bool {
    interop::extension_storage_available()
}

pub(crate) fn extension_storage_set(entries: &[(&str, &str)]) -> Result<(), String> {
    interop::extension_storage_set(entries)
}

pub(crate) fn extension_storage_remove(name: &str) -> Result<(), String> {
    interop::extension_storage_remove(name)
}

pub(crate) async fn extension_storage_snapshot() -> Result<BTreeMap<String, String>, String> {
    interop::extension_storage_snapshot().await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn extension_storage_non_wasm_parity() {
        assert!(!extension_storage_available());
        assert_eq!(
            extension_storage_set(&[("k", "v")]).expect_err("set should fail"),
            "Extension storage is only available when compiled for wasm32"
        );
        assert!(extension_storage_remove("k").is_err());
        assert_eq!(
            block_on(extension_storage_snapshot()).expect("snapshot"),
            BTreeMap::new()
        );
    }
}
