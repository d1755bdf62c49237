use super::*;

fn unsupported() -> String {
    "Extension storage is only available when compiled for wasm32".to_string()
}

pub fn extension_storage_available() -> bool {
    false
}

pub fn extension_storage_set(_entries: &[(&str, &str)]) -> Result<(), String> {
    Err(unsupported())
}

pub fn extension_storage_remove(_name: &str) -> Result<(), String> {
    Err(unsupported())
}

pub async fn extension_storage_snapshot() -> Result<BTreeMap<String, String>, String> {
    Ok(BTreeMap::new())
}
