use super::*;
use js_sys::Promise;
use serde::Serialize;
use serde_json::Value;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen(inline_js = r#"
function syncArea() {
  if (typeof chrome === 'undefined' || !chrome.storage || !chrome.storage.sync) {
    return null;
  }
  return chrome.storage.sync;
}

function requireSyncArea() {
  const area = syncArea();
  if (area === null) {
    throw new Error('extension storage unavailable');
  }
  return area;
}

export function jsExtensionStorageAvailable() { return syncArea() !== null; }
export function jsExtensionStorageSet(items) { requireSyncArea().set(items); }
export function jsExtensionStorageRemove(name) { requireSyncArea().remove(name); }
export function jsExtensionStorageGetAll() {
  const area = syncArea();
  if (area === null) {
    return Promise.resolve({});
  }
  return new Promise((resolve, reject) => {
    area.get(null, (items) => {
      const err = chrome.runtime && chrome.runtime.lastError;
      if (err) {
        reject(new Error(err.message));
      } else {
        resolve(items || {});
      }
    });
  });
}
"#)]
extern "C" {
    #[wasm_bindgen(js_name = jsExtensionStorageAvailable)]
    fn js_extension_storage_available() -> bool;
    #[wasm_bindgen(catch, js_name = jsExtensionStorageSet)]
    fn js_extension_storage_set(items: JsValue) -> Result<(), JsValue>;
    #[wasm_bindgen(catch, js_name = jsExtensionStorageRemove)]
    fn js_extension_storage_remove(name: &str) -> Result<(), JsValue>;
    #[wasm_bindgen(js_name = jsExtensionStorageGetAll)]
    fn js_extension_storage_get_all() -> Promise;
}

fn js_error_to_string(err: JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Ok(message) = js_sys::Reflect::get(&err, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{err:?}")
}

pub fn extension_storage_available() -> bool {
    js_extension_storage_available()
}

pub fn extension_storage_set(entries: &[(&str, &str)]) -> Result<(), String> {
    let items: BTreeMap<&str, &str> = entries.iter().copied().collect();
    let value = items
        .serialize(&Serializer::json_compatible())
        .map_err(|e| e.to_string())?;
    js_extension_storage_set(value).map_err(js_error_to_string)
}

pub fn extension_storage_remove(name: &str) -> Result<(), String> {
    js_extension_storage_remove(name).map_err(js_error_to_string)
}

pub async fn extension_storage_snapshot() -> Result<BTreeMap<String, String>, String> {
    let value = JsFuture::from(js_extension_storage_get_all())
        .await
        .map_err(js_error_to_string)?;
    let items: BTreeMap<String, Value> = from_value(value).map_err(|e| e.to_string())?;
    Ok(items
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((name, text)),
            other => Some((name, other.to_string())),
        })
        .collect())
}
