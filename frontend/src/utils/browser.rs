use std::{cell::RefCell, collections::HashMap};
use js_sys::wasm_bindgen::JsValue;
use web_sys::{window, Storage, Window};

use super::server::AppError;

pub trait BrowserHistory {
  // current address bar path with the deployment base path removed
  fn pathname(&self) -> String;
  // raw query string including the leading `?`, empty when there is none
  fn search(&self) -> String;
  fn push(&self, path: &str) -> Result<(), AppError>;
  fn replace(&self, path: &str) -> Result<(), AppError>;
}

pub trait KeyValueStore {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, value: &str) -> Result<(), AppError>;
  fn remove(&self, key: &str);
}

fn js_err(e: JsValue) -> AppError {
  AppError::WasmError(format!("{:?}", e))
}

fn global_window() -> Result<Window, AppError> {
  window().ok_or_else(|| AppError::WasmError("global window should exist!".to_string()))
}

pub fn strip_base<'a>(path: &'a str, base: &str) -> &'a str {
  if base.is_empty() {
    return path;
  }
  match path.strip_prefix(base) {
    Some("") => "/",
    Some(rest) if rest.starts_with('/') => rest,
    _ => path
  }
}

pub fn with_base(base: &str, path: &str) -> String {
  if base.is_empty() {
    path.to_string()
  } else if path == "/" {
    format!("{}/", base)
  } else {
    format!("{}{}", base, path)
  }
}

pub struct WebHistory {
  window: Window,
  base_path: String
}

impl WebHistory {
  pub fn new(base_path: &str) -> Result<Self, AppError> {
    Ok(Self { window: global_window()?, base_path: base_path.to_string() })
  }
}

impl BrowserHistory for WebHistory {
  fn pathname(&self) -> String {
    let raw = self.window.location().pathname().unwrap_or_else(|_| "/".to_string());
    strip_base(&raw, &self.base_path).to_string()
  }

  fn search(&self) -> String {
    self.window.location().search().unwrap_or_default()
  }

  fn push(&self, path: &str) -> Result<(), AppError> {
    let history = self.window.history().map_err(js_err)?;
    history.push_state_with_url(&JsValue::NULL, "", Some(&with_base(&self.base_path, path))).map_err(js_err)
  }

  fn replace(&self, path: &str) -> Result<(), AppError> {
    let history = self.window.history().map_err(js_err)?;
    history.replace_state_with_url(&JsValue::NULL, "", Some(&with_base(&self.base_path, path))).map_err(js_err)
  }
}

pub struct WebStorage {
  storage: Storage
}

impl WebStorage {
  pub fn session() -> Result<Self, AppError> {
    let storage = global_window()?.session_storage().map_err(js_err)?
      .ok_or_else(|| AppError::StorageError("session storage unavailable".to_string()))?;
    Ok(Self { storage })
  }

  pub fn local() -> Result<Self, AppError> {
    let storage = global_window()?.local_storage().map_err(js_err)?
      .ok_or_else(|| AppError::StorageError("local storage unavailable".to_string()))?;
    Ok(Self { storage })
  }
}

impl KeyValueStore for WebStorage {
  fn get(&self, key: &str) -> Option<String> {
    self.storage.get_item(key).ok().flatten()
  }

  fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
    self.storage.set_item(key, value).map_err(|e| AppError::StorageError(format!("{:?}", e)))
  }

  fn remove(&self, key: &str) {
    let _ = self.storage.remove_item(key);
  }
}

// In-memory stand-in, used when the browser refuses storage access (private modes, sandboxed frames).
#[derive(Default)]
pub struct MemoryStore {
  items: RefCell<HashMap<String, String>>
}

impl MemoryStore {
  #[cfg(test)]
  pub fn with(key: &str, value: &str) -> Self {
    let store = Self::default();
    store.items.borrow_mut().insert(key.to_string(), value.to_string());
    store
  }
}

impl KeyValueStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.items.borrow().get(key).cloned()
  }

  fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
    self.items.borrow_mut().insert(key.to_string(), value.to_string());
    Ok(())
  }

  fn remove(&self, key: &str) {
    self.items.borrow_mut().remove(key);
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn base_path_is_stripped_only_on_segment_boundary() {
    assert_eq!(strip_base("/coin/bitcoin", ""), "/coin/bitcoin");
    assert_eq!(strip_base("/app/coin/bitcoin", "/app"), "/coin/bitcoin");
    assert_eq!(strip_base("/app", "/app"), "/");
    assert_eq!(strip_base("/application", "/app"), "/application");
  }

  #[test]
  fn base_path_is_prefixed_for_history_entries() {
    assert_eq!(with_base("", "/trending"), "/trending");
    assert_eq!(with_base("/app", "/trending"), "/app/trending");
    assert_eq!(with_base("/app", "/"), "/app/");
  }
}
