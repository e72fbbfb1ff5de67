use lingo_engine::{GameError, Storage};
use wasm_bindgen::JsValue;

/// [`Storage`] backed by the browser's `localStorage`.
pub struct LocalStorage {
    inner: web_sys::Storage,
}

impl LocalStorage {
    /// Returns None when storage is unavailable (private mode, sandboxed
    /// iframes, non-browser hosts).
    pub fn open() -> Option<Self> {
        let inner = web_sys::window()?.local_storage().ok()??;
        Some(Self { inner })
    }
}

fn storage_error(e: JsValue) -> GameError {
    GameError::Storage(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), GameError> {
        self.inner.set_item(key, value).map_err(storage_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), GameError> {
        self.inner.remove_item(key).map_err(storage_error)
    }
}
