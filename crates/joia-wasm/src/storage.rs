//! `window.localStorage` behind the [`KeyValueStore`] seam.

use joia_core::KeyValueStore;
use web_sys::Storage;

/// Browser local storage.
///
/// When storage is unavailable (private mode, no window) reads come back
/// empty and writes are dropped, so the cart still works for the page's
/// lifetime.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    storage: Option<Storage>,
}

impl LocalStorage {
    /// Attach to `window.localStorage`
    pub fn from_window() -> Self {
        let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        Self { storage }
    }

    /// Storage that keeps nothing
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.storage.is_some()
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if storage.set_item(key, value).is_err() {
                web_sys::console::warn_1(&format!("localStorage write failed for {}", key).into());
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_storage_keeps_nothing() {
        let store = LocalStorage::detached();
        assert!(!store.is_available());
        store.set("joias-cart", "[]");
        assert!(store.get("joias-cart").is_none());
        store.remove("joias-cart");
    }
}
