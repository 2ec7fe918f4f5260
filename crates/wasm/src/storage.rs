//! Browser storage and URL helpers

use orderco_core::{KeyValueStore, MemoryStore};

// ============================================================================
// Local Storage
// ============================================================================

/// `localStorage`-backed store. Falls back to memory when the browser refuses
/// storage (private mode, disabled cookies), so the app still runs without
/// surviving reloads.
pub struct BrowserStore {
    storage: Option<web_sys::Storage>,
    fallback: MemoryStore,
}

impl BrowserStore {
    pub fn open() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            tracing::warn!("localStorage unavailable, progress will not survive a reload");
        }
        Self {
            storage,
            fallback: MemoryStore::new(),
        }
    }
}

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        match &self.storage {
            Some(storage) => storage.get_item(key).ok().flatten(),
            None => self.fallback.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        match &self.storage {
            Some(storage) => {
                if let Err(e) = storage.set_item(key, value) {
                    tracing::warn!("Failed to write {} to localStorage: {:?}", key, e);
                }
            }
            None => self.fallback.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) {
        match &self.storage {
            Some(storage) => {
                let _ = storage.remove_item(key);
            }
            None => self.fallback.remove(key),
        }
    }
}

// ============================================================================
// URL Helpers
// ============================================================================

/// Current page address, used to build the shareable voting link
pub fn page_url() -> String {
    web_sys::window()
        .and_then(|w| {
            let location = w.location();
            let origin = location.origin().ok()?;
            let path = location.pathname().ok()?;
            Some(format!("{}{}", origin, path))
        })
        .unwrap_or_else(|| "/".to_string())
}
