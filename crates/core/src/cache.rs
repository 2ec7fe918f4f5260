//! Local cache of applicant progress, the order receipt and the admin session
//!
//! The backing store is a plain string key-value store (browser localStorage in
//! the WASM shell, a `HashMap` in tests). Reads never fail: absent or malformed
//! records come back as defaults.

use std::collections::HashMap;

use crate::models::{SessionState, SubmittedOrder};

pub const SESSION_KEY: &str = "applicantData";
pub const ADMIN_TOKEN_KEY: &str = "adminToken";
pub const SUBMITTED_ORDER_KEY: &str = "submittedOrderData";

/// Minimal persisted string store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// In-memory store, used by tests and as a fallback when storage is unavailable
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

pub struct LocalCache<S> {
    store: S,
}

impl<S: KeyValueStore> LocalCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ========================================================================
    // Session state
    // ========================================================================

    pub fn load_session(&self) -> SessionState {
        self.read_json(SESSION_KEY).unwrap_or_default()
    }

    pub fn save_session(&mut self, session: &SessionState) {
        self.write_json(SESSION_KEY, session);
    }

    // ========================================================================
    // Submitted order receipt
    // ========================================================================

    pub fn load_submitted_order(&self) -> Option<SubmittedOrder> {
        self.read_json(SUBMITTED_ORDER_KEY)
    }

    pub fn save_submitted_order(&mut self, order: &SubmittedOrder) {
        self.write_json(SUBMITTED_ORDER_KEY, order);
    }

    pub fn clear_submitted_order(&mut self) {
        self.store.remove(SUBMITTED_ORDER_KEY);
    }

    // ========================================================================
    // Admin session
    // ========================================================================

    pub fn admin_token(&self) -> Option<String> {
        self.store.get(ADMIN_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn save_admin_token(&mut self, token: &str) {
        self.store.set(ADMIN_TOKEN_KEY, token);
    }

    pub fn clear_admin_token(&mut self) {
        self.store.remove(ADMIN_TOKEN_KEY);
    }

    /// Full local reset used by logout
    pub fn clear_all(&mut self) {
        self.store.remove(SESSION_KEY);
        self.store.remove(ADMIN_TOKEN_KEY);
        self.store.remove(SUBMITTED_ORDER_KEY);
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed cache entry {}: {}", key, e);
                None
            }
        }
    }

    fn write_json<T: serde::Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.store.set(key, &json),
            Err(e) => tracing::error!("Failed to serialize cache entry {}: {}", key, e),
        }
    }
}
