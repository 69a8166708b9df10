use indexmap::IndexMap;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::offline::network::AssetResponse;

/// url => cached response
type Store = HashMap<String, AssetResponse>;
/// store name => store, in creation order
type SharedStores = Arc<Mutex<IndexMap<String, Store>>>;

/// Named asset stores, shared by every clone of the handle.
#[derive(Clone, Default)]
pub struct CacheStorage {
    stores: SharedStores,
}

impl CacheStorage {
    pub fn new() -> CacheStorage {
        CacheStorage::default()
    }

    // A panic while holding the lock cannot leave a store half written, so
    // the data stays usable.
    fn lock(&self) -> MutexGuard<'_, IndexMap<String, Store>> {
        self.stores.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the store if it does not exist yet.
    pub fn open(&self, name: &str) {
        self.lock().entry(name.to_string()).or_default();
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn delete(&self, name: &str) -> bool {
        self.lock().shift_remove(name).is_some()
    }

    /// First cached response for `url`, looking through stores in creation order.
    pub fn match_url(&self, url: &str) -> Option<AssetResponse> {
        self.lock()
            .values()
            .find_map(|store| store.get(url))
            .cloned()
    }

    pub fn put(&self, name: &str, url: &str, response: AssetResponse) {
        self.lock()
            .entry(name.to_string())
            .or_default()
            .insert(url.to_string(), response);
    }

    /// Insert every entry under a single lock.
    pub fn put_all(&self, name: &str, entries: Vec<(String, AssetResponse)>) {
        self.lock()
            .entry(name.to_string())
            .or_default()
            .extend(entries);
    }

    /// Number of entries in a store, None when it does not exist.
    pub fn len(&self, name: &str) -> Option<usize> {
        self.lock().get(name).map(|store| store.len())
    }
}
