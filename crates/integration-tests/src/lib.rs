//! Integration tests for Organic Farm.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p organic-farm-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_scenarios` - Store, catalog, and projection working together
//! - `cart_persistence` - File-backed sessions, corrupt data, failing storage
//!
//! This library holds shared fixtures for those tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use organic_farm_cart::{CartState, CartStore, MemoryStorage, Storage, StorageError};

/// Storage wrapper that can be switched into a failing mode, simulating a
/// browser store that is disabled or over quota.
pub struct FlakyStorage<S> {
    inner: S,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl<S: Storage> FlakyStorage<S> {
    pub const fn new(inner: S) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Make subsequent writes and removes fail (`true`) or succeed (`false`).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of writes and removes that reached the inner storage.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl<S: Storage> Storage for FlakyStorage<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("quota exceeded".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.remove(key)
    }
}

/// Shared in-memory storage that survives across store instances, so a new
/// `CartStore` over it behaves like a page reload.
pub fn shared_storage() -> Arc<FlakyStorage<MemoryStorage>> {
    Arc::new(FlakyStorage::new(MemoryStorage::new()))
}

/// Open a new session over `storage`.
pub fn session<S: Storage + 'static>(storage: &Arc<S>) -> CartStore {
    CartStore::new(Arc::clone(storage))
}

/// Record every state a store notifies about.
pub fn record_notifications(store: &CartStore) -> Arc<std::sync::Mutex<Vec<CartState>>> {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    store.subscribe(move |state| {
        if let Ok(mut states) = sink.lock() {
            states.push(state.clone());
        }
    });
    seen
}
