//! The cart store: the single owner and mutator of cart contents.
//!
//! # Persistence
//!
//! Each mutation reads the current blob, applies one change, writes the full
//! cart back, and then notifies subscribers with the new state. An empty cart
//! is stored by removing its key. The whole
//! read-modify-write runs under one lock, so no caller can observe a
//! half-applied change.
//!
//! # Failure handling
//!
//! - A failed write switches the store to in-memory mode for the rest of its
//!   lifetime. The mutation still applies and subscribers are still notified.
//! - A failed read returns the last state the store knew about. If the read
//!   was part of a mutation, the store also switches to in-memory mode, since
//!   writing a cart it could not read would overwrite the saved one.
//! - A blob that cannot be decoded is discarded and the cart starts empty.
//!
//! None of these surface as errors. The only errors callers see are input
//! rejections under [`QuantityPolicy::Reject`].

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use organic_farm_core::ProductId;
use tracing::instrument;

use crate::catalog::Catalog;
use crate::error::{CartError, StorageError};
use crate::projection::{CartTotal, project};
use crate::state::{self, CartState};
use crate::storage::Storage;

/// Storage key the site has always used for the cart blob.
pub const DEFAULT_CART_KEY: &str = "of_cart_v1";

/// How [`CartStore::add_item`] treats a blank id or a quantity outside
/// `1..=u32::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantityPolicy {
    /// Leave the cart untouched and return its current state.
    #[default]
    Ignore,
    /// Return a [`CartError`].
    Reject,
}

impl FromStr for QuantityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "reject" => Ok(Self::Reject),
            other => Err(format!("expected 'ignore' or 'reject', got '{other}'")),
        }
    }
}

/// Handle returned by [`CartStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&CartState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

struct Inner {
    /// Last state read or written. Authoritative once `durable` is false.
    mirror: CartState,
    durable: bool,
}

/// Persisted product-quantity cart.
///
/// Construct one per session and pass it by reference to whatever needs it.
pub struct CartStore {
    storage: Box<dyn Storage>,
    key: String,
    policy: QuantityPolicy,
    inner: Mutex<Inner>,
    listeners: Mutex<Listeners>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("policy", &self.policy)
            .field("durable", &self.is_durable())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store over `storage` using the default key and policy.
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
            key: DEFAULT_CART_KEY.to_owned(),
            policy: QuantityPolicy::default(),
            inner: Mutex::new(Inner {
                mirror: CartState::new(),
                durable: true,
            }),
            listeners: Mutex::new(Listeners::default()),
        }
    }

    /// Store the cart under `key` instead of [`DEFAULT_CART_KEY`].
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: QuantityPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn policy(&self) -> QuantityPolicy {
        self.policy
    }

    /// `false` once a write has failed and the cart lives only in memory.
    #[must_use]
    pub fn is_durable(&self) -> bool {
        self.lock_inner().durable
    }

    /// Current cart contents. Never fails; see the module docs for how
    /// unreadable or corrupt data is handled.
    #[must_use]
    pub fn load(&self) -> CartState {
        let mut inner = self.lock_inner();
        self.read_state(&mut inner)
    }

    /// Quantity held for `product_id`, zero when absent.
    #[must_use]
    pub fn quantity(&self, product_id: &str) -> u32 {
        self.load().quantity(product_id)
    }

    /// Total number of units in the cart.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.load().item_count()
    }

    /// Add one unit of `product_id`.
    ///
    /// # Errors
    ///
    /// See [`add_item`](Self::add_item).
    pub fn add_one(&self, product_id: &str) -> Result<CartState, CartError> {
        self.add_item(product_id, 1)
    }

    /// Add `quantity` units of `product_id`, creating the entry if needed,
    /// and return the new cart.
    ///
    /// A blank id or a quantity outside `1..=u32::MAX` is handled by the
    /// store's [`QuantityPolicy`]; in neither case is anything written or
    /// notified. A running total that would pass `u32::MAX` is capped there.
    ///
    /// # Errors
    ///
    /// Under [`QuantityPolicy::Reject`], returns [`CartError::InvalidQuantity`],
    /// [`CartError::QuantityTooLarge`] or [`CartError::EmptyProductId`].
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn add_item(&self, product_id: &str, quantity: i64) -> Result<CartState, CartError> {
        let Some((product_id, quantity)) = self.validate(product_id, quantity)? else {
            return Ok(self.load());
        };

        let state = {
            let mut inner = self.lock_inner();
            let mut state = self.read_for_update(&mut inner);
            if state.quantity(product_id.as_str()).checked_add(quantity).is_none() {
                tracing::warn!(%product_id, quantity, "Cart quantity capped at {}", u32::MAX);
            }
            let new_quantity = state.add(product_id, quantity);
            tracing::debug!(new_quantity, "Added to cart");
            self.commit(&mut inner, state)
        };
        self.notify(&state);
        Ok(state)
    }

    /// Delete every unit of `product_id`. Returns the cart, unchanged and
    /// without a write or notification if the product was not in it.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn remove_item(&self, product_id: &str) -> CartState {
        let state = {
            let mut inner = self.lock_inner();
            let mut state = self.read_for_update(&mut inner);
            if state.remove(product_id.trim()).is_none() {
                return state;
            }
            tracing::debug!("Removed from cart");
            self.commit(&mut inner, state)
        };
        self.notify(&state);
        state
    }

    /// Empty the cart.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&self) -> CartState {
        let state = {
            let mut inner = self.lock_inner();
            self.commit(&mut inner, CartState::new())
        };
        self.notify(&state);
        state
    }

    /// Price the current cart against `catalog`.
    #[must_use]
    pub fn total(&self, catalog: &Catalog) -> CartTotal {
        project(&self.load(), catalog)
    }

    /// Register a listener called with the new cart after every mutation.
    ///
    /// Listeners run on the mutating thread after the store lock is
    /// released, so they may call back into the store.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CartState) + Send + Sync + 'static,
    {
        let mut listeners = self.lock_listeners();
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.entries.len();
        listeners.entries.retain(|(entry_id, _)| *entry_id != id);
        listeners.entries.len() != before
    }

    fn validate(
        &self,
        product_id: &str,
        quantity: i64,
    ) -> Result<Option<(ProductId, u32)>, CartError> {
        let rejection = match ProductId::parse(product_id) {
            Err(_) => CartError::EmptyProductId,
            Ok(_) if quantity < 1 => CartError::InvalidQuantity(quantity),
            Ok(id) => match u32::try_from(quantity) {
                Ok(quantity) => return Ok(Some((id, quantity))),
                Err(_) => CartError::QuantityTooLarge(quantity),
            },
        };

        match self.policy {
            QuantityPolicy::Ignore => {
                tracing::debug!(reason = %rejection, "Ignoring cart input");
                Ok(None)
            }
            QuantityPolicy::Reject => Err(rejection),
        }
    }

    fn read_state(&self, inner: &mut Inner) -> CartState {
        match self.try_read(inner) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Cart storage read failed, using last known cart");
                inner.mirror.clone()
            }
        }
    }

    /// Read ahead of a mutation. A cart that could not be read must not be
    /// written back, so a read failure here ends durable mode.
    fn read_for_update(&self, inner: &mut Inner) -> CartState {
        match self.try_read(inner) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    error = %e,
                    "Cart storage read failed, keeping cart in memory for this session"
                );
                inner.durable = false;
                inner.mirror.clone()
            }
        }
    }

    fn try_read(&self, inner: &mut Inner) -> Result<CartState, StorageError> {
        if !inner.durable {
            return Ok(inner.mirror.clone());
        }

        let state = match self.storage.read(&self.key)? {
            None => CartState::new(),
            Some(raw) => state::decode(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = %self.key, error = %e, "Discarding malformed cart data");
                CartState::new()
            }),
        };
        inner.mirror = state.clone();
        Ok(state)
    }

    fn persist(&self, state: &CartState) -> Result<(), StorageError> {
        if state.is_empty() {
            return self.storage.remove(&self.key);
        }
        let raw = state::encode(state)?;
        self.storage.write(&self.key, &raw)
    }

    fn commit(&self, inner: &mut Inner, state: CartState) -> CartState {
        if inner.durable {
            match self.persist(&state) {
                Ok(()) => tracing::debug!(key = %self.key, lines = state.len(), "Cart saved"),
                Err(e) => {
                    tracing::warn!(
                        key = %self.key,
                        error = %e,
                        "Cart storage write failed, keeping cart in memory for this session"
                    );
                    inner.durable = false;
                }
            }
        }
        inner.mirror = state.clone();
        state
    }

    fn notify(&self, state: &CartState) {
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(state);
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStorage;

    /// Memory storage that counts writes (removes included) and can be told
    /// to fail.
    #[derive(Default)]
    struct TestStorage {
        inner: MemoryStorage,
        writes: AtomicUsize,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
    }

    impl Storage for TestStorage {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("reads disabled".into()));
            }
            self.inner.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.write(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StorageError::Unavailable("quota exceeded".into()));
            }
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.remove(key)
        }
    }

    fn store() -> (CartStore, Arc<TestStorage>) {
        let storage = Arc::new(TestStorage::default());
        (CartStore::new(Arc::clone(&storage)), storage)
    }

    fn count_notifications(store: &CartStore) -> Arc<AtomicUsize> {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        count
    }

    #[test]
    fn test_add_item_accumulates() {
        let (store, _) = store();
        store.add_item("p1", 2).unwrap();
        store.add_item("p2", 1).unwrap();
        let state = store.add_item("p1", 3).unwrap();
        assert_eq!(state.quantity("p1"), 5);
        assert_eq!(state.quantity("p2"), 1);
        assert_eq!(store.item_count(), 6);
    }

    #[test]
    fn test_add_one() {
        let (store, _) = store();
        store.add_one("p3").unwrap();
        store.add_one("p3").unwrap();
        assert_eq!(store.quantity("p3"), 2);
    }

    #[test]
    fn test_each_mutation_writes_once_and_notifies_once() {
        let (store, storage) = store();
        let notified = count_notifications(&store);

        store.add_item("p1", 1).unwrap();
        store.remove_item("p1");
        store.clear();

        assert_eq!(storage.writes.load(Ordering::SeqCst), 3);
        assert_eq!(notified.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_remove_absent_is_silent() {
        let (store, storage) = store();
        store.add_item("p1", 1).unwrap();
        let notified = count_notifications(&store);

        let state = store.remove_item("p9");

        assert_eq!(state.quantity("p1"), 1);
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_deletes_whole_entry() {
        let (store, _) = store();
        store.add_item("p1", 4).unwrap();
        let state = store.remove_item("p1");
        assert!(!state.contains("p1"));
        assert!(store.total(&Catalog::seed()).lines.is_empty());
    }

    #[test]
    fn test_ignore_policy_is_a_no_op() {
        let (store, storage) = store();
        let notified = count_notifications(&store);

        assert!(store.add_item("p1", 0).unwrap().is_empty());
        assert!(store.add_item("p1", -3).unwrap().is_empty());
        assert!(store.add_item("  ", 2).unwrap().is_empty());

        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reject_policy_returns_errors() {
        let storage = Arc::new(TestStorage::default());
        let store = CartStore::new(Arc::clone(&storage)).with_policy(QuantityPolicy::Reject);

        assert_eq!(store.add_item("p1", 0), Err(CartError::InvalidQuantity(0)));
        assert_eq!(store.add_item("", 1), Err(CartError::EmptyProductId));
        assert_eq!(
            store.add_item("p1", 5_000_000_000),
            Err(CartError::QuantityTooLarge(5_000_000_000))
        );
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_ignore_policy_skips_oversized_quantity() {
        let (store, storage) = store();
        assert!(store.add_item("p1", 5_000_000_000).unwrap().is_empty());
        assert_eq!(storage.writes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_running_total_caps_at_max() {
        let (store, _) = store();
        store.add_item("p1", i64::from(u32::MAX)).unwrap();
        let state = store.add_item("p1", 1).unwrap();
        assert_eq!(state.quantity("p1"), u32::MAX);
    }

    #[test]
    fn test_empty_cart_removes_stored_blob() {
        let (store, storage) = store();
        store.add_item("p1", 1).unwrap();
        store.remove_item("p1");
        assert!(storage.inner.read(DEFAULT_CART_KEY).unwrap().is_none());

        store.add_item("p2", 1).unwrap();
        store.clear();
        assert!(storage.inner.read(DEFAULT_CART_KEY).unwrap().is_none());
        assert!(store.is_durable());
        assert_eq!(storage.writes.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_listener_receives_new_state() {
        let (store, _) = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |state| {
            sink.lock().unwrap().push(state.quantity("p1"));
        });

        store.add_item("p1", 2).unwrap();
        store.add_item("p1", 1).unwrap();
        store.clear();

        assert_eq!(*seen.lock().unwrap(), [2, 3, 0]);
    }

    #[test]
    fn test_listener_may_read_store() {
        let store = Arc::new(CartStore::new(MemoryStorage::new()));
        let totals = Arc::new(Mutex::new(Vec::new()));
        let (handle, sink) = (Arc::clone(&store), Arc::clone(&totals));
        store.subscribe(move |_| {
            sink.lock().unwrap().push(handle.total(&Catalog::seed()).grand_total);
        });

        store.add_item("p2", 1).unwrap();

        assert_eq!(*totals.lock().unwrap(), [Decimal::from(399)]);
    }

    #[test]
    fn test_unsubscribe() {
        let (store, _) = store();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let id = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.add_item("p1", 1).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add_item("p1", 1).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_malformed_blob_loads_empty() {
        let (store, storage) = store();
        storage.inner.write(DEFAULT_CART_KEY, "{not json").unwrap();
        assert!(store.load().is_empty());

        let state = store.add_item("p1", 1).unwrap();
        assert_eq!(state.quantity("p1"), 1);
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let (store, storage) = store();
        store.add_item("p1", 1).unwrap();
        let notified = count_notifications(&store);

        storage.fail_writes.store(true, Ordering::SeqCst);
        let state = store.add_item("p2", 2).unwrap();

        assert_eq!(state.quantity("p2"), 2);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert!(!store.is_durable());

        // Storage recovering does not bring the session back to durable mode.
        storage.fail_writes.store(false, Ordering::SeqCst);
        store.add_item("p3", 1).unwrap();
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.load().len(), 3);

        let fresh = CartStore::new(Arc::clone(&storage));
        assert_eq!(fresh.load().quantity("p1"), 1);
        assert!(!fresh.load().contains("p2"));
    }

    #[test]
    fn test_read_failure_uses_last_known_cart() {
        let (store, storage) = store();
        store.add_item("p1", 2).unwrap();

        storage.fail_reads.store(true, Ordering::SeqCst);
        assert_eq!(store.load().quantity("p1"), 2);
        assert!(store.is_durable());
    }

    #[test]
    fn test_read_failure_during_mutation_keeps_saved_cart() {
        let storage = Arc::new(TestStorage::default());
        CartStore::new(Arc::clone(&storage)).add_item("p1", 2).unwrap();

        let store = CartStore::new(Arc::clone(&storage));
        let notified = count_notifications(&store);
        storage.fail_reads.store(true, Ordering::SeqCst);
        let state = store.add_item("p2", 1).unwrap();

        assert_eq!(state.quantity("p2"), 1);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        assert!(!store.is_durable());
        assert_eq!(storage.writes.load(Ordering::SeqCst), 1);

        storage.fail_reads.store(false, Ordering::SeqCst);
        let reloaded = CartStore::new(Arc::clone(&storage)).load();
        assert_eq!(reloaded.quantity("p1"), 2);
        assert!(!reloaded.contains("p2"));
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        const THREADS: usize = 8;
        const ADDS: usize = 200;

        let (store, storage) = store();
        let store = Arc::new(store);
        let notified = count_notifications(&store);

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..ADDS {
                        store.add_item("p1", 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(usize::try_from(store.quantity("p1")).unwrap(), THREADS * ADDS);
        assert_eq!(notified.load(Ordering::SeqCst), THREADS * ADDS);
        assert_eq!(storage.writes.load(Ordering::SeqCst), THREADS * ADDS);
        assert!(store.is_durable());
    }

    #[test]
    fn test_custom_key() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::new(Arc::clone(&storage)).with_key("dashboard_cart");
        store.add_item("p1", 1).unwrap();

        assert!(storage.read("dashboard_cart").unwrap().is_some());
        assert!(storage.read(DEFAULT_CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("ignore".parse(), Ok(QuantityPolicy::Ignore));
        assert_eq!(" REJECT ".parse(), Ok(QuantityPolicy::Reject));
        assert!("strict".parse::<QuantityPolicy>().is_err());
    }
}
