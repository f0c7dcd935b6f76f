//! Anonymous local cart store.
//!
//! Keeps the unauthenticated user's cart as an ordered list of
//! (product, quantity) entries, persisted under a single well-known key in
//! the injected [`KeyValueStore`]. All operations work on the full snapshot
//! and persist it before returning.
//!
//! Cart mutations must never crash the page: when the underlying store
//! fails, operations degrade to the in-memory snapshot, the failure is
//! logged and counted, and nothing is raised to the caller. Malformed
//! persisted content loads as an empty cart.

use std::sync::{Arc, Mutex};

use tracing::warn;

use clementine_core::ProductId;

use crate::kv::KeyValueStore;
use crate::types::CartEntry;

/// Well-known persistence key for the local cart snapshot.
pub const CART_KEY: &str = "cart";

/// Handle for sharing one [`LocalCartStore`] between the aggregator and the
/// merge coordinator.
pub type SharedLocalCart<S> = Arc<Mutex<LocalCartStore<S>>>;

/// Client-persisted cart for unauthenticated users.
///
/// Invariants: `product_id` is unique across entries, quantity is always
/// >= 1, and insertion order is preserved. Any mutation that would drive a
/// quantity to 0 or below removes the entry instead.
#[derive(Debug)]
pub struct LocalCartStore<S> {
    store: S,
    entries: Vec<CartEntry>,
    persist_failures: u64,
}

impl<S: KeyValueStore> LocalCartStore<S> {
    /// Load the cart from `store`, treating missing or unparseable content
    /// as an empty cart.
    pub fn new(store: S) -> Self {
        let entries = match store.get(CART_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding malformed local cart snapshot");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "local cart storage unavailable, starting empty");
                Vec::new()
            }
        };
        Self {
            store,
            entries,
            persist_failures: 0,
        }
    }

    /// Wrap the store for sharing between components.
    #[must_use]
    pub fn into_shared(self) -> SharedLocalCart<S> {
        Arc::new(Mutex::new(self))
    }

    /// Current entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of persistence failures since this store was loaded.
    ///
    /// Diagnostics only; failures are never surfaced to callers.
    #[must_use]
    pub const fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing entry accumulates (new = old + quantity, saturating); a
    /// new product is appended. A zero quantity is a no-op.
    pub fn add(&mut self, product_id: &ProductId, quantity: u32) -> &[CartEntry] {
        if quantity == 0 {
            return &self.entries;
        }

        match self
            .entries
            .iter_mut()
            .find(|e| &e.product_id == product_id)
        {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self
                .entries
                .push(CartEntry::new(product_id.clone(), quantity)),
        }

        self.persist();
        &self.entries
    }

    /// Set an existing entry's quantity (overwrite, not accumulate).
    ///
    /// A quantity of 0 removes the entry. Updating a product that is not in
    /// the cart is a no-op - it does not create an entry.
    pub fn update(&mut self, product_id: &ProductId, quantity: u32) -> &[CartEntry] {
        let Some(index) = self
            .entries
            .iter()
            .position(|e| &e.product_id == product_id)
        else {
            return &self.entries;
        };

        if quantity == 0 {
            self.entries.remove(index);
        } else if let Some(entry) = self.entries.get_mut(index) {
            entry.quantity = quantity;
        }

        self.persist();
        &self.entries
    }

    /// Remove a product's entry if present; no-op otherwise.
    pub fn remove(&mut self, product_id: &ProductId) -> &[CartEntry] {
        let before = self.entries.len();
        self.entries.retain(|e| &e.product_id != product_id);
        if self.entries.len() != before {
            self.persist();
        }
        &self.entries
    }

    /// Empty the cart and remove the persisted snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(CART_KEY) {
            self.persist_failures += 1;
            warn!(error = %e, "failed to remove local cart snapshot");
        }
    }

    fn persist(&mut self) {
        let raw = match serde_json::to_string(&self.entries) {
            Ok(raw) => raw,
            Err(e) => {
                self.persist_failures += 1;
                warn!(error = %e, "failed to encode local cart snapshot");
                return;
            }
        };
        if let Err(e) = self.store.set(CART_KEY, &raw) {
            self.persist_failures += 1;
            warn!(error = %e, "failed to persist local cart, keeping in-memory snapshot");
        }
    }
}
