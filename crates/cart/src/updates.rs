//! Per-item serialization of cart mutations.
//!
//! Quantity updates travel as absolute values, not deltas. If two updates
//! for the same item are in flight at once, network reordering can deliver
//! the stale response last and leave the cart at the wrong quantity. This
//! module serializes mutations per item identity (a queue keyed by item, not
//! a global lock): a later update does not start before the earlier one for
//! the same item resolves, and a completed-but-stale result is never applied
//! over a newer one. Mutations for distinct items proceed concurrently.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use clementine_core::{CartItemId, Quantity};

use crate::error::CartApiError;
use crate::remote::CartBackend;
use crate::types::CartItem;

/// Whether a completed update was applied or lost to a newer one.
#[derive(Debug)]
pub enum UpdateApplied {
    /// The result was applied; this is the item's current state.
    Applied(CartItem),
    /// A newer update for the same item was applied first; this result was
    /// discarded.
    Superseded,
}

/// Per-item ordering state.
#[derive(Default)]
struct ItemSlot {
    /// FIFO gate serializing in-flight mutations for this item.
    gate: tokio::sync::Mutex<()>,
    /// Next ticket to hand out.
    next_ticket: AtomicU64,
    /// Highest applied ticket + 1 (0 = nothing applied yet).
    applied_watermark: AtomicU64,
}

impl ItemSlot {
    fn take_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst)
    }

    /// Try to apply the result for `ticket`; fails if a newer ticket has
    /// already been applied. Dropping a pending mutation before this point
    /// leaves the watermark untouched, so cancellation has no side effects.
    fn try_apply(&self, ticket: u64) -> bool {
        let mut current = self.applied_watermark.load(Ordering::SeqCst);
        loop {
            if ticket < current {
                return false;
            }
            match self.applied_watermark.compare_exchange(
                current,
                ticket + 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => current = actual,
            }
        }
    }
}

/// Wraps a [`CartBackend`] so same-item mutations are issued and applied in
/// order.
pub struct SerializedUpdater<B> {
    backend: B,
    slots: Mutex<HashMap<CartItemId, Arc<ItemSlot>>>,
}

impl<B: CartBackend> SerializedUpdater<B> {
    /// Wrap a backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The wrapped backend, for operations that need no per-item ordering
    /// (fetch, add, merge).
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    fn slot(&self, item_id: &CartItemId) -> Arc<ItemSlot> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(item_id.clone()).or_default())
    }

    /// Set an item's quantity, serialized against other mutations for the
    /// same item.
    ///
    /// # Errors
    ///
    /// Returns [`CartApiError`] if the backend call fails; ordering state
    /// advances only when a result is applied.
    pub async fn update_quantity(
        &self,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> Result<UpdateApplied, CartApiError> {
        let slot = self.slot(item_id);
        let ticket = slot.take_ticket();
        let _gate = slot.gate.lock().await;

        let item = self.backend.update_quantity(item_id, quantity).await?;
        if slot.try_apply(ticket) {
            Ok(UpdateApplied::Applied(item))
        } else {
            Ok(UpdateApplied::Superseded)
        }
    }

    /// Remove an item, serialized against pending updates for it.
    ///
    /// # Errors
    ///
    /// Returns [`CartApiError`] if the backend call fails.
    pub async fn delete(&self, item_id: &CartItemId) -> Result<(), CartApiError> {
        let slot = self.slot(item_id);
        let ticket = slot.take_ticket();
        let _gate = slot.gate.lock().await;

        self.backend.delete(item_id).await?;
        slot.try_apply(ticket);

        // Drop the slot once the item is gone so the map is bounded by live
        // items, not every item ever touched. A mutation already queued on
        // this slot still holds its own `Arc` and finishes normally.
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(item_id);
        Ok(())
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
