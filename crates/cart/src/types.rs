//! Domain types for the cart subsystem.
//!
//! These types mirror the cart backend's wire contract and provide the
//! display-ready shapes the page layer renders. Prices travel as a
//! `{amount, currency_code}` object; quantities as plain integers.

use serde::{Deserialize, Serialize};

use clementine_core::{CartItemId, Price, ProductId};

/// A (product, quantity) pair in the anonymous local cart.
///
/// Serialized as `{"productId": ..., "quantity": ...}` both in local
/// persistence and in the merge request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Product this entry refers to. Unique within the local cart.
    pub product_id: ProductId,
    /// Units of the product. Always >= 1 while the entry exists.
    pub quantity: u32,
}

impl CartEntry {
    /// Create a new entry.
    #[must_use]
    pub const fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A resolved, display-ready cart item.
///
/// For authenticated carts `id` is the server-assigned item identity; for
/// anonymous carts no separate identity exists client-side, so it is the
/// product id itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Item identity used for update/delete calls.
    pub id: CartItemId,
    /// Product the item refers to.
    pub product_id: ProductId,
    /// Product display name.
    pub name: String,
    /// Unit price from the latest product snapshot.
    pub price: Price,
    /// Available stock from the latest product snapshot.
    pub stock: u32,
    /// Product image URLs.
    pub images: Vec<String>,
    /// Units in the cart.
    pub quantity: u32,
}

impl CartItem {
    /// Line subtotal (price x quantity). Derived on demand, never persisted.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.subtotal(self.quantity)
    }
}

/// The server-owned cart for an authenticated user.
///
/// Source of truth once the user is logged in; this subsystem only reads it
/// and proposes mutations through the backend API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteCart {
    /// Items in server order.
    pub items: Vec<CartItem>,
}

impl RemoteCart {
    /// Whether the remote cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
