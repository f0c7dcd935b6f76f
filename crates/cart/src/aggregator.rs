//! Cart aggregation.
//!
//! Produces the display-ready cart for the current identity mode:
//!
//! - Anonymous: join local entries against fresh catalog snapshots. No
//!   server round trip for the cart itself, and entries whose product no
//!   longer exists in the catalog are dropped from the view (the local
//!   store is left untouched).
//! - Authenticated: the remote cart is passed through as-is; it already
//!   carries resolved product data and is the authoritative state.
//!
//! Stock and price always come from the latest fetch, never from a cached
//! snapshot of a prior render.

use std::sync::PoisonError;

use tracing::{debug, instrument};

use clementine_core::{CartItemId, CurrencyCode, Price, ProductId};

use crate::catalog::ProductCatalog;
use crate::error::CartApiError;
use crate::kv::KeyValueStore;
use crate::local::SharedLocalCart;
use crate::remote::CartBackend;
use crate::session::AuthSession;
use crate::types::{CartItem, RemoteCart};

/// A resolved cart ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCart {
    /// Resolved items, in cart order.
    pub items: Vec<CartItem>,
    /// Sum of line subtotals. Derived, never persisted.
    pub total: Price,
    /// Total units across all items.
    pub item_count: u32,
}

impl ResolvedCart {
    /// An empty cart.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::zero(CurrencyCode::USD),
            item_count: 0,
        }
    }

    /// Build a resolved cart from items, deriving total and count.
    ///
    /// All items are assumed to be quoted in one currency (the backend
    /// serves a single storefront currency); the total adopts it.
    #[must_use]
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let currency = items
            .first()
            .map_or(CurrencyCode::USD, |item| item.price.currency_code);
        debug_assert!(
            items
                .iter()
                .all(|item| item.price.currency_code == currency),
            "mixed currencies in resolved cart"
        );
        let total = items.iter().fold(Price::zero(currency), |acc, item| {
            Price::new(acc.amount + item.subtotal().amount, currency)
        });
        let item_count = items.iter().map(|item| item.quantity).sum();
        Self {
            items,
            total,
            item_count,
        }
    }
}

impl From<RemoteCart> for ResolvedCart {
    fn from(cart: RemoteCart) -> Self {
        Self::from_items(cart.items)
    }
}

/// Resolves the displayable cart for the current identity mode.
pub struct CartAggregator<S, C, B> {
    local: SharedLocalCart<S>,
    catalog: C,
    backend: B,
}

impl<S, C, B> CartAggregator<S, C, B>
where
    S: KeyValueStore,
    C: ProductCatalog,
    B: CartBackend,
{
    /// Create an aggregator over the shared local cart and its collaborators.
    pub const fn new(local: SharedLocalCart<S>, catalog: C, backend: B) -> Self {
        Self {
            local,
            catalog,
            backend,
        }
    }

    /// Resolve the cart for the given session.
    ///
    /// # Errors
    ///
    /// Returns [`CartApiError`] if the catalog lookup (anonymous) or the
    /// remote fetch (authenticated) fails. Local state is never modified.
    #[instrument(skip(self, session), fields(authenticated = session.is_authenticated()))]
    pub async fn resolve(&self, session: &AuthSession) -> Result<ResolvedCart, CartApiError> {
        if session.is_authenticated() {
            let cart = self.backend.fetch().await?;
            return Ok(ResolvedCart::from(cart));
        }

        self.resolve_anonymous().await
    }

    async fn resolve_anonymous(&self) -> Result<ResolvedCart, CartApiError> {
        // Snapshot entries before awaiting; the lock is not held across I/O.
        let entries: Vec<_> = self
            .local
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec();
        if entries.is_empty() {
            return Ok(ResolvedCart::empty());
        }

        let ids: Vec<ProductId> = entries.iter().map(|e| e.product_id.clone()).collect();
        let snapshots = self.catalog.products_by_ids(&ids).await?;

        // Join by product id, preserving the local cart's insertion order.
        // Entries whose product vanished from the catalog are dropped from
        // the view only; the stored entry remains.
        let items = entries
            .into_iter()
            .filter_map(|entry| {
                let Some(snapshot) = snapshots.iter().find(|s| s.id == entry.product_id) else {
                    debug!(product_id = %entry.product_id, "dropping orphaned cart entry from view");
                    return None;
                };
                Some(CartItem {
                    id: CartItemId::new(entry.product_id.as_str()),
                    product_id: entry.product_id,
                    name: snapshot.name.clone(),
                    price: snapshot.price,
                    stock: snapshot.stock,
                    images: snapshot.images.clone(),
                    quantity: entry.quantity,
                })
            })
            .collect();

        Ok(ResolvedCart::from_items(items))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str, cents: i64, quantity: u32) -> CartItem {
        CartItem {
            id: CartItemId::new(id),
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Price::new(Decimal::new(cents, 2), CurrencyCode::USD),
            stock: 10,
            images: vec![],
            quantity,
        }
    }

    #[test]
    fn test_empty_cart() {
        let cart = ResolvedCart::empty();
        assert_eq!(cart.item_count, 0);
        assert_eq!(cart.total.amount, Decimal::ZERO);
    }

    #[test]
    fn test_from_items_derives_total_and_count() {
        let cart = ResolvedCart::from_items(vec![item("p1", 450, 2), item("p2", 100, 3)]);
        assert_eq!(cart.item_count, 5);
        // 2 * 4.50 + 3 * 1.00
        assert_eq!(cart.total.amount, Decimal::new(1200, 2));
    }

    #[test]
    #[should_panic(expected = "mixed currencies in resolved cart")]
    fn test_from_items_rejects_mixed_currencies() {
        let mut other = item("p2", 100, 1);
        other.price = Price::new(Decimal::new(100, 2), CurrencyCode::EUR);
        let _ = ResolvedCart::from_items(vec![item("p1", 450, 2), other]);
    }

    #[test]
    fn test_remote_cart_passthrough_shape() {
        let remote = RemoteCart {
            items: vec![item("p1", 450, 2)],
        };
        let cart = ResolvedCart::from(remote);
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.item_count, 2);
    }
}
