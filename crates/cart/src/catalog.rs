//! Product catalog collaborator.
//!
//! The anonymous cart stores only (product, quantity) pairs; resolving it
//! for display requires the latest product snapshots from the catalog. The
//! aggregator always re-fetches - snapshots are never cached between
//! renders, so displayed price and stock reflect the backend's current
//! state.

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use clementine_core::{Price, ProductId};

use crate::config::CartApiConfig;
use crate::error::CartApiError;

/// Latest fetched catalog state for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Product identity.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current unit price.
    pub price: Price,
    /// Current available stock.
    pub stock: u32,
    /// Product image URLs.
    pub images: Vec<String>,
}

/// Batch product lookup, abstracted for testability.
pub trait ProductCatalog: Send + Sync {
    /// Fetch snapshots for the given products.
    ///
    /// Products unknown to the catalog are simply absent from the response;
    /// that is not an error.
    fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<Vec<ProductSnapshot>, CartApiError>> + Send;
}

/// Catalog lookup over the backend's product API.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<CatalogInner>,
}

struct CatalogInner {
    client: reqwest::Client,
    config: CartApiConfig,
}

impl HttpCatalog {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns [`CartApiError::Http`] if the HTTP client cannot be built.
    pub fn new(config: CartApiConfig) -> Result<Self, CartApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(CatalogInner { client, config }),
        })
    }
}

impl ProductCatalog for HttpCatalog {
    #[instrument(skip(self, ids), fields(id_count = ids.len()))]
    async fn products_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<ProductSnapshot>, CartApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids
            .iter()
            .map(ProductId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let base = self.inner.config.base_url.as_str().trim_end_matches('/');

        let response = self
            .inner
            .client
            .get(format!("{base}/products"))
            .query(&[("ids", joined)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CartApiError::Server {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use clementine_core::CurrencyCode;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_snapshot_wire_shape() {
        let json = serde_json::json!({
            "id": "p1",
            "name": "Clementine Crate",
            "price": {"amount": "4.50", "currency_code": "USD"},
            "stock": 12,
            "images": ["https://cdn.example.com/p1.jpg"]
        });
        let snapshot: ProductSnapshot = serde_json::from_value(json).expect("deserialize");
        assert_eq!(snapshot.id, ProductId::new("p1"));
        assert_eq!(snapshot.price, Price::new(Decimal::new(450, 2), CurrencyCode::USD));
        assert_eq!(snapshot.stock, 12);
    }
}
