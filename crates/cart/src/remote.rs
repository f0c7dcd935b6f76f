//! Remote cart API client.
//!
//! Thin, non-blocking wrapper around the backend cart endpoints. Every
//! operation returns `Result<_, CartApiError>`; network and server failures
//! are caught and converted, never left to unwind into the caller.
//!
//! # Endpoints
//!
//! - `GET    /cart`            - fetch the authenticated user's cart
//! - `POST   /cart`            - add an item (server accumulates)
//! - `PATCH  /cart/{item_id}`  - set an item's quantity (absolute, >= 1)
//! - `DELETE /cart/{item_id}`  - remove an item
//! - `PATCH  /cart/merge`      - merge local entries into the remote cart

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

use clementine_core::{CartItemId, ProductId, Quantity};

use crate::config::CartApiConfig;
use crate::error::CartApiError;
use crate::types::{CartEntry, CartItem, RemoteCart};

/// Backend cart operations, abstracted for testability.
///
/// [`RemoteCartClient`] is the production implementation; tests use scripted
/// in-memory fakes.
pub trait CartBackend: Send + Sync {
    /// Fetch the current remote cart.
    fn fetch(&self) -> impl Future<Output = Result<RemoteCart, CartApiError>> + Send;

    /// Add `quantity` units of a product. The server accumulates if the
    /// product is already in the cart.
    fn add(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<CartItem, CartApiError>> + Send;

    /// Set an item's quantity to an absolute value.
    ///
    /// Quantities below 1 are unrepresentable here; callers route those to
    /// [`delete`](Self::delete) instead.
    fn update_quantity(
        &self,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> impl Future<Output = Result<CartItem, CartApiError>> + Send;

    /// Remove an item from the cart.
    fn delete(&self, item_id: &CartItemId)
    -> impl Future<Output = Result<(), CartApiError>> + Send;

    /// Merge local entries into the remote cart and return the result.
    ///
    /// The server reconciles additively: quantities for overlapping products
    /// sum (capped at current stock), other products become new items.
    /// Repeating a merge with entries the client has not yet cleared is safe
    /// but additive; the coordinator only clears local state after a
    /// confirmed success, so confirmed merges are never double-counted.
    fn merge(
        &self,
        entries: &[CartEntry],
    ) -> impl Future<Output = Result<RemoteCart, CartApiError>> + Send;
}

#[derive(Serialize)]
struct AddItemRequest<'a> {
    product_id: &'a ProductId,
    quantity: u32,
}

#[derive(Serialize)]
struct UpdateQuantityRequest {
    quantity: u32,
}

#[derive(Serialize)]
struct MergeRequest<'a> {
    #[serde(rename = "cartItems")]
    cart_items: &'a [CartEntry],
}

/// Client for the backend cart API.
///
/// Cheap to clone; all clones share one HTTP connection pool.
#[derive(Clone)]
pub struct RemoteCartClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    client: reqwest::Client,
    config: CartApiConfig,
}

impl RemoteCartClient {
    /// Create a new cart API client.
    ///
    /// # Errors
    ///
    /// Returns [`CartApiError::Http`] if the HTTP client cannot be built.
    pub fn new(config: CartApiConfig) -> Result<Self, CartApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            inner: Arc::new(ClientInner { client, config }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.inner.config.base_url.as_str().trim_end_matches('/');
        format!("{base}/{path}")
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.inner.client.request(method, self.endpoint(path));
        if let Some(token) = self.inner.config.token_value() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, CartApiError> {
        let body = self.send_raw(builder).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Send a request, returning the body text after status handling.
    async fn send_raw(&self, builder: reqwest::RequestBuilder) -> Result<String, CartApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        // Read the body before the status check for better error messages.
        let body = response.text().await?;

        map_response(status, retry_after.as_deref(), body)
    }
}

/// Map a response's status, `Retry-After` header, and body into the uniform
/// error envelope.
fn map_response(
    status: reqwest::StatusCode,
    retry_after: Option<&str>,
    body: String,
) -> Result<String, CartApiError> {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = retry_after
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(CartApiError::RateLimited(retry_after));
    }

    if !status.is_success() {
        return Err(CartApiError::Server {
            status: status.as_u16(),
            message: extract_error_message(&body),
        });
    }

    Ok(body)
}

/// Pull the `error` field out of a JSON error body, falling back to a
/// truncated body snippet.
fn extract_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: String,
    }

    serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| body.chars().take(200).collect(),
        |parsed| parsed.error,
    )
}

impl CartBackend for RemoteCartClient {
    #[instrument(skip(self))]
    async fn fetch(&self) -> Result<RemoteCart, CartApiError> {
        self.send(self.request(reqwest::Method::GET, "cart")).await
    }

    #[instrument(skip(self))]
    async fn add(
        &self,
        product_id: &ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, CartApiError> {
        let body = AddItemRequest {
            product_id,
            quantity: quantity.get(),
        };
        self.send(self.request(reqwest::Method::POST, "cart").json(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn update_quantity(
        &self,
        item_id: &CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartApiError> {
        let body = UpdateQuantityRequest {
            quantity: quantity.get(),
        };
        let path = format!("cart/{item_id}");
        self.send(self.request(reqwest::Method::PATCH, &path).json(&body))
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, item_id: &CartItemId) -> Result<(), CartApiError> {
        let path = format!("cart/{item_id}");
        self.send_raw(self.request(reqwest::Method::DELETE, &path))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, entries), fields(entry_count = entries.len()))]
    async fn merge(&self, entries: &[CartEntry]) -> Result<RemoteCart, CartApiError> {
        let body = MergeRequest {
            cart_items: entries,
        };
        self.send(self.request(reqwest::Method::PATCH, "cart/merge").json(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = CartApiConfig::new("https://api.example.com/").expect("config");
        let client = RemoteCartClient::new(config).expect("client");
        assert_eq!(client.endpoint("cart"), "https://api.example.com/cart");
        assert_eq!(
            client.endpoint("cart/merge"),
            "https://api.example.com/cart/merge"
        );
    }

    #[test]
    fn test_map_response_passes_success_body_through() {
        let body = map_response(reqwest::StatusCode::OK, None, "[]".to_string()).expect("success");
        assert_eq!(body, "[]");
    }

    #[test]
    fn test_map_response_rate_limited_with_retry_after() {
        let err = map_response(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            Some("7"),
            String::new(),
        )
        .expect_err("rate limited");
        assert!(matches!(err, CartApiError::RateLimited(7)));
    }

    #[test]
    fn test_map_response_rate_limited_defaults_to_one_second() {
        let err = map_response(reqwest::StatusCode::TOO_MANY_REQUESTS, None, String::new())
            .expect_err("rate limited");
        assert!(matches!(err, CartApiError::RateLimited(1)));

        // An unparseable header falls back to the default too.
        let err = map_response(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            Some("soon"),
            String::new(),
        )
        .expect_err("rate limited");
        assert!(matches!(err, CartApiError::RateLimited(1)));
    }

    #[test]
    fn test_map_response_server_error_carries_status_and_message() {
        let err = map_response(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            None,
            r#"{"error": "cart store offline"}"#.to_string(),
        )
        .expect_err("server error");
        let CartApiError::Server { status, message } = err else {
            panic!("expected Server, got {err:?}");
        };
        assert_eq!(status, 500);
        assert_eq!(message, "cart store offline");
    }

    #[test]
    fn test_map_response_non_json_error_body_is_kept_verbatim() {
        let err = map_response(
            reqwest::StatusCode::NOT_FOUND,
            None,
            "no such item".to_string(),
        )
        .expect_err("server error");
        let CartApiError::Server { status, message } = err else {
            panic!("expected Server, got {err:?}");
        };
        assert_eq!(status, 404);
        assert_eq!(message, "no such item");
    }

    #[test]
    fn test_extract_error_message_prefers_error_field() {
        let body = r#"{"error": "item not found"}"#;
        assert_eq!(extract_error_message(body), "item not found");
    }

    #[test]
    fn test_extract_error_message_falls_back_to_body() {
        assert_eq!(extract_error_message("<html>bad gateway</html>"), "<html>bad gateway</html>");
    }

    #[test]
    fn test_merge_request_wire_shape() {
        let entries = vec![CartEntry::new(ProductId::new("p1"), 2)];
        let body = MergeRequest {
            cart_items: &entries,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"cartItems": [{"productId": "p1", "quantity": 2}]})
        );
    }

    #[test]
    fn test_add_request_wire_shape() {
        let product_id = ProductId::new("p1");
        let body = AddItemRequest {
            product_id: &product_id,
            quantity: 3,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json, serde_json::json!({"product_id": "p1", "quantity": 3}));
    }
}
