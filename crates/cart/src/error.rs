//! Cart error taxonomy.
//!
//! Four failure classes with distinct propagation rules:
//!
//! - [`ValidationError`] - rejected pre-flight, before any network or
//!   storage call; no state changes.
//! - [`CartApiError`] - network/server failures, returned as values through
//!   the uniform result envelope; cart state is left unchanged.
//! - [`StoreError`] - local persistence failures; logged and degraded to an
//!   in-memory cart, never raised to the caller.
//! - Merge failures - a [`CartApiError`] carried inside
//!   [`MergeOutcome::Failed`](crate::merge::MergeOutcome::Failed); login
//!   still completes.

use thiserror::Error;

use clementine_core::{Quantity, QuantityError};

/// Errors from the remote cart API or the catalog collaborator.
///
/// Every variant is a caught, converted failure - client code never sees an
/// unhandled transport error or panic from the network layer.
#[derive(Debug, Error)]
pub enum CartApiError {
    /// HTTP request failed (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Backend returned a non-success status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },
}

/// Errors from the local key-value persistence capability.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage backend is unavailable (disabled, quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Local, pre-flight input validation failures.
///
/// Raised before any network or storage call; nothing has changed when one
/// of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Quantity must be at least 1.
    #[error(transparent)]
    Quantity(#[from] QuantityError),

    /// Requested quantity exceeds available stock.
    #[error("requested quantity {requested} exceeds available stock {stock}")]
    ExceedsStock {
        /// Quantity the caller asked for.
        requested: u32,
        /// Stock available per the latest catalog snapshot.
        stock: u32,
    },
}

/// Validate a requested quantity against the latest known stock.
///
/// # Errors
///
/// Returns [`ValidationError::Quantity`] for a zero quantity and
/// [`ValidationError::ExceedsStock`] when the request exceeds `stock`.
pub fn validate_requested_quantity(
    requested: u32,
    stock: u32,
) -> std::result::Result<Quantity, ValidationError> {
    let quantity = Quantity::new(requested)?;
    if requested > stock {
        return Err(ValidationError::ExceedsStock { requested, stock });
    }
    Ok(quantity)
}

/// Umbrella error for callers that want a single error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Remote API failure.
    #[error("cart API error: {0}")]
    Api(#[from] CartApiError),

    /// Local persistence failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Pre-flight validation failure.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Configuration failure.
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for [`CartError`].
pub type Result<T> = std::result::Result<T, CartError>;
