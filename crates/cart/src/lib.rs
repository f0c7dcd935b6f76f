//! Clementine Cart - the shopping cart subsystem.
//!
//! Maintains a consistent notion of "what is in the cart" across two
//! disjoint storage backends - an anonymous, client-persisted cart and an
//! authenticated, server-owned cart - and reconciles them exactly once at
//! the moment identity changes.
//!
//! # Architecture
//!
//! - [`kv`] - injected key-value persistence capability
//! - [`local`] - anonymous cart store ([`local::LocalCartStore`])
//! - [`remote`] - backend cart API client ([`remote::RemoteCartClient`])
//!   behind the [`remote::CartBackend`] seam
//! - [`catalog`] - product snapshot lookup for resolving anonymous carts
//! - [`aggregator`] - display-ready cart for the current identity mode
//! - [`merge`] - one-shot local-to-remote merge on authentication events
//! - [`updates`] - per-item serialization of absolute quantity updates
//! - [`session`] - explicit auth session value object
//! - [`notify`] - transient, non-blocking user notifications
//!
//! # Data flow
//!
//! An anonymous user mutates the local store directly; the aggregator joins
//! its entries against fresh catalog snapshots on demand. On login or
//! signup the merge coordinator drains the local store into the remote
//! cart, clearing local state only on confirmed success. From then on all
//! cart operations go through the remote client, until logout resets the
//! local store to empty.
//!
//! # Example
//!
//! ```rust,ignore
//! use clementine_cart::{
//!     CartAggregator, CartApiConfig, CartMergeCoordinator, FileStore, HttpCatalog,
//!     LocalCartStore, RemoteCartClient, TracingNotifier,
//! };
//!
//! let config = CartApiConfig::from_env()?;
//! let backend = RemoteCartClient::new(config.clone())?;
//! let catalog = HttpCatalog::new(config)?;
//! let local = LocalCartStore::new(FileStore::open("state")?).into_shared();
//!
//! let aggregator = CartAggregator::new(local.clone(), catalog, backend.clone());
//! let coordinator = CartMergeCoordinator::new(local, backend, TracingNotifier);
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod aggregator;
pub mod catalog;
pub mod config;
pub mod error;
pub mod kv;
pub mod local;
pub mod merge;
pub mod notify;
pub mod remote;
pub mod session;
pub mod types;
pub mod updates;

pub use aggregator::{CartAggregator, ResolvedCart};
pub use catalog::{HttpCatalog, ProductCatalog, ProductSnapshot};
pub use config::{CartApiConfig, ConfigError};
pub use error::{
    CartApiError, CartError, StoreError, ValidationError, validate_requested_quantity,
};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use local::{CART_KEY, LocalCartStore, SharedLocalCart};
pub use merge::{CartMergeCoordinator, MergeOutcome};
pub use notify::{Notifier, TracingNotifier};
pub use remote::{CartBackend, RemoteCartClient};
pub use session::{AuthEvent, AuthSession};
pub use types::{CartEntry, CartItem, RemoteCart};
pub use updates::{SerializedUpdater, UpdateApplied};
