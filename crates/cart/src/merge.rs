//! Cart merge coordination.
//!
//! When identity changes from anonymous to authenticated, the local cart is
//! drained into the remote cart exactly once. The coordinator owns that
//! transition:
//!
//! - Empty local cart: the transition completes with no network call.
//! - Merge success: the local store is cleared; the remote cart is
//!   authoritative from here on.
//! - Merge failure: the local store is left untouched and the failure is
//!   surfaced as a non-fatal warning. Login itself still succeeds; the
//!   stale local cart stays orphaned until the next successful merge (no
//!   automatic retry is scheduled here).
//!
//! Logout resets the local store to empty. The merge is one-directional
//! (local to remote only); items that exist only remotely stay invisible to
//! the anonymous view until the user logs in again.

use std::sync::PoisonError;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, instrument, warn};

use crate::error::CartApiError;
use crate::kv::KeyValueStore;
use crate::local::SharedLocalCart;
use crate::notify::Notifier;
use crate::remote::CartBackend;
use crate::types::RemoteCart;

/// Result of driving the anonymous-to-authenticated transition.
#[derive(Debug)]
pub enum MergeOutcome {
    /// Local entries were merged and the local store cleared.
    Merged(RemoteCart),
    /// The local cart was empty; nothing to merge, no network call made.
    Nothing,
    /// The merge failed; the local cart is preserved. Non-fatal - the
    /// identity transition still completes.
    Failed(CartApiError),
    /// A merge for this coordinator is already in flight; the call was
    /// rejected to prevent double-submission.
    AlreadyInFlight,
}

/// Drives the one-shot local-to-remote cart merge on authentication events.
///
/// Must be invoked once per successful authentication event, never on every
/// render or navigation.
pub struct CartMergeCoordinator<S, B, N> {
    local: SharedLocalCart<S>,
    backend: B,
    notifier: N,
    merge_in_flight: AtomicBool,
}

/// Resets the in-flight flag even if the merge future is dropped mid-call.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S, B, N> CartMergeCoordinator<S, B, N>
where
    S: KeyValueStore,
    B: CartBackend,
    N: Notifier,
{
    /// Create a coordinator over the shared local cart and its collaborators.
    pub const fn new(local: SharedLocalCart<S>, backend: B, notifier: N) -> Self {
        Self {
            local,
            backend,
            notifier,
            merge_in_flight: AtomicBool::new(false),
        }
    }

    /// Handle a successful login or signup.
    ///
    /// At most one merge runs at a time; re-entrant calls return
    /// [`MergeOutcome::AlreadyInFlight`] without touching anything. The
    /// local store is cleared only after the backend confirms the merge, so
    /// a failure mid-flight cannot lose unmerged items.
    #[instrument(skip(self))]
    pub async fn on_login(&self) -> MergeOutcome {
        if self
            .merge_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("merge already in flight, rejecting re-entrant call");
            return MergeOutcome::AlreadyInFlight;
        }
        let _guard = InFlightGuard(&self.merge_in_flight);

        let snapshot: Vec<_> = self
            .local
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries()
            .to_vec();
        if snapshot.is_empty() {
            debug!("local cart empty, nothing to merge");
            return MergeOutcome::Nothing;
        }

        match self.backend.merge(&snapshot).await {
            Ok(cart) => {
                self.local
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clear();
                debug!(merged_entries = snapshot.len(), "local cart merged and cleared");
                MergeOutcome::Merged(cart)
            }
            Err(e) => {
                warn!(error = %e, "cart merge failed, keeping local cart");
                self.notifier
                    .warning("Your saved cart could not be merged yet; it has been kept.");
                MergeOutcome::Failed(e)
            }
        }
    }

    /// Handle a logout: reset the local cart to empty.
    ///
    /// The remote cart is not consulted and never copied down.
    #[instrument(skip(self))]
    pub fn on_logout(&self) {
        self.local
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("local cart reset on logout");
    }
}
