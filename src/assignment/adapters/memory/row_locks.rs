//! Exclusive per-pull-request locks for the in-memory store.

use crate::assignment::{
    domain::PullRequestId,
    ports::{StoreError, StoreResult},
};
use std::collections::HashSet;
use std::sync::{Condvar, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often a blocked waiter re-checks for cancellation.
const CANCELLATION_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Lock table keyed by pull request identifier.
#[derive(Debug, Default)]
pub(super) struct RowLocks {
    held: Mutex<HashSet<PullRequestId>>,
    released: Condvar,
}

impl RowLocks {
    /// Blocks until `id` is free, then takes it.
    pub(super) fn acquire(
        &self,
        id: &PullRequestId,
        cancel: &CancellationToken,
    ) -> StoreResult<()> {
        let mut held = self.held.lock().map_err(poisoned)?;
        while held.contains(id) {
            if cancel.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            let (guard, _) = self
                .released
                .wait_timeout(held, CANCELLATION_POLL_INTERVAL)
                .map_err(poisoned)?;
            held = guard;
        }
        held.insert(id.clone());
        Ok(())
    }

    /// Releases every lock in `ids` and wakes waiters.
    pub(super) fn release(&self, ids: &[PullRequestId]) {
        if ids.is_empty() {
            return;
        }
        let mut held = self
            .held
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for id in ids {
            held.remove(id);
        }
        drop(held);
        self.released.notify_all();
    }
}

pub(super) fn poisoned(err: impl std::fmt::Display) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}
