//! Observable state holders.
//!
//! Stores are plain values constructed with their dependencies; there is no
//! global instance. Every piece of state lives in a `tokio::sync::watch` cell,
//! so a view can read the latest value synchronously or `subscribe()` and be
//! woken on change.

mod app;
mod user;

use std::sync::Arc;

use tokio::sync::watch;

pub use app::AppStore;
pub use user::{UserStore, FETCH_FAILED, USER_CREATED, USER_DELETED, USER_UPDATED};

/// Counts operations in flight. Busy while at least one is running, so
/// overlapping operations cannot clear each other's indicator.
#[derive(Debug, Clone)]
pub struct BusyCounter {
    count: Arc<watch::Sender<usize>>,
}

impl Default for BusyCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyCounter {
    pub fn new() -> Self {
        Self {
            count: Arc::new(watch::Sender::new(0)),
        }
    }

    /// Mark one operation as started. It ends when the guard is dropped,
    /// whether the operation succeeded, failed or was cancelled.
    pub fn enter(&self) -> BusyGuard {
        self.count.send_modify(|n| *n += 1);
        BusyGuard {
            count: Arc::clone(&self.count),
        }
    }

    pub fn in_flight(&self) -> usize {
        *self.count.borrow()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.count.subscribe()
    }
}

#[derive(Debug)]
#[must_use = "the operation counts as finished as soon as the guard is dropped"]
pub struct BusyGuard {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.count.send_modify(|n| *n = n.saturating_sub(1));
    }
}
