//! Visual status of an upload or save control.
//!
//! `Idle -> InFlight -> Success | Error`, with Success and Error reverting to
//! `Idle` after a fixed delay. The revert resets what the operator sees; it
//! never touches the underlying request. While `InFlight`, `begin` refuses a
//! second submission, which is the only double-submit protection there is.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    InFlight,
    Success,
    Error(String),
}

impl SyncStatus {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SyncStatus::InFlight)
    }
}

#[derive(Debug)]
struct Inner {
    status: SyncStatus,
    /// Bumped on every transition so a stale revert timer does nothing.
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct StatusTracker {
    label: &'static str,
    inner: Arc<Mutex<Inner>>,
    reset_after: Duration,
}

impl StatusTracker {
    pub fn new(label: &'static str, reset_after: Duration) -> Self {
        Self {
            label,
            inner: Arc::new(Mutex::new(Inner {
                status: SyncStatus::Idle,
                generation: 0,
            })),
            reset_after,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn current(&self) -> SyncStatus {
        self.with_inner(|inner| inner.status.clone())
    }

    /// Moves to `InFlight`. Returns `false` if an operation is already in flight.
    pub fn begin(&self) -> bool {
        self.with_inner(|inner| {
            if inner.status.is_in_flight() {
                return false;
            }
            inner.status = SyncStatus::InFlight;
            inner.generation += 1;
            true
        })
    }

    /// Must be called from within a Tokio runtime; schedules the revert to idle.
    pub fn succeed(&self) {
        self.settle(SyncStatus::Success);
    }

    /// Must be called from within a Tokio runtime; schedules the revert to idle.
    pub fn fail(&self, message: impl Into<String>) {
        self.settle(SyncStatus::Error(message.into()));
    }

    /// Dismisses a finished status early, as the next user action does.
    pub fn acknowledge(&self) {
        self.with_inner(|inner| {
            if !inner.status.is_in_flight() {
                inner.status = SyncStatus::Idle;
                inner.generation += 1;
            }
        });
    }

    fn settle(&self, status: SyncStatus) {
        let generation = self.with_inner(|inner| {
            inner.status = status;
            inner.generation += 1;
            inner.generation
        });

        let tracker = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(tracker.reset_after).await;
            tracker.with_inner(|inner| {
                if inner.generation == generation {
                    inner.status = SyncStatus::Idle;
                    inner.generation += 1;
                    debug!("{} status reverted to idle", tracker.label);
                }
            });
        });
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        match self.inner.lock() {
            Ok(mut inner) => f(&mut inner),
            Err(poisoned) => {
                warn!("{} status lock poisoned", self.label);
                f(&mut poisoned.into_inner())
            }
        }
    }
}
