// crates/api-strategist-core/src/runtime/cancel.rs
// ============================================================================
// Module: Cancellation Signal
// Description: Shared, cooperative cancellation for strategy runs.
// Purpose: Let callers abort a run before or during the model call.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! A [`CancellationSignal`] is a cloneable handle. Any clone may request
//! cancellation; all clones observe it. Synchronous code polls
//! [`CancellationSignal::is_cancelled`]; async code awaits
//! [`CancellationSignal::cancelled`], which completes once cancellation has
//! been requested. Cancellation is one-way: a signal is never reset.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use tokio::sync::Notify;

// ============================================================================
// SECTION: Signal
// ============================================================================

/// Shared state behind every clone of a signal.
#[derive(Debug, Default)]
struct SignalState {
    /// Set once cancellation has been requested.
    cancelled: AtomicBool,
    /// Wakes async waiters when cancellation is requested.
    notify: Notify,
}

/// Cooperative cancellation signal shared between a caller and a run.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    /// Shared signal state.
    state: Arc<SignalState>,
}

impl CancellationSignal {
    /// Creates a signal that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation and wakes all waiters.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Release);
        self.state.notify.notify_waiters();
    }

    /// Returns true once cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Acquire)
    }

    /// Completes when cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.state.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent cancel cannot slip between.
            notified.as_mut().enable();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
