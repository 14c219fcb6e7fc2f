//! Mount-scoped cancellation.
//!
//! A `ViewScope` belongs to the view that owns some local state. Work started
//! on behalf of the view captures a `ScopeToken`; once the view is torn down
//! every outstanding token reports inactive and results are discarded
//! instead of being applied. In-flight network calls still complete.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generation counter shared by a view and the tokens it hands out.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    generation: Arc<AtomicU64>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures a token bound to the current generation.
    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            generation: Arc::clone(&self.generation),
            issued_at: self.generation.load(Ordering::SeqCst),
        }
    }

    /// Invalidates every token issued so far.
    pub fn teardown(&self) {
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(generation = previous + 1, "View scope torn down");
    }
}

/// Captured at invocation time and checked before applying state.
#[derive(Debug, Clone)]
pub struct ScopeToken {
    generation: Arc<AtomicU64>,
    issued_at: u64,
}

impl ScopeToken {
    /// A token not tied to any view. It is always active.
    pub fn detached() -> Self {
        ViewScope::new().token()
    }

    pub fn is_active(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued_at
    }
}
