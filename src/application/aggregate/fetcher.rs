//! Partial-failure-tolerant aggregation of independent fetch sources.
//!
//! Every source runs to completion on the caller's task, interleaved with
//! its siblings through `join_all`. A source that fails (or panics) becomes
//! a [`FetchOutcome::Failure`] and never cancels the others.
//!
//! Each call to [`AggregateFetcher::fetch`] takes a new invocation number.
//! A result is published only if no newer invocation was started before it
//! settled, so a slow stale call can never overwrite fresher state.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::join_all;
use futures::FutureExt;

use super::scope::ScopeToken;
use crate::domain::foundation::{SourceId, SyncError};

/// Message recorded for a source whose operation panicked.
pub const PANIC_MESSAGE: &str = "source panicked";

type SourceFuture<T> = Pin<Box<dyn Future<Output = Result<T, SyncError>> + Send>>;
type SourceOperation<T> = Box<dyn FnOnce() -> SourceFuture<T> + Send>;

/// A named, zero-argument asynchronous fetch.
pub struct FetchSource<T> {
    id: SourceId,
    operation: SourceOperation<T>,
}

impl<T: Send + 'static> FetchSource<T> {
    pub fn new<F, Fut>(id: SourceId, operation: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, SyncError>> + Send + 'static,
    {
        Self {
            id,
            operation: Box::new(move || Box::pin(operation())),
        }
    }
}

impl<T> FetchSource<T> {
    pub fn id(&self) -> &SourceId {
        &self.id
    }
}

impl<T> fmt::Debug for FetchSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchSource").field("id", &self.id).finish()
    }
}

/// Outcome of a single source.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Success(T),
    Failure { source_id: SourceId, message: String },
}

impl<T> FetchOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FetchOutcome::Success(value) => Some(value),
            FetchOutcome::Failure { .. } => None,
        }
    }
}

/// A failed source, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub source_id: SourceId,
    pub message: String,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source_id, self.message)
    }
}

/// Combined outcome of one aggregation, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult<T> {
    per_source: Vec<(SourceId, FetchOutcome<T>)>,
    degraded: bool,
}

impl<T> AggregateResult<T> {
    pub fn new(per_source: Vec<(SourceId, FetchOutcome<T>)>) -> Self {
        let degraded = per_source.iter().any(|(_, outcome)| outcome.is_failure());
        Self {
            per_source,
            degraded,
        }
    }

    /// True iff at least one source failed.
    pub fn degraded(&self) -> bool {
        self.degraded
    }

    pub fn per_source(&self) -> &[(SourceId, FetchOutcome<T>)] {
        &self.per_source
    }

    /// Outcome of the first source registered under `source_id`.
    pub fn get(&self, source_id: &str) -> Option<&FetchOutcome<T>> {
        self.per_source
            .iter()
            .find(|(id, _)| id.as_str() == source_id)
            .map(|(_, outcome)| outcome)
    }

    /// Successful value of `source_id`, if any.
    pub fn value(&self, source_id: &str) -> Option<&T> {
        self.get(source_id).and_then(FetchOutcome::value)
    }

    pub fn errors(&self) -> Vec<SourceError> {
        self.per_source
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                FetchOutcome::Failure { source_id, message } => Some(SourceError {
                    source_id: source_id.clone(),
                    message: message.clone(),
                }),
                FetchOutcome::Success(_) => None,
            })
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.per_source.iter().filter(|(_, o)| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.per_source.len() - self.success_count()
    }
}

/// How an invocation settled from the caller's point of view.
#[derive(Debug, Clone)]
pub enum Settlement<T> {
    /// The invocation was the newest when it settled; its result is published.
    Current(Arc<AggregateResult<T>>),

    /// A newer invocation started first. The result was dropped.
    Superseded { invocation: u64, newest: u64 },

    /// The owning view was torn down before the result arrived.
    Discarded { invocation: u64 },
}

impl<T> Settlement<T> {
    /// The published result, if this invocation won.
    pub fn current(&self) -> Option<&Arc<AggregateResult<T>>> {
        match self {
            Settlement::Current(result) => Some(result),
            _ => None,
        }
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Settlement::Current(_))
    }
}

/// Runs sources concurrently and keeps the newest published result.
pub struct AggregateFetcher<T> {
    sequence: AtomicU64,
    latest: RwLock<Option<Arc<AggregateResult<T>>>>,
}

impl<T> Default for AggregateFetcher<T> {
    fn default() -> Self {
        Self {
            sequence: AtomicU64::new(0),
            latest: RwLock::new(None),
        }
    }
}

impl<T> fmt::Debug for AggregateFetcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateFetcher")
            .field("sequence", &self.sequence.load(Ordering::SeqCst))
            .finish()
    }
}

impl<T: Send + 'static> AggregateFetcher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published result.
    pub fn latest(&self) -> Option<Arc<AggregateResult<T>>> {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of invocations started so far.
    pub fn invocations(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Runs every source to completion and publishes the combined result.
    ///
    /// Never fails. Failures of individual sources are recorded in the
    /// result; the settlement tells the caller whether the result is the
    /// one it should display.
    pub async fn fetch(&self, sources: Vec<FetchSource<T>>, scope: &ScopeToken) -> Settlement<T> {
        let invocation = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(invocation, sources = sources.len(), "Aggregation started");

        let per_source = join_all(sources.into_iter().map(run_source)).await;
        let result = AggregateResult::new(per_source);

        if !scope.is_active() {
            tracing::debug!(invocation, "Aggregation discarded after view teardown");
            return Settlement::Discarded { invocation };
        }

        let mut latest = self.latest.write().unwrap_or_else(PoisonError::into_inner);
        let newest = self.sequence.load(Ordering::SeqCst);
        if newest != invocation {
            tracing::debug!(invocation, newest, "Stale aggregation result dropped");
            return Settlement::Superseded { invocation, newest };
        }

        if result.degraded() {
            tracing::warn!(
                invocation,
                failed = result.failure_count(),
                succeeded = result.success_count(),
                "Aggregation settled degraded"
            );
        }
        let result = Arc::new(result);
        *latest = Some(Arc::clone(&result));
        Settlement::Current(result)
    }
}

async fn run_source<T>(source: FetchSource<T>) -> (SourceId, FetchOutcome<T>) {
    let FetchSource { id, operation } = source;

    let settled = match std::panic::catch_unwind(AssertUnwindSafe(operation)) {
        Ok(future) => AssertUnwindSafe(future).catch_unwind().await,
        Err(payload) => Err(payload),
    };

    let outcome = match settled {
        Ok(Ok(value)) => FetchOutcome::Success(value),
        Ok(Err(error)) => {
            tracing::warn!(source_id = %id, error = %error, "Fetch source failed");
            FetchOutcome::Failure {
                source_id: id.clone(),
                message: error.to_string(),
            }
        }
        Err(_) => {
            tracing::error!(source_id = %id, "Fetch source panicked");
            FetchOutcome::Failure {
                source_id: id.clone(),
                message: PANIC_MESSAGE.to_string(),
            }
        }
    };
    (id, outcome)
}
