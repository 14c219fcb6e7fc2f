//! Multi-source aggregation with stale-invocation protection.

mod fetcher;
mod scope;

pub use fetcher::{
    AggregateFetcher, AggregateResult, FetchOutcome, FetchSource, Settlement, SourceError,
    PANIC_MESSAGE,
};
pub use scope::{ScopeToken, ViewScope};
