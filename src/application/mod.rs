//! Application layer - Stateful coordinators and query handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! - `aggregate` - concurrent multi-source fetching with stale protection
//! - `resource_store` - paginated, mutable collection cache
//! - `handlers` - dashboard flows built on the two above

pub mod aggregate;
pub mod handlers;
pub mod resource_store;

pub use aggregate::{
    AggregateFetcher, AggregateResult, FetchOutcome, FetchSource, ScopeToken, Settlement,
    SourceError, ViewScope,
};
pub use handlers::{
    DoctorDashboardHandler, GetDoctorDashboardQuery, GetPatientDashboardQuery, PatientDashboardHandler,
};
pub use resource_store::{ResourceStore, StoreSnapshot, MAX_PAGE_LIMIT};
