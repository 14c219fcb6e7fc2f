//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers and error types that form the
//! vocabulary of the synchronization layer.

mod errors;
mod ids;

pub use errors::{SyncError, ValidationError};
pub use ids::{PageCursor, SourceId};
