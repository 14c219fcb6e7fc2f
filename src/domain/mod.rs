//! Domain layer containing synchronization rules and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (errors, identifier newtypes)
//! - `entity` - Loosely-typed records and multi-field identity resolution
//! - `session` - Roles, the signed-in session and its process-wide context
//! - `routing` - Declared routes and the role-based gate
//! - `dashboard` - Summaries derived from aggregated sources

pub mod dashboard;
pub mod entity;
pub mod foundation;
pub mod routing;
pub mod session;
