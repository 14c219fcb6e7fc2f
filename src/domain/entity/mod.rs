//! Entity module - cached records and identity resolution.

mod identity;
mod record;

pub use identity::{ConsistencyWarning, IdentityResolver, Resolution, DEFAULT_IDENTIFIER_FIELDS};
pub use record::{Entity, ENABLED_FIELD};
