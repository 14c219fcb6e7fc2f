//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the synchronization core to external systems:
//! - `auth` - Token providers
//! - `rest` - The clinic REST backend over HTTP
//! - `memory` - In-process backends for tests and demos

pub mod auth;
pub mod memory;
pub mod rest;

pub use auth::StaticTokenProvider;
pub use memory::InMemoryResourceBackend;
pub use rest::{ApiClient, RestAppointmentReader, RestPatientReader, RestUserResource};
