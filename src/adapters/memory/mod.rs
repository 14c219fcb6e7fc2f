//! In-memory adapters.
//!
//! - `InMemoryResourceBackend` - paged collection without a network

mod resource;

pub use resource::InMemoryResourceBackend;
