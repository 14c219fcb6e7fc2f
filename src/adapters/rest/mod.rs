//! REST adapters over the clinic backend.
//!
//! - `ApiClient` - reqwest client with bearer auth and error mapping
//! - `RestUserResource` - `ResourceBackend` for user accounts
//! - `RestAppointmentReader` / `RestPatientReader` - dashboard sources

mod client;
mod clinic;
mod users;

pub use client::{ApiClient, REQUEST_ID_HEADER};
pub use clinic::{RestAppointmentReader, RestPatientReader};
pub use users::RestUserResource;
