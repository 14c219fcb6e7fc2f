//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the synchronization core and the remote backend. Adapters implement
//! these ports.
//!
//! - `TokenProvider` - Bearer credential for outbound calls
//! - `ResourceBackend` - Paged, mutable collection (user accounts)
//! - `AppointmentReader` / `DailyAppointmentReader` / `PatientReader` - Dashboard data sources

mod clinic_readers;
mod resource_backend;
mod token_provider;

pub use clinic_readers::{AppointmentReader, DailyAppointmentReader, PatientReader};
pub use resource_backend::{Page, ResourceBackend};
pub use token_provider::TokenProvider;
