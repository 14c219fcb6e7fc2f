//! Clinic Sync - Client-side data synchronization for the clinic UI
//!
//! This crate sits between the clinic-management UI and its REST backend:
//! - multi-source dashboard fetching that tolerates partial failure
//! - a paginated, mutable resource cache kept coherent with the server
//! - role-based route authorization driven by the signed-in session

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
