//! Read-only ports for the clinic dashboard sources.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::entity::Entity;
use crate::domain::foundation::SyncError;

/// Read-only port for appointment queries
#[async_trait]
pub trait AppointmentReader: Send + Sync {
    /// Lists every appointment booked with the doctor
    async fn list_by_doctor(&self, doctor_id: &str) -> Result<Vec<Entity>, SyncError>;
}

/// Read-only port for the clinic's schedule of one day
#[async_trait]
pub trait DailyAppointmentReader: Send + Sync {
    /// Lists every appointment booked on `day`, across all doctors
    async fn list_for_day(&self, day: NaiveDate) -> Result<Vec<Entity>, SyncError>;
}

/// Read-only port for patient queries
#[async_trait]
pub trait PatientReader: Send + Sync {
    /// Lists all patients visible to the caller
    async fn list_patients(&self) -> Result<Vec<Entity>, SyncError>;
}
