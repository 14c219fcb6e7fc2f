//! Dashboard summaries derived from aggregated sources.

pub mod doctor;
pub mod patient;

pub use doctor::{
    count_appointments_on, count_assigned_patients, degraded_warning, DoctorDashboard,
    APPOINTMENT_DATE_FIELD, DOCTOR_ASSIGNMENT_FIELDS,
};
pub use patient::PatientDashboard;
