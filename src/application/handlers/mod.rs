//! Query handlers composing ports and the aggregation layer.

pub mod doctor_dashboard;
pub mod patient_dashboard;

pub use doctor_dashboard::{
    DoctorDashboardHandler, GetDoctorDashboardQuery, GetDoctorDashboardResult,
    APPOINTMENTS_SOURCE, PATIENTS_SOURCE,
};
pub use patient_dashboard::{
    GetPatientDashboardQuery, GetPatientDashboardResult, PatientDashboardHandler,
};
