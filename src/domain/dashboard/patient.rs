use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::entity::Entity;

/// Clinic-wide summary for the current day.
///
/// Counts fall back to zero for a source that failed to load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDashboard {
    pub day: NaiveDate,
    pub patient_count: usize,

    /// The day's appointments, in server order
    pub todays_appointments: Vec<Entity>,
    pub warning: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl PatientDashboard {
    pub fn summarize(
        day: NaiveDate,
        patients: &[Entity],
        todays_appointments: Vec<Entity>,
        warning: Option<String>,
    ) -> Self {
        Self {
            day,
            patient_count: patients.len(),
            todays_appointments,
            warning,
            generated_at: Utc::now(),
        }
    }

    pub fn appointment_count(&self) -> usize {
        self.todays_appointments.len()
    }

    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}
