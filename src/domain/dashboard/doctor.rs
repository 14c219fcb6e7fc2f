use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::entity::Entity;

/// Field holding an appointment's ISO-8601 date or timestamp.
pub const APPOINTMENT_DATE_FIELD: &str = "appointmentDate";

/// Patient fields that may name the treating doctor.
pub const DOCTOR_ASSIGNMENT_FIELDS: [&str; 2] = ["primaryDoctorId", "doctorId"];

/// Summary shown on a doctor's landing page.
///
/// Built from whatever sources loaded. A failed source contributes empty
/// data and is named in `warning`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDashboard {
    pub doctor_id: String,

    /// Every appointment of the doctor, in server order
    pub appointments: Vec<Entity>,
    pub todays_appointment_count: usize,
    pub assigned_patient_count: usize,

    /// Non-blocking notice listing the sources that failed
    pub warning: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl DoctorDashboard {
    pub fn summarize(
        doctor_id: impl Into<String>,
        today: NaiveDate,
        appointments: Vec<Entity>,
        patients: &[Entity],
        warning: Option<String>,
    ) -> Self {
        let doctor_id = doctor_id.into();
        let todays_appointment_count = count_appointments_on(&appointments, today);
        let assigned_patient_count = count_assigned_patients(patients, &doctor_id);
        Self {
            doctor_id,
            appointments,
            todays_appointment_count,
            assigned_patient_count,
            warning,
            generated_at: Utc::now(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

/// Counts appointments whose date part (before any `T`) is `day`.
pub fn count_appointments_on(appointments: &[Entity], day: NaiveDate) -> usize {
    let day = day.format("%Y-%m-%d").to_string();
    appointments
        .iter()
        .filter_map(|appointment| appointment.get_str(APPOINTMENT_DATE_FIELD))
        .filter(|date| date.split('T').next() == Some(day.as_str()))
        .count()
}

/// Counts patients assigned to `doctor_id` through either assignment field.
pub fn count_assigned_patients(patients: &[Entity], doctor_id: &str) -> usize {
    let count = patients
        .iter()
        .filter(|patient| {
            DOCTOR_ASSIGNMENT_FIELDS
                .iter()
                .any(|field| patient.get_str(field) == Some(doctor_id))
        })
        .count();

    if count == 0
        && !patients.is_empty()
        && !patients
            .iter()
            .any(|p| DOCTOR_ASSIGNMENT_FIELDS.iter().any(|f| p.has_field(f)))
    {
        tracing::warn!(
            patients = patients.len(),
            "Patient records carry no doctor assignment field"
        );
    }
    count
}

/// Joins `(source, message)` failures into the dashboard notice.
pub fn degraded_warning<'a, I>(failures: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let parts: Vec<String> = failures
        .into_iter()
        .map(|(source, message)| format!("{}: {}", source, message))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(format!("Some data failed to load: {}", parts.join("; ")))
    }
}
