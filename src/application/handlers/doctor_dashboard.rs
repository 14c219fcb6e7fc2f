//! DoctorDashboardHandler - Query handler for a doctor's landing page.
//!
//! Loads the doctor's appointments and the patient list concurrently. A
//! failure of either source degrades the summary instead of blocking it.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::application::aggregate::{AggregateFetcher, FetchSource, ScopeToken, Settlement};
use crate::domain::dashboard::{degraded_warning, DoctorDashboard};
use crate::domain::entity::Entity;
use crate::domain::foundation::{SourceId, ValidationError};
use crate::ports::{AppointmentReader, PatientReader};

pub const APPOINTMENTS_SOURCE: &str = "appointments";
pub const PATIENTS_SOURCE: &str = "patients";

/// Query to build the dashboard of one doctor.
#[derive(Debug, Clone)]
pub struct GetDoctorDashboardQuery {
    /// The doctor's id as appointment and patient records store it. The
    /// clinic UI passes the session's `cognito:username` attribute.
    pub doctor_id: String,
    /// Day used for the "today" count.
    pub today: NaiveDate,
}

/// `None` when a newer refresh superseded this one or the view went away.
pub type GetDoctorDashboardResult = Option<DoctorDashboard>;

/// Handler for the doctor dashboard.
///
/// Keep one handler per dashboard view so repeated refreshes share the
/// stale-invocation sequence.
pub struct DoctorDashboardHandler {
    appointments: Arc<dyn AppointmentReader>,
    patients: Arc<dyn PatientReader>,
    fetcher: AggregateFetcher<Vec<Entity>>,
}

impl DoctorDashboardHandler {
    pub fn new(appointments: Arc<dyn AppointmentReader>, patients: Arc<dyn PatientReader>) -> Self {
        Self {
            appointments,
            patients,
            fetcher: AggregateFetcher::new(),
        }
    }

    pub async fn handle(
        &self,
        query: GetDoctorDashboardQuery,
        scope: &ScopeToken,
    ) -> Result<GetDoctorDashboardResult, ValidationError> {
        if query.doctor_id.trim().is_empty() {
            return Err(ValidationError::empty_field("doctor_id"));
        }

        let appointments = Arc::clone(&self.appointments);
        let doctor_id = query.doctor_id.clone();
        let patients = Arc::clone(&self.patients);
        let sources = vec![
            FetchSource::new(SourceId::new(APPOINTMENTS_SOURCE)?, move || async move {
                appointments.list_by_doctor(&doctor_id).await
            }),
            FetchSource::new(SourceId::new(PATIENTS_SOURCE)?, move || async move {
                patients.list_patients().await
            }),
        ];

        let result = match self.fetcher.fetch(sources, scope).await {
            Settlement::Current(result) => result,
            Settlement::Superseded { .. } | Settlement::Discarded { .. } => return Ok(None),
        };

        let errors = result.errors();
        let warning = degraded_warning(
            errors
                .iter()
                .map(|e| (e.source_id.as_str(), e.message.as_str())),
        );
        let appointments = result
            .value(APPOINTMENTS_SOURCE)
            .cloned()
            .unwrap_or_default();
        let patients = result.value(PATIENTS_SOURCE).map(Vec::as_slice).unwrap_or(&[]);

        Ok(Some(DoctorDashboard::summarize(
            query.doctor_id,
            query.today,
            appointments,
            patients,
            warning,
        )))
    }
}
