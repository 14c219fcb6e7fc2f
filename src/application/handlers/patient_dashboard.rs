//! PatientDashboardHandler - Query handler for the clinic-wide patient overview.
//!
//! Loads the patient list and the day's appointments concurrently. Either
//! source may fail without hiding the other.

use std::sync::Arc;

use chrono::NaiveDate;

use super::{APPOINTMENTS_SOURCE, PATIENTS_SOURCE};
use crate::application::aggregate::{AggregateFetcher, FetchSource, ScopeToken, Settlement};
use crate::domain::dashboard::{degraded_warning, PatientDashboard};
use crate::domain::entity::Entity;
use crate::domain::foundation::{SourceId, ValidationError};
use crate::ports::{DailyAppointmentReader, PatientReader};

/// Query to build the overview for one day.
#[derive(Debug, Clone)]
pub struct GetPatientDashboardQuery {
    pub today: NaiveDate,
}

/// `None` when a newer refresh superseded this one or the view went away.
pub type GetPatientDashboardResult = Option<PatientDashboard>;

pub struct PatientDashboardHandler {
    patients: Arc<dyn PatientReader>,
    appointments: Arc<dyn DailyAppointmentReader>,
    fetcher: AggregateFetcher<Vec<Entity>>,
}

impl PatientDashboardHandler {
    pub fn new(
        patients: Arc<dyn PatientReader>,
        appointments: Arc<dyn DailyAppointmentReader>,
    ) -> Self {
        Self {
            patients,
            appointments,
            fetcher: AggregateFetcher::new(),
        }
    }

    pub async fn handle(
        &self,
        query: GetPatientDashboardQuery,
        scope: &ScopeToken,
    ) -> Result<GetPatientDashboardResult, ValidationError> {
        let patients = Arc::clone(&self.patients);
        let appointments = Arc::clone(&self.appointments);
        let day = query.today;
        let sources = vec![
            FetchSource::new(SourceId::new(PATIENTS_SOURCE)?, move || async move {
                patients.list_patients().await
            }),
            FetchSource::new(SourceId::new(APPOINTMENTS_SOURCE)?, move || async move {
                appointments.list_for_day(day).await
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
        let patients = result.value(PATIENTS_SOURCE).map(Vec::as_slice).unwrap_or(&[]);
        let todays_appointments = result
            .value(APPOINTMENTS_SOURCE)
            .cloned()
            .unwrap_or_default();

        Ok(Some(PatientDashboard::summarize(
            query.today,
            patients,
            todays_appointments,
            warning,
        )))
    }
}
