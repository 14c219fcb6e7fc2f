//! REST adapters for the appointment and patient endpoints.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Method;
use serde::Deserialize;

use super::ApiClient;
use crate::domain::entity::Entity;
use crate::domain::foundation::SyncError;
use crate::ports::{AppointmentReader, DailyAppointmentReader, PatientReader};

/// Wire shape of `GET /patients`.
#[derive(Debug, Deserialize)]
struct PatientListResponse {
    data: Vec<Entity>,
}

/// Appointment queries. Both endpoints return a bare JSON array:
/// `GET /appointments/doctor/{doctorId}` and `GET /appointments?date=YYYY-MM-DD`.
#[derive(Clone)]
pub struct RestAppointmentReader {
    client: ApiClient,
}

impl RestAppointmentReader {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AppointmentReader for RestAppointmentReader {
    async fn list_by_doctor(&self, doctor_id: &str) -> Result<Vec<Entity>, SyncError> {
        let url = self.client.endpoint(&["appointments", "doctor", doctor_id]);
        let request = self.client.request(Method::GET, url).await;
        self.client.send_json(request).await
    }
}

#[async_trait]
impl DailyAppointmentReader for RestAppointmentReader {
    async fn list_for_day(&self, day: NaiveDate) -> Result<Vec<Entity>, SyncError> {
        let request = self
            .client
            .request(Method::GET, self.client.endpoint(&["appointments"]))
            .await
            .query(&[("date", day.format("%Y-%m-%d").to_string())]);
        self.client.send_json(request).await
    }
}

/// `GET /patients`, returning `{"data": [...]}`.
#[derive(Clone)]
pub struct RestPatientReader {
    client: ApiClient,
}

impl RestPatientReader {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PatientReader for RestPatientReader {
    async fn list_patients(&self) -> Result<Vec<Entity>, SyncError> {
        let request = self
            .client
            .request(Method::GET, self.client.endpoint(&["patients"]))
            .await;
        let body: PatientListResponse = self.client.send_json(request).await?;
        Ok(body.data)
    }
}
