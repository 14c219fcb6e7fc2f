//! Integration tests for the REST adapters against a local mock backend.
//!
//! The mock is an axum router bound to an ephemeral port. It mimics the
//! clinic API closely enough to verify:
//! 1. Request shape (paths, query, bearer header, request id)
//! 2. Cursor handling, including the literal "null" token
//! 3. Error mapping (401 -> Auth, 404 -> Server, bad body -> Malformed)
//! 4. Store and dashboard flows end to end over HTTP

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};

use clinic_sync::adapters::auth::StaticTokenProvider;
use clinic_sync::adapters::rest::{
    ApiClient, RestAppointmentReader, RestPatientReader, RestUserResource, REQUEST_ID_HEADER,
};
use clinic_sync::application::aggregate::ScopeToken;
use clinic_sync::application::handlers::{
    DoctorDashboardHandler, GetDoctorDashboardQuery, GetPatientDashboardQuery,
    PatientDashboardHandler,
};
use clinic_sync::application::resource_store::ResourceStore;
use clinic_sync::config::ApiConfig;
use clinic_sync::domain::entity::Entity;
use clinic_sync::domain::foundation::{PageCursor, SyncError};
use clinic_sync::ports::{
    AppointmentReader, DailyAppointmentReader, PatientReader, ResourceBackend,
};

// =============================================================================
// Mock Backend
// =============================================================================

const TOKEN: &str = "secret-token";

type ApiError = (StatusCode, Json<Value>);

#[derive(Default)]
struct MockData {
    users: Vec<Value>,
    appointments: Vec<Value>,
    patients_body: Value,
    list_body_override: Option<Value>,
    next_id: usize,
    authorizations: Vec<Option<String>>,
    request_ids: Vec<String>,
    list_queries: Vec<HashMap<String, String>>,
}

#[derive(Clone, Default)]
struct MockBackend {
    data: Arc<Mutex<MockData>>,
}

impl MockBackend {
    fn with_users(self, users: Vec<Value>) -> Self {
        self.data.lock().unwrap().users = users;
        self
    }

    fn with_appointments(self, appointments: Vec<Value>) -> Self {
        self.data.lock().unwrap().appointments = appointments;
        self
    }

    fn with_patients_body(self, body: Value) -> Self {
        self.data.lock().unwrap().patients_body = body;
        self
    }

    /// Makes every later `GET /users` answer 200 with `body` verbatim.
    fn answer_list_with(&self, body: Value) {
        self.data.lock().unwrap().list_body_override = Some(body);
    }

    fn users(&self) -> Vec<Value> {
        self.data.lock().unwrap().users.clone()
    }

    fn authorizations(&self) -> Vec<Option<String>> {
        self.data.lock().unwrap().authorizations.clone()
    }

    fn request_ids(&self) -> Vec<String> {
        self.data.lock().unwrap().request_ids.clone()
    }

    fn list_queries(&self) -> Vec<HashMap<String, String>> {
        self.data.lock().unwrap().list_queries.clone()
    }

    async fn serve(self) -> String {
        let app = Router::new()
            .route("/prod/users", get(list_users).post(create_user))
            .route("/prod/users/:id", put(update_user).delete(delete_user))
            .route("/prod/users/:id/:action", post(toggle_user))
            .route("/prod/appointments", get(appointments_by_date))
            .route("/prod/appointments/doctor/:doctor_id", get(appointments_by_doctor))
            .route("/prod/patients", get(list_patients))
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/prod", addr)
    }
}

fn not_found() -> ApiError {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "User not found" })))
}

fn authorize(backend: &MockBackend, headers: &HeaderMap) -> Result<(), ApiError> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut data = backend.data.lock().unwrap();
    data.authorizations.push(authorization.clone());
    data.request_ids.push(request_id);

    let expected = format!("Bearer {}", TOKEN);
    if authorization.as_deref() == Some(expected.as_str()) {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" }))))
    }
}

fn matches_id(user: &Value, id: &str) -> bool {
    ["id", "sub", "uniqueId"]
        .iter()
        .any(|field| user.get(field).and_then(Value::as_str) == Some(id))
}

async fn list_users(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&backend, &headers)?;
    let mut data = backend.data.lock().unwrap();
    data.list_queries.push(query.clone());
    if let Some(body) = data.list_body_override.clone() {
        return Ok(Json(body));
    }

    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(60);
    let offset: usize = query.get("nextToken").and_then(|t| t.parse().ok()).unwrap_or(0);
    let end = (offset + limit).min(data.users.len());
    let page = data.users.get(offset..end).unwrap_or(&[]).to_vec();
    // The real endpoint emits the literal string "null" on the last page.
    let next = if end < data.users.len() {
        end.to_string()
    } else {
        "null".to_string()
    };
    Ok(Json(json!({ "users": page, "nextToken": next })))
}

async fn create_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    authorize(&backend, &headers)?;
    let mut data = backend.data.lock().unwrap();
    data.next_id += 1;
    body["id"] = json!(format!("new-{}", data.next_id));
    data.users.push(body.clone());
    Ok(Json(body))
}

async fn update_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    authorize(&backend, &headers)?;
    let mut data = backend.data.lock().unwrap();
    let user = data
        .users
        .iter_mut()
        .find(|u| matches_id(u, &id))
        .ok_or_else(not_found)?;
    if let (Some(user), Some(changes)) = (user.as_object_mut(), body.as_object()) {
        for (field, value) in changes {
            user.insert(field.clone(), value.clone());
        }
    }
    Ok(Json(user.clone()))
}

async fn delete_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&backend, &headers)?;
    let mut data = backend.data.lock().unwrap();
    let before = data.users.len();
    data.users.retain(|u| !matches_id(u, &id));
    if data.users.len() == before {
        return Err(not_found());
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn toggle_user(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path((id, action)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    authorize(&backend, &headers)?;
    let enabled = match action.as_str() {
        "enable" => true,
        "disable" => false,
        _ => return Err((StatusCode::BAD_REQUEST, Json(json!({ "error": "Unknown action" })))),
    };
    let mut data = backend.data.lock().unwrap();
    let user = data
        .users
        .iter_mut()
        .find(|u| matches_id(u, &id))
        .ok_or_else(not_found)?;
    user["enabled"] = json!(enabled);
    Ok(Json(json!({ "message": format!("User {}d", action) })))
}

async fn appointments_by_doctor(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Path(doctor_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    authorize(&backend, &headers)?;
    if doctor_id == "dr-broken" {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Database unavailable" }))));
    }
    let data = backend.data.lock().unwrap();
    let appointments: Vec<Value> = data
        .appointments
        .iter()
        .filter(|a| a.get("doctorId").and_then(Value::as_str) == Some(doctor_id.as_str()))
        .cloned()
        .collect();
    Ok(Json(Value::Array(appointments)))
}

async fn appointments_by_date(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    authorize(&backend, &headers)?;
    let Some(date) = query.get("date") else {
        return Err((StatusCode::BAD_REQUEST, Json(json!({ "message": "date is required" }))));
    };
    let data = backend.data.lock().unwrap();
    let appointments: Vec<Value> = data
        .appointments
        .iter()
        .filter(|a| {
            a.get("appointmentDate")
                .and_then(Value::as_str)
                .map_or(false, |d| d.starts_with(date.as_str()))
        })
        .cloned()
        .collect();
    Ok(Json(Value::Array(appointments)))
}

async fn list_patients(
    State(backend): State<MockBackend>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    authorize(&backend, &headers)?;
    Ok(Json(backend.data.lock().unwrap().patients_body.clone()))
}

// =============================================================================
// Test Infrastructure
// =============================================================================

fn client(base_url: &str, tokens: StaticTokenProvider) -> ApiClient {
    ApiClient::new(base_url, Arc::new(tokens)).unwrap()
}

fn authorized_client(base_url: &str) -> ApiClient {
    client(base_url, StaticTokenProvider::new(TOKEN))
}

fn seeded_users(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| json!({ "id": format!("u{}", i), "enabled": true }))
        .collect()
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn list_page_sends_limit_cursor_and_credentials() {
    let backend = MockBackend::default().with_users(seeded_users(3));
    let base_url = backend.clone().serve().await;
    let users = RestUserResource::new(authorized_client(&base_url));

    let first = users.list_page(2, None).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.next.as_ref().map(PageCursor::as_str), Some("2"));

    let last = users.list_page(2, first.next.as_ref()).await.unwrap();
    assert_eq!(last.items.len(), 1);
    assert!(last.next.is_none(), "\"null\" cursor must mean no more pages");

    let queries = backend.list_queries();
    assert_eq!(queries[0].get("limit").map(String::as_str), Some("2"));
    assert!(!queries[0].contains_key("nextToken"));
    assert_eq!(queries[1].get("nextToken").map(String::as_str), Some("2"));

    let expected = format!("Bearer {}", TOKEN);
    assert!(backend
        .authorizations()
        .iter()
        .all(|a| a.as_deref() == Some(expected.as_str())));
    let ids = backend.request_ids();
    assert!(ids.iter().all(|id| uuid::Uuid::parse_str(id).is_ok()));
    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn missing_token_goes_out_without_authorization() {
    let backend = MockBackend::default().with_users(seeded_users(1));
    let base_url = backend.clone().serve().await;
    let users = RestUserResource::new(client(&base_url, StaticTokenProvider::empty()));

    let err = users.list_page(60, None).await.unwrap_err();

    assert_eq!(err, SyncError::auth("Unauthorized"));
    assert!(err.requires_reauthentication());
    assert_eq!(backend.authorizations(), vec![None]);
}

#[tokio::test]
async fn failing_token_provider_is_treated_as_no_token() {
    let backend = MockBackend::default();
    let base_url = backend.clone().serve().await;
    let tokens = StaticTokenProvider::new(TOKEN).with_error(SyncError::auth("Session expired"));
    let users = RestUserResource::new(client(&base_url, tokens));

    let err = users.list_page(60, None).await.unwrap_err();

    assert!(matches!(err, SyncError::Auth(_)));
    assert_eq!(backend.authorizations(), vec![None]);
}

#[tokio::test]
async fn mutations_hit_the_user_endpoints() {
    let backend = MockBackend::default().with_users(vec![json!({ "sub": "abc", "role": "doctor" })]);
    let base_url = backend.clone().serve().await;
    let users = RestUserResource::new(authorized_client(&base_url));

    let created = users
        .create(Entity::new().with("email", "new@clinic.test"))
        .await
        .unwrap();
    assert_eq!(created.get_str("id"), Some("new-1"));

    let updated = users
        .update("abc", Entity::new().with("role", "admin"))
        .await
        .unwrap();
    assert_eq!(updated.get_str("role"), Some("admin"));

    users.set_enabled("abc", false).await.unwrap();
    assert_eq!(backend.users()[0]["enabled"], json!(false));

    users.delete("abc").await.unwrap();
    assert_eq!(backend.users().len(), 1);
}

#[tokio::test]
async fn unknown_user_maps_to_server_error() {
    let backend = MockBackend::default();
    let base_url = backend.clone().serve().await;
    let users = RestUserResource::new(authorized_client(&base_url));

    let err = users.delete("ghost").await.unwrap_err();

    assert_eq!(err, SyncError::server(404, "User not found"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let users = RestUserResource::new(authorized_client(&format!("http://{}", addr)));

    let err = users.list_page(60, None).await.unwrap_err();

    assert!(matches!(err, SyncError::Transport(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn store_over_rest_keeps_cache_coherent() {
    let backend = MockBackend::default().with_users(vec![
        json!({ "sub": "abc", "enabled": true }),
        json!({ "id": "def", "enabled": true }),
        json!({ "uniqueId": "ghi", "enabled": true }),
    ]);
    let base_url = backend.clone().serve().await;
    let resource = Arc::new(RestUserResource::new(authorized_client(&base_url)));
    let store = ResourceStore::new(resource, 2);

    store.refresh().await;
    let state = store.load_more().await;
    assert_eq!(state.items.len(), 3);
    assert!(!state.has_more);

    store.disable("ghi").await.unwrap();
    store.delete("abc").await.unwrap();

    let state = store.snapshot();
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[0].get_str("id"), Some("def"));
    assert_eq!(state.items[1].enabled(), Some(false));
    assert!(state.last_error.is_none());
}

#[tokio::test]
async fn list_body_without_users_fails_refresh_and_keeps_cache() {
    let backend = MockBackend::default().with_users(seeded_users(2));
    let base_url = backend.clone().serve().await;
    let resource = Arc::new(RestUserResource::new(authorized_client(&base_url)));
    let store = ResourceStore::new(resource.clone(), 10);
    assert_eq!(store.refresh().await.items.len(), 2);

    backend.answer_list_with(json!({ "message": "Internal error" }));
    let err = resource.list_page(10, None).await.unwrap_err();
    assert!(matches!(err, SyncError::MalformedResponse(_)));

    backend.answer_list_with(json!({}));
    let state = store.refresh().await;

    assert_eq!(state.items.len(), 2);
    assert!(state.last_error.is_some());
    assert!(!state.loading);
}

// =============================================================================
// Dashboard Sources
// =============================================================================

#[tokio::test]
async fn patients_are_read_from_data_envelope() {
    let backend = MockBackend::default()
        .with_patients_body(json!({ "data": [{ "id": "p1" }, { "id": "p2" }] }));
    let base_url = backend.clone().serve().await;
    let patients = RestPatientReader::new(authorized_client(&base_url));

    assert_eq!(patients.list_patients().await.unwrap().len(), 2);
}

#[tokio::test]
async fn unexpected_patient_shape_is_malformed() {
    let backend = MockBackend::default().with_patients_body(json!({ "data": "oops" }));
    let base_url = backend.clone().serve().await;
    let patients = RestPatientReader::new(authorized_client(&base_url));

    let err = patients.list_patients().await.unwrap_err();
    assert!(matches!(err, SyncError::MalformedResponse(_)));
}

#[tokio::test]
async fn appointments_are_a_bare_array() {
    let backend = MockBackend::default().with_appointments(vec![
        json!({ "id": "a1", "doctorId": "dr-1" }),
        json!({ "id": "a2", "doctorId": "dr-2" }),
    ]);
    let base_url = backend.clone().serve().await;
    let appointments = RestAppointmentReader::new(authorized_client(&base_url));

    let listed = appointments.list_by_doctor("dr-1").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].get_str("id"), Some("a1"));
}

#[tokio::test]
async fn doctor_dashboard_degrades_when_appointments_fail() {
    let backend = MockBackend::default().with_patients_body(json!({
        "data": [
            { "id": "p1", "primaryDoctorId": "dr-broken" },
            { "id": "p2", "doctorId": "dr-other" },
        ]
    }));
    let base_url = backend.clone().serve().await;
    let config = ApiConfig::new(base_url.clone());
    let api = ApiClient::from_config(&config, Arc::new(StaticTokenProvider::new(TOKEN))).unwrap();
    let handler = DoctorDashboardHandler::new(
        Arc::new(RestAppointmentReader::new(api.clone())),
        Arc::new(RestPatientReader::new(api)),
    );

    let query = GetDoctorDashboardQuery {
        doctor_id: "dr-broken".to_string(),
        today: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
    };
    let dashboard = handler
        .handle(query, &ScopeToken::detached())
        .await
        .unwrap()
        .unwrap();

    assert!(dashboard.appointments.is_empty());
    assert_eq!(dashboard.assigned_patient_count, 1);
    assert_eq!(
        dashboard.warning.as_deref(),
        Some("Some data failed to load: appointments: Database unavailable")
    );
}

#[tokio::test]
async fn todays_appointments_are_queried_by_date() {
    let backend = MockBackend::default().with_appointments(vec![
        json!({ "id": "a1", "appointmentDate": "2024-03-14T09:00:00Z" }),
        json!({ "id": "a2", "appointmentDate": "2024-03-15T10:00:00Z" }),
    ]);
    let base_url = backend.clone().serve().await;
    let appointments = RestAppointmentReader::new(authorized_client(&base_url));

    let listed = appointments
        .list_for_day(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap())
        .await
        .unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].get_str("id"), Some("a1"));
}

#[tokio::test]
async fn patient_dashboard_degrades_when_patients_are_malformed() {
    let backend = MockBackend::default()
        .with_appointments(vec![json!({ "id": "a1", "appointmentDate": "2024-03-14T09:00:00Z" })])
        .with_patients_body(json!({ "patients": [] }));
    let base_url = backend.clone().serve().await;
    let api = authorized_client(&base_url);
    let handler = PatientDashboardHandler::new(
        Arc::new(RestPatientReader::new(api.clone())),
        Arc::new(RestAppointmentReader::new(api)),
    );

    let query = GetPatientDashboardQuery {
        today: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
    };
    let dashboard = handler
        .handle(query, &ScopeToken::detached())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(dashboard.patient_count, 0);
    assert_eq!(dashboard.appointment_count(), 1);
    assert!(dashboard
        .warning
        .as_deref()
        .map_or(false, |w| w.starts_with("Some data failed to load: patients: ")));
}
