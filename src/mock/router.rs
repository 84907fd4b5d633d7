//! Routes of the mock backend, one handler per backend endpoint.
//!
//! Every service is mounted on the same router so a single base URL
//! (`ServiceEndpoints::single`) reaches all of them.

use axum::extract::{Path, Request, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use super::state::MockState;
use super::MockError;
use crate::models::auth::{AuthResponse, Credentials};
use crate::models::certificate::{Certificate, NewCertificate};
use crate::models::medical_record::MedicalRecord;
use crate::models::notification::RawNotification;
use crate::models::patient::{PatientProfile, PatientProfileUpdate, PatientSummary};
use crate::models::profile::{ProviderProfile, ProviderProfileUpdate};
use crate::models::request::{MessagePayload, NewRequest, PatientRequest, RespondPayload};
use crate::models::AccountStatus;

type Result<T> = std::result::Result<T, MockError>;

pub fn mock_router(state: MockState) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/profile", get(provider_profile))
        .route("/api/auth/complete-profile", put(complete_provider_profile))
        .route("/api/patient/profile", get(patient_profile))
        .route("/api/patient/complete-profile", put(complete_patient_profile))
        .route("/api/patient/medical-history", get(medical_history))
        .route("/api/notifications", get(notifications))
        .route("/api/requests", get(list_requests).post(create_request))
        .route("/api/requests/patient/:id", get(patient_requests))
        .route("/api/requests/:id", get(get_request))
        .route("/api/requests/:id/respond", put(respond))
        .route("/api/requests/:id/messages", post(add_message))
        .route("/api/certificates", get(list_certificates).post(create_certificate))
        .route("/api/certificates/:id", get(get_certificate))
        .route("/api/certificates/:id/print", get(print_certificate))
        .route("/api/providers/patients/:id", get(list_patients))
        .route("/api/providers/patients/:id/assign", post(assign).delete(unassign))
        .route("/api/providers/patients/:id/activate", post(activate))
        .route("/api/providers/patients/:id/suspend", post(suspend))
        .route("/api/providers/medical-records", post(create_record))
        .route("/api/records", get(list_records))
        .route(
            "/api/records/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .layer(middleware::from_fn_with_state(state.clone(), inject_fault))
        .with_state(state)
}

/// Fail the request with the status armed by `force_status`, once.
async fn inject_fault(State(state): State<MockState>, req: Request, next: Next) -> Response {
    let forced = match state.lock() {
        Ok(mut data) => data.take_forced_status(),
        Err(e) => return e.into_response(),
    };
    match forced {
        Some(code) => {
            tracing::debug!(code, path = %req.uri().path(), "Injecting mock failure");
            MockError::Forced(code).into_response()
        }
        None => next.run(req).await,
    }
}

fn ack(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}

// ── Auth ─────────────────────────────────────────────────

async fn login(State(state): State<MockState>, Json(body): Json<Credentials>) -> Result<Json<AuthResponse>> {
    Ok(Json(state.lock()?.login(&body)?))
}

async fn register(
    State(state): State<MockState>,
    Json(body): Json<Credentials>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let resp = state.lock()?.register(&body)?;
    Ok((StatusCode::CREATED, Json(resp)))
}

// ── Profiles ─────────────────────────────────────────────

async fn provider_profile(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<ProviderProfile>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.provider_profile(&caller)?))
}

async fn complete_provider_profile(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<ProviderProfileUpdate>,
) -> Result<Json<ProviderProfile>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.complete_provider_profile(&caller, body)?))
}

async fn patient_profile(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<PatientProfile>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.patient_profile(&caller)?))
}

async fn complete_patient_profile(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<PatientProfileUpdate>,
) -> Result<Json<PatientProfile>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.complete_patient_profile(&caller, body)?))
}

async fn medical_history(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<Vec<MedicalRecord>>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.medical_history(&caller)?))
}

async fn notifications(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<Vec<RawNotification>>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.notifications(&caller)?))
}

// ── Requests ─────────────────────────────────────────────

async fn list_requests(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<Vec<PatientRequest>>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.list_requests(&caller)))
}

async fn create_request(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<NewRequest>,
) -> Result<(StatusCode, Json<PatientRequest>)> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok((StatusCode::CREATED, Json(data.create_request(&caller, body)?)))
}

async fn get_request(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PatientRequest>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.get_request(&caller, &id)?))
}

async fn patient_requests(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<PatientRequest>>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.patient_requests(&caller, &id)?))
}

async fn respond(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RespondPayload>,
) -> Result<Json<PatientRequest>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.respond(&caller, &id, body)?))
}

async fn add_message(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<MessagePayload>,
) -> Result<Json<PatientRequest>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.add_message(&caller, &id, &body.content)?))
}

// ── Certificates ─────────────────────────────────────────

async fn list_certificates(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<Vec<Certificate>>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.list_certificates(&caller)))
}

async fn create_certificate(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<NewCertificate>,
) -> Result<(StatusCode, Json<Certificate>)> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok((StatusCode::CREATED, Json(data.create_certificate(&caller, body)?)))
}

async fn get_certificate(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Certificate>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.get_certificate(&caller, &id)?))
}

async fn print_certificate(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    let cert = data.get_certificate(&caller, &id)?;
    let pdf = render_pdf(&cert);
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"certificate-{id}.pdf\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

/// Single-page PDF listing the certificate fields.
fn render_pdf(cert: &Certificate) -> Vec<u8> {
    let escape = |s: &str| s.replace('\\', "\\\\").replace('(', "\\(").replace(')', "\\)");
    let lines = [
        format!("Certificate {}", cert.certificate_number.as_deref().unwrap_or_default()),
        cert.title.clone(),
        format!("Patient: {}", cert.patient_name.as_deref().unwrap_or_default()),
        format!("Provider: {}", cert.provider_name.as_deref().unwrap_or_default()),
        cert.content.clone().unwrap_or_default(),
    ];
    let mut stream = String::from("BT /F1 12 Tf 72 720 Td 16 TL\n");
    for line in &lines {
        stream.push_str(&format!("({}) '\n", escape(line)));
    }
    stream.push_str("ET");

    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R /Resources << /Font << /F1 5 0 R >> >> >>".to_string(),
        format!("<< /Length {} >>\nstream\n{}\nendstream", stream.len(), stream),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", i + 1, obj));
    }
    let xref_at = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_at
    ));
    out.into_bytes()
}

// ── Provider gateway ─────────────────────────────────────

async fn list_patients(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(scope): Path<String>,
) -> Result<Json<Vec<PatientSummary>>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.list_patients(&caller, &scope)?))
}

async fn assign(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    data.assign(&caller, &id)?;
    Ok(ack("Patient assigned successfully"))
}

async fn unassign(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    data.unassign(&caller, &id)?;
    Ok(ack("Patient unassigned successfully"))
}

async fn activate(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PatientSummary>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.set_status(&caller, &id, AccountStatus::Active, None)?))
}

#[derive(Deserialize)]
struct SuspendBody {
    #[serde(default)]
    reason: Option<String>,
}

async fn suspend(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<SuspendBody>,
) -> Result<Json<PatientSummary>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    let reason = body.reason.filter(|r| !r.trim().is_empty());
    Ok(Json(data.set_status(&caller, &id, AccountStatus::Suspended, reason)?))
}

async fn create_record(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<MedicalRecord>,
) -> Result<(StatusCode, Json<MedicalRecord>)> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok((StatusCode::CREATED, Json(data.create_record(&caller, body)?)))
}

async fn list_records(State(state): State<MockState>, headers: HeaderMap) -> Result<Json<Vec<MedicalRecord>>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.list_records(&caller)?))
}

async fn get_record(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MedicalRecord>> {
    let data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.get_record(&caller, &id)?))
}

async fn update_record(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<MedicalRecord>,
) -> Result<Json<MedicalRecord>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    Ok(Json(data.update_record(&caller, &id, body)?))
}

async fn delete_record(
    State(state): State<MockState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let mut data = state.lock()?;
    let caller = data.authenticate(&headers)?;
    data.delete_record(&caller, &id)?;
    Ok(ack("Record deleted successfully"))
}
