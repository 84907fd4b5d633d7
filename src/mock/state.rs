//! In-memory data behind the mock backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::http::HeaderMap;
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use super::MockError;
use crate::models::auth::{AuthResponse, Credentials};
use crate::models::certificate::{Certificate, NewCertificate};
use crate::models::medical_record::MedicalRecord;
use crate::models::notification::RawNotification;
use crate::models::patient::{PatientProfile, PatientProfileUpdate, PatientSummary};
use crate::models::profile::{ProviderProfile, ProviderProfileUpdate};
use crate::models::request::{NewRequest, PatientRequest, Priority, RequestMessage, RequestStatus, RespondPayload};
use crate::models::{AccountStatus, CertificateStatus, Role, SenderType};

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    use base64::Engine;
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

fn short_id(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &id[..8]).to_uppercase()
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

// ═══════════════════════════════════════════════════════════
// Data
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct MockPatient {
    pub profile: PatientProfile,
    pub assigned_provider_id: Option<String>,
    pub suspension_reason: Option<String>,
    pub registered_at: Option<NaiveDateTime>,
}

impl MockPatient {
    fn id(&self) -> &str {
        self.profile.id.as_deref().unwrap_or_default()
    }

    fn status(&self) -> AccountStatus {
        self.profile.account_status.unwrap_or(AccountStatus::Pending)
    }

    fn full_name(&self) -> Option<String> {
        let name = [self.profile.first_name.as_deref(), self.profile.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        (!name.trim().is_empty()).then_some(name)
    }

    fn summary(&self) -> PatientSummary {
        PatientSummary {
            id: self.id().to_string(),
            email: self.profile.email.clone(),
            first_name: self.profile.first_name.clone(),
            last_name: self.profile.last_name.clone(),
            full_name: self.full_name(),
            phone: self.profile.phone.clone(),
            gender: self.profile.gender.clone(),
            city: self.profile.city.clone(),
            account_status: self.profile.account_status,
            date_of_birth: self.profile.date_of_birth.clone(),
            suspension_reason: self.suspension_reason.clone(),
            assigned_provider_id: self.assigned_provider_id.clone(),
        }
    }
}

/// Authenticated caller resolved from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub account_id: String,
    pub role: Role,
}

impl Caller {
    fn require(&self, role: Role) -> Result<(), MockError> {
        if self.role == role {
            Ok(())
        } else {
            Err(MockError::Forbidden(format!("{} access required", role.label())))
        }
    }
}

#[derive(Debug, Default)]
pub struct MockData {
    pub accounts: Vec<Account>,
    pub tokens: HashMap<String, String>,
    pub patients: Vec<MockPatient>,
    pub providers: Vec<ProviderProfile>,
    pub requests: Vec<PatientRequest>,
    pub certificates: Vec<Certificate>,
    pub records: Vec<MedicalRecord>,
    forced_status: Option<u16>,
}

impl MockData {
    // ── Auth ─────────────────────────────────────────────

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Caller, MockError> {
        let token = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(MockError::Unauthorized)?;
        let account_id = self.tokens.get(token).ok_or(MockError::Unauthorized)?;
        let account = self
            .accounts
            .iter()
            .find(|a| &a.id == account_id)
            .ok_or(MockError::Unauthorized)?;
        Ok(Caller {
            account_id: account.id.clone(),
            role: account.role,
        })
    }

    pub fn login(&mut self, credentials: &Credentials) -> Result<AuthResponse, MockError> {
        let account = self
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(credentials.email.trim()) && a.password == credentials.password)
            .cloned()
            .ok_or(MockError::InvalidCredentials)?;
        Ok(self.issue_session(&account, "Login successful"))
    }

    pub fn register(&mut self, credentials: &Credentials) -> Result<AuthResponse, MockError> {
        let email = credentials.email.trim();
        if !email.contains('@') {
            return Err(MockError::BadRequest("A valid email is required".into()));
        }
        if credentials.password.len() < 6 {
            return Err(MockError::BadRequest("Password must be at least 6 characters".into()));
        }
        if self.accounts.iter().any(|a| a.email.eq_ignore_ascii_case(email)) {
            return Err(MockError::Conflict("Email already registered".into()));
        }

        let id = short_id("pat").to_lowercase();
        let account = Account {
            id: id.clone(),
            email: email.to_string(),
            password: credentials.password.clone(),
            role: Role::Patient,
        };
        self.accounts.push(account.clone());
        self.patients.push(MockPatient {
            profile: PatientProfile {
                id: Some(id.clone()),
                patient_id: Some(id),
                email: email.to_string(),
                country: Some(PatientProfileUpdate::DEFAULT_COUNTRY.into()),
                account_status: Some(AccountStatus::Pending),
                ..Default::default()
            },
            assigned_provider_id: None,
            suspension_reason: None,
            registered_at: Some(now()),
        });
        tracing::info!(email, "Mock patient registered");
        Ok(self.issue_session(&account, "Registration successful"))
    }

    fn issue_session(&mut self, account: &Account, message: &str) -> AuthResponse {
        let token = generate_token();
        self.tokens.insert(token.clone(), account.id.clone());
        let status = match account.role {
            Role::Patient => self.patient(&account.id).ok().map(MockPatient::status),
            Role::Provider => None,
        };
        AuthResponse {
            token,
            email: account.email.clone(),
            role: account.role.as_str().to_string(),
            message: Some(message.to_string()),
            account_status: status,
            can_access_medical_history: status == Some(AccountStatus::Active),
        }
    }

    // ── Fault injection ──────────────────────────────────

    pub fn force_status(&mut self, status: u16) {
        self.forced_status = Some(status);
    }

    pub fn take_forced_status(&mut self) -> Option<u16> {
        self.forced_status.take()
    }

    // ── Patients ─────────────────────────────────────────

    fn patient(&self, id: &str) -> Result<&MockPatient, MockError> {
        self.patients
            .iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| MockError::NotFound(format!("Patient {id} not found")))
    }

    fn patient_mut(&mut self, id: &str) -> Result<&mut MockPatient, MockError> {
        self.patients
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| MockError::NotFound(format!("Patient {id} not found")))
    }

    /// Caller must be a patient whose account is active.
    fn active_patient(&self, caller: &Caller) -> Result<&MockPatient, MockError> {
        caller.require(Role::Patient)?;
        let patient = self.patient(&caller.account_id)?;
        if patient.status().unlocks_features() {
            Ok(patient)
        } else {
            Err(MockError::NotActivated(patient.status()))
        }
    }

    pub fn patient_profile(&self, caller: &Caller) -> Result<PatientProfile, MockError> {
        caller.require(Role::Patient)?;
        Ok(self.patient(&caller.account_id)?.profile.clone())
    }

    pub fn complete_patient_profile(
        &mut self,
        caller: &Caller,
        update: PatientProfileUpdate,
    ) -> Result<PatientProfile, MockError> {
        caller.require(Role::Patient)?;
        if !update.missing_fields().is_empty() {
            return Err(MockError::BadRequest(
                "First name, last name, phone and date of birth are required".into(),
            ));
        }
        let opt = |v: String| (!blank(&v)).then_some(v);
        let patient = self.patient_mut(&caller.account_id)?;
        let profile = &mut patient.profile;
        profile.first_name = opt(update.first_name);
        profile.last_name = opt(update.last_name);
        profile.phone = opt(update.phone);
        profile.date_of_birth = update.date_of_birth.map(|d| d.format("%Y-%m-%d").to_string());
        profile.gender = opt(update.gender);
        profile.address = opt(update.address);
        profile.city = opt(update.city);
        profile.state = opt(update.state);
        profile.zip_code = opt(update.zip_code);
        profile.country = opt(update.country);
        profile.blood_type = opt(update.blood_type);
        profile.emergency_contact = opt(update.emergency_contact);
        profile.allergies = update.allergies;
        profile.chronic_diseases = update.chronic_diseases;
        profile.profile_complete = profile.is_complete();
        Ok(profile.clone())
    }

    pub fn list_patients(&self, caller: &Caller, scope: &str) -> Result<Vec<PatientSummary>, MockError> {
        caller.require(Role::Provider)?;
        let keep = |p: &&MockPatient| match scope {
            "all" => true,
            "assigned" => p.assigned_provider_id.as_deref() == Some(caller.account_id.as_str()),
            _ => p.assigned_provider_id.is_none(),
        };
        if !matches!(scope, "all" | "assigned" | "unassigned") {
            return Err(MockError::NotFound(format!("Unknown patient list: {scope}")));
        }
        let mut patients: Vec<&MockPatient> = self.patients.iter().filter(keep).collect();
        patients.sort_by(|a, b| b.registered_at.cmp(&a.registered_at));
        Ok(patients.into_iter().map(MockPatient::summary).collect())
    }

    pub fn assign(&mut self, caller: &Caller, patient_id: &str) -> Result<PatientSummary, MockError> {
        caller.require(Role::Provider)?;
        let provider_id = caller.account_id.clone();
        let patient = self.patient_mut(patient_id)?;
        match patient.assigned_provider_id.as_deref() {
            Some(other) if other != provider_id => {
                Err(MockError::Conflict("Patient is already assigned to another provider".into()))
            }
            _ => {
                patient.assigned_provider_id = Some(provider_id);
                Ok(patient.summary())
            }
        }
    }

    pub fn unassign(&mut self, caller: &Caller, patient_id: &str) -> Result<PatientSummary, MockError> {
        caller.require(Role::Provider)?;
        let provider_id = caller.account_id.clone();
        let patient = self.patient_mut(patient_id)?;
        if patient.assigned_provider_id.as_deref() != Some(provider_id.as_str()) {
            return Err(MockError::BadRequest("Patient is not assigned to you".into()));
        }
        patient.assigned_provider_id = None;
        Ok(patient.summary())
    }

    pub fn set_status(
        &mut self,
        caller: &Caller,
        patient_id: &str,
        status: AccountStatus,
        reason: Option<String>,
    ) -> Result<PatientSummary, MockError> {
        caller.require(Role::Provider)?;
        let patient = self.patient_mut(patient_id)?;
        patient.profile.account_status = Some(status);
        patient.suspension_reason = match status {
            AccountStatus::Suspended => reason,
            _ => None,
        };
        tracing::info!(patient_id, status = %status, "Mock patient status changed");
        Ok(patient.summary())
    }

    // ── Providers ────────────────────────────────────────

    fn provider_mut(&mut self, id: &str) -> Result<&mut ProviderProfile, MockError> {
        self.providers
            .iter_mut()
            .find(|p| p.id.as_deref() == Some(id))
            .ok_or_else(|| MockError::NotFound(format!("Provider {id} not found")))
    }

    fn provider_name(&self, id: &str) -> Option<String> {
        self.providers
            .iter()
            .find(|p| p.id.as_deref() == Some(id))
            .map(|p| p.display_name().to_string())
    }

    pub fn provider_profile(&mut self, caller: &Caller) -> Result<ProviderProfile, MockError> {
        caller.require(Role::Provider)?;
        Ok(self.provider_mut(&caller.account_id)?.clone())
    }

    pub fn complete_provider_profile(
        &mut self,
        caller: &Caller,
        update: ProviderProfileUpdate,
    ) -> Result<ProviderProfile, MockError> {
        caller.require(Role::Provider)?;
        if !update.missing_fields().is_empty() {
            return Err(MockError::BadRequest(
                "Full name, professional title and specialty are required".into(),
            ));
        }
        let opt = |v: String| (!blank(&v)).then_some(v);
        let profile = self.provider_mut(&caller.account_id)?;
        profile.full_name = opt(update.full_name);
        profile.professional_title = opt(update.professional_title);
        profile.specialty = opt(update.specialty);
        profile.sub_specialties = update.sub_specialties;
        profile.state_licenses = update.state_licenses;
        profile.primary_clinic_name = opt(update.primary_clinic_name);
        profile.clinic_address = opt(update.clinic_address);
        profile.contact_number = opt(update.contact_number);
        profile.profile_complete = true;
        Ok(profile.clone())
    }

    // ── Requests ─────────────────────────────────────────

    fn request_mut(&mut self, id: &str) -> Result<&mut PatientRequest, MockError> {
        self.requests
            .iter_mut()
            .find(|r| r.request_id == id)
            .ok_or_else(|| MockError::NotFound(format!("Request {id} not found")))
    }

    fn can_see(caller: &Caller, request: &PatientRequest) -> bool {
        caller.role == Role::Provider || request.patient_id.as_deref() == Some(caller.account_id.as_str())
    }

    pub fn list_requests(&self, caller: &Caller) -> Vec<PatientRequest> {
        let mut requests: Vec<PatientRequest> = self
            .requests
            .iter()
            .filter(|r| Self::can_see(caller, r))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    pub fn get_request(&self, caller: &Caller, id: &str) -> Result<PatientRequest, MockError> {
        self.requests
            .iter()
            .find(|r| r.request_id == id && Self::can_see(caller, r))
            .cloned()
            .ok_or_else(|| MockError::NotFound(format!("Request {id} not found")))
    }

    pub fn patient_requests(&self, caller: &Caller, patient_id: &str) -> Result<Vec<PatientRequest>, MockError> {
        if caller.role == Role::Patient && caller.account_id != patient_id {
            return Err(MockError::Forbidden("Cannot read another patient's requests".into()));
        }
        Ok(self
            .list_requests(caller)
            .into_iter()
            .filter(|r| r.patient_id.as_deref() == Some(patient_id))
            .collect())
    }

    pub fn create_request(&mut self, caller: &Caller, new: NewRequest) -> Result<PatientRequest, MockError> {
        let patient = self.active_patient(caller)?;
        if blank(&new.subject) || blank(&new.description) {
            return Err(MockError::BadRequest("Subject and description are required".into()));
        }
        let at = now();
        let request = PatientRequest {
            request_id: short_id("REQ"),
            patient_id: Some(caller.account_id.clone()),
            patient_email: Some(patient.profile.email.clone()),
            patient_name: patient.full_name(),
            request_type: Some(new.request_type),
            priority: Some(Priority::parse(&new.priority)),
            subject: new.subject,
            description: Some(new.description),
            preferred_date: new.preferred_date,
            status: RequestStatus::Pending,
            target_provider_id: new.target_provider_id,
            provider_id: None,
            provider_name: None,
            response_message: None,
            response_date: None,
            messages: Vec::new(),
            created_at: Some(at),
            updated_at: Some(at),
        };
        self.requests.push(request.clone());
        Ok(request)
    }

    pub fn respond(&mut self, caller: &Caller, id: &str, payload: RespondPayload) -> Result<PatientRequest, MockError> {
        caller.require(Role::Provider)?;
        let provider_name = self.provider_name(&caller.account_id);
        let request = self.request_mut(id)?;
        let at = now();
        request.status = payload.status;
        request.response_message = Some(payload.response_message);
        request.response_date = Some(at);
        request.provider_id = Some(caller.account_id.clone());
        request.provider_name = provider_name;
        request.updated_at = Some(at);
        Ok(request.clone())
    }

    pub fn add_message(&mut self, caller: &Caller, id: &str, content: &str) -> Result<PatientRequest, MockError> {
        if blank(content) {
            return Err(MockError::BadRequest("Message content is required".into()));
        }
        let caller = caller.clone();
        let request = self.request_mut(id)?;
        if !Self::can_see(&caller, request) {
            return Err(MockError::NotFound(format!("Request {id} not found")));
        }
        let at = now();
        request.messages.push(RequestMessage {
            sender_id: Some(caller.account_id.clone()),
            sender_type: Some(match caller.role {
                Role::Patient => SenderType::Patient,
                Role::Provider => SenderType::Provider,
            }),
            content: content.trim().to_string(),
            timestamp: Some(at),
        });
        request.updated_at = Some(at);
        Ok(request.clone())
    }

    // ── Notifications ────────────────────────────────────

    /// Responded requests of a patient, most recent first.
    pub fn notifications_for(&self, patient_id: &str) -> Vec<RawNotification> {
        let mut items: Vec<RawNotification> = self
            .requests
            .iter()
            .filter(|r| r.patient_id.as_deref() == Some(patient_id) && r.response_message.is_some())
            .map(|r| RawNotification {
                request_id: Some(r.request_id.clone()),
                message: None,
                response_message: r.response_message.clone(),
                status: Some(r.status.clone()),
                provider_name: r.provider_name.clone(),
                provider_id: r.provider_id.clone(),
                request_type: r.request_type.clone(),
                subject: Some(r.subject.clone()),
                priority: r.priority.clone(),
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect();
        items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        items
    }

    pub fn notifications(&self, caller: &Caller) -> Result<Vec<RawNotification>, MockError> {
        self.active_patient(caller)?;
        Ok(self.notifications_for(&caller.account_id))
    }

    // ── Records ──────────────────────────────────────────

    pub fn medical_history(&self, caller: &Caller) -> Result<Vec<MedicalRecord>, MockError> {
        self.active_patient(caller)?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.patient_id.as_deref() == Some(caller.account_id.as_str()))
            .cloned()
            .collect())
    }

    pub fn list_records(&self, caller: &Caller) -> Result<Vec<MedicalRecord>, MockError> {
        caller.require(Role::Provider)?;
        Ok(self
            .records
            .iter()
            .filter(|r| r.provider_id.as_deref() == Some(caller.account_id.as_str()))
            .cloned()
            .collect())
    }

    pub fn get_record(&self, caller: &Caller, id: &str) -> Result<MedicalRecord, MockError> {
        caller.require(Role::Provider)?;
        self.records
            .iter()
            .find(|r| r.record_id.as_deref() == Some(id))
            .cloned()
            .ok_or_else(|| MockError::NotFound(format!("Record {id} not found")))
    }

    pub fn create_record(&mut self, caller: &Caller, mut record: MedicalRecord) -> Result<MedicalRecord, MockError> {
        caller.require(Role::Provider)?;
        let patient_id = record
            .patient_id
            .clone()
            .filter(|id| !blank(id))
            .ok_or_else(|| MockError::BadRequest("Patient is required".into()))?;
        self.patient(&patient_id)?;
        if blank(&record.diagnosis) {
            return Err(MockError::BadRequest("Diagnosis is required".into()));
        }
        let at = now();
        record.record_id = Some(short_id("REC"));
        record.provider_id = Some(caller.account_id.clone());
        record.provider_name = self.provider_name(&caller.account_id);
        record.visit_date = record.visit_date.or(Some(at));
        record.created_at = Some(at);
        record.updated_at = Some(at);
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn update_record(&mut self, caller: &Caller, id: &str, update: MedicalRecord) -> Result<MedicalRecord, MockError> {
        caller.require(Role::Provider)?;
        let record = self
            .records
            .iter_mut()
            .find(|r| r.record_id.as_deref() == Some(id))
            .ok_or_else(|| MockError::NotFound(format!("Record {id} not found")))?;
        if record.provider_id.as_deref() != Some(caller.account_id.as_str()) {
            return Err(MockError::Forbidden("Only the authoring provider may edit this record".into()));
        }
        record.record_type = update.record_type;
        record.visit_date = update.visit_date.or(record.visit_date);
        record.diagnosis = update.diagnosis;
        record.content = update.content;
        record.updated_at = Some(now());
        Ok(record.clone())
    }

    pub fn delete_record(&mut self, caller: &Caller, id: &str) -> Result<(), MockError> {
        caller.require(Role::Provider)?;
        let before = self.records.len();
        self.records.retain(|r| r.record_id.as_deref() != Some(id));
        if self.records.len() == before {
            return Err(MockError::NotFound(format!("Record {id} not found")));
        }
        Ok(())
    }

    // ── Certificates ─────────────────────────────────────

    pub fn list_certificates(&self, caller: &Caller) -> Vec<Certificate> {
        let own = |c: &&Certificate| match caller.role {
            Role::Patient => c.patient_id.as_deref() == Some(caller.account_id.as_str()),
            Role::Provider => c.provider_id.as_deref() == Some(caller.account_id.as_str()),
        };
        let mut certs: Vec<Certificate> = self.certificates.iter().filter(own).cloned().collect();
        certs.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
        certs
    }

    pub fn get_certificate(&self, caller: &Caller, id: &str) -> Result<Certificate, MockError> {
        self.list_certificates(caller)
            .into_iter()
            .find(|c| c.key() == Some(id) || c.certificate_id.as_deref() == Some(id))
            .ok_or_else(|| MockError::NotFound(format!("Certificate {id} not found")))
    }

    pub fn create_certificate(&mut self, caller: &Caller, new: NewCertificate) -> Result<Certificate, MockError> {
        caller.require(Role::Provider)?;
        if blank(&new.title) || blank(&new.content) {
            return Err(MockError::BadRequest("Title and content are required".into()));
        }
        let patient = self.patient(&new.patient_id)?;
        let patient_name = patient.full_name();
        let patient_email = patient.profile.email.clone();
        let number = if blank(&new.certificate_number) {
            short_id("CERT")
        } else {
            new.certificate_number
        };
        let cert = Certificate {
            id: Some(Uuid::new_v4().to_string()),
            certificate_id: Some(number.clone()),
            request_id: new.request_id,
            patient_id: Some(new.patient_id),
            patient_name,
            patient_email: Some(patient_email),
            provider_id: Some(caller.account_id.clone()),
            provider_name: self.provider_name(&caller.account_id),
            certificate_type: Some(new.certificate_type),
            title: new.title,
            content: Some(new.content),
            case_treated: Some(new.case_treated),
            issue_date: Some(now()),
            expiry_date: new.expiry_date.and_then(|d| d.and_hms_opt(0, 0, 0)),
            signature: Some(new.signature),
            certificate_number: Some(number),
            status: Some(CertificateStatus::Active),
        };
        self.certificates.push(cert.clone());
        Ok(cert)
    }
}

// ═══════════════════════════════════════════════════════════
// Shared handle
// ═══════════════════════════════════════════════════════════

/// Cloneable handle shared by the router's handlers.
#[derive(Clone)]
pub struct MockState {
    data: Arc<Mutex<MockData>>,
}

impl MockState {
    pub fn new(data: MockData) -> Self {
        Self {
            data: Arc::new(Mutex::new(data)),
        }
    }

    pub fn seeded() -> Self {
        Self::new(super::seed::demo_data())
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, MockData>, MockError> {
        self.data
            .lock()
            .map_err(|_| MockError::Internal("mock state lock poisoned".into()))
    }

    /// Fail the next request with `status`.
    pub fn force_status(&self, status: u16) -> Result<(), MockError> {
        self.lock()?.force_status(status);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::seed;

    fn caller(id: &str, role: Role) -> Caller {
        Caller {
            account_id: id.into(),
            role,
        }
    }

    #[test]
    fn login_issues_token_that_authenticates() {
        let mut data = seed::demo_data();
        let resp = data
            .login(&Credentials::new("PATIENT@sehamaroc.com", seed::DEMO_PASSWORD))
            .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", resp.token).parse().unwrap(),
        );
        let who = data.authenticate(&headers).unwrap();
        assert_eq!(who, caller(seed::PATIENT_ID, Role::Patient));
        assert!(resp.can_access_medical_history);
    }

    #[test]
    fn missing_or_unknown_token_is_unauthorized() {
        let data = seed::demo_data();
        assert!(matches!(data.authenticate(&HeaderMap::new()), Err(MockError::Unauthorized)));
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer nope".parse().unwrap());
        assert!(matches!(data.authenticate(&headers), Err(MockError::Unauthorized)));
    }

    #[test]
    fn pending_patient_is_not_activated() {
        let data = seed::demo_data();
        let err = data
            .notifications(&caller(seed::NEW_PATIENT_ID, Role::Patient))
            .unwrap_err();
        assert!(matches!(err, MockError::NotActivated(AccountStatus::Pending)));
    }

    #[test]
    fn provider_cannot_steal_assigned_patient() {
        let mut data = seed::demo_data();
        let err = data
            .assign(&caller("prov-999", Role::Provider), seed::PATIENT_ID)
            .unwrap_err();
        assert!(matches!(err, MockError::Conflict(_)));
    }

    #[test]
    fn activate_clears_suspension_reason() {
        let mut data = seed::demo_data();
        let doctor = caller(seed::PROVIDER_ID, Role::Provider);
        data.set_status(&doctor, seed::PATIENT_ID, AccountStatus::Suspended, Some("Fraud".into()))
            .unwrap();
        let summary = data
            .set_status(&doctor, seed::PATIENT_ID, AccountStatus::Active, None)
            .unwrap();
        assert_eq!(summary.account_status, Some(AccountStatus::Active));
        assert!(summary.suspension_reason.is_none());
    }

    #[test]
    fn forced_status_fires_once() {
        let mut data = seed::demo_data();
        data.force_status(500);
        assert_eq!(data.take_forced_status(), Some(500));
        assert_eq!(data.take_forced_status(), None);
    }

    #[test]
    fn generated_tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
        assert_eq!(generate_token().len(), 43);
    }
}
