//! Certificate issuing for assigned patients.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::Rng;

use crate::client::providers::PatientScope;
use crate::i18n::Language;
use crate::models::certificate::{Certificate, NewCertificate};
use crate::models::patient::PatientSummary;
use crate::models::Role;
use crate::portal::{require_fields, Notice, PageError, Phase, Portal, SubmitFlag};
use crate::session::{Session, Storage};

use super::patient_certificates::{render_row, PRINT_FAILED};
use super::push_notices;

const PATIENTS_FAILED: &str = "Failed to load patients";
const CERTIFICATES_FAILED: &str = "Failed to load certificates";
const DETAIL_FAILED: &str = "Failed to load certificate details";
const CREATE_FAILED: &str = "Failed to create certificate";
const CREATED: &str = "Certificate created successfully";
pub const DEFAULT_TYPE: &str = "MEDICAL";
pub const DEFAULT_TITLE: &str = "Medical Certificate";

/// Fresh `CERT-<year>-<6 digits>` number.
pub fn generate_number(now: NaiveDateTime) -> String {
    let seed = rand::thread_rng().gen_range(0..1_000_000);
    NewCertificate::number_for(now.year(), seed)
}

/// Certificate form. Title, case treated and content are required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateDraft {
    pub patient_id: String,
    pub request_id: Option<String>,
    pub certificate_type: String,
    pub title: String,
    pub case_treated: String,
    pub content: String,
    pub expiry_date: Option<NaiveDate>,
    pub signature: String,
    pub certificate_number: String,
}

impl CertificateDraft {
    /// Prefilled form for `patient_id`, signed with `signature`.
    pub fn new(patient_id: impl Into<String>, signature: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            patient_id: patient_id.into(),
            request_id: None,
            certificate_type: DEFAULT_TYPE.into(),
            title: DEFAULT_TITLE.into(),
            case_treated: String::new(),
            content: String::new(),
            expiry_date: None,
            signature: signature.into(),
            certificate_number: generate_number(now),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("patientId", &self.patient_id),
            ("title", &self.title),
            ("caseTreated", &self.case_treated),
            ("content", &self.content),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn to_payload(&self) -> NewCertificate {
        NewCertificate {
            patient_id: self.patient_id.trim().to_string(),
            request_id: self.request_id.clone().filter(|id| !id.trim().is_empty()),
            certificate_type: self.certificate_type.trim().to_string(),
            title: self.title.trim().to_string(),
            case_treated: self.case_treated.trim().to_string(),
            content: self.content.trim().to_string(),
            expiry_date: self.expiry_date,
            signature: self.signature.trim().to_string(),
            certificate_number: self.certificate_number.trim().to_string(),
        }
    }
}

#[derive(Debug)]
pub struct ProviderCertificates {
    session: Session,
    pub patients: Vec<PatientSummary>,
    pub certificates: Vec<Certificate>,
    pub search: String,
    pub notices: Vec<Notice>,
    submit: SubmitFlag,
}

impl ProviderCertificates {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Provider)?;
        let mut view = Self {
            session,
            patients: Vec::new(),
            certificates: Vec::new(),
            search: String::new(),
            notices: Vec::new(),
            submit: SubmitFlag::default(),
        };
        view.refresh(portal).await?;
        Ok(view)
    }

    pub async fn refresh<S: Storage>(&mut self, portal: &Portal<S>) -> Result<(), PageError> {
        let client = portal.client(&self.session)?;
        let (patients, certificates) =
            tokio::join!(client.patients(PatientScope::Assigned), client.list_certificates());
        let mut notices = Vec::new();
        if let Some(patients) = portal.partial(&self.session, PATIENTS_FAILED, patients, &mut notices)? {
            self.patients = patients;
        }
        if let Some(certs) = portal.partial(&self.session, CERTIFICATES_FAILED, certificates, &mut notices)? {
            self.certificates = certs;
        }
        self.notices = notices;
        Ok(())
    }

    /// Search over patient name, title, case treated and number.
    pub fn visible(&self) -> Vec<&Certificate> {
        let needle = self.search.trim().to_lowercase();
        let hit = |v: Option<&str>| v.is_some_and(|s| s.to_lowercase().contains(&needle));
        self.certificates
            .iter()
            .filter(|c| {
                needle.is_empty()
                    || hit(c.patient_name.as_deref())
                    || hit(Some(&c.title))
                    || hit(c.case_treated.as_deref())
                    || hit(c.certificate_number.as_deref())
            })
            .collect()
    }

    /// Blank form for one of the assigned patients.
    pub fn draft_for(&self, now: NaiveDateTime, patient_id: &str) -> CertificateDraft {
        CertificateDraft::new(patient_id, self.session.user.email.clone(), now)
    }

    pub async fn detail<S: Storage>(&self, portal: &Portal<S>, id: &str) -> Result<Certificate, PageError> {
        portal
            .client(&self.session)?
            .get_certificate(id)
            .await
            .map_err(portal.on_error(&self.session, Phase::Load, DETAIL_FAILED))
    }

    pub async fn print<S: Storage>(&self, portal: &Portal<S>, id: &str) -> Result<Vec<u8>, PageError> {
        portal
            .client(&self.session)?
            .print_certificate(id)
            .await
            .map_err(portal.on_error(&self.session, Phase::Submit, PRINT_FAILED))
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    pub async fn send<S: Storage>(&self, portal: &Portal<S>, draft: &CertificateDraft) -> Result<Certificate, PageError> {
        require_fields(draft.missing_fields())?;
        let _busy = self.submit.begin()?;
        let created = portal
            .client(&self.session)?
            .create_certificate(&draft.to_payload())
            .await
            .map_err(portal.on_error(&self.session, Phase::Submit, CREATE_FAILED))?;
        tracing::info!(number = ?created.certificate_number, "Certificate created");
        Ok(created)
    }

    pub async fn create<S: Storage>(&mut self, portal: &Portal<S>, draft: &CertificateDraft) -> Result<Notice, PageError> {
        self.send(portal, draft).await?;
        self.refresh(portal).await?;
        Ok(Notice::success("Success", CREATED))
    }

    pub fn render(&self, lang: Language) -> String {
        let visible = self.visible();
        let mut out = format!("Certificates ({})\n", visible.len());
        push_notices(&mut out, &self.notices);
        if visible.is_empty() {
            out.push_str("  No certificates found\n");
        }
        for cert in visible {
            out.push_str(&render_row(cert, lang));
        }
        out.push_str(&format!("\nAssigned patients ({})\n", self.patients.len()));
        for p in &self.patients {
            out.push_str(&format!("  {} {}\n", p.id, p.display_name()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed, MockServer};
    use crate::portal::test_support::logged_in;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 2, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap()
    }

    #[test]
    fn generated_numbers_follow_format() {
        let number = generate_number(now());
        assert!(number.starts_with("CERT-2025-"));
        assert_eq!(number.len(), "CERT-2025-".len() + 6);
    }

    #[tokio::test]
    async fn create_refetches_and_prints() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let mut view = ProviderCertificates::mount(&portal).await.unwrap();
        assert_eq!(view.patients.len(), 1);
        assert_eq!(view.certificates.len(), 1);

        let mut draft = view.draft_for(now(), seed::PATIENT_ID);
        draft.case_treated = "Influenza".into();
        draft.content = "Five days of rest.".into();
        draft.expiry_date = NaiveDate::from_ymd_opt(2025, 2, 6);
        let number = draft.certificate_number.clone();

        let notice = view.create(&portal, &draft).await.unwrap();
        assert_eq!(notice.description, CREATED);
        assert_eq!(view.certificates.len(), 2);

        view.search = number.to_lowercase();
        let found = view.visible();
        assert_eq!(found.len(), 1);
        let id = found[0].key().unwrap().to_string();
        let detail = view.detail(&portal, &id).await.unwrap();
        assert_eq!(detail.case_treated.as_deref(), Some("Influenza"));
        assert!(view.print(&portal, &id).await.unwrap().starts_with(b"%PDF"));
        server.shutdown();
    }

    #[tokio::test]
    async fn required_fields_checked_before_sending() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let view = ProviderCertificates::mount(&portal).await.unwrap();
        let draft = view.draft_for(now(), seed::PATIENT_ID);
        let err = view.send(&portal, &draft).await.unwrap_err();
        assert!(matches!(err, PageError::Validation(ref f) if f == &vec!["caseTreated", "content"]));
        server.shutdown();
    }

    #[tokio::test]
    async fn unknown_patient_shows_server_message() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let view = ProviderCertificates::mount(&portal).await.unwrap();
        let mut draft = view.draft_for(now(), "pat-999");
        draft.case_treated = "x".into();
        draft.content = "y".into();
        let err = view.send(&portal, &draft).await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, "Patient pat-999 not found");
        server.shutdown();
    }
}
