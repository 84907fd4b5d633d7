//! Provider landing page: caseload stats, urgent requests, newest patients.

use crate::client::providers::PatientScope;
use crate::format::{format_optional_date, PriorityTone};
use crate::i18n::Language;
use crate::models::certificate::Certificate;
use crate::models::patient::PatientSummary;
use crate::models::request::{PatientRequest, RequestStatus};
use crate::models::Role;
use crate::portal::{Notice, PageError, Portal};
use crate::session::{Session, Storage};

use super::push_notices;

const LOAD_FAILED: &str = "Failed to load dashboard data";
const NEWEST_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderStats {
    pub assigned_patients: usize,
    pub total_patients: usize,
    pub pending_requests: usize,
    pub processed_requests: usize,
    pub certificates: usize,
}

#[derive(Debug)]
pub struct ProviderDashboard {
    session: Session,
    pub assigned: Vec<PatientSummary>,
    pub patients: Vec<PatientSummary>,
    pub requests: Vec<PatientRequest>,
    pub certificates: Vec<Certificate>,
    pub notices: Vec<Notice>,
}

impl ProviderDashboard {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Provider)?;
        let client = portal.client(&session)?;

        let (assigned, patients, requests, certificates) = tokio::join!(
            client.patients(PatientScope::Assigned),
            client.patients(PatientScope::All),
            client.list_requests(),
            client.list_certificates(),
        );

        let mut notices = Vec::new();
        let assigned = portal.partial(&session, LOAD_FAILED, assigned, &mut notices)?;
        let patients = portal.partial(&session, LOAD_FAILED, patients, &mut notices)?;
        let requests = portal.partial(&session, LOAD_FAILED, requests, &mut notices)?;
        let certificates = portal.partial(&session, LOAD_FAILED, certificates, &mut notices)?;

        Ok(Self {
            session,
            assigned: assigned.unwrap_or_default(),
            patients: patients.unwrap_or_default(),
            requests: requests.unwrap_or_default(),
            certificates: certificates.unwrap_or_default(),
            notices,
        })
    }

    pub fn stats(&self) -> ProviderStats {
        let count = |status: RequestStatus| self.requests.iter().filter(|r| r.status == status).count();
        ProviderStats {
            assigned_patients: self.assigned.len(),
            total_patients: self.patients.len(),
            pending_requests: count(RequestStatus::Pending),
            processed_requests: count(RequestStatus::Completed),
            certificates: self.certificates.len(),
        }
    }

    /// Urgent or high priority, whatever the status.
    pub fn urgent_requests(&self) -> Vec<&PatientRequest> {
        self.requests
            .iter()
            .filter(|r| r.priority.as_ref().is_some_and(|p| p.needs_attention()))
            .collect()
    }

    pub fn newest_patients(&self) -> &[PatientSummary] {
        &self.patients[..self.patients.len().min(NEWEST_LIMIT)]
    }

    pub fn render(&self, lang: Language) -> String {
        let stats = self.stats();
        let mut out = format!("Welcome, {}\n", self.session.user.email);
        push_notices(&mut out, &self.notices);
        out.push_str(&format!(
            "Patients: {} assigned / {} total\nPending requests: {}\nProcessed requests: {}\nCertificates: {}\n",
            stats.assigned_patients,
            stats.total_patients,
            stats.pending_requests,
            stats.processed_requests,
            stats.certificates,
        ));

        out.push_str("\nUrgent requests\n");
        let urgent = self.urgent_requests();
        if urgent.is_empty() {
            out.push_str("  No urgent requests\n");
        }
        for req in urgent {
            out.push_str(&format!(
                "  {} [{:?}] {} - {} ({})\n",
                req.request_id,
                PriorityTone::for_priority(req.priority.as_ref()),
                req.patient_name.as_deref().unwrap_or("Unknown patient"),
                req.subject,
                format_optional_date(req.created_at, lang),
            ));
        }

        out.push_str("\nNewest patients\n");
        for patient in self.newest_patients() {
            let status = patient.account_status.map(|s| s.as_str()).unwrap_or("PENDING");
            out.push_str(&format!("  {} <{}> {status}\n", patient.display_name(), patient.email));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed, MockServer};
    use crate::portal::test_support::logged_in;

    #[tokio::test]
    async fn stats_from_seeded_backend() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let view = ProviderDashboard::mount(&portal).await.unwrap();

        assert!(view.notices.is_empty());
        assert_eq!(
            view.stats(),
            ProviderStats {
                assigned_patients: 1,
                total_patients: 2,
                pending_requests: 1,
                processed_requests: 1,
                certificates: 1,
            }
        );
        let urgent: Vec<_> = view.urgent_requests().iter().map(|r| r.request_id.as_str()).collect();
        assert_eq!(urgent, vec!["REQ-001"]);
        assert_eq!(view.newest_patients()[0].id, seed::NEW_PATIENT_ID);
        server.shutdown();
    }

    #[tokio::test]
    async fn newest_patients_are_capped_at_three() {
        let server = MockServer::start().await.unwrap();
        let anon = reqwest::Client::new();
        for i in 0..3 {
            anon.post(format!("{}/api/auth/register", server.base_url()))
                .json(&serde_json::json!({"email": format!("p{i}@example.ma"), "password": "secret1"}))
                .send()
                .await
                .unwrap();
        }
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let view = ProviderDashboard::mount(&portal).await.unwrap();
        assert_eq!(view.stats().total_patients, 5);
        assert_eq!(view.newest_patients().len(), 3);
        server.shutdown();
    }

    #[tokio::test]
    async fn expired_session_redirects_to_provider_login() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        server.force_status(401).unwrap();
        let err = ProviderDashboard::mount(&portal).await.unwrap_err();
        assert_eq!(err.redirect_target(), Some(crate::routes::Route::ProviderAuth));
        assert!(portal.current_session().unwrap().is_none());
        server.shutdown();
    }

    #[tokio::test]
    async fn one_failed_branch_still_renders_the_rest() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        server.force_status(500).unwrap();
        let view = ProviderDashboard::mount(&portal).await.unwrap();
        assert_eq!(view.notices, vec![Notice::error(LOAD_FAILED)]);
        let stats = view.stats();
        let loaded = [
            stats.assigned_patients > 0,
            stats.total_patients > 0,
            !view.requests.is_empty(),
            stats.certificates > 0,
        ];
        assert_eq!(loaded.iter().filter(|ok| **ok).count(), 3);
        server.shutdown();
    }
}
