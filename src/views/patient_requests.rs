//! Patient's own requests: list, filter, submit.

use chrono::NaiveDate;

use crate::format::{format_optional_date, PriorityTone, StatusBadge};
use crate::i18n::Language;
use crate::models::request::{NewRequest, PatientRequest, RequestStatus};
use crate::models::Role;
use crate::portal::{require_fields, Notice, PageError, Phase, Portal, SubmitFlag};
use crate::session::{Session, Storage};

use super::patient_dashboard::PATIENT_ID_MISSING;
use super::{or_dash, push_notices};

const LOAD_FAILED: &str = "Failed to load requests";
const SUBMIT_FAILED: &str = "Failed to submit request";
const SUBMITTED: &str = "Request submitted successfully";
/// Doctor choice meaning "whoever is available".
pub const ANY_DOCTOR: &str = "any";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestFilter {
    #[default]
    All,
    Pending,
    InProgress,
    Completed,
}

impl RequestFilter {
    pub fn matches(&self, status: &RequestStatus) -> bool {
        match self {
            RequestFilter::All => true,
            RequestFilter::Pending => *status == RequestStatus::Pending,
            RequestFilter::InProgress => *status == RequestStatus::InProgress,
            RequestFilter::Completed => *status == RequestStatus::Completed,
        }
    }
}

impl std::str::FromStr for RequestFilter {
    type Err = crate::models::ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "in-progress" | "processing" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(crate::models::ModelError::InvalidEnum {
                field: "RequestFilter",
                value: s.to_string(),
            }),
        }
    }
}

/// New-request form as the patient fills it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDraft {
    pub request_type: String,
    pub priority: String,
    pub subject: String,
    pub description: String,
    pub preferred_date: Option<NaiveDate>,
    /// Provider id, or [`ANY_DOCTOR`].
    pub doctor: String,
}

impl Default for RequestDraft {
    fn default() -> Self {
        Self {
            request_type: "Consultation".into(),
            priority: "MED".into(),
            subject: String::new(),
            description: String::new(),
            preferred_date: None,
            doctor: ANY_DOCTOR.into(),
        }
    }
}

impl RequestDraft {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.request_type.trim().is_empty() {
            missing.push("type");
        }
        if self.priority.trim().is_empty() {
            missing.push("priority");
        }
        if self.subject.trim().is_empty() {
            missing.push("subject");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if self.preferred_date.is_none() {
            missing.push("preferredDate");
        }
        missing
    }

    pub fn to_payload(&self) -> NewRequest {
        let doctor = self.doctor.trim();
        NewRequest {
            request_type: self.request_type.trim().to_string(),
            priority: self.priority.trim().to_string(),
            subject: self.subject.trim().to_string(),
            description: self.description.trim().to_string(),
            preferred_date: self.preferred_date.map(|d| d.format("%Y-%m-%d").to_string()),
            target_provider_id: (!doctor.is_empty() && doctor != ANY_DOCTOR).then(|| doctor.to_string()),
        }
    }
}

#[derive(Debug)]
pub struct PatientRequests {
    session: Session,
    patient_id: Option<String>,
    pub requests: Vec<PatientRequest>,
    pub filter: RequestFilter,
    pub notices: Vec<Notice>,
    submit: SubmitFlag,
}

impl PatientRequests {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Patient)?;
        let mut view = Self {
            session,
            patient_id: None,
            requests: Vec::new(),
            filter: RequestFilter::All,
            notices: Vec::new(),
            submit: SubmitFlag::default(),
        };
        view.refresh(portal).await?;
        Ok(view)
    }

    /// Profile first for the patient id, then that patient's requests.
    pub async fn refresh<S: Storage>(&mut self, portal: &Portal<S>) -> Result<(), PageError> {
        let client = portal.client(&self.session)?;
        if self.patient_id.is_none() {
            let profile = client
                .patient_profile()
                .await
                .map_err(portal.on_error(&self.session, Phase::Load, LOAD_FAILED))?;
            self.patient_id = profile.request_owner_id().map(str::to_string);
        }
        let Some(patient_id) = self.patient_id.as_deref() else {
            return Err(PageError::Notice(Notice::error(PATIENT_ID_MISSING)));
        };
        self.requests = client
            .patient_requests(patient_id)
            .await
            .map_err(portal.on_error(&self.session, Phase::Load, LOAD_FAILED))?;
        tracing::debug!(count = self.requests.len(), "Patient requests loaded");
        Ok(())
    }

    pub fn set_filter(&mut self, filter: RequestFilter) {
        self.filter = filter;
    }

    pub fn visible(&self) -> Vec<&PatientRequest> {
        self.requests
            .iter()
            .filter(|r| self.filter.matches(&r.status))
            .collect()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    /// Validate and post the draft without refetching.
    pub async fn send<S: Storage>(&self, portal: &Portal<S>, draft: &RequestDraft) -> Result<Notice, PageError> {
        require_fields(draft.missing_fields())?;
        let _busy = self.submit.begin()?;
        let client = portal.client(&self.session)?;
        let created = client
            .create_request(&draft.to_payload())
            .await
            .map_err(portal.on_error(&self.session, Phase::Submit, SUBMIT_FAILED))?;
        tracing::info!(request_id = %created.request_id, "Request submitted");
        Ok(Notice::success("Success", SUBMITTED))
    }

    pub async fn submit<S: Storage>(&mut self, portal: &Portal<S>, draft: &RequestDraft) -> Result<Notice, PageError> {
        let notice = self.send(portal, draft).await?;
        self.refresh(portal).await?;
        Ok(notice)
    }

    pub fn render(&self, lang: Language) -> String {
        let visible = self.visible();
        let mut out = format!("Your Requests ({})\n", visible.len());
        push_notices(&mut out, &self.notices);
        if visible.is_empty() {
            out.push_str(if self.requests.is_empty() {
                "  No requests yet\n"
            } else {
                "  No requests found for this filter\n"
            });
        }
        for req in visible {
            out.push_str(&format!(
                "  {} [{}] {:?} {} | {} | {}\n",
                req.request_id,
                StatusBadge::for_status(&req.status).as_str(),
                PriorityTone::for_priority(req.priority.as_ref()),
                req.subject,
                or_dash(req.provider_name.as_deref()),
                format_optional_date(req.created_at, lang),
            ));
            if let Some(response) = req.response_message.as_deref() {
                out.push_str(&format!("      > {response}\n"));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed, MockServer};
    use crate::portal::test_support::logged_in;

    fn draft() -> RequestDraft {
        RequestDraft {
            subject: "Persistent cough".into(),
            description: "Two weeks, worse at night.".into(),
            preferred_date: NaiveDate::from_ymd_opt(2025, 1, 20),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn loads_own_requests_and_filters() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let mut view = PatientRequests::mount(&portal).await.unwrap();
        assert_eq!(view.requests.len(), 3);

        view.set_filter(RequestFilter::Pending);
        assert_eq!(view.visible().len(), 1);
        view.set_filter("in_progress".parse().unwrap());
        assert_eq!(view.visible()[0].request_id, "REQ-002");
        view.set_filter(RequestFilter::Completed);
        assert_eq!(view.visible()[0].request_id, "REQ-003");
        server.shutdown();
    }

    #[tokio::test]
    async fn submit_refetches_list() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let mut view = PatientRequests::mount(&portal).await.unwrap();

        let notice = view.submit(&portal, &draft()).await.unwrap();
        assert_eq!(notice.description, SUBMITTED);
        assert_eq!(view.requests.len(), 4);
        assert!(view.requests.iter().any(|r| r.subject == "Persistent cough"));
        assert!(!view.is_submitting());
        server.shutdown();
    }

    #[tokio::test]
    async fn blank_fields_are_rejected_locally() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let view = PatientRequests::mount(&portal).await.unwrap();
        let err = view.send(&portal, &RequestDraft::default()).await.unwrap_err();
        match err {
            PageError::Validation(fields) => {
                assert_eq!(fields, vec!["subject", "description", "preferredDate"])
            }
            other => panic!("unexpected {other:?}"),
        }
        server.shutdown();
    }

    #[tokio::test]
    async fn server_failure_on_submit_shows_server_message() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let view = PatientRequests::mount(&portal).await.unwrap();
        server.force_status(500).unwrap();
        let err = view.send(&portal, &draft()).await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, "Injected failure (HTTP 500)");
        server.shutdown();
    }

    #[tokio::test]
    async fn pending_account_sees_backend_refusal() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::NEW_PATIENT_EMAIL, Role::Patient).await;
        let view = PatientRequests::mount(&portal).await.unwrap();
        assert!(view.requests.is_empty());
        let err = view.send(&portal, &draft()).await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, "Account not activated");
        server.shutdown();
    }

    #[tokio::test]
    async fn concurrent_submit_is_refused() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let view = PatientRequests::mount(&portal).await.unwrap();
        let d = draft();
        let (first, second) = tokio::join!(view.send(&portal, &d), view.send(&portal, &d));
        let busy = [&first, &second]
            .iter()
            .filter(|r| matches!(r, Err(PageError::Busy)))
            .count();
        assert_eq!(busy, 1);
        assert!(first.is_ok() || second.is_ok());
        server.shutdown();
    }

    #[test]
    fn any_doctor_is_sent_as_null() {
        let payload = draft().to_payload();
        assert_eq!(payload.target_provider_id, None);
        assert_eq!(payload.priority, "MED");
        assert_eq!(payload.preferred_date.as_deref(), Some("2025-01-20"));

        let targeted = RequestDraft {
            doctor: seed::PROVIDER_ID.into(),
            ..draft()
        };
        assert_eq!(targeted.to_payload().target_provider_id.as_deref(), Some(seed::PROVIDER_ID));
    }
}
