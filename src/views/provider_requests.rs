//! Incoming patient requests: triage, conversation, response.

use chrono::NaiveDate;

use crate::format::{format_date_time, format_optional_date, PriorityTone, StatusBadge};
use crate::i18n::Language;
use crate::models::request::{PatientRequest, RequestStatus, RespondPayload};
use crate::models::{Role, SenderType};
use crate::portal::{require_fields, Notice, PageError, Phase, Portal, SubmitFlag};
use crate::session::{Session, Storage};

use super::patient_requests::RequestFilter;
use super::provider_certificates::CertificateDraft;
use super::{or_dash, push_notices};

const LOAD_FAILED: &str = "Failed to load requests";
const DETAIL_FAILED: &str = "Failed to load request details";
const MESSAGE_FAILED: &str = "Failed to send message";
const RESPOND_FAILED: &str = "Failed to send response";
const CERTIFICATE_FAILED: &str = "Failed to create certificate";

/// Optional certificate issued together with a response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttachedCertificate {
    pub content: String,
    pub expiry_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseDraft {
    pub message: String,
    pub certificate: Option<AttachedCertificate>,
}

impl ResponseDraft {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.message.trim().is_empty() {
            missing.push("response");
        }
        if self
            .certificate
            .as_ref()
            .is_some_and(|c| c.content.trim().is_empty())
        {
            missing.push("certificateContent");
        }
        missing
    }
}

#[derive(Debug)]
pub struct ProviderRequests {
    session: Session,
    pub requests: Vec<PatientRequest>,
    pub filter: RequestFilter,
    pub notices: Vec<Notice>,
    submit: SubmitFlag,
}

impl ProviderRequests {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Provider)?;
        let mut view = Self {
            session,
            requests: Vec::new(),
            filter: RequestFilter::All,
            notices: Vec::new(),
            submit: SubmitFlag::default(),
        };
        view.refresh(portal).await?;
        Ok(view)
    }

    /// Replaces the list; never appends.
    pub async fn refresh<S: Storage>(&mut self, portal: &Portal<S>) -> Result<(), PageError> {
        self.requests = portal
            .client(&self.session)?
            .list_requests()
            .await
            .map_err(portal.on_error(&self.session, Phase::Load, LOAD_FAILED))?;
        Ok(())
    }

    pub fn visible(&self) -> Vec<&PatientRequest> {
        self.requests
            .iter()
            .filter(|r| self.filter.matches(&r.status))
            .collect()
    }

    pub fn count(&self, status: RequestStatus) -> usize {
        self.requests.iter().filter(|r| r.status == status).count()
    }

    pub async fn detail<S: Storage>(&self, portal: &Portal<S>, request_id: &str) -> Result<PatientRequest, PageError> {
        portal
            .client(&self.session)?
            .get_request(request_id)
            .await
            .map_err(portal.on_error(&self.session, Phase::Load, DETAIL_FAILED))
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    /// Add a message to the request's conversation.
    pub async fn send_message<S: Storage>(
        &self,
        portal: &Portal<S>,
        request_id: &str,
        content: &str,
    ) -> Result<Notice, PageError> {
        if content.trim().is_empty() {
            return Err(PageError::Validation(vec!["message"]));
        }
        let _busy = self.submit.begin()?;
        portal
            .client(&self.session)?
            .send_message(request_id, content.trim())
            .await
            .map_err(portal.on_error(&self.session, Phase::Submit, MESSAGE_FAILED))?;
        Ok(Notice::success("Success", "Message sent successfully"))
    }

    /// Mark the request processed with `draft.message`, echo it into the
    /// conversation and, when asked, issue a certificate for the request.
    pub async fn send_response<S: Storage>(
        &self,
        portal: &Portal<S>,
        request: &PatientRequest,
        draft: &ResponseDraft,
    ) -> Result<Notice, PageError> {
        require_fields(draft.missing_fields())?;
        let _busy = self.submit.begin()?;
        let client = portal.client(&self.session)?;
        let message = draft.message.trim();

        client
            .respond_to_request(
                &request.request_id,
                &RespondPayload {
                    status: RequestStatus::Completed,
                    response_message: message.to_string(),
                },
            )
            .await
            .map_err(portal.on_error(&self.session, Phase::Submit, RESPOND_FAILED))?;

        if let Err(e) = client.send_message(&request.request_id, message).await {
            tracing::warn!(request_id = %request.request_id, error = %e, "Response saved but thread message failed");
        }

        let Some(attached) = &draft.certificate else {
            return Ok(Notice::success("Success", "Response sent successfully"));
        };
        let Some(patient_id) = request.patient_id.as_deref() else {
            return Err(PageError::Notice(Notice::error(CERTIFICATE_FAILED)));
        };
        let now = portal.now();
        let certificate = CertificateDraft {
            request_id: Some(request.request_id.clone()),
            case_treated: request.subject.clone(),
            content: attached.content.clone(),
            expiry_date: attached.expiry_date,
            ..CertificateDraft::new(patient_id, self.session.user.email.clone(), now)
        };
        client
            .create_certificate(&certificate.to_payload())
            .await
            .map_err(portal.on_error(&self.session, Phase::Submit, CERTIFICATE_FAILED))?;
        Ok(Notice::success("Success", "Response sent with certificate"))
    }

    pub async fn respond<S: Storage>(
        &mut self,
        portal: &Portal<S>,
        request_id: &str,
        draft: &ResponseDraft,
    ) -> Result<Notice, PageError> {
        let request = match self.requests.iter().find(|r| r.request_id == request_id) {
            Some(found) => found.clone(),
            None => self.detail(portal, request_id).await?,
        };
        match self.send_response(portal, &request, draft).await {
            Ok(notice) => {
                self.refresh(portal).await?;
                Ok(notice)
            }
            // The status change may already be saved when a later step fails.
            Err(PageError::Notice(notice)) => {
                if let Err(e) = self.refresh(portal).await {
                    tracing::warn!(request_id, error = %e, "Refetch after failed response failed");
                }
                Err(PageError::Notice(notice))
            }
            Err(e) => Err(e),
        }
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = format!(
            "Requests: {} pending, {} in progress, {} completed\n",
            self.count(RequestStatus::Pending),
            self.count(RequestStatus::InProgress),
            self.count(RequestStatus::Completed),
        );
        push_notices(&mut out, &self.notices);
        let visible = self.visible();
        if visible.is_empty() {
            out.push_str("  No requests found\n");
        }
        for req in visible {
            out.push_str(&format!(
                "  {} [{}] {:?} {} - {} ({})\n",
                req.request_id,
                StatusBadge::for_status(&req.status).as_str(),
                PriorityTone::for_priority(req.priority.as_ref()),
                or_dash(req.patient_name.as_deref()),
                req.subject,
                format_optional_date(req.created_at, lang),
            ));
        }
        out
    }

    pub fn render_detail(request: &PatientRequest, lang: Language) -> String {
        let mut out = format!(
            "{} {}\nPatient: {}\nType: {}\nStatus: {}\nDescription: {}\n",
            request.request_id,
            request.subject,
            or_dash(request.patient_name.as_deref()),
            or_dash(request.request_type.as_deref()),
            request.status,
            or_dash(request.description.as_deref()),
        );
        if let Some(response) = request.response_message.as_deref() {
            out.push_str(&format!("Response: {response}\n"));
        }
        out.push_str(&format!("Messages ({})\n", request.messages.len()));
        for msg in &request.messages {
            let who = match msg.sender_type {
                Some(SenderType::Patient) => "patient",
                Some(_) => "provider",
                None => "unknown",
            };
            let when = msg
                .timestamp
                .map(|t| format_date_time(t, lang))
                .unwrap_or_default();
            out.push_str(&format!("  [{who}] {when} {}\n", msg.content));
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
    async fn loading_twice_yields_identical_lists() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let mut view = ProviderRequests::mount(&portal).await.unwrap();
        let first = view.requests.clone();
        view.refresh(&portal).await.unwrap();
        assert_eq!(view.requests, first);
        assert_eq!(view.requests.len(), 3);
        server.shutdown();
    }

    #[tokio::test]
    async fn filter_and_counts() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let mut view = ProviderRequests::mount(&portal).await.unwrap();
        assert_eq!(view.count(RequestStatus::Pending), 1);
        view.filter = RequestFilter::InProgress;
        assert_eq!(view.visible()[0].request_id, "REQ-002");
        server.shutdown();
    }

    #[tokio::test]
    async fn respond_completes_request_and_threads_message() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let mut view = ProviderRequests::mount(&portal).await.unwrap();

        let draft = ResponseDraft {
            message: "Please come in on Monday.".into(),
            certificate: None,
        };
        let notice = view.respond(&portal, "REQ-001", &draft).await.unwrap();
        assert_eq!(notice.description, "Response sent successfully");

        let req = view.requests.iter().find(|r| r.request_id == "REQ-001").unwrap();
        assert_eq!(req.status, RequestStatus::Completed);
        assert_eq!(req.response_message.as_deref(), Some("Please come in on Monday."));
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[1].sender_type, Some(SenderType::Provider));
        assert_eq!(req.provider_name.as_deref(), Some(seed::PROVIDER_NAME));
        server.shutdown();
    }

    #[tokio::test]
    async fn respond_with_certificate_issues_one() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let mut view = ProviderRequests::mount(&portal).await.unwrap();
        let draft = ResponseDraft {
            message: "Rest for two days.".into(),
            certificate: Some(AttachedCertificate {
                content: "Unfit for work for two days.".into(),
                expiry_date: NaiveDate::from_ymd_opt(2025, 1, 3),
            }),
        };
        let notice = view.respond(&portal, "REQ-002", &draft).await.unwrap();
        assert_eq!(notice.description, "Response sent with certificate");

        let client = server.client_for(seed::PROVIDER_EMAIL).await.unwrap();
        let certs = client.list_certificates().await.unwrap();
        assert_eq!(certs.len(), 2);
        assert!(certs.iter().any(|c| c.request_id.as_deref() == Some("REQ-002")));
        server.shutdown();
    }

    #[tokio::test]
    async fn failed_certificate_still_refreshes_completed_request() {
        let server = MockServer::start().await.unwrap();
        server
            .state()
            .lock()
            .unwrap()
            .requests
            .iter_mut()
            .find(|r| r.request_id == "REQ-001")
            .unwrap()
            .patient_id = Some("pat-999".into());
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let mut view = ProviderRequests::mount(&portal).await.unwrap();

        let draft = ResponseDraft {
            message: "Rest for two days.".into(),
            certificate: Some(AttachedCertificate {
                content: "Unfit for work for two days.".into(),
                expiry_date: NaiveDate::from_ymd_opt(2025, 1, 3),
            }),
        };
        let err = view.respond(&portal, "REQ-001", &draft).await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, "Patient pat-999 not found");

        let req = view.requests.iter().find(|r| r.request_id == "REQ-001").unwrap();
        assert_eq!(req.status, RequestStatus::Completed);
        assert_eq!(view.count(RequestStatus::Pending), 0);
        server.shutdown();
    }

    #[tokio::test]
    async fn message_and_detail() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let view = ProviderRequests::mount(&portal).await.unwrap();

        view.send_message(&portal, "REQ-002", "Any side effects?").await.unwrap();
        let detail = view.detail(&portal, "REQ-002").await.unwrap();
        assert_eq!(detail.messages.last().unwrap().content, "Any side effects?");
        assert!(ProviderRequests::render_detail(&detail, Language::En).contains("[provider]"));

        let err = view.send_message(&portal, "REQ-002", "  ").await.unwrap_err();
        assert!(matches!(err, PageError::Validation(_)));
        let err = view.detail(&portal, "REQ-404").await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, DETAIL_FAILED);
        server.shutdown();
    }

    #[tokio::test]
    async fn empty_response_is_rejected() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PROVIDER_EMAIL, Role::Provider).await;
        let mut view = ProviderRequests::mount(&portal).await.unwrap();
        let err = view
            .respond(&portal, "REQ-001", &ResponseDraft::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PageError::Validation(ref f) if f == &vec!["response"]));
        assert_eq!(view.count(RequestStatus::Pending), 1);
        server.shutdown();
    }
}
