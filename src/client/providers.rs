use reqwest::Method;
use serde::Serialize;

use super::{Ack, ApiClient, ApiError, Service};
use crate::models::patient::PatientSummary;

/// Default reason sent when the provider leaves the field blank.
pub const DEFAULT_SUSPEND_REASON: &str = "Suspended by provider";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientScope {
    All,
    Assigned,
    Unassigned,
}

impl PatientScope {
    fn segment(&self) -> &'static str {
        match self {
            PatientScope::All => "all",
            PatientScope::Assigned => "assigned",
            PatientScope::Unassigned => "unassigned",
        }
    }
}

#[derive(Serialize)]
struct SuspendBody<'a> {
    reason: &'a str,
}

impl ApiClient {
    pub async fn patients(&self, scope: PatientScope) -> Result<Vec<PatientSummary>, ApiError> {
        self.get_json(
            Service::Providers,
            &format!("/api/providers/patients/{}", scope.segment()),
        )
        .await
    }

    pub async fn assign_patient(&self, patient_id: &str) -> Result<Ack, ApiError> {
        self.patient_action(Method::POST, patient_id, "assign", None).await
    }

    pub async fn unassign_patient(&self, patient_id: &str) -> Result<Ack, ApiError> {
        self.patient_action(Method::DELETE, patient_id, "assign", None).await
    }

    pub async fn activate_patient(&self, patient_id: &str) -> Result<Ack, ApiError> {
        self.patient_action(Method::POST, patient_id, "activate", None).await
    }

    /// Blank reasons are replaced by [`DEFAULT_SUSPEND_REASON`].
    pub async fn suspend_patient(&self, patient_id: &str, reason: &str) -> Result<Ack, ApiError> {
        let reason = if reason.trim().is_empty() {
            DEFAULT_SUSPEND_REASON
        } else {
            reason.trim()
        };
        self.patient_action(Method::POST, patient_id, "suspend", Some(&SuspendBody { reason }))
            .await
    }

    async fn patient_action(
        &self,
        method: Method,
        patient_id: &str,
        action: &str,
        body: Option<&SuspendBody<'_>>,
    ) -> Result<Ack, ApiError> {
        self.send_action(
            method,
            Service::Providers,
            &format!("/api/providers/patients/{patient_id}/{action}"),
            body,
        )
        .await
    }
}
