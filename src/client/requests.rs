use reqwest::Method;

use super::{Ack, ApiClient, ApiError, Service};
use crate::models::request::{MessagePayload, PatientRequest, RespondPayload};

impl ApiClient {
    /// All requests visible to the caller (provider inbox).
    pub async fn list_requests(&self) -> Result<Vec<PatientRequest>, ApiError> {
        self.get_json(Service::Requests, "/api/requests").await
    }

    pub async fn get_request(&self, request_id: &str) -> Result<PatientRequest, ApiError> {
        self.get_json(Service::Requests, &format!("/api/requests/{request_id}"))
            .await
    }

    pub async fn patient_requests(&self, patient_id: &str) -> Result<Vec<PatientRequest>, ApiError> {
        self.get_json(Service::Requests, &format!("/api/requests/patient/{patient_id}"))
            .await
    }

    pub async fn respond_to_request(&self, request_id: &str, payload: &RespondPayload) -> Result<Ack, ApiError> {
        self.send_action(
            Method::PUT,
            Service::Requests,
            &format!("/api/requests/{request_id}/respond"),
            Some(payload),
        )
        .await
    }

    pub async fn send_message(&self, request_id: &str, content: &str) -> Result<Ack, ApiError> {
        let payload = MessagePayload {
            content: content.to_string(),
        };
        self.send_action(
            Method::POST,
            Service::Requests,
            &format!("/api/requests/{request_id}/messages"),
            Some(&payload),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockServer;
    use crate::models::request::RequestStatus;

    #[tokio::test]
    async fn listing_twice_is_stable() {
        let server = MockServer::start().await.unwrap();
        let client = server.client_for("doctor@sehamaroc.com").await.unwrap();
        let first = client.list_requests().await.unwrap();
        let second = client.list_requests().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        server.shutdown();
    }

    #[tokio::test]
    async fn respond_then_message_updates_thread() {
        let server = MockServer::start().await.unwrap();
        let client = server.client_for("doctor@sehamaroc.com").await.unwrap();
        let pending = client
            .list_requests()
            .await
            .unwrap()
            .into_iter()
            .find(|r| r.status == RequestStatus::Pending)
            .unwrap();

        let payload = RespondPayload {
            status: RequestStatus::Completed,
            response_message: "Please come on Monday.".into(),
        };
        client.respond_to_request(&pending.request_id, &payload).await.unwrap();
        client
            .send_message(&pending.request_id, "Please come on Monday.")
            .await
            .unwrap();

        let updated = client.get_request(&pending.request_id).await.unwrap();
        assert_eq!(updated.status, RequestStatus::Completed);
        assert_eq!(updated.response_message.as_deref(), Some("Please come on Monday."));
        assert_eq!(updated.messages.len(), pending.messages.len() + 1);
        server.shutdown();
    }

    #[tokio::test]
    async fn unknown_request_is_404() {
        let server = MockServer::start().await.unwrap();
        let client = server.client_for("doctor@sehamaroc.com").await.unwrap();
        let err = client.get_request("REQ-404").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        server.shutdown();
    }
}
