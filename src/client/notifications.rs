use super::{ApiClient, ApiError, Service};
use crate::models::notification::RawNotification;

impl ApiClient {
    /// Responses to the patient's requests. `403` while the account is not active.
    pub async fn notifications(&self) -> Result<Vec<RawNotification>, ApiError> {
        self.get_json(Service::Patient, "/api/notifications").await
    }
}
