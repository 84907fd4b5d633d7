use reqwest::Method;

use super::{Ack, ApiClient, ApiError, Service};
use crate::models::medical_record::MedicalRecord;

impl ApiClient {
    pub async fn list_records(&self) -> Result<Vec<MedicalRecord>, ApiError> {
        self.get_json(Service::Providers, "/api/records").await
    }

    pub async fn get_record(&self, record_id: &str) -> Result<MedicalRecord, ApiError> {
        self.get_json(Service::Providers, &format!("/api/records/{record_id}"))
            .await
    }

    pub async fn create_record(&self, record: &MedicalRecord) -> Result<MedicalRecord, ApiError> {
        self.send_json(Method::POST, Service::Providers, "/api/providers/medical-records", record)
            .await
    }

    pub async fn update_record(&self, record_id: &str, record: &MedicalRecord) -> Result<MedicalRecord, ApiError> {
        self.send_json(
            Method::PUT,
            Service::Providers,
            &format!("/api/records/{record_id}"),
            record,
        )
        .await
    }

    pub async fn delete_record(&self, record_id: &str) -> Result<Ack, ApiError> {
        self.send_action::<()>(
            Method::DELETE,
            Service::Providers,
            &format!("/api/records/{record_id}"),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockServer;

    #[tokio::test]
    async fn delete_removes_record() {
        let server = MockServer::start().await.unwrap();
        let client = server.client_for("doctor@sehamaroc.com").await.unwrap();
        let records = client.list_records().await.unwrap();
        let id = records[0].record_id.clone().unwrap();

        client.delete_record(&id).await.unwrap();
        let err = client.get_record(&id).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(client.list_records().await.unwrap().len(), records.len() - 1);
        server.shutdown();
    }
}
