use reqwest::Method;

use super::{ApiClient, ApiError, Service};
use crate::models::certificate::{Certificate, NewCertificate};

impl ApiClient {
    pub async fn list_certificates(&self) -> Result<Vec<Certificate>, ApiError> {
        self.get_json(Service::Requests, "/api/certificates").await
    }

    pub async fn get_certificate(&self, id: &str) -> Result<Certificate, ApiError> {
        self.get_json(Service::Requests, &format!("/api/certificates/{id}"))
            .await
    }

    pub async fn create_certificate(&self, certificate: &NewCertificate) -> Result<Certificate, ApiError> {
        self.send_json(Method::POST, Service::Requests, "/api/certificates", certificate)
            .await
    }

    /// Printable PDF bytes.
    pub async fn print_certificate(&self, id: &str) -> Result<Vec<u8>, ApiError> {
        self.get_bytes(Service::Requests, &format!("/api/certificates/{id}/print"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockServer;

    #[tokio::test]
    async fn print_returns_pdf_bytes() {
        let server = MockServer::start().await.unwrap();
        let client = server.client_for("patient@sehamaroc.com").await.unwrap();
        let certs = client.list_certificates().await.unwrap();
        let id = certs[0].key().unwrap().to_string();
        let pdf = client.print_certificate(&id).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        server.shutdown();
    }

    #[tokio::test]
    async fn provider_creates_certificate() {
        let server = MockServer::start().await.unwrap();
        let client = server.client_for("doctor@sehamaroc.com").await.unwrap();
        let before = client.list_certificates().await.unwrap().len();
        let created = client
            .create_certificate(&NewCertificate {
                patient_id: crate::mock::seed::PATIENT_ID.into(),
                certificate_type: "MEDICAL_FITNESS".into(),
                title: "Aptitude au sport".into(),
                case_treated: "Routine check".into(),
                content: "Fit for sport".into(),
                signature: "Dr. Fatima Alami".into(),
                certificate_number: NewCertificate::number_for(2025, 7),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.patient_name.as_deref(), Some("Ahmed Benali"));
        assert_eq!(client.list_certificates().await.unwrap().len(), before + 1);
        server.shutdown();
    }
}
