use reqwest::Method;

use super::{ApiClient, ApiError, Service};
use crate::models::auth::{AuthResponse, Credentials};
use crate::models::Role;

impl ApiClient {
    /// `POST /api/auth/login` on the service that owns `role`.
    pub async fn login(&self, role: Role, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let service = match role {
            Role::Patient => Service::Patient,
            Role::Provider => Service::Provider,
        };
        self.send_json(Method::POST, service, "/api/auth/login", credentials)
            .await
    }

    /// Patient self-registration. The account starts out `PENDING`.
    pub async fn register_patient(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        self.send_json(Method::POST, Service::Patient, "/api/auth/register", credentials)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockServer, DEMO_PASSWORD};
    use crate::models::AccountStatus;

    #[tokio::test]
    async fn patient_and_provider_login() {
        let server = MockServer::start().await.unwrap();
        let client = ApiClient::new(server.endpoints(), 5).unwrap();

        let patient = client
            .login(Role::Patient, &Credentials::new("patient@sehamaroc.com", DEMO_PASSWORD))
            .await
            .unwrap();
        assert_eq!(patient.role, "ROLE_PATIENT");
        assert_eq!(patient.account_status, Some(AccountStatus::Active));
        assert!(!patient.token.is_empty());

        let provider = client
            .login(Role::Provider, &Credentials::new("doctor@sehamaroc.com", DEMO_PASSWORD))
            .await
            .unwrap();
        assert_eq!(provider.role, "PROVIDER");
        assert!(provider.account_status.is_none());
        server.shutdown();
    }

    #[tokio::test]
    async fn wrong_password_is_rejected() {
        let server = MockServer::start().await.unwrap();
        let client = ApiClient::new(server.endpoints(), 5).unwrap();
        let err = client
            .login(Role::Patient, &Credentials::new("patient@sehamaroc.com", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
        server.shutdown();
    }

    #[tokio::test]
    async fn duplicate_registration_reports_server_message() {
        let server = MockServer::start().await.unwrap();
        let client = ApiClient::new(server.endpoints(), 5).unwrap();
        let fresh = client
            .register_patient(&Credentials::new("sara@example.ma", "secret1"))
            .await
            .unwrap();
        assert_eq!(fresh.account_status, Some(AccountStatus::Pending));

        let err = client
            .register_patient(&Credentials::new("sara@example.ma", "secret1"))
            .await
            .unwrap_err();
        assert_eq!(err.server_message(), Some("Email already registered"));
        server.shutdown();
    }
}
