use reqwest::Method;

use super::{ApiClient, ApiError, Service};
use crate::models::medical_record::MedicalRecord;
use crate::models::patient::{PatientProfile, PatientProfileUpdate};
use crate::models::profile::{ProviderProfile, ProviderProfileUpdate};
use crate::models::request::{NewRequest, PatientRequest};

impl ApiClient {
    pub async fn patient_profile(&self) -> Result<PatientProfile, ApiError> {
        self.get_json(Service::Patient, "/api/patient/profile").await
    }

    pub async fn complete_patient_profile(&self, update: &PatientProfileUpdate) -> Result<PatientProfile, ApiError> {
        self.send_json(Method::PUT, Service::Patient, "/api/patient/complete-profile", update)
            .await
    }

    /// Records visible to the logged-in patient. `403` until the account is active.
    pub async fn medical_history(&self) -> Result<Vec<MedicalRecord>, ApiError> {
        self.get_json(Service::Patient, "/api/patient/medical-history")
            .await
    }

    pub async fn create_request(&self, request: &NewRequest) -> Result<PatientRequest, ApiError> {
        self.send_json(Method::POST, Service::Patient, "/api/requests", request)
            .await
    }

    pub async fn provider_profile(&self) -> Result<ProviderProfile, ApiError> {
        self.get_json(Service::Provider, "/api/auth/profile").await
    }

    pub async fn complete_provider_profile(&self, update: &ProviderProfileUpdate) -> Result<ProviderProfile, ApiError> {
        self.send_json(Method::PUT, Service::Provider, "/api/auth/complete-profile", update)
            .await
    }
}
