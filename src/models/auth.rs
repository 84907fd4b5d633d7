use serde::{Deserialize, Serialize};

use super::AccountStatus;

/// Body of `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Success body of the auth endpoints.
///
/// The patient service fills `accountStatus`/`canAccessMedicalHistory`;
/// the provider service only sends `token`, `email`, `role`, `message`.
/// `role` stays raw here and is normalized when the session is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_status: Option<AccountStatus>,
    #[serde(default)]
    pub can_access_medical_history: bool,
}
