//! Login, registration and logout.

use crate::client::ApiError;
use crate::models::auth::Credentials;
use crate::models::Role;
use crate::portal::{require_fields, Notice, PageError, Phase, Portal, SubmitFlag};
use crate::routes::Route;
use crate::session::{Session, Storage};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const REGISTRATION_FAILED: &str = "Registration failed";
const MIN_PASSWORD_LEN: usize = 6;

/// Where a successful login or registration leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub session: Session,
    pub redirect: Route,
    pub notice: Notice,
}

#[derive(Debug, Default)]
pub struct AuthView {
    submit: SubmitFlag,
}

impl AuthView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    pub async fn login<S: Storage>(
        &self,
        portal: &Portal<S>,
        role: Role,
        email: &str,
        password: &str,
    ) -> Result<AuthOutcome, PageError> {
        let credentials = validated(email, password)?;
        let _busy = self.submit.begin()?;

        let client = portal.anonymous_client()?;
        let resp = client
            .login(role, &credentials)
            .await
            .map_err(|e| auth_failure(portal, e, INVALID_CREDENTIALS))?;

        let session = Session::from_auth(&resp, role, false)?;
        if session.user.role != role {
            tracing::warn!(expected = %role, actual = %session.user.role, "Login role does not match portal");
            return Err(PageError::Notice(Notice::error(INVALID_CREDENTIALS)));
        }
        portal.save_session(&session)?;

        Ok(AuthOutcome {
            redirect: Route::dashboard_for(role),
            notice: Notice::success("Success", resp.message.unwrap_or_else(|| "Login successful".into())),
            session,
        })
    }

    /// Create a patient account; the new account waits for provider approval.
    pub async fn register_patient<S: Storage>(
        &self,
        portal: &Portal<S>,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<AuthOutcome, PageError> {
        let credentials = validated(email, password)?;
        if password != confirm_password {
            return Err(PageError::Notice(Notice::error("Passwords do not match")));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PageError::Notice(Notice::error(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            ))));
        }
        let _busy = self.submit.begin()?;

        let client = portal.anonymous_client()?;
        let resp = client
            .register_patient(&credentials)
            .await
            .map_err(|e| auth_failure(portal, e, REGISTRATION_FAILED))?;

        let session = Session::from_auth(&resp, Role::Patient, true)?;
        portal.save_session(&session)?;

        Ok(AuthOutcome {
            redirect: Route::PatientProfileCompletion,
            notice: Notice::success(
                "Success",
                resp.message.unwrap_or_else(|| "Account created successfully".into()),
            ),
            session,
        })
    }

    pub fn logout<S: Storage>(portal: &Portal<S>) -> Result<Route, PageError> {
        portal.logout()?;
        Ok(Route::Home)
    }
}

fn validated(email: &str, password: &str) -> Result<Credentials, PageError> {
    let mut missing = Vec::new();
    if email.trim().is_empty() {
        missing.push("email");
    }
    if password.is_empty() {
        missing.push("password");
    }
    require_fields(missing)?;
    Ok(Credentials::new(email.trim(), password))
}

/// No session exists yet, so a `401` here means bad credentials.
fn auth_failure<S: Storage>(portal: &Portal<S>, err: ApiError, fallback: &str) -> PageError {
    match err {
        ApiError::Unauthorized => PageError::Notice(Notice::error(fallback)),
        other => portal.settle(None, Phase::Submit, fallback, other),
    }
}
