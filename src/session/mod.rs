//! Persisted login session.
//!
//! Two storage keys make a session: `token` (raw bearer string) and
//! `user` (camelCase JSON). Both present means authenticated; anything
//! else is treated as logged out. A `user` value that fails to parse, or
//! carries a role we do not know, is purged rather than trusted.

pub mod storage;

use serde::{Deserialize, Serialize};

use crate::models::auth::AuthResponse;
use crate::models::{AccountStatus, ModelError, Role};

pub use storage::{FileStorage, MemoryStorage, Storage};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const LANGUAGE_KEY: &str = "language";

/// Errors from the session layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage file is corrupted: {0}")]
    CorruptStore(String),
    #[error("Stored user is corrupted: {0}")]
    CorruptUser(String),
    #[error(transparent)]
    Role(#[from] ModelError),
    #[error("Login response carried an empty token")]
    EmptyToken,
    #[error("Internal lock error")]
    LockPoisoned,
}

// ═══════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════

/// Shape written under the `user` key. The role keeps the backend's
/// spelling so other clients reading the same store see what they expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredUser {
    email: String,
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    account_status: Option<AccountStatus>,
    #[serde(default)]
    can_access_medical_history: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_new_user: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub email: String,
    pub role: Role,
    pub account_status: Option<AccountStatus>,
    pub can_access_medical_history: bool,
    pub is_new_user: bool,
    raw_role: String,
}

impl SessionUser {
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            email: email.into(),
            role,
            account_status: None,
            can_access_medical_history: false,
            is_new_user: false,
            raw_role: role.as_str().to_string(),
        }
    }

    fn from_stored(stored: StoredUser) -> Result<Self, SessionError> {
        let role: Role = stored.role.parse()?;
        Ok(Self {
            email: stored.email,
            role,
            account_status: stored.account_status,
            can_access_medical_history: stored.can_access_medical_history,
            is_new_user: stored.is_new_user,
            raw_role: stored.role,
        })
    }

    fn to_stored(&self) -> StoredUser {
        StoredUser {
            email: self.email.clone(),
            role: self.raw_role.clone(),
            account_status: self.account_status,
            can_access_medical_history: self.can_access_medical_history,
            is_new_user: self.is_new_user,
        }
    }

    /// Accounts without a status (providers) are treated as active.
    pub fn is_active(&self) -> bool {
        self.account_status
            .map(|s| s.unlocks_features())
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    /// Build a session from a login/register response.
    ///
    /// `expected` fills in the role when the service omits it.
    pub fn from_auth(resp: &AuthResponse, expected: Role, is_new_user: bool) -> Result<Self, SessionError> {
        if resp.token.trim().is_empty() {
            return Err(SessionError::EmptyToken);
        }
        let raw_role = if resp.role.trim().is_empty() {
            expected.as_str().to_string()
        } else {
            resp.role.clone()
        };
        let role: Role = raw_role.parse()?;
        Ok(Self {
            token: resp.token.clone(),
            user: SessionUser {
                email: resp.email.clone(),
                role,
                account_status: resp.account_status,
                can_access_medical_history: resp.can_access_medical_history,
                is_new_user,
                raw_role,
            },
        })
    }
}

/// Shorten a bearer token for logs.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(6).collect();
    format!("{prefix}…")
}

// ═══════════════════════════════════════════════════════════
// Load / save / purge
// ═══════════════════════════════════════════════════════════

/// Read the current session.
///
/// Returns `Ok(None)` when either key is missing. A corrupted store or
/// user value is purged and reported as `Ok(None)`.
pub fn load<S: Storage + ?Sized>(storage: &S) -> Result<Option<Session>, SessionError> {
    match read(storage) {
        Ok(session) => Ok(session),
        Err(e @ (SessionError::CorruptStore(_) | SessionError::CorruptUser(_) | SessionError::Role(_))) => {
            tracing::warn!(error = %e, "Discarding unreadable session");
            purge(storage)?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn read<S: Storage + ?Sized>(storage: &S) -> Result<Option<Session>, SessionError> {
    let Some(token) = storage.get_item(TOKEN_KEY)?.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    let Some(raw_user) = storage.get_item(USER_KEY)? else {
        return Ok(None);
    };
    let stored: StoredUser =
        serde_json::from_str(&raw_user).map_err(|e| SessionError::CorruptUser(e.to_string()))?;
    let user = SessionUser::from_stored(stored)?;
    Ok(Some(Session { token, user }))
}

pub fn save<S: Storage + ?Sized>(storage: &S, session: &Session) -> Result<(), SessionError> {
    let user_json = serde_json::to_string(&session.user.to_stored())
        .map_err(|e| SessionError::CorruptUser(e.to_string()))?;
    storage.set_item(TOKEN_KEY, &session.token)?;
    storage.set_item(USER_KEY, &user_json)?;
    tracing::info!(
        email = %session.user.email,
        role = %session.user.role,
        token = %redact_token(&session.token),
        "Session created"
    );
    Ok(())
}

/// Remove both session keys. The language preference survives.
pub fn purge<S: Storage + ?Sized>(storage: &S) -> Result<(), SessionError> {
    storage.remove_item(TOKEN_KEY)?;
    storage.remove_item(USER_KEY)?;
    tracing::info!("Session cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient_response(role: &str) -> AuthResponse {
        serde_json::from_value(serde_json::json!({
            "token": "tok-123456789",
            "email": "patient@sehamaroc.com",
            "role": role,
            "accountStatus": "ACTIVE",
            "canAccessMedicalHistory": true
        }))
        .unwrap()
    }

    #[test]
    fn empty_storage_has_no_session() {
        let storage = MemoryStorage::new();
        assert!(load(&storage).unwrap().is_none());
    }

    #[test]
    fn token_without_user_is_no_session() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        assert!(load(&storage).unwrap().is_none());
    }

    #[test]
    fn save_then_load_preserves_user() {
        let storage = MemoryStorage::new();
        let session = Session::from_auth(&patient_response("ROLE_PATIENT"), Role::Patient, false).unwrap();
        save(&storage, &session).unwrap();

        let loaded = load(&storage).unwrap().unwrap();
        assert_eq!(loaded, session);
        assert_eq!(loaded.user.role, Role::Patient);
        assert!(loaded.user.is_active());
    }

    #[test]
    fn raw_role_spelling_is_written_back() {
        let storage = MemoryStorage::new();
        let session = Session::from_auth(&patient_response("patient"), Role::Patient, true).unwrap();
        save(&storage, &session).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&storage.get_item(USER_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["role"], "patient");
        assert_eq!(raw["accountStatus"], "ACTIVE");
        assert_eq!(raw["isNewUser"], true);
    }

    #[test]
    fn corrupted_user_json_is_purged() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage.set_item(USER_KEY, "{not json").unwrap();
        storage.set_item(LANGUAGE_KEY, "fr").unwrap();

        assert!(load(&storage).unwrap().is_none());
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get_item(USER_KEY).unwrap(), None);
        assert_eq!(storage.get_item(LANGUAGE_KEY).unwrap().as_deref(), Some("fr"));
    }

    #[test]
    fn unknown_stored_role_is_purged() {
        let storage = MemoryStorage::new();
        storage.set_item(TOKEN_KEY, "abc").unwrap();
        storage
            .set_item(USER_KEY, r#"{"email":"x@y.ma","role":"ADMIN"}"#)
            .unwrap();
        assert!(load(&storage).unwrap().is_none());
        assert_eq!(storage.get_item(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn missing_role_falls_back_to_expected() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"token":"t","email":"doctor@sehamaroc.com"}"#).unwrap();
        let session = Session::from_auth(&resp, Role::Provider, false).unwrap();
        assert_eq!(session.user.role, Role::Provider);
        assert!(session.user.is_active());
    }

    #[test]
    fn empty_token_is_rejected() {
        let resp: AuthResponse = serde_json::from_str(r#"{"token":"","role":"PROVIDER"}"#).unwrap();
        assert!(matches!(
            Session::from_auth(&resp, Role::Provider, false),
            Err(SessionError::EmptyToken)
        ));
    }

    #[test]
    fn pending_patient_is_not_active() {
        let mut user = SessionUser::new("p@x.ma", Role::Patient);
        user.account_status = Some(AccountStatus::Pending);
        assert!(!user.is_active());
    }

    #[test]
    fn redacted_token_keeps_prefix_only() {
        assert_eq!(redact_token("eyJhbGciOiJIUzI1NiJ9"), "eyJhbG…");
        assert_eq!(redact_token("abc"), "abc…");
    }
}
