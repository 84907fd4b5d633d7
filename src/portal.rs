//! Page runtime shared by every view.
//!
//! A [`Portal`] owns the storage, the configured endpoints and the
//! language. Views call [`Portal::guard`] on mount, then run their loads
//! and submits through [`Portal::settle`], which turns backend failures
//! into the view-level [`PageError`]: a `401` purges the session and
//! redirects to login; anything else becomes a [`Notice`].

use std::fmt;

use chrono::{NaiveDateTime, Utc};

use crate::client::{ApiClient, ApiError};
use crate::config::{PortalConfig, ServiceEndpoints};
use crate::i18n::Language;
use crate::models::Role;
use crate::routes::Route;
use crate::session::{self, Session, SessionError, Storage};

pub const ACCESS_DENIED: &str = "Access denied. Please check your permissions.";
pub const CONNECTION_ERROR: &str = "Connection error. Please try again.";

// ═══════════════════════════════════════════════════════════
// Notices & page errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeVariant {
    Default,
    Destructive,
}

/// Toast-style message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub variant: NoticeVariant,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NoticeVariant::Default,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: NoticeVariant::Destructive,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}

/// Outcome of a view operation that did not complete.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Redirect to {0}")]
    Redirect(Route),
    #[error("{0}")]
    Notice(Notice),
    #[error("Please fill in: {}", .0.join(", "))]
    Validation(Vec<&'static str>),
    #[error("A submission is already in progress")]
    Busy,
    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),
}

impl PageError {
    pub fn redirect_target(&self) -> Option<Route> {
        match self {
            PageError::Redirect(route) => Some(*route),
            _ => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            PageError::Notice(notice) => Some(notice),
            _ => None,
        }
    }
}

/// Whether a failed call was a page load or a form submission.
///
/// Loads always show the view's fallback for generic failures; submits
/// prefer the server's own message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Load,
    Submit,
}

// ═══════════════════════════════════════════════════════════
// Portal
// ═══════════════════════════════════════════════════════════

pub struct Portal<S: Storage> {
    storage: S,
    endpoints: ServiceEndpoints,
    timeout_secs: u64,
    language: Language,
}

impl<S: Storage> Portal<S> {
    pub fn new(storage: S, endpoints: ServiceEndpoints, timeout_secs: u64) -> Result<Self, SessionError> {
        let language = Language::load(&storage)?;
        Ok(Self {
            storage,
            endpoints,
            timeout_secs,
            language,
        })
    }

    pub fn from_config(storage: S, config: &PortalConfig) -> Result<Self, SessionError> {
        Self::new(storage, config.endpoints.clone(), config.request_timeout_secs)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) -> Result<(), SessionError> {
        language.save(&self.storage)?;
        self.language = language;
        Ok(())
    }

    pub fn now(&self) -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    /// Client without credentials, for the auth endpoints.
    pub fn anonymous_client(&self) -> Result<ApiClient, PageError> {
        ApiClient::new(self.endpoints.clone(), self.timeout_secs)
            .map_err(|e| self.settle(None, Phase::Load, CONNECTION_ERROR, e))
    }

    /// Client carrying the session's bearer token.
    pub fn client(&self, session: &Session) -> Result<ApiClient, PageError> {
        Ok(self.anonymous_client()?.with_token(session.token.clone()))
    }

    pub fn current_session(&self) -> Result<Option<Session>, SessionError> {
        session::load(&self.storage)
    }

    /// Mount check for a protected view.
    ///
    /// No session → login route of `required`; wrong role → home.
    pub fn guard(&self, required: Role) -> Result<Session, PageError> {
        let Some(session) = session::load(&self.storage)? else {
            tracing::debug!(role = %required, "No session, redirecting to login");
            return Err(PageError::Redirect(Route::login_for(required)));
        };
        if session.user.role != required {
            tracing::warn!(
                expected = %required,
                actual = %session.user.role,
                "Role mismatch, redirecting home"
            );
            return Err(PageError::Redirect(Route::Home));
        }
        Ok(session)
    }

    pub fn save_session(&self, session: &Session) -> Result<(), SessionError> {
        session::save(&self.storage, session)
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        session::purge(&self.storage)
    }

    /// Map a backend failure to what the view shows.
    ///
    /// `role` is the session's role, used for the post-`401` redirect.
    pub fn settle(&self, role: Option<Role>, phase: Phase, fallback: &str, err: ApiError) -> PageError {
        match err {
            ApiError::Unauthorized => {
                if let Err(e) = session::purge(&self.storage) {
                    return PageError::Session(e);
                }
                tracing::info!("Backend rejected the session, logging out");
                PageError::Redirect(role.map(Route::login_for).unwrap_or(Route::Home))
            }
            ApiError::Network(reason) => {
                tracing::error!(%reason, "Backend unreachable");
                PageError::Notice(Notice::error(CONNECTION_ERROR))
            }
            ApiError::Forbidden { message } => {
                let text = match phase {
                    Phase::Submit => message.unwrap_or_else(|| ACCESS_DENIED.to_string()),
                    Phase::Load => ACCESS_DENIED.to_string(),
                };
                PageError::Notice(Notice::error(text))
            }
            ApiError::Http { message, .. } => {
                let text = match phase {
                    Phase::Submit => message.unwrap_or_else(|| fallback.to_string()),
                    Phase::Load => fallback.to_string(),
                };
                PageError::Notice(Notice::error(text))
            }
            ApiError::Decode(reason) => {
                tracing::warn!(%reason, "Backend sent an unexpected body");
                PageError::Notice(Notice::error(fallback))
            }
        }
    }

    /// `settle` bound to a session, for `map_err`.
    pub fn on_error<'a>(
        &'a self,
        session: &Session,
        phase: Phase,
        fallback: &'a str,
    ) -> impl FnOnce(ApiError) -> PageError + 'a {
        let role = session.user.role;
        move |err| self.settle(Some(role), phase, fallback, err)
    }

    /// Settle one branch of a parallel load.
    ///
    /// A failed branch becomes a notice in `notices` and `None`; redirects
    /// and storage failures still abort the whole load.
    pub fn partial<T>(
        &self,
        session: &Session,
        fallback: &str,
        result: Result<T, ApiError>,
        notices: &mut Vec<Notice>,
    ) -> Result<Option<T>, PageError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) => match self.settle(Some(session.user.role), Phase::Load, fallback, err) {
                PageError::Notice(notice) => {
                    if !notices.contains(&notice) {
                        notices.push(notice);
                    }
                    Ok(None)
                }
                other => Err(other),
            },
        }
    }
}

/// Per-view submission latch.
///
/// `begin` refuses a second submission while one is in flight; the
/// returned guard clears the flag when dropped.
#[derive(Debug, Default)]
pub struct SubmitFlag {
    in_flight: std::sync::atomic::AtomicBool,
}

pub struct SubmitGuard<'a> {
    flag: &'a SubmitFlag,
}

impl SubmitFlag {
    pub fn begin(&self) -> Result<SubmitGuard<'_>, PageError> {
        use std::sync::atomic::Ordering;
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(PageError::Busy);
        }
        Ok(SubmitGuard { flag: self })
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(std::sync::atomic::Ordering::Acquire)
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.flag
            .in_flight
            .store(false, std::sync::atomic::Ordering::Release);
    }
}

/// Reject a submission when required fields are blank.
pub fn require_fields(missing: Vec<&'static str>) -> Result<(), PageError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(PageError::Validation(missing))
    }
}
