//! Patient landing page: account status, stats, recent requests.

use crate::format::{format_optional_date, StatusBadge};
use crate::i18n::Language;
use crate::models::patient::PatientProfile;
use crate::models::request::{PatientRequest, RequestStatus};
use crate::models::{AccountStatus, Role};
use crate::portal::{Notice, PageError, Phase, Portal};
use crate::session::{Session, Storage};

use super::push_notices;

const LOAD_FAILED: &str = "Failed to load dashboard";
pub const PATIENT_ID_MISSING: &str = "Patient ID not found. Please try logging in again.";
const RECENT_LIMIT: usize = 5;

/// Dashboard counter; locked until a provider approves the account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Count(usize),
    Locked,
}

impl Stat {
    fn render(&self) -> String {
        match self {
            Stat::Count(n) => n.to_string(),
            Stat::Locked => "locked".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardAlert {
    PendingApproval,
    Suspended,
    IncompleteProfile,
}

impl DashboardAlert {
    pub fn message(&self) -> &'static str {
        match self {
            DashboardAlert::PendingApproval => {
                "Your account is pending approval. Please wait for provider approval to access all features."
            }
            DashboardAlert::Suspended => "Your account has been suspended. Please contact your provider.",
            DashboardAlert::IncompleteProfile => "Please complete your profile to get the most out of SehaMaroc.",
        }
    }
}

#[derive(Debug)]
pub struct PatientDashboard {
    session: Session,
    /// `None` when the profile could not be loaded.
    pub profile: Option<PatientProfile>,
    pub account_status: Option<AccountStatus>,
    /// `None` while the account is locked.
    pub requests: Option<Vec<PatientRequest>>,
    pub notifications: Option<usize>,
    pub notices: Vec<Notice>,
}

impl PatientDashboard {
    /// Load the dashboard.
    ///
    /// The lock follows the freshly fetched `accountStatus`, so an approval
    /// shows up without logging in again. The stored session's status is
    /// used when the profile omits it or cannot be loaded; a failed profile
    /// load becomes a notice rather than failing the whole page.
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Patient)?;
        let client = portal.client(&session)?;

        let mut notices = Vec::new();
        let profile = portal.partial(&session, LOAD_FAILED, client.patient_profile().await, &mut notices)?;
        let account_status = profile
            .as_ref()
            .and_then(|p| p.account_status)
            .or(session.user.account_status);
        let unlocked = account_status.map(|s| s.unlocks_features()).unwrap_or(true);

        let (mut requests, mut notifications) = (None, None);
        if !unlocked {
            tracing::debug!(status = ?account_status, "Account locked, skipping request and notification loads");
        } else if let Some(profile) = &profile {
            match profile.request_owner_id() {
                Some(owner) => {
                    let (reqs, notifs) = tokio::join!(client.patient_requests(owner), client.notifications());
                    requests = portal.partial(&session, LOAD_FAILED, reqs, &mut notices)?;
                    notifications = portal
                        .partial(&session, LOAD_FAILED, notifs, &mut notices)?
                        .map(|n| n.len());
                }
                None => {
                    tracing::warn!(email = %session.user.email, "Profile carried no patient id");
                    notices.push(Notice::error(PATIENT_ID_MISSING));
                }
            }
        }

        Ok(Self {
            session,
            profile,
            account_status,
            requests,
            notifications,
            notices,
        })
    }

    pub fn is_locked(&self) -> bool {
        !self.account_status.map(|s| s.unlocks_features()).unwrap_or(true)
    }

    fn stat(&self, count: Option<usize>) -> Stat {
        if self.is_locked() {
            Stat::Locked
        } else {
            Stat::Count(count.unwrap_or(0))
        }
    }

    /// Requests not yet completed.
    pub fn active_requests(&self) -> Stat {
        self.stat(self.requests.as_ref().map(|r| {
            r.iter().filter(|req| req.status != RequestStatus::Completed).count()
        }))
    }

    pub fn notification_count(&self) -> Stat {
        self.stat(self.notifications)
    }

    pub fn consultations(&self) -> Stat {
        self.stat(self.requests.as_ref().map(Vec::len))
    }

    pub fn recent_requests(&self) -> &[PatientRequest] {
        match &self.requests {
            Some(requests) => &requests[..requests.len().min(RECENT_LIMIT)],
            None => &[],
        }
    }

    pub fn alerts(&self) -> Vec<DashboardAlert> {
        let mut alerts = Vec::new();
        match self.account_status {
            Some(AccountStatus::Pending) => alerts.push(DashboardAlert::PendingApproval),
            Some(AccountStatus::Suspended) => alerts.push(DashboardAlert::Suspended),
            _ => {}
        }
        if self.profile.as_ref().is_some_and(|p| !p.is_complete()) {
            alerts.push(DashboardAlert::IncompleteProfile);
        }
        alerts
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = format!("Welcome, {}\n", self.session.user.email);
        push_notices(&mut out, &self.notices);
        for alert in self.alerts() {
            out.push_str(&format!("* {}\n", alert.message()));
        }
        let status = self.account_status.map(|s| s.as_str()).unwrap_or("PENDING");
        out.push_str(&format!("Account status: {status}\n"));
        out.push_str(&format!("Active requests: {}\n", self.active_requests().render()));
        out.push_str(&format!("Notifications: {}\n", self.notification_count().render()));
        out.push_str(&format!("Consultations: {}\n", self.consultations().render()));

        out.push_str("\nRecent requests\n");
        if self.is_locked() {
            out.push_str("  Feature locked. Please wait for provider approval to access this feature.\n");
        } else if self.recent_requests().is_empty() {
            out.push_str("  No consultation requests yet\n");
        } else {
            for req in self.recent_requests() {
                out.push_str(&format!(
                    "  [{}] {} ({})\n",
                    StatusBadge::for_status(&req.status).as_str(),
                    req.subject,
                    format_optional_date(req.created_at, lang),
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed, MockServer};
    use crate::portal::test_support::logged_in;
    use crate::routes::Route;

    #[tokio::test]
    async fn active_patient_sees_counts() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let view = PatientDashboard::mount(&portal).await.unwrap();

        assert!(view.notices.is_empty());
        assert_eq!(view.active_requests(), Stat::Count(2));
        assert_eq!(view.notification_count(), Stat::Count(2));
        assert_eq!(view.consultations(), Stat::Count(3));
        assert_eq!(view.recent_requests().len(), 3);
        assert!(view.alerts().is_empty());
        server.shutdown();
    }

    #[tokio::test]
    async fn pending_patient_has_locked_stats_and_no_extra_loads() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::NEW_PATIENT_EMAIL, Role::Patient).await;
        let view = PatientDashboard::mount(&portal).await.unwrap();

        assert!(view.is_locked());
        assert_eq!(view.active_requests(), Stat::Locked);
        assert_eq!(view.notification_count(), Stat::Locked);
        assert_eq!(view.consultations(), Stat::Locked);
        // The backend refuses these calls for a pending account, so a
        // notice here would mean they were issued.
        assert!(view.notices.is_empty());
        assert!(view.requests.is_none());
        assert_eq!(
            view.alerts(),
            vec![DashboardAlert::PendingApproval, DashboardAlert::IncompleteProfile]
        );
        assert!(view.render(Language::En).contains("Active requests: locked"));
        server.shutdown();
    }

    #[tokio::test]
    async fn only_five_most_recent_requests_are_listed() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let client = server.client_for(seed::PATIENT_EMAIL).await.unwrap();
        for i in 0..4 {
            client
                .create_request(&crate::models::request::NewRequest {
                    request_type: "consultation".into(),
                    priority: "low".into(),
                    subject: format!("Follow-up {i}"),
                    description: "Routine".into(),
                    preferred_date: None,
                    target_provider_id: None,
                })
                .await
                .unwrap();
        }
        let view = PatientDashboard::mount(&portal).await.unwrap();
        assert_eq!(view.consultations(), Stat::Count(7));
        assert_eq!(view.recent_requests().len(), 5);
        server.shutdown();
    }

    #[tokio::test]
    async fn failed_profile_load_falls_back_to_stored_status() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::NEW_PATIENT_EMAIL, Role::Patient).await;
        server.force_status(500).unwrap();
        let view = PatientDashboard::mount(&portal).await.unwrap();

        assert!(view.profile.is_none());
        assert_eq!(view.account_status, Some(AccountStatus::Pending));
        assert_eq!(view.consultations(), Stat::Locked);
        assert_eq!(view.notices.len(), 1);
        assert_eq!(view.notices[0].description, LOAD_FAILED);
        assert_eq!(view.alerts(), vec![DashboardAlert::PendingApproval]);
        server.shutdown();
    }

    #[tokio::test]
    async fn expired_token_logs_out() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        server.force_status(401).unwrap();
        let err = PatientDashboard::mount(&portal).await.unwrap_err();
        assert_eq!(err.redirect_target(), Some(Route::PatientAuth));
        assert!(portal.current_session().unwrap().is_none());
        server.shutdown();
    }
}
