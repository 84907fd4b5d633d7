//! One module per portal page.
//!
//! Every protected view follows the same cycle: `mount` runs the session
//! guard and the initial load, actions submit and refetch, and `render`
//! produces the text the CLI prints. Failures come back as [`PageError`].

pub mod auth;
pub mod patient_certificates;
pub mod patient_dashboard;
pub mod patient_history;
pub mod patient_notifications;
pub mod patient_profile;
pub mod patient_requests;
pub mod provider_certificates;
pub mod provider_dashboard;
pub mod provider_patients;
pub mod provider_profile;
pub mod provider_records;
pub mod provider_requests;

use std::fmt;
use std::str::FromStr;

use crate::i18n::Language;
use crate::models::{ModelError, Role};
use crate::portal::{Notice, PageError, Portal};
use crate::session::Storage;

/// Protected views reachable by name from the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewName {
    PatientDashboard,
    PatientRequests,
    PatientHistory,
    PatientNotifications,
    PatientProfile,
    PatientCertificates,
    ProviderDashboard,
    ProviderPatients,
    ProviderRequests,
    ProviderRecords,
    ProviderCertificates,
    ProviderProfile,
}

impl ViewName {
    pub const ALL: [ViewName; 12] = [
        ViewName::PatientDashboard,
        ViewName::PatientRequests,
        ViewName::PatientHistory,
        ViewName::PatientNotifications,
        ViewName::PatientProfile,
        ViewName::PatientCertificates,
        ViewName::ProviderDashboard,
        ViewName::ProviderPatients,
        ViewName::ProviderRequests,
        ViewName::ProviderRecords,
        ViewName::ProviderCertificates,
        ViewName::ProviderProfile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewName::PatientDashboard => "patient-dashboard",
            ViewName::PatientRequests => "patient-requests",
            ViewName::PatientHistory => "patient-history",
            ViewName::PatientNotifications => "patient-notifications",
            ViewName::PatientProfile => "patient-profile",
            ViewName::PatientCertificates => "patient-certificates",
            ViewName::ProviderDashboard => "provider-dashboard",
            ViewName::ProviderPatients => "provider-patients",
            ViewName::ProviderRequests => "provider-requests",
            ViewName::ProviderRecords => "provider-records",
            ViewName::ProviderCertificates => "provider-certificates",
            ViewName::ProviderProfile => "provider-profile",
        }
    }

    pub fn role(&self) -> Role {
        match self {
            ViewName::PatientDashboard
            | ViewName::PatientRequests
            | ViewName::PatientHistory
            | ViewName::PatientNotifications
            | ViewName::PatientProfile
            | ViewName::PatientCertificates => Role::Patient,
            _ => Role::Provider,
        }
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewName {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == wanted)
            .ok_or_else(|| ModelError::InvalidEnum {
                field: "View",
                value: s.to_string(),
            })
    }
}

/// Mount `name` and render it in the portal's language.
pub async fn render_view<S: Storage>(portal: &Portal<S>, name: ViewName) -> Result<String, PageError> {
    let lang = portal.language();
    let text = match name {
        ViewName::PatientDashboard => patient_dashboard::PatientDashboard::mount(portal).await?.render(lang),
        ViewName::PatientRequests => patient_requests::PatientRequests::mount(portal).await?.render(lang),
        ViewName::PatientHistory => patient_history::PatientHistory::mount(portal).await?.render(lang),
        ViewName::PatientNotifications => {
            patient_notifications::PatientNotifications::mount(portal).await?.render(lang)
        }
        ViewName::PatientProfile => patient_profile::PatientProfileView::mount(portal).await?.render(lang),
        ViewName::PatientCertificates => {
            patient_certificates::PatientCertificates::mount(portal).await?.render(lang)
        }
        ViewName::ProviderDashboard => provider_dashboard::ProviderDashboard::mount(portal).await?.render(lang),
        ViewName::ProviderPatients => provider_patients::ProviderPatients::mount(portal).await?.render(lang),
        ViewName::ProviderRequests => provider_requests::ProviderRequests::mount(portal).await?.render(lang),
        ViewName::ProviderRecords => provider_records::ProviderRecords::mount(portal).await?.render(lang),
        ViewName::ProviderCertificates => {
            provider_certificates::ProviderCertificates::mount(portal).await?.render(lang)
        }
        ViewName::ProviderProfile => provider_profile::ProviderProfileView::mount(portal).await?.render(lang),
    };
    Ok(text)
}

/// Append `notices` as `! title: description` lines.
pub(crate) fn push_notices(out: &mut String, notices: &[Notice]) {
    for notice in notices {
        out.push_str(&format!("! {notice}\n"));
    }
}

pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|s| !s.trim().is_empty()).unwrap_or("-")
}
