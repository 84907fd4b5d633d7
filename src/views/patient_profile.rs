//! Patient profile: view, complete, update.

use crate::i18n::Language;
use crate::models::patient::{PatientProfile, PatientProfileUpdate};
use crate::models::Role;
use crate::portal::{require_fields, Notice, PageError, Phase, Portal, SubmitFlag};
use crate::routes::Route;
use crate::session::{Session, Storage};

use super::or_dash;

const LOAD_FAILED: &str = "Failed to load profile";
const SAVE_FAILED: &str = "Failed to update profile";
const SAVED: &str = "Profile updated successfully";

/// Result of a successful save. A first completion moves on to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSaved {
    pub notice: Notice,
    pub redirect: Option<Route>,
}

#[derive(Debug)]
pub struct PatientProfileView {
    session: Session,
    pub profile: PatientProfile,
    submit: SubmitFlag,
}

impl PatientProfileView {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Patient)?;
        let profile = portal
            .client(&session)?
            .patient_profile()
            .await
            .map_err(portal.on_error(&session, Phase::Load, LOAD_FAILED))?;
        Ok(Self {
            session,
            profile,
            submit: SubmitFlag::default(),
        })
    }

    /// Completion mode: a fresh registration or a profile missing required fields.
    pub fn needs_completion(&self) -> bool {
        self.session.user.is_new_user || !self.profile.is_complete()
    }

    /// Form prefilled from the loaded profile.
    pub fn draft(&self) -> PatientProfileUpdate {
        PatientProfileUpdate::from_profile(&self.profile)
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    pub async fn save<S: Storage>(
        &mut self,
        portal: &Portal<S>,
        update: &PatientProfileUpdate,
    ) -> Result<ProfileSaved, PageError> {
        require_fields(update.missing_fields())?;
        let completing = self.needs_completion();
        let saved = {
            let _busy = self.submit.begin()?;
            let mut body = update.clone();
            if body.country.trim().is_empty() {
                body.country = PatientProfileUpdate::DEFAULT_COUNTRY.to_string();
            }
            portal
                .client(&self.session)?
                .complete_patient_profile(&body)
                .await
                .map_err(portal.on_error(&self.session, Phase::Submit, SAVE_FAILED))?
        };
        self.profile = saved;

        if self.session.user.is_new_user {
            self.session.user.is_new_user = false;
            portal.save_session(&self.session)?;
        }
        tracing::info!(email = %self.session.user.email, completing, "Patient profile saved");
        Ok(ProfileSaved {
            notice: Notice::success("Success", SAVED),
            redirect: completing.then_some(Route::PatientDashboard),
        })
    }

    pub fn render(&self, _lang: Language) -> String {
        let p = &self.profile;
        let mut out = String::from("Patient Profile\n");
        if self.needs_completion() {
            out.push_str("* Please fill in all required fields to complete your profile\n");
        }
        let status = p.account_status.map(|s| s.as_str()).unwrap_or("PENDING");
        let rows = [
            ("Email", Some(p.email.as_str())),
            ("First name", p.first_name.as_deref()),
            ("Last name", p.last_name.as_deref()),
            ("Phone", p.phone.as_deref()),
            ("Date of birth", p.date_of_birth.as_deref()),
            ("Gender", p.gender.as_deref()),
            ("Address", p.address.as_deref()),
            ("City", p.city.as_deref()),
            ("Country", p.country.as_deref()),
            ("Blood type", p.blood_type.as_deref()),
            ("Emergency contact", p.emergency_contact.as_deref()),
            ("Account status", Some(status)),
        ];
        for (label, value) in rows {
            out.push_str(&format!("  {label}: {}\n", or_dash(value)));
        }
        out.push_str(&format!("  Allergies: {}\n", list_or_dash(&p.allergies)));
        out.push_str(&format!("  Chronic diseases: {}\n", list_or_dash(&p.chronic_diseases)));
        out
    }
}

fn list_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed, MockServer};
    use crate::models::patient::split_list;
    use crate::portal::test_support::{logged_in, portal_for};
    use crate::views::auth::AuthView;
    use chrono::NaiveDate;

    fn filled() -> PatientProfileUpdate {
        PatientProfileUpdate {
            first_name: "Sara".into(),
            last_name: "Idrissi".into(),
            phone: "+212 6 11 22 33 44".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1992, 7, 4),
            allergies: split_list("pollen, , dust"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn complete_profile_after_registration() {
        let server = MockServer::start().await.unwrap();
        let portal = portal_for(&server);
        AuthView::new()
            .register_patient(&portal, "sara@example.ma", "secret1", "secret1")
            .await
            .unwrap();

        let mut view = PatientProfileView::mount(&portal).await.unwrap();
        assert!(view.needs_completion());

        let saved = view.save(&portal, &filled()).await.unwrap();
        assert_eq!(saved.redirect, Some(Route::PatientDashboard));
        assert_eq!(saved.notice.description, SAVED);
        assert!(view.profile.is_complete());
        assert_eq!(view.profile.country.as_deref(), Some("Morocco"));
        assert_eq!(view.profile.allergies, vec!["pollen", "dust"]);
        assert!(!portal.current_session().unwrap().unwrap().user.is_new_user);
        assert!(!view.needs_completion());
        server.shutdown();
    }

    #[tokio::test]
    async fn update_of_complete_profile_stays_on_page() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let mut view = PatientProfileView::mount(&portal).await.unwrap();
        let mut update = view.draft();
        update.city = "Rabat".into();
        let saved = view.save(&portal, &update).await.unwrap();
        assert_eq!(saved.redirect, None);
        assert_eq!(view.profile.city.as_deref(), Some("Rabat"));
        server.shutdown();
    }

    #[tokio::test]
    async fn missing_required_fields_never_reach_backend() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::NEW_PATIENT_EMAIL, Role::Patient).await;
        let mut view = PatientProfileView::mount(&portal).await.unwrap();
        server.force_status(500).unwrap();
        let err = view.save(&portal, &PatientProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(err, PageError::Validation(ref f) if f.len() == 4));
        // The injected failure is still pending, so nothing was sent.
        let err = view.save(&portal, &filled()).await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, "Injected failure (HTTP 500)");
        server.shutdown();
    }
}
