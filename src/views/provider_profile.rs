//! Provider's professional profile.

use crate::i18n::Language;
use crate::models::profile::{ProviderProfile, ProviderProfileUpdate};
use crate::models::Role;
use crate::portal::{require_fields, Notice, PageError, Phase, Portal, SubmitFlag};
use crate::session::{Session, Storage};

use super::or_dash;

const LOAD_FAILED: &str = "Failed to load profile";
const SAVE_FAILED: &str = "Failed to update profile";

#[derive(Debug)]
pub struct ProviderProfileView {
    session: Session,
    pub profile: ProviderProfile,
    submit: SubmitFlag,
}

impl ProviderProfileView {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Provider)?;
        let profile = portal
            .client(&session)?
            .provider_profile()
            .await
            .map_err(portal.on_error(&session, Phase::Load, LOAD_FAILED))?;
        Ok(Self {
            session,
            profile,
            submit: SubmitFlag::default(),
        })
    }

    pub fn draft(&self) -> ProviderProfileUpdate {
        ProviderProfileUpdate::from_profile(&self.profile)
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    pub async fn save<S: Storage>(
        &mut self,
        portal: &Portal<S>,
        update: &ProviderProfileUpdate,
    ) -> Result<Notice, PageError> {
        require_fields(update.missing_fields())?;
        let saved = {
            let _busy = self.submit.begin()?;
            portal
                .client(&self.session)?
                .complete_provider_profile(update)
                .await
                .map_err(portal.on_error(&self.session, Phase::Submit, SAVE_FAILED))?
        };
        self.profile = saved;
        tracing::info!(email = %self.profile.email, "Provider profile saved");
        Ok(Notice::success("Success", "Profile updated successfully"))
    }

    pub fn render(&self, _lang: Language) -> String {
        let p = &self.profile;
        let mut out = format!("{}\n", p.display_name());
        if !p.profile_complete {
            out.push_str("* Please fill in all required fields to complete your profile\n");
        }
        let rows = [
            ("Email", Some(p.email.as_str())),
            ("Title", p.professional_title.as_deref()),
            ("Specialty", p.specialty.as_deref()),
            ("Clinic", p.primary_clinic_name.as_deref()),
            ("Clinic address", p.clinic_address.as_deref()),
            ("Contact", p.contact_number.as_deref()),
        ];
        for (label, value) in rows {
            out.push_str(&format!("  {label}: {}\n", or_dash(value)));
        }
        let joined = |items: &[String]| if items.is_empty() { "-".to_string() } else { items.join(", ") };
        out.push_str(&format!("  Sub-specialties: {}\n", joined(&p.sub_specialties)));
        out.push_str(&format!("  Licenses: {}\n", joined(&p.state_licenses)));
        out
    }
}
