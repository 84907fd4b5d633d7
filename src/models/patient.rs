//! Patient-side records: the provider's patient list entry and the
//! patient's own profile.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::AccountStatus;

/// Row of the provider's patient management lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub account_status: Option<AccountStatus>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub suspension_reason: Option<String>,
    #[serde(default)]
    pub assigned_provider_id: Option<String>,
}

impl PatientSummary {
    /// `fullName`, else first + last, else the email.
    pub fn display_name(&self) -> String {
        if let Some(full) = self.full_name.as_deref().filter(|s| !s.trim().is_empty()) {
            return full.to_string();
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if joined.is_empty() {
            self.email.clone()
        } else {
            joined
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub chronic_diseases: Vec<String>,
    #[serde(default)]
    pub account_status: Option<AccountStatus>,
    #[serde(default)]
    pub profile_complete: bool,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|s| !s.trim().is_empty())
}

impl PatientProfile {
    /// Id used for `/api/requests/patient/{id}`: `id`, else `patientId`.
    pub fn request_owner_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.patient_id.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// First name, last name, phone and date of birth all present.
    pub fn is_complete(&self) -> bool {
        filled(&self.first_name)
            && filled(&self.last_name)
            && filled(&self.phone)
            && filled(&self.date_of_birth)
    }
}

/// Body of `PUT /api/patient/complete-profile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub blood_type: String,
    pub emergency_contact: String,
    pub allergies: Vec<String>,
    pub chronic_diseases: Vec<String>,
}

impl PatientProfileUpdate {
    pub const DEFAULT_COUNTRY: &'static str = "Morocco";

    /// Prefill the form from the current profile.
    pub fn from_profile(profile: &PatientProfile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            first_name: text(&profile.first_name),
            last_name: text(&profile.last_name),
            phone: text(&profile.phone),
            date_of_birth: profile
                .date_of_birth
                .as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.get(..10).unwrap_or(d), "%Y-%m-%d").ok()),
            gender: text(&profile.gender),
            address: text(&profile.address),
            city: text(&profile.city),
            state: text(&profile.state),
            zip_code: text(&profile.zip_code),
            country: profile
                .country
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| Self::DEFAULT_COUNTRY.to_string()),
            blood_type: text(&profile.blood_type),
            emergency_contact: text(&profile.emergency_contact),
            allergies: profile.allergies.clone(),
            chronic_diseases: profile.chronic_diseases.clone(),
        }
    }

    /// Names of required fields left blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.first_name.trim().is_empty() {
            missing.push("firstName");
        }
        if self.last_name.trim().is_empty() {
            missing.push("lastName");
        }
        if self.phone.trim().is_empty() {
            missing.push("phone");
        }
        if self.date_of_birth.is_none() {
            missing.push("dateOfBirth");
        }
        missing
    }
}

/// Split a comma-separated form field into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
