//! Provider profile.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfile {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub sub_specialties: Vec<String>,
    #[serde(default)]
    pub state_licenses: Vec<String>,
    #[serde(default)]
    pub primary_clinic_name: Option<String>,
    #[serde(default)]
    pub clinic_address: Option<String>,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub profile_complete: bool,
}

impl ProviderProfile {
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Body of `PUT /api/auth/complete-profile` on the provider service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderProfileUpdate {
    pub full_name: String,
    pub professional_title: String,
    pub specialty: String,
    pub sub_specialties: Vec<String>,
    pub state_licenses: Vec<String>,
    pub primary_clinic_name: String,
    pub clinic_address: String,
    pub contact_number: String,
}

impl ProviderProfileUpdate {
    pub fn from_profile(profile: &ProviderProfile) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            full_name: text(&profile.full_name),
            professional_title: text(&profile.professional_title),
            specialty: text(&profile.specialty),
            sub_specialties: profile.sub_specialties.clone(),
            state_licenses: profile.state_licenses.clone(),
            primary_clinic_name: text(&profile.primary_clinic_name),
            clinic_address: text(&profile.clinic_address),
            contact_number: text(&profile.contact_number),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("professionalTitle", &self.professional_title),
            ("specialty", &self.specialty),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_parses_lists() {
        let json = r#"{
            "email": "doctor@sehamaroc.com",
            "fullName": "Dr. Fatima Alami",
            "specialty": "Cardiology",
            "subSpecialties": ["Echocardiography"],
            "profileComplete": true
        }"#;
        let profile: ProviderProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name(), "Dr. Fatima Alami");
        assert_eq!(profile.sub_specialties.len(), 1);
        assert!(profile.state_licenses.is_empty());
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let profile = ProviderProfile {
            email: "doc@x.ma".into(),
            ..Default::default()
        };
        assert_eq!(profile.display_name(), "doc@x.ma");
    }

    #[test]
    fn update_reports_missing_required() {
        let update = ProviderProfileUpdate {
            full_name: "Dr. Fatima Alami".into(),
            ..Default::default()
        };
        assert_eq!(update.missing_fields(), vec!["professionalTitle", "specialty"]);
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["fullName"], "Dr. Fatima Alami");
        assert!(json["subSpecialties"].as_array().unwrap().is_empty());
    }
}
