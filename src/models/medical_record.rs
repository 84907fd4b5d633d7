use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordContent {
    #[serde(default)]
    pub symptoms: String,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub notes: String,
}

/// A visit record written by a provider and read back in the patient's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    #[serde(default)]
    pub record_id: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub record_type: String,
    #[serde(default, with = "super::timestamp::option")]
    pub visit_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub content: RecordContent,
    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

impl MedicalRecord {
    /// Date the record is filed under: visit date, else creation date.
    pub fn effective_date(&self) -> Option<NaiveDateTime> {
        self.visit_date.or(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_parses_nested_content() {
        let json = r#"{
            "recordId": "REC-1",
            "patientId": "p1",
            "recordType": "CONSULTATION",
            "visitDate": "2024-12-09T11:00:00Z",
            "diagnosis": "Hypertension",
            "content": {"symptoms": "Headache", "treatment": "Rest"}
        }"#;
        let record: MedicalRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.content.symptoms, "Headache");
        assert_eq!(record.content.medications, "");
        assert_eq!(record.effective_date(), record.visit_date);
    }

    #[test]
    fn effective_date_falls_back_to_created_at() {
        let record: MedicalRecord =
            serde_json::from_str(r#"{"createdAt":"2024-11-02T08:00:00"}"#).unwrap();
        assert!(record.visit_date.is_none());
        assert_eq!(record.effective_date(), record.created_at);
    }
}
