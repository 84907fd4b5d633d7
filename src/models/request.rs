//! Consultation requests and their message threads.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::SenderType;

// ═══════════════════════════════════════════════════════════
// Status & priority
// ═══════════════════════════════════════════════════════════

/// Request lifecycle: pending → in progress → completed (or refused).
///
/// The request service writes French values (`EN_ATTENTE`, `TRAITÉ`),
/// older payloads use English ones. Unknown values are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Refused,
    Other(String),
}

impl RequestStatus {
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase().replace(['-', ' '], "_");
        match upper.as_str() {
            "EN_ATTENTE" | "PENDING" => Self::Pending,
            "EN_COURS" | "IN_PROGRESS" => Self::InProgress,
            "TRAITÉ" | "TRAITE" | "TERMINE" | "TERMINÉ" | "COMPLETED" => Self::Completed,
            "REFUSÉ" | "REFUSE" | "REFUSED" => Self::Refused,
            _ => Self::Other(raw.to_string()),
        }
    }

    /// Value the request service expects on writes.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Pending => "EN_ATTENTE",
            Self::InProgress => "EN_COURS",
            Self::Completed => "TRAITÉ",
            Self::Refused => "REFUSÉ",
            Self::Other(s) => s,
        }
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed | Self::Refused)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Refused => "REFUSED",
            Self::Other(s) => s,
        };
        f.write_str(label)
    }
}

impl Serialize for RequestStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for RequestStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::parse(&String::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
    Other(String),
}

impl Priority {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "URGENT" | "URG" => Self::Urgent,
            "HIGH" | "HAUTE" => Self::High,
            "MEDIUM" | "MED" | "MOYENNE" => Self::Medium,
            "LOW" | "BASSE" => Self::Low,
            _ => Self::Other(raw.to_string()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            Self::Urgent => "URGENT",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Other(s) => s,
        }
    }

    /// Urgent and high requests surface on the provider dashboard.
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Urgent | Self::High)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self::parse(&String::deserialize(deserializer)?))
    }
}

// ═══════════════════════════════════════════════════════════
// Request
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMessage {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub sender_type: Option<SenderType>,
    pub content: String,
    #[serde(default, with = "super::timestamp::option")]
    pub timestamp: Option<NaiveDateTime>,
}

/// A patient request as returned by the request service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientRequest {
    pub request_id: String,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_email: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default, rename = "type")]
    pub request_type: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preferred_date: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub target_provider_id: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default, with = "super::timestamp::option")]
    pub response_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub messages: Vec<RequestMessage>,
    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

/// Body of `POST /api/requests` (patient side).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequest {
    #[serde(rename = "type")]
    pub request_type: String,
    pub priority: String,
    pub subject: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<String>,
    /// `None` means "any available doctor".
    pub target_provider_id: Option<String>,
}

/// Body of `PUT /api/requests/{id}/respond`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondPayload {
    pub status: RequestStatus,
    pub response_message: String,
}

/// Body of `POST /api/requests/{id}/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_aliases_normalize() {
        assert_eq!(RequestStatus::parse("EN_ATTENTE"), RequestStatus::Pending);
        assert_eq!(RequestStatus::parse("pending"), RequestStatus::Pending);
        assert_eq!(RequestStatus::parse("in_progress"), RequestStatus::InProgress);
        assert_eq!(RequestStatus::parse("in-progress"), RequestStatus::InProgress);
        assert_eq!(RequestStatus::parse("TRAITÉ"), RequestStatus::Completed);
        assert_eq!(RequestStatus::parse("termine"), RequestStatus::Completed);
        assert_eq!(RequestStatus::parse("REFUSÉ"), RequestStatus::Refused);
        assert_eq!(
            RequestStatus::parse("ARCHIVED"),
            RequestStatus::Other("ARCHIVED".into())
        );
    }

    #[test]
    fn completed_serializes_as_traite() {
        let payload = RespondPayload {
            status: RequestStatus::Completed,
            response_message: "Votre demande a été acceptée.".into(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["status"], "TRAITÉ");
        assert_eq!(json["responseMessage"], "Votre demande a été acceptée.");
    }

    #[test]
    fn priority_aliases_normalize() {
        assert_eq!(Priority::parse("urg"), Priority::Urgent);
        assert_eq!(Priority::parse("High"), Priority::High);
        assert_eq!(Priority::parse("med"), Priority::Medium);
        assert!(Priority::High.needs_attention());
        assert!(!Priority::Low.needs_attention());
    }

    #[test]
    fn request_parses_backend_payload() {
        let json = r#"{
            "requestId": "REQ-1",
            "patientId": "p1",
            "patientName": "Ahmed Benali",
            "type": "consultation",
            "priority": "high",
            "subject": "Chest pain consultation",
            "status": "EN_ATTENTE",
            "messages": [
                {"senderId": "p1", "senderType": "PATIENT", "content": "Hello", "timestamp": "2024-12-13T10:05:00"}
            ],
            "createdAt": "2024-12-13T10:00:00Z"
        }"#;
        let req: PatientRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.status, RequestStatus::Pending);
        assert_eq!(req.priority, Some(Priority::High));
        assert_eq!(req.messages[0].sender_type, Some(SenderType::Patient));
        assert!(req.created_at.is_some());
        assert!(req.status.is_open());
    }

    #[test]
    fn new_request_keeps_null_target_provider() {
        let req = NewRequest {
            request_type: "consultation".into(),
            priority: "LOW".into(),
            subject: "Checkup".into(),
            description: "Annual".into(),
            preferred_date: None,
            target_provider_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json["targetProviderId"].is_null());
        assert!(json.get("preferredDate").is_none());
        assert_eq!(json["type"], "consultation");
    }
}
