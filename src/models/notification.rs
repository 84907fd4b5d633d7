//! Notifications.
//!
//! `/api/notifications` returns request responses rather than a dedicated
//! notification shape; [`NotificationItem::from_raw`] folds each one into
//! what the notification list shows.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::request::{Priority, RequestStatus};

const DEFAULT_MESSAGE: &str = "New response received";
const DEFAULT_PROVIDER: &str = "Healthcare Provider";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNotification {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response_message: Option<String>,
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default, rename = "type")]
    pub request_type: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default, with = "super::timestamp::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationItem {
    pub id: String,
    pub message: String,
    pub status: Option<RequestStatus>,
    pub provider_name: String,
    pub date: NaiveDateTime,
    pub read: bool,
    pub request_type: Option<String>,
    pub subject: Option<String>,
    pub priority: Option<Priority>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl NotificationItem {
    /// Build a list entry; `now` stands in for a missing timestamp.
    pub fn from_raw(raw: RawNotification, now: NaiveDateTime) -> Self {
        let message = non_empty(&raw.message)
            .or(non_empty(&raw.response_message))
            .unwrap_or(DEFAULT_MESSAGE)
            .to_string();
        let provider_name = non_empty(&raw.provider_name)
            .or(non_empty(&raw.provider_id))
            .unwrap_or(DEFAULT_PROVIDER)
            .to_string();
        Self {
            id: raw.request_id.clone().unwrap_or_default(),
            message,
            status: raw.status,
            provider_name,
            date: raw.updated_at.or(raw.created_at).unwrap_or(now),
            read: false,
            request_type: raw.request_type,
            subject: raw.subject,
            priority: raw.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn message_prefers_message_then_response() {
        let raw = RawNotification {
            message: Some("Explicit".into()),
            response_message: Some("Response".into()),
            ..Default::default()
        };
        assert_eq!(NotificationItem::from_raw(raw, now()).message, "Explicit");

        let raw = RawNotification {
            response_message: Some("Response".into()),
            ..Default::default()
        };
        assert_eq!(NotificationItem::from_raw(raw, now()).message, "Response");
    }

    #[test]
    fn empty_fields_fall_back_to_defaults() {
        let item = NotificationItem::from_raw(RawNotification::default(), now());
        assert_eq!(item.message, "New response received");
        assert_eq!(item.provider_name, "Healthcare Provider");
        assert_eq!(item.date, now());
        assert!(!item.read);
    }

    #[test]
    fn provider_falls_back_to_id_and_date_to_created() {
        let raw: RawNotification = serde_json::from_str(
            r#"{"requestId":"REQ-9","providerId":"prov-1","status":"TRAITÉ","createdAt":"2024-12-10T10:00:00"}"#,
        )
        .unwrap();
        let item = NotificationItem::from_raw(raw, now());
        assert_eq!(item.id, "REQ-9");
        assert_eq!(item.provider_name, "prov-1");
        assert_eq!(item.status, Some(RequestStatus::Completed));
        assert_eq!(crate::models::timestamp::to_wire(&item.date), "2024-12-10T10:00:00");
    }
}
