//! Lenient timestamp handling.
//!
//! The services emit Java `LocalDateTime` strings without an offset
//! (`2024-12-13T10:00:00`), while other call sites produce RFC 3339
//! (`2024-12-13T10:00:00.000Z`). Both are accepted and normalized to a
//! UTC `NaiveDateTime`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse any timestamp spelling the backends produce.
pub fn parse(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Format in the backend's `LocalDateTime` spelling.
pub fn to_wire(dt: &NaiveDateTime) -> String {
    dt.format(WIRE_FORMAT).to_string()
}

/// Serde adapter for `Option<NaiveDateTime>` fields.
pub mod option {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&super::to_wire(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_date_time() {
        let dt = parse("2024-12-13T10:00:00").unwrap();
        assert_eq!(to_wire(&dt), "2024-12-13T10:00:00");
    }

    #[test]
    fn parses_rfc3339_as_utc() {
        let dt = parse("2024-12-13T12:00:00+02:00").unwrap();
        assert_eq!(to_wire(&dt), "2024-12-13T10:00:00");
        let z = parse("2024-12-13T10:00:00.000Z").unwrap();
        assert_eq!(to_wire(&z), "2024-12-13T10:00:00");
    }

    #[test]
    fn parses_fractional_and_date_only() {
        assert!(parse("2024-12-13T10:00:00.123456").is_some());
        assert_eq!(to_wire(&parse("2024-12-13").unwrap()), "2024-12-13T00:00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("   ").is_none());
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Holder {
        #[serde(default, with = "super::option")]
        at: Option<NaiveDateTime>,
    }

    #[test]
    fn option_adapter_handles_null_and_empty() {
        let h: Holder = serde_json::from_str(r#"{"at":null}"#).unwrap();
        assert!(h.at.is_none());
        let h: Holder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(h.at.is_none());
        let h: Holder = serde_json::from_str(r#"{"at":""}"#).unwrap();
        assert!(h.at.is_none());
        let h: Holder = serde_json::from_str(r#"{"at":"2024-12-09T11:00:00Z"}"#).unwrap();
        assert_eq!(serde_json::to_string(&h).unwrap(), r#"{"at":"2024-12-09T11:00:00"}"#);
    }
}
