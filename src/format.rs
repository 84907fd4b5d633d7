//! Display helpers shared by the views: dates, badges, tones.

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::i18n::{Language, Text};
use crate::models::request::{Priority, RequestStatus};

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const FR_MONTHS: [&str; 12] = [
    "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.", "nov.",
    "déc.",
];

// ═══════════════════════════════════════════════════════════
// Dates
// ═══════════════════════════════════════════════════════════

/// `Jan 5, 2025` / `5 janv. 2025` / `5/1/2025`.
pub fn format_date(date: NaiveDate, lang: Language) -> String {
    let month = date.month0() as usize;
    match lang {
        Language::En => format!("{} {}, {}", EN_MONTHS[month], date.day(), date.year()),
        Language::Fr => format!("{} {} {}", date.day(), FR_MONTHS[month], date.year()),
        Language::Ar => format!("{}/{}/{}", date.day(), date.month(), date.year()),
    }
}

/// `format_date` plus `HH:MM`.
pub fn format_date_time(at: NaiveDateTime, lang: Language) -> String {
    format!("{} {}", format_date(at.date(), lang), at.format("%H:%M"))
}

pub fn format_optional_date(at: Option<NaiveDateTime>, lang: Language) -> String {
    match at {
        Some(at) => format_date(at.date(), lang),
        None => lang.text(Text::NotAvailable).to_string(),
    }
}

/// Relative label for notification timestamps.
pub fn format_relative(at: NaiveDateTime, now: NaiveDateTime, lang: Language) -> String {
    let hours = (now - at).num_hours();
    if hours < 1 {
        lang.text(Text::JustNow).to_string()
    } else if hours < 24 {
        lang.text(Text::HoursAgo).replace("{n}", &hours.to_string())
    } else if hours < 48 {
        lang.text(Text::Yesterday).to_string()
    } else {
        format_date(at.date(), lang)
    }
}

/// `YYYY-MM` grouping key for the history timeline.
pub fn month_key(at: NaiveDateTime) -> String {
    at.format("%Y-%m").to_string()
}

// ═══════════════════════════════════════════════════════════
// Badges
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBadge {
    Pending,
    InProgress,
    Completed,
    Refused,
    Default,
}

impl StatusBadge {
    pub fn for_status(status: &RequestStatus) -> Self {
        match status {
            RequestStatus::Pending => Self::Pending,
            RequestStatus::InProgress => Self::InProgress,
            RequestStatus::Completed => Self::Completed,
            RequestStatus::Refused => Self::Refused,
            RequestStatus::Other(_) => Self::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Refused => "refused",
            Self::Default => "default",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityTone {
    Critical,
    High,
    Medium,
    Low,
    Neutral,
}

impl PriorityTone {
    pub fn for_priority(priority: Option<&Priority>) -> Self {
        match priority {
            Some(Priority::Urgent) => Self::Critical,
            Some(Priority::High) => Self::High,
            Some(Priority::Medium) => Self::Medium,
            Some(Priority::Low) => Self::Low,
            Some(Priority::Other(_)) | None => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCategory {
    Consultation,
    Lab,
    Procedure,
    Vaccination,
    Prescription,
    Other,
}

impl RecordCategory {
    pub fn for_type(record_type: &str) -> Self {
        match record_type.trim().to_lowercase().as_str() {
            "consultation" => Self::Consultation,
            "lab" | "lab_result" | "laboratory" => Self::Lab,
            "procedure" => Self::Procedure,
            "vaccination" => Self::Vaccination,
            "prescription" => Self::Prescription,
            _ => Self::Other,
        }
    }
}

/// `consultation` → `Consultation`, as record types are shown.
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
