//! Medical history timeline, grouped by month.

use chrono::{Datelike, NaiveDateTime};

use crate::format::{capitalize, format_optional_date, month_key, RecordCategory};
use crate::i18n::Language;
use crate::models::medical_record::MedicalRecord;
use crate::models::Role;
use crate::portal::{PageError, Phase, Portal};
use crate::session::Storage;

use super::or_dash;

const LOAD_FAILED: &str = "Failed to load medical history";
const UNDATED: &str = "undated";

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October",
    "November", "December",
];
const FR_MONTHS: [&str; 12] = [
    "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre", "octobre",
    "novembre", "décembre",
];

/// Records sharing a `YYYY-MM` key.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub key: String,
    pub label: String,
    pub records: Vec<MedicalRecord>,
}

fn month_label(at: NaiveDateTime, lang: Language) -> String {
    let month = at.month0() as usize;
    match lang {
        Language::En => format!("{} {}", EN_MONTHS[month], at.year()),
        Language::Fr => format!("{} {}", FR_MONTHS[month], at.year()),
        Language::Ar => format!("{}/{}", at.month(), at.year()),
    }
}

/// Most recent month first; records without a date go last.
pub fn group_by_month(records: &[MedicalRecord], lang: Language) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();
    for record in records {
        let (key, label) = match record.effective_date() {
            Some(at) => (month_key(at), month_label(at, lang)),
            None => (UNDATED.to_string(), lang.text(crate::i18n::Text::NotAvailable).to_string()),
        };
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.records.push(record.clone()),
            None => groups.push(MonthGroup {
                key,
                label,
                records: vec![record.clone()],
            }),
        }
    }
    groups.sort_by(|a, b| match (a.key == UNDATED, b.key == UNDATED) {
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        _ => b.key.cmp(&a.key),
    });
    for group in &mut groups {
        group.records.sort_by(|a, b| b.effective_date().cmp(&a.effective_date()));
    }
    groups
}

#[derive(Debug)]
pub struct PatientHistory {
    pub records: Vec<MedicalRecord>,
}

impl PatientHistory {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Patient)?;
        let records = portal
            .client(&session)?
            .medical_history()
            .await
            .map_err(portal.on_error(&session, Phase::Load, LOAD_FAILED))?;
        Ok(Self { records })
    }

    pub fn groups(&self, lang: Language) -> Vec<MonthGroup> {
        group_by_month(&self.records, lang)
    }

    pub fn record(&self, record_id: &str) -> Option<&MedicalRecord> {
        self.records
            .iter()
            .find(|r| r.record_id.as_deref() == Some(record_id))
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = String::from("Medical History\n");
        if self.records.is_empty() {
            out.push_str("  No medical records yet\n");
            return out;
        }
        for group in self.groups(lang) {
            let noun = if group.records.len() == 1 { "record" } else { "records" };
            out.push_str(&format!("\n{} ({} {noun})\n", group.label, group.records.len()));
            for record in &group.records {
                out.push_str(&format!(
                    "  {} [{:?}] {} - {} | {}\n",
                    format_optional_date(record.effective_date(), lang),
                    RecordCategory::for_type(&record.record_type),
                    capitalize(&record.record_type),
                    record.diagnosis,
                    or_dash(record.provider_name.as_deref()),
                ));
            }
        }
        out
    }

    pub fn render_record(record: &MedicalRecord, lang: Language) -> String {
        let c = &record.content;
        format!(
            "{} ({})\nDate: {}\nProvider: {}\nDiagnosis: {}\nSymptoms: {}\nTreatment: {}\nMedications: {}\nNotes: {}\n",
            capitalize(&record.record_type),
            or_dash(record.record_id.as_deref()),
            format_optional_date(record.effective_date(), lang),
            or_dash(record.provider_name.as_deref()),
            record.diagnosis,
            or_dash(Some(&c.symptoms)),
            or_dash(Some(&c.treatment)),
            or_dash(Some(&c.medications)),
            or_dash(Some(&c.notes)),
        )
    }
}
