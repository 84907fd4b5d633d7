//! Medical records authored by the provider.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::client::providers::PatientScope;
use crate::format::{capitalize, format_optional_date, RecordCategory};
use crate::i18n::Language;
use crate::models::medical_record::{MedicalRecord, RecordContent};
use crate::models::patient::PatientSummary;
use crate::models::Role;
use crate::portal::{require_fields, Notice, PageError, Phase, Portal, SubmitFlag};
use crate::session::{Session, Storage};

use super::push_notices;

const LOAD_FAILED: &str = "Failed to load data";
const DETAIL_FAILED: &str = "Failed to load record details";
const CREATE_FAILED: &str = "Failed to create record";
const UPDATE_FAILED: &str = "Failed to update record";
const DELETE_FAILED: &str = "Failed to delete record";

/// Record form. Empty content sections are sent as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub patient_id: String,
    pub record_type: String,
    pub visit_date: Option<NaiveDate>,
    /// Midnight when left blank.
    pub visit_time: Option<NaiveTime>,
    pub diagnosis: String,
    pub symptoms: String,
    pub treatment: String,
    pub medications: String,
    pub notes: String,
}

impl RecordDraft {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            record_type: "consultation".into(),
            visit_date: None,
            visit_time: None,
            diagnosis: String::new(),
            symptoms: String::new(),
            treatment: String::new(),
            medications: String::new(),
            notes: String::new(),
        }
    }

    /// Edit form for an existing record.
    pub fn from_record(record: &MedicalRecord) -> Self {
        let visit = record.visit_date;
        Self {
            patient_id: record.patient_id.clone().unwrap_or_default(),
            record_type: record.record_type.clone(),
            visit_date: visit.map(|v| v.date()),
            visit_time: visit.map(|v| v.time()),
            diagnosis: record.diagnosis.clone(),
            symptoms: record.content.symptoms.clone(),
            treatment: record.content.treatment.clone(),
            medications: record.content.medications.clone(),
            notes: record.content.notes.clone(),
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.patient_id.trim().is_empty() {
            missing.push("patientId");
        }
        if self.record_type.trim().is_empty() {
            missing.push("recordType");
        }
        if self.visit_date.is_none() {
            missing.push("visitDate");
        }
        if self.diagnosis.trim().is_empty() {
            missing.push("diagnosis");
        }
        missing
    }

    fn visit(&self) -> Option<NaiveDateTime> {
        self.visit_date
            .map(|d| d.and_time(self.visit_time.unwrap_or(NaiveTime::MIN)))
    }

    /// Body for create (`existing = None`) or update.
    pub fn to_record(&self, existing: Option<&MedicalRecord>) -> MedicalRecord {
        MedicalRecord {
            record_id: existing.and_then(|r| r.record_id.clone()),
            patient_id: Some(self.patient_id.trim().to_string()),
            provider_id: existing.and_then(|r| r.provider_id.clone()),
            provider_name: existing.and_then(|r| r.provider_name.clone()),
            record_type: self.record_type.trim().to_string(),
            visit_date: self.visit(),
            diagnosis: self.diagnosis.trim().to_string(),
            content: RecordContent {
                symptoms: self.symptoms.trim().to_string(),
                treatment: self.treatment.trim().to_string(),
                medications: self.medications.trim().to_string(),
                notes: self.notes.trim().to_string(),
            },
            created_at: existing.and_then(|r| r.created_at),
            updated_at: None,
        }
    }
}

#[derive(Debug)]
pub struct ProviderRecords {
    session: Session,
    pub patients: Vec<PatientSummary>,
    pub records: Vec<MedicalRecord>,
    pub search: String,
    pub notices: Vec<Notice>,
    submit: SubmitFlag,
}

impl ProviderRecords {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Provider)?;
        let mut view = Self {
            session,
            patients: Vec::new(),
            records: Vec::new(),
            search: String::new(),
            notices: Vec::new(),
            submit: SubmitFlag::default(),
        };
        view.refresh(portal).await?;
        Ok(view)
    }

    pub async fn refresh<S: Storage>(&mut self, portal: &Portal<S>) -> Result<(), PageError> {
        let client = portal.client(&self.session)?;
        let (patients, records) = tokio::join!(client.patients(PatientScope::Assigned), client.list_records());
        let mut notices = Vec::new();
        if let Some(patients) = portal.partial(&self.session, LOAD_FAILED, patients, &mut notices)? {
            self.patients = patients;
        }
        if let Some(records) = portal.partial(&self.session, LOAD_FAILED, records, &mut notices)? {
            self.records = records;
        }
        self.notices = notices;
        Ok(())
    }

    fn patient_of(&self, record: &MedicalRecord) -> Option<&PatientSummary> {
        let id = record.patient_id.as_deref()?;
        self.patients.iter().find(|p| p.id == id)
    }

    /// Search over patient name and email, diagnosis and record type.
    pub fn visible(&self) -> Vec<&MedicalRecord> {
        let needle = self.search.trim().to_lowercase();
        self.records
            .iter()
            .filter(|r| {
                if needle.is_empty() {
                    return true;
                }
                let patient_hit = self.patient_of(r).is_some_and(|p| {
                    p.display_name().to_lowercase().contains(&needle) || p.email.to_lowercase().contains(&needle)
                });
                patient_hit
                    || r.diagnosis.to_lowercase().contains(&needle)
                    || r.record_type.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub async fn detail<S: Storage>(&self, portal: &Portal<S>, record_id: &str) -> Result<MedicalRecord, PageError> {
        portal
            .client(&self.session)?
            .get_record(record_id)
            .await
            .map_err(portal.on_error(&self.session, Phase::Load, DETAIL_FAILED))
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    pub async fn create<S: Storage>(&mut self, portal: &Portal<S>, draft: &RecordDraft) -> Result<Notice, PageError> {
        require_fields(draft.missing_fields())?;
        {
            let _busy = self.submit.begin()?;
            let created = portal
                .client(&self.session)?
                .create_record(&draft.to_record(None))
                .await
                .map_err(portal.on_error(&self.session, Phase::Submit, CREATE_FAILED))?;
            tracing::info!(record_id = ?created.record_id, "Medical record created");
        }
        self.refresh(portal).await?;
        Ok(Notice::success("Success", "Medical record created successfully"))
    }

    pub async fn update<S: Storage>(
        &mut self,
        portal: &Portal<S>,
        record_id: &str,
        draft: &RecordDraft,
    ) -> Result<Notice, PageError> {
        require_fields(draft.missing_fields())?;
        {
            let _busy = self.submit.begin()?;
            let existing = self
                .records
                .iter()
                .find(|r| r.record_id.as_deref() == Some(record_id))
                .cloned();
            let mut body = draft.to_record(existing.as_ref());
            body.record_id = Some(record_id.to_string());
            portal
                .client(&self.session)?
                .update_record(record_id, &body)
                .await
                .map_err(portal.on_error(&self.session, Phase::Submit, UPDATE_FAILED))?;
        }
        self.refresh(portal).await?;
        Ok(Notice::success("Success", "Medical record updated successfully"))
    }

    pub async fn delete<S: Storage>(&mut self, portal: &Portal<S>, record_id: &str) -> Result<Notice, PageError> {
        {
            let _busy = self.submit.begin()?;
            portal
                .client(&self.session)?
                .delete_record(record_id)
                .await
                .map_err(portal.on_error(&self.session, Phase::Submit, DELETE_FAILED))?;
            tracing::info!(record_id, "Medical record deleted");
        }
        self.refresh(portal).await?;
        Ok(Notice::success("Success", "Record deleted successfully"))
    }

    pub fn render(&self, lang: Language) -> String {
        let visible = self.visible();
        let mut out = format!("Medical Records ({})\n", visible.len());
        push_notices(&mut out, &self.notices);
        if visible.is_empty() {
            out.push_str("  No records found\n");
        }
        for record in visible {
            let patient = self
                .patient_of(record)
                .map(PatientSummary::display_name)
                .or_else(|| record.patient_id.clone())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!(
                "  {} {} [{:?}] {} | {} | {}\n",
                record.record_id.as_deref().unwrap_or("-"),
                format_optional_date(record.effective_date(), lang),
                RecordCategory::for_type(&record.record_type),
                capitalize(&record.record_type),
                patient,
                record.diagnosis,
            ));
        }
        out
    }
}
