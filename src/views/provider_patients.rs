//! Patient management: assignment and account status.

use crate::client::providers::PatientScope;
use crate::i18n::Language;
use crate::models::patient::PatientSummary;
use crate::models::Role;
use crate::portal::{Notice, PageError, Phase, Portal, SubmitFlag};
use crate::session::{Session, Storage};

use super::{or_dash, push_notices};

const LOAD_FAILED: &str = "Failed to load patients";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatientAction {
    Assign,
    Unassign,
    Activate,
    /// Blank reasons fall back to the client default.
    Suspend(String),
}

impl PatientAction {
    fn success(&self) -> &'static str {
        match self {
            PatientAction::Assign => "Patient assigned successfully",
            PatientAction::Unassign => "Patient unassigned successfully",
            PatientAction::Activate => "Patient activated successfully",
            PatientAction::Suspend(_) => "Patient suspended successfully",
        }
    }

    fn failure(&self) -> &'static str {
        match self {
            PatientAction::Assign => "Failed to assign patient",
            PatientAction::Unassign => "Failed to unassign patient",
            PatientAction::Activate => "Failed to activate patient",
            PatientAction::Suspend(_) => "Failed to suspend patient",
        }
    }
}

#[derive(Debug)]
pub struct ProviderPatients {
    session: Session,
    pub all: Vec<PatientSummary>,
    pub assigned: Vec<PatientSummary>,
    pub unassigned: Vec<PatientSummary>,
    pub tab: PatientScope,
    pub search: String,
    pub notices: Vec<Notice>,
    submit: SubmitFlag,
}

impl ProviderPatients {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Provider)?;
        let mut view = Self {
            session,
            all: Vec::new(),
            assigned: Vec::new(),
            unassigned: Vec::new(),
            tab: PatientScope::All,
            search: String::new(),
            notices: Vec::new(),
            submit: SubmitFlag::default(),
        };
        view.refresh(portal).await?;
        Ok(view)
    }

    /// Reload the three lists in parallel. A failed list keeps its
    /// previous contents and adds a notice.
    pub async fn refresh<S: Storage>(&mut self, portal: &Portal<S>) -> Result<(), PageError> {
        let client = portal.client(&self.session)?;
        let (all, assigned, unassigned) = tokio::join!(
            client.patients(PatientScope::All),
            client.patients(PatientScope::Assigned),
            client.patients(PatientScope::Unassigned),
        );
        let mut notices = Vec::new();
        if let Some(all) = portal.partial(&self.session, LOAD_FAILED, all, &mut notices)? {
            self.all = all;
        }
        if let Some(assigned) = portal.partial(&self.session, LOAD_FAILED, assigned, &mut notices)? {
            self.assigned = assigned;
        }
        if let Some(unassigned) = portal.partial(&self.session, LOAD_FAILED, unassigned, &mut notices)? {
            self.unassigned = unassigned;
        }
        self.notices = notices;
        Ok(())
    }

    /// Current tab, narrowed by the search box (name or email).
    pub fn visible(&self) -> Vec<&PatientSummary> {
        let list = match self.tab {
            PatientScope::All => &self.all,
            PatientScope::Assigned => &self.assigned,
            PatientScope::Unassigned => &self.unassigned,
        };
        let needle = self.search.trim().to_lowercase();
        list.iter()
            .filter(|p| {
                needle.is_empty()
                    || p.display_name().to_lowercase().contains(&needle)
                    || p.email.to_lowercase().contains(&needle)
            })
            .collect()
    }

    pub fn patient(&self, patient_id: &str) -> Option<&PatientSummary> {
        self.all.iter().find(|p| p.id == patient_id)
    }

    pub fn is_submitting(&self) -> bool {
        self.submit.is_submitting()
    }

    /// Run `action` without refetching.
    pub async fn send<S: Storage>(
        &self,
        portal: &Portal<S>,
        patient_id: &str,
        action: &PatientAction,
    ) -> Result<Notice, PageError> {
        let _busy = self.submit.begin()?;
        let client = portal.client(&self.session)?;
        let result = match action {
            PatientAction::Assign => client.assign_patient(patient_id).await,
            PatientAction::Unassign => client.unassign_patient(patient_id).await,
            PatientAction::Activate => client.activate_patient(patient_id).await,
            PatientAction::Suspend(reason) => client.suspend_patient(patient_id, reason).await,
        };
        result.map_err(portal.on_error(&self.session, Phase::Submit, action.failure()))?;
        tracing::info!(patient_id, action = ?action, "Patient action applied");
        Ok(Notice::success("Success", action.success()))
    }

    /// Run `action`, then reload every list.
    pub async fn apply<S: Storage>(
        &mut self,
        portal: &Portal<S>,
        patient_id: &str,
        action: PatientAction,
    ) -> Result<Notice, PageError> {
        let notice = self.send(portal, patient_id, &action).await?;
        self.refresh(portal).await?;
        Ok(notice)
    }

    pub fn render(&self, _lang: Language) -> String {
        let mut out = format!(
            "Patients: {} total, {} assigned, {} unassigned\n",
            self.all.len(),
            self.assigned.len(),
            self.unassigned.len()
        );
        push_notices(&mut out, &self.notices);
        let visible = self.visible();
        if visible.is_empty() {
            out.push_str("  No patients found\n");
        }
        for p in visible {
            let status = p.account_status.map(|s| s.as_str()).unwrap_or("PENDING");
            let assigned = if p.assigned_provider_id.is_some() { "assigned" } else { "unassigned" };
            out.push_str(&format!(
                "  {} {} <{}> {status} {assigned} | {} | {}\n",
                p.id,
                p.display_name(),
                p.email,
                or_dash(p.phone.as_deref()),
                or_dash(p.city.as_deref()),
            ));
            if let Some(reason) = p.suspension_reason.as_deref() {
                out.push_str(&format!("      suspended: {reason}\n"));
            }
        }
        out
    }
}
