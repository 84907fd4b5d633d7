//! Provider responses to the patient's requests.
//!
//! Read state lives only in this view; the backend has no endpoint for it.

use chrono::NaiveDateTime;

use crate::format::{format_relative, StatusBadge};
use crate::i18n::Language;
use crate::models::notification::NotificationItem;
use crate::models::Role;
use crate::portal::{PageError, Phase, Portal};
use crate::session::Storage;

const LOAD_FAILED: &str = "Failed to load notifications";

#[derive(Debug)]
pub struct PatientNotifications {
    pub items: Vec<NotificationItem>,
    loaded_at: NaiveDateTime,
}

impl PatientNotifications {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Patient)?;
        let raw = portal
            .client(&session)?
            .notifications()
            .await
            .map_err(portal.on_error(&session, Phase::Load, LOAD_FAILED))?;
        let loaded_at = portal.now();
        let items = raw
            .into_iter()
            .enumerate()
            .map(|(i, raw)| {
                let mut item = NotificationItem::from_raw(raw, loaded_at);
                if item.id.is_empty() {
                    item.id = format!("notification-{i}");
                }
                item
            })
            .collect();
        Ok(Self { items, loaded_at })
    }

    /// Returns `false` when no item has that id.
    pub fn mark_as_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(item) => {
                item.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_as_read(&mut self) {
        for item in &mut self.items {
            item.read = true;
        }
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = format!("Notifications ({} unread)\n", self.unread_count());
        if self.items.is_empty() {
            out.push_str("  No notifications yet\n");
        }
        for item in &self.items {
            let marker = if item.read { ' ' } else { '*' };
            let badge = item
                .status
                .as_ref()
                .map(|s| StatusBadge::for_status(s).as_str())
                .unwrap_or("default");
            out.push_str(&format!(
                "{marker} {} [{badge}] {} - {}\n",
                format_relative(item.date, self.loaded_at, lang),
                item.provider_name,
                item.subject.as_deref().unwrap_or(&item.id),
            ));
            out.push_str(&format!("    {}\n", item.message));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed, MockServer};
    use crate::portal::test_support::logged_in;

    #[tokio::test]
    async fn responses_arrive_unread_and_can_be_marked() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let mut view = PatientNotifications::mount(&portal).await.unwrap();

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.unread_count(), 2);
        assert_eq!(view.items[0].id, "REQ-002");
        assert_eq!(view.items[0].provider_name, seed::PROVIDER_NAME);

        assert!(view.mark_as_read("REQ-002"));
        assert!(!view.mark_as_read("REQ-404"));
        assert_eq!(view.unread_count(), 1);
        view.mark_all_as_read();
        assert_eq!(view.unread_count(), 0);
        assert!(view.render(Language::En).starts_with("Notifications (0 unread)"));
        server.shutdown();
    }

    #[tokio::test]
    async fn read_state_is_not_persisted() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let mut view = PatientNotifications::mount(&portal).await.unwrap();
        view.mark_all_as_read();
        let reloaded = PatientNotifications::mount(&portal).await.unwrap();
        assert_eq!(reloaded.unread_count(), 2);
        server.shutdown();
    }

    #[tokio::test]
    async fn server_error_uses_fallback() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        server.force_status(500).unwrap();
        let err = PatientNotifications::mount(&portal).await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, LOAD_FAILED);
        server.shutdown();
    }
}
