//! Interface language preference.

use std::fmt;
use std::str::FromStr;

use crate::models::ModelError;
use crate::session::{SessionError, Storage, LANGUAGE_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Fr,
    Ar,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
            Language::Ar => "ar",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }

    /// Stored preference, `En` when unset, unrecognized or unreadable.
    ///
    /// A corrupted store is left in place for the session layer to purge.
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Result<Self, SessionError> {
        let stored = match storage.get_item(LANGUAGE_KEY) {
            Ok(stored) => stored,
            Err(SessionError::CorruptStore(reason)) => {
                tracing::warn!(%reason, "Language preference unreadable, using default");
                None
            }
            Err(e) => return Err(e),
        };
        Ok(stored.and_then(|code| code.parse().ok()).unwrap_or_default())
    }

    pub fn save<S: Storage + ?Sized>(&self, storage: &S) -> Result<(), SessionError> {
        storage.set_item(LANGUAGE_KEY, self.code())
    }

    pub fn text(&self, key: Text) -> &'static str {
        use Text::*;
        match (self, key) {
            (Language::En, JustNow) => "Just now",
            (Language::Fr, JustNow) => "À l'instant",
            (Language::Ar, JustNow) => "الآن",
            (Language::En, HoursAgo) => "{n} hours ago",
            (Language::Fr, HoursAgo) => "il y a {n} heures",
            (Language::Ar, HoursAgo) => "منذ {n} ساعات",
            (Language::En, Yesterday) => "Yesterday",
            (Language::Fr, Yesterday) => "Hier",
            (Language::Ar, Yesterday) => "أمس",
            (Language::En, NotAvailable) => "N/A",
            (Language::Fr, NotAvailable) => "N/D",
            (Language::Ar, NotAvailable) => "غير متوفر",
        }
    }
}

/// Short labels that change with the interface language.
/// `HoursAgo` is a template with an `{n}` placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    JustNow,
    HoursAgo,
    Yesterday,
    NotAvailable,
}

impl FromStr for Language {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "fr" => Ok(Language::Fr),
            "ar" => Ok(Language::Ar),
            _ => Err(ModelError::InvalidEnum {
                field: "Language",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
