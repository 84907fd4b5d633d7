//! User role normalized at the session-ingestion boundary.
//!
//! The backends disagree on spelling (`ROLE_PATIENT`, `patient`,
//! `PROVIDER`, `provider`, ...). Every raw string is folded into
//! [`Role`] exactly once, when a login response or stored user is read.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Patient,
    Provider,
}

impl Role {
    /// Backend-canonical spelling written back to storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "ROLE_PATIENT",
            Role::Provider => "PROVIDER",
        }
    }

    /// Lowercase label for display and CLI arguments.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Provider => "provider",
        }
    }
}

impl FromStr for Role {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let upper = raw.trim().to_uppercase();
        let bare = upper.strip_prefix("ROLE_").unwrap_or(&upper);
        match bare {
            "PATIENT" => Ok(Role::Patient),
            "PROVIDER" | "DOCTOR" => Ok(Role::Provider),
            _ => Err(ModelError::UnknownRole(raw.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
