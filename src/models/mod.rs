//! Wire models for the SehaMaroc backend services.
//!
//! Field names follow the backend's camelCase JSON. Enumerations are
//! parsed leniently at this boundary so the rest of the crate only sees
//! normalized values.

pub mod auth;
pub mod certificate;
pub mod enums;
pub mod medical_record;
pub mod notification;
pub mod patient;
pub mod profile;
pub mod request;
pub mod role;
pub mod timestamp;

pub use enums::{AccountStatus, CertificateStatus, SenderType};
pub use role::Role;

/// Errors raised while normalizing wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid {field} value: {value:?}")]
    InvalidEnum { field: &'static str, value: String },
    #[error("Unknown role: {0:?}")]
    UnknownRole(String),
}
