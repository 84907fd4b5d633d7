//! Medical certificates issued by providers.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::CertificateStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub certificate_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub patient_email: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default, rename = "type")]
    pub certificate_type: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub case_treated: Option<String>,
    #[serde(default, with = "super::timestamp::option")]
    pub issue_date: Option<NaiveDateTime>,
    #[serde(default, with = "super::timestamp::option")]
    pub expiry_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub signature: Option<String>,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub status: Option<CertificateStatus>,
}

impl Certificate {
    /// Identifier used in `/api/certificates/{id}` paths.
    ///
    /// The document id wins over the business `certificateId`.
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().or(self.certificate_id.as_deref())
    }
}

/// Body of `POST /api/certificates`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCertificate {
    pub patient_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(rename = "type")]
    pub certificate_type: String,
    pub title: String,
    pub case_treated: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    pub signature: String,
    pub certificate_number: String,
}

impl NewCertificate {
    /// `CERT-<year>-<6 digits>` from a seed, as the issuing form does.
    pub fn number_for(year: i32, seed: u32) -> String {
        format!("CERT-{year}-{:06}", seed % 1_000_000)
    }
}
