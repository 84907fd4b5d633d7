//! Certificates issued to the patient.

use crate::format::format_optional_date;
use crate::i18n::Language;
use crate::models::certificate::Certificate;
use crate::models::Role;
use crate::portal::{PageError, Phase, Portal};
use crate::session::{Session, Storage};

use super::or_dash;

const LOAD_FAILED: &str = "Failed to load certificates";
const DETAIL_FAILED: &str = "Failed to load certificate";
pub(crate) const PRINT_FAILED: &str = "Failed to print certificate";

#[derive(Debug)]
pub struct PatientCertificates {
    session: Session,
    pub certificates: Vec<Certificate>,
}

impl PatientCertificates {
    pub async fn mount<S: Storage>(portal: &Portal<S>) -> Result<Self, PageError> {
        let session = portal.guard(Role::Patient)?;
        let certificates = portal
            .client(&session)?
            .list_certificates()
            .await
            .map_err(portal.on_error(&session, Phase::Load, LOAD_FAILED))?;
        Ok(Self { session, certificates })
    }

    pub async fn detail<S: Storage>(&self, portal: &Portal<S>, id: &str) -> Result<Certificate, PageError> {
        portal
            .client(&self.session)?
            .get_certificate(id)
            .await
            .map_err(portal.on_error(&self.session, Phase::Load, DETAIL_FAILED))
    }

    /// PDF bytes of the printable certificate.
    pub async fn print<S: Storage>(&self, portal: &Portal<S>, id: &str) -> Result<Vec<u8>, PageError> {
        let pdf = portal
            .client(&self.session)?
            .print_certificate(id)
            .await
            .map_err(portal.on_error(&self.session, Phase::Submit, PRINT_FAILED))?;
        tracing::info!(certificate = id, bytes = pdf.len(), "Certificate printed");
        Ok(pdf)
    }

    pub fn render(&self, lang: Language) -> String {
        let mut out = format!("My Certificates ({})\n", self.certificates.len());
        if self.certificates.is_empty() {
            out.push_str("  No certificates yet\n");
        }
        for cert in &self.certificates {
            out.push_str(&render_row(cert, lang));
        }
        out
    }
}

pub(crate) fn render_row(cert: &Certificate, lang: Language) -> String {
    format!(
        "  {} {} | {} | {} | {}\n",
        or_dash(cert.key()),
        cert.title,
        or_dash(cert.patient_name.as_deref()),
        or_dash(cert.provider_name.as_deref()),
        format_optional_date(cert.issue_date, lang),
    )
}

/// Full certificate as shown in the detail dialog.
pub fn render_certificate(cert: &Certificate, lang: Language) -> String {
    let status = cert.status.map(|s| s.as_str());
    let rows = [
        ("Number", cert.certificate_number.as_deref().or(cert.certificate_id.as_deref())),
        ("Type", cert.certificate_type.as_deref()),
        ("Patient", cert.patient_name.as_deref()),
        ("Provider", cert.provider_name.as_deref()),
        ("Case treated", cert.case_treated.as_deref()),
        ("Status", status),
    ];
    let mut out = format!("{}\n", cert.title);
    for (label, value) in rows {
        out.push_str(&format!("  {label}: {}\n", or_dash(value)));
    }
    out.push_str(&format!("  Issued: {}\n", format_optional_date(cert.issue_date, lang)));
    out.push_str(&format!("  Expires: {}\n", format_optional_date(cert.expiry_date, lang)));
    out.push_str(&format!("\n{}\n", or_dash(cert.content.as_deref())));
    if let Some(signature) = cert.signature.as_deref() {
        out.push_str(&format!("\nSigned: {signature}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{seed, MockServer};
    use crate::portal::test_support::logged_in;

    #[tokio::test]
    async fn lists_detail_and_print() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::PATIENT_EMAIL, Role::Patient).await;
        let view = PatientCertificates::mount(&portal).await.unwrap();
        assert_eq!(view.certificates.len(), 1);

        let cert = view.detail(&portal, "cert-001").await.unwrap();
        let text = render_certificate(&cert, Language::En);
        assert!(text.contains("Number: CERT-2024-000123"));
        assert!(text.contains("Issued: Dec 6, 2024"));

        let pdf = view.print(&portal, "cert-001").await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        server.shutdown();
    }

    #[tokio::test]
    async fn other_patient_sees_nothing() {
        let server = MockServer::start().await.unwrap();
        let portal = logged_in(&server, seed::NEW_PATIENT_EMAIL, Role::Patient).await;
        let view = PatientCertificates::mount(&portal).await.unwrap();
        assert!(view.certificates.is_empty());
        let err = view.detail(&portal, "cert-001").await.unwrap_err();
        assert_eq!(err.notice().unwrap().description, DETAIL_FAILED);
        assert!(view.render(Language::En).contains("No certificates yet"));
        server.shutdown();
    }
}
