//! Demo data set loaded into a fresh mock backend.

use chrono::{NaiveDate, NaiveDateTime};

use super::state::{Account, MockData, MockPatient};
use crate::models::certificate::Certificate;
use crate::models::medical_record::{MedicalRecord, RecordContent};
use crate::models::patient::PatientProfile;
use crate::models::profile::ProviderProfile;
use crate::models::request::{PatientRequest, Priority, RequestMessage, RequestStatus};
use crate::models::{AccountStatus, CertificateStatus, Role, SenderType};

/// Password of every seeded account.
pub const DEMO_PASSWORD: &str = "password";

pub const PATIENT_ID: &str = "pat-001";
pub const PATIENT_EMAIL: &str = "patient@sehamaroc.com";
pub const NEW_PATIENT_ID: &str = "pat-002";
pub const NEW_PATIENT_EMAIL: &str = "newpatient@sehamaroc.com";
pub const PROVIDER_ID: &str = "prov-001";
pub const PROVIDER_EMAIL: &str = "doctor@sehamaroc.com";
pub const PROVIDER_NAME: &str = "Dr. Fatima Alami";

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, min, 0))
}

pub fn demo_data() -> MockData {
    let mut data = MockData::default();

    data.accounts = vec![
        Account {
            id: PATIENT_ID.into(),
            email: PATIENT_EMAIL.into(),
            password: DEMO_PASSWORD.into(),
            role: Role::Patient,
        },
        Account {
            id: NEW_PATIENT_ID.into(),
            email: NEW_PATIENT_EMAIL.into(),
            password: DEMO_PASSWORD.into(),
            role: Role::Patient,
        },
        Account {
            id: PROVIDER_ID.into(),
            email: PROVIDER_EMAIL.into(),
            password: DEMO_PASSWORD.into(),
            role: Role::Provider,
        },
    ];

    data.patients = vec![
        MockPatient {
            profile: PatientProfile {
                id: Some(PATIENT_ID.into()),
                patient_id: Some(PATIENT_ID.into()),
                email: PATIENT_EMAIL.into(),
                first_name: Some("Ahmed".into()),
                last_name: Some("Benali".into()),
                phone: Some("+212 6 12 34 56 78".into()),
                date_of_birth: Some("1985-03-15".into()),
                gender: Some("MALE".into()),
                address: Some("12 Rue Hassan II".into()),
                city: Some("Casablanca".into()),
                state: Some("Casablanca-Settat".into()),
                zip_code: Some("20000".into()),
                country: Some("Morocco".into()),
                blood_type: Some("A+".into()),
                emergency_contact: Some("Khadija Benali +212 6 98 76 54 32".into()),
                allergies: vec!["Penicillin".into()],
                chronic_diseases: vec!["Type 2 diabetes".into()],
                account_status: Some(AccountStatus::Active),
                profile_complete: true,
            },
            assigned_provider_id: Some(PROVIDER_ID.into()),
            suspension_reason: None,
            registered_at: at(2024, 9, 2, 9, 30),
        },
        MockPatient {
            profile: PatientProfile {
                id: Some(NEW_PATIENT_ID.into()),
                patient_id: Some(NEW_PATIENT_ID.into()),
                email: NEW_PATIENT_EMAIL.into(),
                country: Some("Morocco".into()),
                account_status: Some(AccountStatus::Pending),
                ..Default::default()
            },
            assigned_provider_id: None,
            suspension_reason: None,
            registered_at: at(2024, 12, 12, 16, 0),
        },
    ];

    data.providers = vec![ProviderProfile {
        id: Some(PROVIDER_ID.into()),
        email: PROVIDER_EMAIL.into(),
        full_name: Some(PROVIDER_NAME.into()),
        professional_title: Some("Cardiologist".into()),
        specialty: Some("Cardiology".into()),
        sub_specialties: vec!["Echocardiography".into()],
        state_licenses: vec!["CNOM-45821".into()],
        primary_clinic_name: Some("Clinique Al Amal".into()),
        clinic_address: Some("45 Boulevard Zerktouni, Casablanca".into()),
        contact_number: Some("+212 5 22 00 11 22".into()),
        profile_complete: true,
    }];

    data.requests = vec![
        PatientRequest {
            request_id: "REQ-001".into(),
            patient_id: Some(PATIENT_ID.into()),
            patient_email: Some(PATIENT_EMAIL.into()),
            patient_name: Some("Ahmed Benali".into()),
            request_type: Some("consultation".into()),
            priority: Some(Priority::High),
            subject: "Chest pain consultation".into(),
            description: Some("Intermittent chest pain when climbing stairs.".into()),
            preferred_date: Some("2024-12-16".into()),
            status: RequestStatus::Pending,
            target_provider_id: Some(PROVIDER_ID.into()),
            provider_id: None,
            provider_name: None,
            response_message: None,
            response_date: None,
            messages: vec![RequestMessage {
                sender_id: Some(PATIENT_ID.into()),
                sender_type: Some(SenderType::Patient),
                content: "The pain lasts a few minutes each time.".into(),
                timestamp: at(2024, 12, 13, 10, 5),
            }],
            created_at: at(2024, 12, 13, 10, 0),
            updated_at: at(2024, 12, 13, 10, 5),
        },
        PatientRequest {
            request_id: "REQ-002".into(),
            patient_id: Some(PATIENT_ID.into()),
            patient_email: Some(PATIENT_EMAIL.into()),
            patient_name: Some("Ahmed Benali".into()),
            request_type: Some("prescription".into()),
            priority: Some(Priority::Medium),
            subject: "Diabetes medication refill".into(),
            description: Some("Metformin 850mg running out next week.".into()),
            preferred_date: None,
            status: RequestStatus::InProgress,
            target_provider_id: None,
            provider_id: Some(PROVIDER_ID.into()),
            provider_name: Some(PROVIDER_NAME.into()),
            response_message: Some("Refill approved, please pick it up at the clinic.".into()),
            response_date: at(2024, 12, 11, 15, 0),
            messages: Vec::new(),
            created_at: at(2024, 12, 10, 8, 45),
            updated_at: at(2024, 12, 11, 15, 0),
        },
        PatientRequest {
            request_id: "REQ-003".into(),
            patient_id: Some(PATIENT_ID.into()),
            patient_email: Some(PATIENT_EMAIL.into()),
            patient_name: Some("Ahmed Benali".into()),
            request_type: Some("certificate".into()),
            priority: Some(Priority::Low),
            subject: "Sick leave certificate".into(),
            description: Some("Certificate for three days of rest.".into()),
            preferred_date: None,
            status: RequestStatus::Completed,
            target_provider_id: Some(PROVIDER_ID.into()),
            provider_id: Some(PROVIDER_ID.into()),
            provider_name: Some(PROVIDER_NAME.into()),
            response_message: Some("Your certificate has been issued.".into()),
            response_date: at(2024, 12, 6, 11, 0),
            messages: Vec::new(),
            created_at: at(2024, 12, 5, 9, 0),
            updated_at: at(2024, 12, 6, 11, 0),
        },
    ];

    data.certificates = vec![Certificate {
        id: Some("cert-001".into()),
        certificate_id: Some("CERT-2024-000123".into()),
        request_id: Some("REQ-003".into()),
        patient_id: Some(PATIENT_ID.into()),
        patient_name: Some("Ahmed Benali".into()),
        patient_email: Some(PATIENT_EMAIL.into()),
        provider_id: Some(PROVIDER_ID.into()),
        provider_name: Some(PROVIDER_NAME.into()),
        certificate_type: Some("MEDICAL_LEAVE".into()),
        title: "Sick leave".into(),
        content: Some("The patient requires three days of rest.".into()),
        case_treated: Some("Acute bronchitis".into()),
        issue_date: at(2024, 12, 6, 11, 0),
        expiry_date: at(2024, 12, 9, 0, 0),
        signature: Some(PROVIDER_NAME.into()),
        certificate_number: Some("CERT-2024-000123".into()),
        status: Some(CertificateStatus::Active),
    }];

    data.records = vec![
        MedicalRecord {
            record_id: Some("REC-001".into()),
            patient_id: Some(PATIENT_ID.into()),
            provider_id: Some(PROVIDER_ID.into()),
            provider_name: Some(PROVIDER_NAME.into()),
            record_type: "consultation".into(),
            visit_date: at(2024, 12, 9, 11, 0),
            diagnosis: "Stable angina, suspected".into(),
            content: RecordContent {
                symptoms: "Exertional chest pain".into(),
                treatment: "Stress test scheduled".into(),
                medications: "Aspirin 75mg".into(),
                notes: "Follow up in two weeks".into(),
            },
            created_at: at(2024, 12, 9, 11, 30),
            updated_at: at(2024, 12, 9, 11, 30),
        },
        MedicalRecord {
            record_id: Some("REC-002".into()),
            patient_id: Some(PATIENT_ID.into()),
            provider_id: Some(PROVIDER_ID.into()),
            provider_name: Some(PROVIDER_NAME.into()),
            record_type: "lab".into(),
            visit_date: at(2024, 11, 20, 8, 0),
            diagnosis: "HbA1c 7.2%".into(),
            content: RecordContent {
                symptoms: String::new(),
                treatment: "Continue metformin".into(),
                medications: "Metformin 850mg".into(),
                notes: "Fasting glucose 1.32 g/L".into(),
            },
            created_at: at(2024, 11, 20, 14, 0),
            updated_at: at(2024, 11, 20, 14, 0),
        },
    ];

    data
}
