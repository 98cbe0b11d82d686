use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrappers for the mediation aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeacherId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StudentSubjectId(pub u32);

/// Operator identity threaded through every mutating call so audit fields are
/// explicit inputs rather than ambient session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContext {
    pub operator_id: u32,
    pub role: OperatorRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatorRole {
    Admin,
    Mediator,
    Accounting,
}

/// Aggregate student status driven by the mediation ledger and contract
/// linkage. Only admin overrides set it directly; normal flows derive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentStatus {
    Leads,
    MediationOpen,
    PartiallyMediated,
    Mediated,
    SpecialistConsulting,
    ContractedCustomers,
    Suspended,
    Deleted,
    Unplaceable,
    WaitingList,
    AppointmentCall,
    FollowUp,
}

impl StudentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            StudentStatus::Leads => "Leads",
            StudentStatus::MediationOpen => "Mediation Open",
            StudentStatus::PartiallyMediated => "Partially Mediated",
            StudentStatus::Mediated => "Mediated",
            StudentStatus::SpecialistConsulting => "Specialist Consulting",
            StudentStatus::ContractedCustomers => "Contracted Customers",
            StudentStatus::Suspended => "Suspended",
            StudentStatus::Deleted => "Deleted",
            StudentStatus::Unplaceable => "Unplaceable",
            StudentStatus::WaitingList => "Waiting List",
            StudentStatus::AppointmentCall => "Appointment Call",
            StudentStatus::FollowUp => "Follow-up",
        }
    }

    /// Inverse of [`StudentStatus::label`], used by the configurable
    /// stage-completion policy.
    pub fn from_label(label: &str) -> Option<Self> {
        const ALL: [StudentStatus; 12] = [
            StudentStatus::Leads,
            StudentStatus::MediationOpen,
            StudentStatus::PartiallyMediated,
            StudentStatus::Mediated,
            StudentStatus::SpecialistConsulting,
            StudentStatus::ContractedCustomers,
            StudentStatus::Suspended,
            StudentStatus::Deleted,
            StudentStatus::Unplaceable,
            StudentStatus::WaitingList,
            StudentStatus::AppointmentCall,
            StudentStatus::FollowUp,
        ];
        ALL.into_iter().find(|status| status.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
    Diverse,
}

/// Geocoded location resolved elsewhere; absence means the record has not been
/// geocoded yet, never "infinitely far away".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Payment account details captured at contract signing and mirrored onto the
/// student record for invoicing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder: String,
    pub iban: String,
    pub bic: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub coordinates: Option<Coordinates>,
    pub level_id: u32,
    pub status: StudentStatus,
    /// Set at intake, cleared when a contract is created, restored when an
    /// engagement is cancelled.
    pub needs_engagement: bool,
    pub bank_details: Option<BankDetails>,
}

/// A (student, subject) pair requested for tutoring. Contract/engagement ids
/// stay null until a teacher is engaged under a signed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentSubject {
    pub id: StudentSubjectId,
    pub student_id: StudentId,
    pub subject_id: u32,
    pub requested_level_id: u32,
    pub contract_id: Option<u32>,
    pub engagement_id: Option<u32>,
}

impl StudentSubject {
    pub fn is_engaged(&self) -> bool {
        self.engagement_id.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeacherStatus {
    New,
    Interviewed,
    Hired,
    Inactive,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportPreference {
    Walking,
    PublicTransit,
    Car,
    OnlineOnly,
}

/// Per-subject qualification and rate a teacher offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherExpertise {
    pub subject_id: u32,
    pub level_id: u32,
    pub years_experience: u8,
    pub hourly_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub email: String,
    pub gender: Gender,
    pub coordinates: Option<Coordinates>,
    pub transport: TransportPreference,
    pub status: TeacherStatus,
    /// Self-declared maximum number of concurrent students; `None` means no
    /// declared limit.
    pub capacity: Option<u8>,
    pub expertise: Vec<TeacherExpertise>,
}

impl Teacher {
    /// Expertise row for a subject, if the teacher offers it at all.
    pub fn expertise_for(&self, subject_id: u32) -> Option<&TeacherExpertise> {
        self.expertise.iter().find(|row| row.subject_id == subject_id)
    }
}

/// Immutable mediation-stage log row. The `active` flag marks the entry that
/// represents the currently live teacher assignment for its subject; at most
/// one entry per subject carries it at any time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediationStageEntry {
    pub student_id: StudentId,
    pub subject_id: u32,
    pub mediation_type_id: u32,
    pub recorded_at: DateTime<Utc>,
    pub teacher_id: Option<TeacherId>,
    pub note: Option<String>,
    pub active: bool,
    pub created_by: u32,
}
