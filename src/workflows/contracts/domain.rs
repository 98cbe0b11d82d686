use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::mediation::domain::{BankDetails, StudentId, StudentSubjectId, TeacherId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EngagementId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    MonthlyInvoice,
    Prepaid,
    DirectDebit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    PendingSignature,
    Active,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementStatus {
    Active,
    Inactive,
}

/// Commercial terms fixed at contract creation. `minimum_lessons` and
/// `charge_minimum_lessons` feed the invoicing floor rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractTerms {
    pub payment_mode: PaymentMode,
    pub lesson_duration_minutes: u16,
    pub minimum_lessons: u32,
    pub charge_minimum_lessons: bool,
    pub registration_fee: f64,
    pub student_rate: f64,
    /// Skip the signature round-trip and activate the contract immediately.
    pub bypass_signature: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub student_id: StudentId,
    pub terms: ContractTerms,
    pub status: ContractStatus,
    pub created_at: DateTime<Utc>,
    pub signed_at: Option<DateTime<Utc>>,
    /// Reference returned by the signature store, if the artifact was
    /// persisted successfully.
    pub signature_url: Option<String>,
    pub bank_details: Option<BankDetails>,
    pub created_by: u32,
}

/// Binds (contract, student-subject, teacher) with the teacher's per-lesson
/// rate. A StudentSubject points at most one Active engagement at a time;
/// cancellation resets the subject, contract deletion flips the engagement to
/// Inactive for historical retention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractEngagement {
    pub id: EngagementId,
    pub contract_id: ContractId,
    pub student_subject_id: StudentSubjectId,
    pub teacher_id: TeacherId,
    pub teacher_rate: f64,
    pub status: EngagementStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: u32,
}

/// Result of contract creation. `warning` carries a collaborator failure
/// (notification dispatch) that deliberately did not abort the mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateContractOutcome {
    pub contract: Contract,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignContractOutcome {
    pub contract: Contract,
    pub warning: Option<String>,
}
