use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::workflows::mediation::domain::{
    BankDetails, OperatorContext, StudentId, StudentStatus, StudentSubjectId, TeacherId,
};
use crate::workflows::mediation::repository::{
    LedgerRepository, StoreError, StudentRepository, TeacherRepository,
};

use super::domain::{
    Contract, ContractEngagement, ContractId, ContractStatus, ContractTerms,
    CreateContractOutcome, EngagementId, EngagementStatus, SignContractOutcome,
};
use super::repository::{
    ContractRepository, NotificationDispatcher, NotificationKind, SignatureStore,
};

/// Error raised by the contract/engagement manager.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("subject already has an active engagement")]
    Conflict,
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

static CONTRACT_SEQUENCE: AtomicU32 = AtomicU32::new(1);
static ENGAGEMENT_SEQUENCE: AtomicU32 = AtomicU32::new(1);

fn next_contract_id() -> ContractId {
    ContractId(CONTRACT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

fn next_engagement_id() -> EngagementId {
    EngagementId(ENGAGEMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Service owning the contract lifecycle and the per-subject engagement
/// bookkeeping that must stay consistent with the mediation ledger.
pub struct ContractService<R, S, T, L, N, G> {
    contracts: Arc<R>,
    students: Arc<S>,
    teachers: Arc<T>,
    ledger: Arc<L>,
    notifications: Arc<N>,
    signatures: Arc<G>,
}

impl<R, S, T, L, N, G> ContractService<R, S, T, L, N, G>
where
    R: ContractRepository + 'static,
    S: StudentRepository + 'static,
    T: TeacherRepository + 'static,
    L: LedgerRepository + 'static,
    N: NotificationDispatcher + 'static,
    G: SignatureStore + 'static,
{
    pub fn new(
        contracts: Arc<R>,
        students: Arc<S>,
        teachers: Arc<T>,
        ledger: Arc<L>,
        notifications: Arc<N>,
        signatures: Arc<G>,
    ) -> Self {
        Self {
            contracts,
            students,
            teachers,
            ledger,
            notifications,
            signatures,
        }
    }

    /// Create a contract for a student. Without `bypass_signature` the
    /// contract starts in `PendingSignature` and a signature-request
    /// notification goes out; dispatch failure is returned as a warning, never
    /// rolled back.
    pub fn create_contract(
        &self,
        ctx: &OperatorContext,
        student_id: StudentId,
        terms: ContractTerms,
    ) -> Result<CreateContractOutcome, ContractError> {
        if terms.student_rate <= 0.0 || !terms.student_rate.is_finite() {
            return Err(ContractError::Validation(
                "student rate must be a positive amount".to_string(),
            ));
        }
        self.students
            .fetch_student(student_id)?
            .ok_or(StoreError::NotFound)?;

        let status = if terms.bypass_signature {
            ContractStatus::Active
        } else {
            ContractStatus::PendingSignature
        };
        let request_signature = !terms.bypass_signature;

        let contract = Contract {
            id: next_contract_id(),
            student_id,
            terms,
            status,
            created_at: Utc::now(),
            signed_at: None,
            signature_url: None,
            bank_details: None,
            created_by: ctx.operator_id,
        };

        self.contracts.insert_contract(contract.clone())?;
        self.students.set_needs_engagement(student_id, false)?;
        info!(
            contract = contract.id.0,
            student = student_id.0,
            status = ?contract.status,
            "created contract"
        );

        let warning = if request_signature {
            self.dispatch(contract.id, NotificationKind::SignatureRequest)
        } else {
            None
        };

        Ok(CreateContractOutcome { contract, warning })
    }

    /// Apply a signature: contract goes Active with a signed-at stamp, bank
    /// details land on contract and student, and the student becomes a
    /// contracted customer. The contract and student rows are written in one
    /// store transaction; only the signature-artifact upload may degrade to a
    /// warning.
    pub fn sign_contract(
        &self,
        _ctx: &OperatorContext,
        contract_id: ContractId,
        signature: &[u8],
        bank_details: Option<BankDetails>,
    ) -> Result<SignContractOutcome, ContractError> {
        let mut contract = self.fetch_contract(contract_id)?;
        match contract.status {
            ContractStatus::PendingSignature => {}
            ContractStatus::Active => {
                return Err(ContractError::Validation(
                    "contract is already signed".to_string(),
                ))
            }
            ContractStatus::Deleted => {
                return Err(ContractError::Validation(
                    "cannot sign a deleted contract".to_string(),
                ))
            }
        }

        let (signature_url, warning) =
            match self.signatures.store_signature(contract_id, signature) {
                Ok(url) => (Some(url), None),
                Err(err) => {
                    warn!(contract = contract_id.0, error = %err, "signature upload failed");
                    (None, Some(err.to_string()))
                }
            };

        contract.status = ContractStatus::Active;
        contract.signed_at = Some(Utc::now());
        contract.signature_url = signature_url;
        contract.bank_details = bank_details.clone();
        self.contracts.apply_signature(
            contract.clone(),
            bank_details,
            StudentStatus::ContractedCustomers,
        )?;

        info!(contract = contract_id.0, student = contract.student_id.0, "contract signed");
        Ok(SignContractOutcome { contract, warning })
    }

    /// Bind a teacher to a student-subject under a contract. The engagement
    /// insert, the subject linkage, and the ledger active flag are one logical
    /// transaction: any later-step failure rolls the insert back so no orphan
    /// engagement survives.
    pub fn create_engagement(
        &self,
        ctx: &OperatorContext,
        contract_id: ContractId,
        student_subject_id: StudentSubjectId,
        teacher_id: TeacherId,
        teacher_rate: f64,
    ) -> Result<ContractEngagement, ContractError> {
        if teacher_rate <= 0.0 || !teacher_rate.is_finite() {
            return Err(ContractError::Validation(
                "teacher rate must be a positive amount".to_string(),
            ));
        }

        let contract = self.fetch_contract(contract_id)?;
        if contract.status == ContractStatus::Deleted {
            return Err(ContractError::Validation(
                "cannot engage under a deleted contract".to_string(),
            ));
        }
        let subject = self
            .students
            .fetch_subject(student_subject_id)?
            .ok_or(StoreError::NotFound)?;
        if subject.student_id != contract.student_id {
            return Err(ContractError::Validation(
                "subject does not belong to the contract's student".to_string(),
            ));
        }
        self.teachers
            .fetch_teacher(teacher_id)?
            .ok_or(StoreError::NotFound)?;

        let engagement = ContractEngagement {
            id: next_engagement_id(),
            contract_id,
            student_subject_id,
            teacher_id,
            teacher_rate,
            status: EngagementStatus::Active,
            created_at: Utc::now(),
            created_by: ctx.operator_id,
        };

        match self.contracts.insert_engagement(engagement.clone()) {
            Ok(()) => {}
            Err(StoreError::Conflict) => return Err(ContractError::Conflict),
            Err(err) => return Err(err.into()),
        }

        if let Err(err) = self
            .students
            .link_subject(student_subject_id, Some((contract_id.0, engagement.id.0)))
        {
            self.roll_back_engagement(engagement.id, None)?;
            return Err(err.into());
        }

        // Upsert semantics: set_active clears any stale active entry for the
        // subject even when the cancel path did not run first.
        if let Err(err) =
            self.ledger
                .set_active(contract.student_id, subject.subject_id, teacher_id)
        {
            self.roll_back_engagement(engagement.id, Some(student_subject_id))?;
            return Err(err.into());
        }

        info!(
            engagement = engagement.id.0,
            contract = contract_id.0,
            subject = student_subject_id.0,
            teacher = teacher_id.0,
            "created engagement"
        );
        Ok(engagement)
    }

    /// Cancel one engagement by id. Idempotent: a missing engagement is a
    /// no-op so duplicate admin actions cannot clobber a newer assignment.
    /// The caller's student id must match the engagement's subject before
    /// anything is written.
    pub fn cancel_engagement(
        &self,
        _ctx: &OperatorContext,
        engagement_id: EngagementId,
        student_id: StudentId,
    ) -> Result<(), ContractError> {
        let Some(engagement) = self.contracts.fetch_engagement(engagement_id)? else {
            return Ok(());
        };

        let subject = self
            .students
            .fetch_subject(engagement.student_subject_id)?
            .ok_or_else(|| {
                ContractError::Integrity(format!(
                    "engagement {} references missing subject {}",
                    engagement_id.0, engagement.student_subject_id.0
                ))
            })?;
        if subject.student_id != student_id {
            return Err(ContractError::Validation(format!(
                "engagement {} does not belong to student {}",
                engagement_id.0, student_id.0
            )));
        }

        self.ledger.clear_active(student_id, subject.subject_id)?;
        self.students.link_subject(subject.id, None)?;
        self.contracts.delete_engagement(engagement_id)?;
        self.students.set_needs_engagement(student_id, true)?;

        info!(engagement = engagement_id.0, student = student_id.0, "cancelled engagement");
        Ok(())
    }

    /// Cancel a whole contract. Subject references are cleared before the
    /// contract is marked deleted so no reader can dereference a deleted
    /// contract through a still-linked subject; engagements flip to Inactive
    /// and are retained.
    pub fn cancel_contract(
        &self,
        _ctx: &OperatorContext,
        contract_id: ContractId,
    ) -> Result<(), ContractError> {
        let mut contract = self.fetch_contract(contract_id)?;
        let engagements = self.contracts.engagements_for_contract(contract_id)?;

        for engagement in &engagements {
            if let Some(subject) = self.students.fetch_subject(engagement.student_subject_id)? {
                self.students.link_subject(subject.id, None)?;
                self.ledger.clear_active(contract.student_id, subject.subject_id)?;
            }
        }
        for engagement in &engagements {
            self.contracts
                .set_engagement_status(engagement.id, EngagementStatus::Inactive)?;
        }

        contract.status = ContractStatus::Deleted;
        self.contracts.update_contract(contract)?;

        info!(
            contract = contract_id.0,
            engagements = engagements.len(),
            "cancelled contract"
        );
        Ok(())
    }

    /// Adjust the minimum-lessons floor. Pure field update; the new value only
    /// matters the next time invoices are aggregated.
    pub fn update_minimum_lessons(
        &self,
        _ctx: &OperatorContext,
        contract_id: ContractId,
        minimum_lessons: u32,
    ) -> Result<(), ContractError> {
        let mut contract = self.fetch_contract(contract_id)?;
        contract.terms.minimum_lessons = minimum_lessons;
        self.contracts.update_contract(contract)?;
        Ok(())
    }

    fn fetch_contract(&self, id: ContractId) -> Result<Contract, ContractError> {
        Ok(self.contracts.fetch_contract(id)?.ok_or(StoreError::NotFound)?)
    }

    fn dispatch(&self, contract: ContractId, kind: NotificationKind) -> Option<String> {
        match self.notifications.send_contract_notification(contract, kind) {
            Ok(()) => None,
            Err(err) => {
                warn!(contract = contract.0, error = %err, "notification dispatch failed");
                Some(err.to_string())
            }
        }
    }

    fn roll_back_engagement(
        &self,
        engagement_id: EngagementId,
        relink: Option<StudentSubjectId>,
    ) -> Result<(), ContractError> {
        if let Some(subject_id) = relink {
            self.students.link_subject(subject_id, None).map_err(|err| {
                ContractError::Integrity(format!(
                    "engagement {} rollback failed while unlinking subject: {err}",
                    engagement_id.0
                ))
            })?;
        }
        self.contracts.delete_engagement(engagement_id).map_err(|err| {
            ContractError::Integrity(format!(
                "engagement {} rollback failed: {err}",
                engagement_id.0
            ))
        })
    }
}
