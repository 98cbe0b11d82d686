use crate::workflows::mediation::domain::{BankDetails, StudentStatus};
use crate::workflows::mediation::repository::StoreError;

use super::domain::{Contract, ContractEngagement, ContractId, EngagementId, EngagementStatus};

/// Storage abstraction over contracts and their engagements.
///
/// `insert_engagement` must enforce "at most one Active engagement per
/// StudentSubject" as a genuine storage constraint (a partial unique index in
/// a SQL-backed implementation) and answer `Conflict` when it would be
/// violated; the services never rely on check-then-act for this.
pub trait ContractRepository: Send + Sync {
    fn insert_contract(&self, contract: Contract) -> Result<(), StoreError>;
    fn fetch_contract(&self, id: ContractId) -> Result<Option<Contract>, StoreError>;
    fn update_contract(&self, contract: Contract) -> Result<(), StoreError>;
    /// Persist a signed contract together with its student-side effects: the
    /// optional bank details and the new student status land in the same
    /// transaction as the contract row, never as separate follow-up writes.
    fn apply_signature(
        &self,
        contract: Contract,
        bank_details: Option<BankDetails>,
        student_status: StudentStatus,
    ) -> Result<(), StoreError>;

    fn insert_engagement(&self, engagement: ContractEngagement) -> Result<(), StoreError>;
    fn fetch_engagement(&self, id: EngagementId)
        -> Result<Option<ContractEngagement>, StoreError>;
    fn delete_engagement(&self, id: EngagementId) -> Result<(), StoreError>;
    fn set_engagement_status(
        &self,
        id: EngagementId,
        status: EngagementStatus,
    ) -> Result<(), StoreError>;
    fn engagements_for_contract(
        &self,
        contract: ContractId,
    ) -> Result<Vec<ContractEngagement>, StoreError>;
}

/// Outbound notification kinds raised by the contract lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    SignatureRequest,
    SignatureConfirmation,
}

/// Fire-and-forget dispatch boundary (e-mail / messaging adapters). A failed
/// dispatch never fails the calling mutation; the services log it and surface
/// a warning.
pub trait NotificationDispatcher: Send + Sync {
    fn send_contract_notification(
        &self,
        contract: ContractId,
        kind: NotificationKind,
    ) -> Result<(), DispatchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Object-storage boundary for signature artifacts; returns a retrievable URL.
pub trait SignatureStore: Send + Sync {
    fn store_signature(
        &self,
        contract: ContractId,
        payload: &[u8],
    ) -> Result<String, SignatureStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SignatureStoreError {
    #[error("signature storage unavailable: {0}")]
    Unavailable(String),
}
