//! Contract issuance, signing, and the per-subject engagement bookkeeping
//! that keeps subjects, ledger flags, and billing data consistent.

pub mod domain;
pub mod repository;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Contract, ContractEngagement, ContractId, ContractStatus, ContractTerms,
    CreateContractOutcome, EngagementId, EngagementStatus, PaymentMode, SignContractOutcome,
};
pub use repository::{
    ContractRepository, DispatchError, NotificationDispatcher, NotificationKind, SignatureStore,
    SignatureStoreError,
};
pub use service::{ContractError, ContractService};
