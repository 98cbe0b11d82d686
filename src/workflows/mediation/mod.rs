//! Student–teacher mediation: candidate matching, the append-only stage
//! ledger, and the aggregate status machine driven by it.

pub mod catalog;
pub mod domain;
pub mod geo;
pub mod matching;
pub mod repository;
pub mod service;
pub mod status;

#[cfg(test)]
mod tests;

pub use catalog::{Catalog, CatalogReader, Level, MediationRole, MediationType, Subject,
    MATCH_TYPE_NAME};
pub use domain::{
    BankDetails, Coordinates, Gender, MediationStageEntry, OperatorContext, OperatorRole, Student,
    StudentId,
    StudentStatus, StudentSubject, StudentSubjectId, Teacher, TeacherExpertise, TeacherId,
    TeacherStatus, TransportPreference,
};
pub use matching::{
    find_candidates, CandidateFilters, Compatibility, RankedCandidate, SubjectRule, TeacherScope,
};
pub use repository::{LedgerRepository, StoreError, StudentRepository, TeacherRepository};
pub use service::{MediationError, MediationService};
pub use status::{derive_status, StagePolicy, SubjectMediationState};
