use super::domain::{
    MediationStageEntry, Student, StudentId, StudentStatus, StudentSubject, StudentSubjectId,
    Teacher, TeacherId, TeacherStatus,
};

/// Error enumeration shared by every storage trait in the crate. `Conflict`
/// is surfaced distinctly so callers can offer reassignment flows instead of
/// treating it as a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists or violates a uniqueness constraint")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction over students and their requested subjects.
///
/// Each method is one atomic statement. Mutations that must see a consistent
/// multi-table view (status recomputation, signature application) are modelled
/// as dedicated composite operations on the owning repository instead of
/// read-here/write-back sequences.
pub trait StudentRepository: Send + Sync {
    fn fetch_student(&self, id: StudentId) -> Result<Option<Student>, StoreError>;
    fn set_needs_engagement(&self, id: StudentId, needs: bool) -> Result<(), StoreError>;
    fn subjects_for(&self, student: StudentId) -> Result<Vec<StudentSubject>, StoreError>;
    fn fetch_subject(&self, id: StudentSubjectId) -> Result<Option<StudentSubject>, StoreError>;
    /// Point a subject at a contract/engagement pair, or clear both with `None`.
    fn link_subject(
        &self,
        id: StudentSubjectId,
        links: Option<(u32, u32)>,
    ) -> Result<(), StoreError>;
}

pub trait TeacherRepository: Send + Sync {
    fn fetch_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError>;
    fn teachers_with_status(&self, status: TeacherStatus) -> Result<Vec<Teacher>, StoreError>;
}

/// Append-only mediation-stage log plus active-flag bookkeeping.
pub trait LedgerRepository: Send + Sync {
    fn append(&self, entry: MediationStageEntry) -> Result<(), StoreError>;
    fn entries_for_student(&self, student: StudentId)
        -> Result<Vec<MediationStageEntry>, StoreError>;
    /// Append `entries`, recompute the student's derived status from the
    /// post-append ledger, and persist it on the student row — all under one
    /// guard, so a concurrent recording for another subject of the same
    /// student cannot act on a stale subject count. An empty `entries` is a
    /// plain guarded recomputation.
    fn append_and_recompute(
        &self,
        student: StudentId,
        match_type_id: u32,
        entries: Vec<MediationStageEntry>,
    ) -> Result<StudentStatus, StoreError>;
    /// Append one stage entry and, if that stage afterwards covers every
    /// subject of the student, force the student's status to `completion` in
    /// the same guarded step. Returns the status when it was applied.
    fn append_and_apply_completion(
        &self,
        entry: MediationStageEntry,
        completion: StudentStatus,
    ) -> Result<Option<StudentStatus>, StoreError>;
    /// Flag the most recent entry for (student, subject, teacher) as the live
    /// assignment, clearing any previously active entry for the same subject
    /// in the same atomic step.
    fn set_active(
        &self,
        student: StudentId,
        subject_id: u32,
        teacher: TeacherId,
    ) -> Result<(), StoreError>;
    fn clear_active(&self, student: StudentId, subject_id: u32) -> Result<(), StoreError>;
    /// Number of subjects across all students whose live assignment names this
    /// teacher. Feeds the matching tie-breaker.
    fn active_assignment_count(&self, teacher: TeacherId) -> Result<usize, StoreError>;
}
