use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::catalog::{CatalogReader, MATCH_TYPE_NAME};
use super::domain::{
    MediationStageEntry, OperatorContext, Student, StudentId, StudentStatus, StudentSubject,
    TeacherId,
};
use super::matching::{find_candidates, CandidateFilters, RankedCandidate};
use super::repository::{LedgerRepository, StoreError, StudentRepository, TeacherRepository};
use super::status::{StagePolicy, SubjectMediationState};

/// Error raised by the mediation service.
#[derive(Debug, thiserror::Error)]
pub enum MediationError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service composing the matching engine, stage ledger, and status machine.
pub struct MediationService<S, T, L, C> {
    students: Arc<S>,
    teachers: Arc<T>,
    ledger: Arc<L>,
    catalog: Arc<C>,
    policy: StagePolicy,
}

impl<S, T, L, C> MediationService<S, T, L, C>
where
    S: StudentRepository + 'static,
    T: TeacherRepository + 'static,
    L: LedgerRepository + 'static,
    C: CatalogReader + 'static,
{
    pub fn new(
        students: Arc<S>,
        teachers: Arc<T>,
        ledger: Arc<L>,
        catalog: Arc<C>,
        policy: StagePolicy,
    ) -> Self {
        Self {
            students,
            teachers,
            ledger,
            catalog,
            policy,
        }
    }

    /// Rank candidate teachers against the student's not-yet-mediated
    /// subjects. Pure query; no ledger or status writes.
    pub fn find_candidates(
        &self,
        student_id: StudentId,
        filters: &CandidateFilters,
    ) -> Result<Vec<RankedCandidate>, MediationError> {
        let student = self.fetch_student(student_id)?;
        let outstanding = self.outstanding_subjects(&student)?;

        Ok(find_candidates(
            &student,
            &outstanding,
            filters,
            self.teachers.as_ref(),
            self.ledger.as_ref(),
        )?)
    }

    /// Record a teacher match for the given subjects and recompute the
    /// student's aggregate status in the same store pass.
    pub fn record_match(
        &self,
        ctx: &OperatorContext,
        student_id: StudentId,
        teacher_id: TeacherId,
        subject_ids: &[u32],
    ) -> Result<StudentStatus, MediationError> {
        if subject_ids.is_empty() {
            return Err(MediationError::Validation(
                "a match must name at least one subject".to_string(),
            ));
        }

        let student = self.fetch_student(student_id)?;
        self.teachers
            .fetch_teacher(teacher_id)?
            .ok_or(StoreError::NotFound)?;
        let match_type = self.match_type_id()?;

        let subjects = self.students.subjects_for(student.id)?;
        let mut entries = Vec::with_capacity(subject_ids.len());
        for subject_id in subject_ids {
            if !subjects.iter().any(|row| row.subject_id == *subject_id) {
                return Err(MediationError::Validation(format!(
                    "student {} has not requested subject {subject_id}",
                    student.id.0
                )));
            }
            entries.push(MediationStageEntry {
                student_id: student.id,
                subject_id: *subject_id,
                mediation_type_id: match_type,
                recorded_at: Utc::now(),
                teacher_id: Some(teacher_id),
                note: None,
                active: false,
                created_by: ctx.operator_id,
            });
        }

        let status = self
            .ledger
            .append_and_recompute(student.id, match_type, entries)?;
        info!(
            student = student.id.0,
            teacher = teacher_id.0,
            subjects = subject_ids.len(),
            status = status.label(),
            "recorded match"
        );
        Ok(status)
    }

    /// Record a softer progress stage (e.g. "Specialist Consulting"). When the
    /// stage now covers every subject of the student, the student's status is
    /// force-set to the policy's completion status for that stage; the forced
    /// status is returned so callers can observe the transition.
    pub fn record_stage(
        &self,
        ctx: &OperatorContext,
        teacher_id: Option<TeacherId>,
        student_id: StudentId,
        subject_id: u32,
        mediation_type_name: &str,
    ) -> Result<Option<StudentStatus>, MediationError> {
        let student = self.fetch_student(student_id)?;
        let mediation_type = self
            .catalog
            .mediation_type_by_name(mediation_type_name)?
            .ok_or_else(|| {
                MediationError::Validation(format!(
                    "unknown mediation type '{mediation_type_name}'"
                ))
            })?;

        let entry = MediationStageEntry {
            student_id: student.id,
            subject_id,
            mediation_type_id: mediation_type.id,
            recorded_at: Utc::now(),
            teacher_id,
            note: None,
            active: false,
            created_by: ctx.operator_id,
        };

        let Some(completion) = self.policy.completion_status_for(&mediation_type.name) else {
            self.ledger.append(entry)?;
            return Ok(None);
        };

        let applied = self.ledger.append_and_apply_completion(entry, completion)?;
        if applied.is_some() {
            info!(
                student = student.id.0,
                stage = mediation_type.name.as_str(),
                status = completion.label(),
                "stage covers all subjects"
            );
        }
        Ok(applied)
    }

    /// Recompute and persist the aggregate status from the ledger. Exposed for
    /// flows (engagement cancellation) that change mediation state outside of
    /// `record_match`.
    pub fn recompute_status(&self, student: &Student) -> Result<StudentStatus, MediationError> {
        let match_type = self.match_type_id()?;
        Ok(self
            .ledger
            .append_and_recompute(student.id, match_type, Vec::new())?)
    }

    fn outstanding_subjects(
        &self,
        student: &Student,
    ) -> Result<Vec<StudentSubject>, MediationError> {
        let match_type = self.match_type_id()?;
        let entries = self.ledger.entries_for_student(student.id)?;
        Ok(self
            .students
            .subjects_for(student.id)?
            .into_iter()
            .filter(|subject| {
                subject_state(subject, &entries, match_type) == SubjectMediationState::Unmediated
            })
            .collect())
    }

    fn fetch_student(&self, id: StudentId) -> Result<Student, MediationError> {
        Ok(self.students.fetch_student(id)?.ok_or(StoreError::NotFound)?)
    }

    fn match_type_id(&self) -> Result<u32, MediationError> {
        self.catalog
            .mediation_type_by_name(MATCH_TYPE_NAME)?
            .map(|mediation_type| mediation_type.id)
            .ok_or_else(|| {
                MediationError::Integrity(format!(
                    "catalog is missing the '{MATCH_TYPE_NAME}' mediation type"
                ))
            })
    }
}

fn subject_state(
    subject: &StudentSubject,
    entries: &[MediationStageEntry],
    match_type_id: u32,
) -> SubjectMediationState {
    let matched = entries.iter().any(|entry| {
        entry.subject_id == subject.subject_id && entry.mediation_type_id == match_type_id
    });
    if matched {
        SubjectMediationState::Matched
    } else {
        SubjectMediationState::Unmediated
    }
}
