//! Reference in-memory store. One mutex guards every table, and the composite
//! repository operations (status recomputation, signature application) run
//! start to finish under that guard, so they get the isolation a serializable
//! transaction would provide. The engagement insert enforces the one-active-
//! engagement-per-subject constraint the way a partial unique index would.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::workflows::contracts::domain::{
    Contract, ContractEngagement, ContractId, EngagementId, EngagementStatus,
};
use crate::workflows::contracts::repository::ContractRepository;
use crate::workflows::mediation::domain::{
    BankDetails, MediationStageEntry, Student, StudentId, StudentStatus, StudentSubject,
    StudentSubjectId, Teacher, TeacherId, TeacherStatus,
};
use crate::workflows::mediation::repository::{
    LedgerRepository, StoreError, StudentRepository, TeacherRepository,
};
use crate::workflows::mediation::status::{derive_status, SubjectMediationState};

#[derive(Debug, Default)]
struct Tables {
    students: HashMap<StudentId, Student>,
    subjects: HashMap<StudentSubjectId, StudentSubject>,
    teachers: HashMap<TeacherId, Teacher>,
    ledger: Vec<MediationStageEntry>,
    contracts: HashMap<ContractId, Contract>,
    engagements: HashMap<EngagementId, ContractEngagement>,
}

#[derive(Debug, Default)]
pub struct InMemoryBackOffice {
    inner: Mutex<Tables>,
}

impl InMemoryBackOffice {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    pub fn seed_student(&self, student: Student) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.students.contains_key(&student.id) {
            return Err(StoreError::Conflict);
        }
        tables.students.insert(student.id, student);
        Ok(())
    }

    pub fn seed_subject(&self, subject: StudentSubject) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.subjects.contains_key(&subject.id) {
            return Err(StoreError::Conflict);
        }
        tables.subjects.insert(subject.id, subject);
        Ok(())
    }

    pub fn seed_teacher(&self, teacher: Teacher) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.teachers.contains_key(&teacher.id) {
            return Err(StoreError::Conflict);
        }
        tables.teachers.insert(teacher.id, teacher);
        Ok(())
    }
}

impl StudentRepository for InMemoryBackOffice {
    fn fetch_student(&self, id: StudentId) -> Result<Option<Student>, StoreError> {
        Ok(self.lock()?.students.get(&id).cloned())
    }

    fn set_needs_engagement(&self, id: StudentId, needs: bool) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let student = tables.students.get_mut(&id).ok_or(StoreError::NotFound)?;
        student.needs_engagement = needs;
        Ok(())
    }

    fn subjects_for(&self, student: StudentId) -> Result<Vec<StudentSubject>, StoreError> {
        let tables = self.lock()?;
        let mut subjects: Vec<StudentSubject> = tables
            .subjects
            .values()
            .filter(|subject| subject.student_id == student)
            .cloned()
            .collect();
        subjects.sort_by_key(|subject| subject.id);
        Ok(subjects)
    }

    fn fetch_subject(&self, id: StudentSubjectId) -> Result<Option<StudentSubject>, StoreError> {
        Ok(self.lock()?.subjects.get(&id).cloned())
    }

    fn link_subject(
        &self,
        id: StudentSubjectId,
        links: Option<(u32, u32)>,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let subject = tables.subjects.get_mut(&id).ok_or(StoreError::NotFound)?;
        match links {
            Some((contract_id, engagement_id)) => {
                subject.contract_id = Some(contract_id);
                subject.engagement_id = Some(engagement_id);
            }
            None => {
                subject.contract_id = None;
                subject.engagement_id = None;
            }
        }
        Ok(())
    }
}

impl TeacherRepository for InMemoryBackOffice {
    fn fetch_teacher(&self, id: TeacherId) -> Result<Option<Teacher>, StoreError> {
        Ok(self.lock()?.teachers.get(&id).cloned())
    }

    fn teachers_with_status(&self, status: TeacherStatus) -> Result<Vec<Teacher>, StoreError> {
        let tables = self.lock()?;
        let mut teachers: Vec<Teacher> = tables
            .teachers
            .values()
            .filter(|teacher| teacher.status == status)
            .cloned()
            .collect();
        teachers.sort_by_key(|teacher| teacher.id);
        Ok(teachers)
    }
}

impl LedgerRepository for InMemoryBackOffice {
    fn append(&self, entry: MediationStageEntry) -> Result<(), StoreError> {
        self.lock()?.ledger.push(entry);
        Ok(())
    }

    fn entries_for_student(
        &self,
        student: StudentId,
    ) -> Result<Vec<MediationStageEntry>, StoreError> {
        Ok(self
            .lock()?
            .ledger
            .iter()
            .filter(|entry| entry.student_id == student)
            .cloned()
            .collect())
    }

    fn append_and_recompute(
        &self,
        student: StudentId,
        match_type_id: u32,
        entries: Vec<MediationStageEntry>,
    ) -> Result<StudentStatus, StoreError> {
        let mut tables = self.lock()?;
        tables.ledger.extend(entries);
        let status = derived_status(&tables, student, match_type_id);
        let row = tables.students.get_mut(&student).ok_or(StoreError::NotFound)?;
        row.status = status;
        Ok(status)
    }

    fn append_and_apply_completion(
        &self,
        entry: MediationStageEntry,
        completion: StudentStatus,
    ) -> Result<Option<StudentStatus>, StoreError> {
        let mut tables = self.lock()?;
        let student = entry.student_id;
        let stage = entry.mediation_type_id;
        tables.ledger.push(entry);

        let subject_ids: Vec<u32> = tables
            .subjects
            .values()
            .filter(|subject| subject.student_id == student)
            .map(|subject| subject.subject_id)
            .collect();
        let covered = !subject_ids.is_empty()
            && subject_ids.iter().all(|subject_id| {
                tables.ledger.iter().any(|entry| {
                    entry.student_id == student
                        && entry.subject_id == *subject_id
                        && entry.mediation_type_id == stage
                })
            });
        if !covered {
            return Ok(None);
        }

        let row = tables.students.get_mut(&student).ok_or(StoreError::NotFound)?;
        row.status = completion;
        Ok(Some(completion))
    }

    fn set_active(
        &self,
        student: StudentId,
        subject_id: u32,
        teacher: TeacherId,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        for entry in tables.ledger.iter_mut() {
            if entry.student_id == student && entry.subject_id == subject_id {
                entry.active = false;
            }
        }
        let target = tables
            .ledger
            .iter_mut()
            .rev()
            .find(|entry| {
                entry.student_id == student
                    && entry.subject_id == subject_id
                    && entry.teacher_id == Some(teacher)
            })
            .ok_or(StoreError::NotFound)?;
        target.active = true;
        Ok(())
    }

    fn clear_active(&self, student: StudentId, subject_id: u32) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        for entry in tables.ledger.iter_mut() {
            if entry.student_id == student && entry.subject_id == subject_id {
                entry.active = false;
            }
        }
        Ok(())
    }

    fn active_assignment_count(&self, teacher: TeacherId) -> Result<usize, StoreError> {
        Ok(self
            .lock()?
            .ledger
            .iter()
            .filter(|entry| entry.active && entry.teacher_id == Some(teacher))
            .count())
    }
}

impl ContractRepository for InMemoryBackOffice {
    fn insert_contract(&self, contract: Contract) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.contracts.contains_key(&contract.id) {
            return Err(StoreError::Conflict);
        }
        tables.contracts.insert(contract.id, contract);
        Ok(())
    }

    fn fetch_contract(&self, id: ContractId) -> Result<Option<Contract>, StoreError> {
        Ok(self.lock()?.contracts.get(&id).cloned())
    }

    fn update_contract(&self, contract: Contract) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.contracts.contains_key(&contract.id) {
            return Err(StoreError::NotFound);
        }
        tables.contracts.insert(contract.id, contract);
        Ok(())
    }

    fn apply_signature(
        &self,
        contract: Contract,
        bank_details: Option<BankDetails>,
        student_status: StudentStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.contracts.contains_key(&contract.id) {
            return Err(StoreError::NotFound);
        }
        let student = tables
            .students
            .get_mut(&contract.student_id)
            .ok_or(StoreError::NotFound)?;
        if let Some(details) = bank_details {
            student.bank_details = Some(details);
        }
        student.status = student_status;
        tables.contracts.insert(contract.id, contract);
        Ok(())
    }

    fn insert_engagement(&self, engagement: ContractEngagement) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.engagements.contains_key(&engagement.id) {
            return Err(StoreError::Conflict);
        }
        let subject_taken = tables.engagements.values().any(|existing| {
            existing.student_subject_id == engagement.student_subject_id
                && existing.status == EngagementStatus::Active
        });
        if subject_taken {
            return Err(StoreError::Conflict);
        }
        tables.engagements.insert(engagement.id, engagement);
        Ok(())
    }

    fn fetch_engagement(
        &self,
        id: EngagementId,
    ) -> Result<Option<ContractEngagement>, StoreError> {
        Ok(self.lock()?.engagements.get(&id).cloned())
    }

    fn delete_engagement(&self, id: EngagementId) -> Result<(), StoreError> {
        self.lock()?
            .engagements
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    fn set_engagement_status(
        &self,
        id: EngagementId,
        status: EngagementStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let engagement = tables.engagements.get_mut(&id).ok_or(StoreError::NotFound)?;
        engagement.status = status;
        Ok(())
    }

    fn engagements_for_contract(
        &self,
        contract: ContractId,
    ) -> Result<Vec<ContractEngagement>, StoreError> {
        let tables = self.lock()?;
        let mut engagements: Vec<ContractEngagement> = tables
            .engagements
            .values()
            .filter(|engagement| engagement.contract_id == contract)
            .cloned()
            .collect();
        engagements.sort_by_key(|engagement| engagement.id);
        Ok(engagements)
    }
}

fn derived_status(tables: &Tables, student: StudentId, match_type_id: u32) -> StudentStatus {
    let states: Vec<SubjectMediationState> = tables
        .subjects
        .values()
        .filter(|subject| subject.student_id == student)
        .map(|subject| {
            let matched = tables.ledger.iter().any(|entry| {
                entry.student_id == student
                    && entry.subject_id == subject.subject_id
                    && entry.mediation_type_id == match_type_id
            });
            if matched {
                SubjectMediationState::Matched
            } else {
                SubjectMediationState::Unmediated
            }
        })
        .collect();
    derive_status(&states)
}
