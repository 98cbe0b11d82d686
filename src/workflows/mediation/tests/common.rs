use std::sync::Arc;

use chrono::Utc;

use crate::storage::InMemoryBackOffice;
use crate::workflows::mediation::catalog::{Catalog, Level, Subject};
use crate::workflows::mediation::domain::{
    Coordinates, Gender, MediationStageEntry, OperatorContext, OperatorRole, Student, StudentId,
    StudentStatus, StudentSubject, StudentSubjectId, Teacher, TeacherExpertise, TeacherId,
    TeacherStatus, TransportPreference,
};
use crate::workflows::mediation::repository::LedgerRepository;
use crate::workflows::mediation::service::MediationService;
use crate::workflows::mediation::status::StagePolicy;

pub(super) const MATH: u32 = 10;
pub(super) const ENGLISH: u32 = 11;
pub(super) const LEVEL_5: u32 = 5;
pub(super) const LEVEL_7: u32 = 7;

pub(super) fn ctx() -> OperatorContext {
    OperatorContext {
        operator_id: 42,
        role: OperatorRole::Mediator,
    }
}

pub(super) fn catalog() -> Catalog {
    let mut catalog = Catalog::standard();
    catalog.subjects = vec![
        Subject {
            id: MATH,
            name: "Mathematics".to_string(),
            active: true,
        },
        Subject {
            id: ENGLISH,
            name: "English".to_string(),
            active: true,
        },
    ];
    catalog.levels = vec![
        Level {
            id: LEVEL_5,
            name: "Grade 5".to_string(),
        },
        Level {
            id: LEVEL_7,
            name: "Grade 7".to_string(),
        },
    ];
    catalog
}

pub(super) fn berlin() -> Coordinates {
    Coordinates {
        latitude: 52.5200,
        longitude: 13.4050,
    }
}

pub(super) fn student(id: u32, coordinates: Option<Coordinates>) -> Student {
    Student {
        id: StudentId(id),
        name: format!("Student {id}"),
        email: format!("student{id}@example.org"),
        phone: None,
        gender: None,
        coordinates,
        level_id: LEVEL_5,
        status: StudentStatus::MediationOpen,
        needs_engagement: true,
        bank_details: None,
    }
}

pub(super) fn student_subject(
    id: u32,
    student_id: u32,
    subject_id: u32,
    requested_level_id: u32,
) -> StudentSubject {
    StudentSubject {
        id: StudentSubjectId(id),
        student_id: StudentId(student_id),
        subject_id,
        requested_level_id,
        contract_id: None,
        engagement_id: None,
    }
}

pub(super) fn teacher(
    id: u32,
    gender: Gender,
    coordinates: Option<Coordinates>,
    expertise: Vec<TeacherExpertise>,
) -> Teacher {
    Teacher {
        id: TeacherId(id),
        name: format!("Teacher {id}"),
        email: format!("teacher{id}@example.org"),
        gender,
        coordinates,
        transport: TransportPreference::PublicTransit,
        status: TeacherStatus::Hired,
        capacity: None,
        expertise,
    }
}

pub(super) fn expertise(subject_id: u32, level_id: u32) -> TeacherExpertise {
    TeacherExpertise {
        subject_id,
        level_id,
        years_experience: 3,
        hourly_rate: 16.0,
    }
}

/// Append an active-flagged ledger entry so a teacher shows up as carrying a
/// live assignment without walking the whole engagement flow.
pub(super) fn seed_active_assignment(
    store: &InMemoryBackOffice,
    student_id: u32,
    subject_id: u32,
    teacher_id: u32,
) {
    store
        .append(MediationStageEntry {
            student_id: StudentId(student_id),
            subject_id,
            mediation_type_id: 1,
            recorded_at: Utc::now(),
            teacher_id: Some(TeacherId(teacher_id)),
            note: None,
            active: true,
            created_by: 42,
        })
        .expect("ledger append");
}

pub(super) type TestService =
    MediationService<InMemoryBackOffice, InMemoryBackOffice, InMemoryBackOffice, Catalog>;

pub(super) fn service(store: &Arc<InMemoryBackOffice>) -> TestService {
    MediationService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(catalog()),
        StagePolicy::standard(),
    )
}
