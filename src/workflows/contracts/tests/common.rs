use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::storage::InMemoryBackOffice;
use crate::workflows::contracts::domain::{ContractId, ContractTerms, PaymentMode};
use crate::workflows::contracts::repository::{
    DispatchError, NotificationDispatcher, NotificationKind, SignatureStore, SignatureStoreError,
};
use crate::workflows::contracts::service::ContractService;
use crate::workflows::mediation::domain::{
    BankDetails, Coordinates, Gender, MediationStageEntry, OperatorContext, OperatorRole, Student,
    StudentId, StudentStatus, StudentSubject, StudentSubjectId, Teacher, TeacherExpertise,
    TeacherId, TeacherStatus, TransportPreference,
};
use crate::workflows::mediation::repository::LedgerRepository;

pub(super) const MATH: u32 = 10;
pub(super) const ENGLISH: u32 = 11;
pub(super) const MATH_SUBJECT_ROW: StudentSubjectId = StudentSubjectId(1);
pub(super) const ENGLISH_SUBJECT_ROW: StudentSubjectId = StudentSubjectId(2);
pub(super) const STUDENT: StudentId = StudentId(1);
pub(super) const TEACHER: TeacherId = TeacherId(7);

pub(super) fn ctx() -> OperatorContext {
    OperatorContext {
        operator_id: 42,
        role: OperatorRole::Admin,
    }
}

pub(super) fn terms(bypass_signature: bool) -> ContractTerms {
    ContractTerms {
        payment_mode: PaymentMode::MonthlyInvoice,
        lesson_duration_minutes: 90,
        minimum_lessons: 4,
        charge_minimum_lessons: true,
        registration_fee: 49.0,
        student_rate: 20.0,
        bypass_signature,
    }
}

pub(super) fn bank_details() -> BankDetails {
    BankDetails {
        account_holder: "Pat Example".to_string(),
        iban: "DE02120300000000202051".to_string(),
        bic: Some("BYLADEM1001".to_string()),
    }
}

/// Store with one mediated student (two subjects, both matched to the same
/// teacher) ready for contract creation.
pub(super) fn mediated_store() -> Arc<InMemoryBackOffice> {
    let store = Arc::new(InMemoryBackOffice::new());
    store
        .seed_student(Student {
            id: STUDENT,
            name: "Student 1".to_string(),
            email: "student1@example.org".to_string(),
            phone: None,
            gender: None,
            coordinates: Some(Coordinates {
                latitude: 52.52,
                longitude: 13.405,
            }),
            level_id: 5,
            status: StudentStatus::Mediated,
            needs_engagement: true,
            bank_details: None,
        })
        .expect("seed student");

    for (row_id, subject_id) in [(MATH_SUBJECT_ROW, MATH), (ENGLISH_SUBJECT_ROW, ENGLISH)] {
        store
            .seed_subject(StudentSubject {
                id: row_id,
                student_id: STUDENT,
                subject_id,
                requested_level_id: 5,
                contract_id: None,
                engagement_id: None,
            })
            .expect("seed subject");
        store
            .append(MediationStageEntry {
                student_id: STUDENT,
                subject_id,
                mediation_type_id: 1,
                recorded_at: Utc::now(),
                teacher_id: Some(TEACHER),
                note: None,
                active: false,
                created_by: 42,
            })
            .expect("seed ledger");
    }

    store
        .seed_teacher(Teacher {
            id: TEACHER,
            name: "Teacher 7".to_string(),
            email: "teacher7@example.org".to_string(),
            gender: Gender::Female,
            coordinates: None,
            transport: TransportPreference::Car,
            status: TeacherStatus::Hired,
            capacity: None,
            expertise: vec![
                TeacherExpertise {
                    subject_id: MATH,
                    level_id: 5,
                    years_experience: 4,
                    hourly_rate: 15.0,
                },
                TeacherExpertise {
                    subject_id: ENGLISH,
                    level_id: 5,
                    years_experience: 2,
                    hourly_rate: 14.0,
                },
            ],
        })
        .expect("seed teacher");

    store
}

#[derive(Default)]
pub(super) struct MemoryDispatcher {
    events: Mutex<Vec<(ContractId, NotificationKind)>>,
}

impl MemoryDispatcher {
    pub(super) fn events(&self) -> Vec<(ContractId, NotificationKind)> {
        self.events.lock().expect("dispatcher mutex poisoned").clone()
    }
}

impl NotificationDispatcher for MemoryDispatcher {
    fn send_contract_notification(
        &self,
        contract: ContractId,
        kind: NotificationKind,
    ) -> Result<(), DispatchError> {
        self.events
            .lock()
            .expect("dispatcher mutex poisoned")
            .push((contract, kind));
        Ok(())
    }
}

pub(super) struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    fn send_contract_notification(
        &self,
        _contract: ContractId,
        _kind: NotificationKind,
    ) -> Result<(), DispatchError> {
        Err(DispatchError::Transport("smtp relay down".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemorySignatures;

impl SignatureStore for MemorySignatures {
    fn store_signature(
        &self,
        contract: ContractId,
        _payload: &[u8],
    ) -> Result<String, SignatureStoreError> {
        Ok(format!("https://docs.example.org/signatures/{}", contract.0))
    }
}

pub(super) struct FailingSignatures;

impl SignatureStore for FailingSignatures {
    fn store_signature(
        &self,
        _contract: ContractId,
        _payload: &[u8],
    ) -> Result<String, SignatureStoreError> {
        Err(SignatureStoreError::Unavailable("bucket unreachable".to_string()))
    }
}

pub(super) type TestContractService<N, G> = ContractService<
    InMemoryBackOffice,
    InMemoryBackOffice,
    InMemoryBackOffice,
    InMemoryBackOffice,
    N,
    G,
>;

pub(super) fn contract_service(
    store: &Arc<InMemoryBackOffice>,
) -> (TestContractService<MemoryDispatcher, MemorySignatures>, Arc<MemoryDispatcher>) {
    let dispatcher = Arc::new(MemoryDispatcher::default());
    let service = ContractService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        dispatcher.clone(),
        Arc::new(MemorySignatures),
    );
    (service, dispatcher)
}
