//! End-to-end mediation scenario: lead with two subjects, matched one subject
//! at a time, then contracted, engaged, and signed into a paying customer.

mod common {
    use std::sync::Arc;

    use tutor_ops::storage::InMemoryBackOffice;
    use tutor_ops::workflows::contracts::{
        ContractId, ContractService, ContractTerms, DispatchError, NotificationDispatcher,
        NotificationKind, PaymentMode, SignatureStore, SignatureStoreError,
    };
    use tutor_ops::workflows::mediation::{
        Catalog, Coordinates, Gender, Level, MediationService, OperatorContext, OperatorRole,
        StagePolicy, Student, StudentId, StudentStatus, StudentSubject, StudentSubjectId, Subject,
        Teacher, TeacherExpertise, TeacherId, TeacherStatus, TransportPreference,
    };

    pub const MATH: u32 = 10;
    pub const ENGLISH: u32 = 11;

    pub fn ctx() -> OperatorContext {
        OperatorContext {
            operator_id: 1,
            role: OperatorRole::Admin,
        }
    }

    pub fn catalog() -> Catalog {
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
        catalog.levels = vec![Level {
            id: 5,
            name: "Grade 5".to_string(),
        }];
        catalog
    }

    pub fn seed(store: &InMemoryBackOffice) {
        store
            .seed_student(Student {
                id: StudentId(1),
                name: "Alex Lead".to_string(),
                email: "alex@example.org".to_string(),
                phone: None,
                gender: None,
                coordinates: Some(Coordinates {
                    latitude: 52.5200,
                    longitude: 13.4050,
                }),
                level_id: 5,
                status: StudentStatus::Leads,
                needs_engagement: true,
                bank_details: None,
            })
            .expect("seed student");

        for (row, subject) in [(1, MATH), (2, ENGLISH)] {
            store
                .seed_subject(StudentSubject {
                    id: StudentSubjectId(row),
                    student_id: StudentId(1),
                    subject_id: subject,
                    requested_level_id: 5,
                    contract_id: None,
                    engagement_id: None,
                })
                .expect("seed subject");
        }

        store
            .seed_teacher(Teacher {
                id: TeacherId(7),
                name: "Kim Tutor".to_string(),
                email: "kim@example.org".to_string(),
                gender: Gender::Female,
                coordinates: Some(Coordinates {
                    latitude: 52.5310,
                    longitude: 13.3840,
                }),
                transport: TransportPreference::PublicTransit,
                status: TeacherStatus::Hired,
                capacity: None,
                expertise: vec![
                    TeacherExpertise {
                        subject_id: MATH,
                        level_id: 5,
                        years_experience: 4,
                        hourly_rate: 16.0,
                    },
                    TeacherExpertise {
                        subject_id: ENGLISH,
                        level_id: 5,
                        years_experience: 2,
                        hourly_rate: 15.0,
                    },
                ],
            })
            .expect("seed teacher");
    }

    pub fn mediation_service(
        store: &Arc<InMemoryBackOffice>,
    ) -> MediationService<InMemoryBackOffice, InMemoryBackOffice, InMemoryBackOffice, Catalog>
    {
        MediationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(catalog()),
            StagePolicy::standard(),
        )
    }

    pub struct RecordingDispatcher;

    impl NotificationDispatcher for RecordingDispatcher {
        fn send_contract_notification(
            &self,
            _contract: ContractId,
            _kind: NotificationKind,
        ) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    pub struct StubSignatures;

    impl SignatureStore for StubSignatures {
        fn store_signature(
            &self,
            contract: ContractId,
            _payload: &[u8],
        ) -> Result<String, SignatureStoreError> {
            Ok(format!("https://docs.example.org/s/{}", contract.0))
        }
    }

    pub fn contract_service(
        store: &Arc<InMemoryBackOffice>,
    ) -> ContractService<
        InMemoryBackOffice,
        InMemoryBackOffice,
        InMemoryBackOffice,
        InMemoryBackOffice,
        RecordingDispatcher,
        StubSignatures,
    > {
        ContractService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(RecordingDispatcher),
            Arc::new(StubSignatures),
        )
    }

    pub fn terms() -> ContractTerms {
        ContractTerms {
            payment_mode: PaymentMode::MonthlyInvoice,
            lesson_duration_minutes: 90,
            minimum_lessons: 4,
            charge_minimum_lessons: true,
            registration_fee: 49.0,
            student_rate: 20.0,
            bypass_signature: false,
        }
    }
}

use std::sync::Arc;

use common::*;
use tutor_ops::storage::InMemoryBackOffice;
use tutor_ops::workflows::mediation::{
    CandidateFilters, StudentId, StudentRepository, StudentStatus, StudentSubjectId, SubjectRule,
    TeacherId, TeacherScope,
};

#[test]
fn lead_becomes_contracted_customer_through_the_full_flow() {
    let store = Arc::new(InMemoryBackOffice::new());
    seed(&store);
    let mediation = mediation_service(&store);
    let contracts = contract_service(&store);

    // The hired teacher covers both outstanding subjects within radius.
    let candidates = mediation
        .find_candidates(
            StudentId(1),
            &CandidateFilters {
                scope: TeacherScope::Hired,
                gender: None,
                radius_km: 25.0,
                rule: SubjectRule::All,
            },
        )
        .expect("candidate query");
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].teacher.id, TeacherId(7));
    assert!(candidates[0].distance_km.expect("both ends geocoded") < 5.0);

    // First match covers Math only.
    let status = mediation
        .record_match(&ctx(), StudentId(1), TeacherId(7), &[MATH])
        .expect("math match");
    assert_eq!(status, StudentStatus::PartiallyMediated);

    // Second match completes the set.
    let status = mediation
        .record_match(&ctx(), StudentId(1), TeacherId(7), &[ENGLISH])
        .expect("english match");
    assert_eq!(status, StudentStatus::Mediated);

    // Contract plus one engagement per subject, then signature.
    let contract = contracts
        .create_contract(&ctx(), StudentId(1), terms())
        .expect("contract")
        .contract;
    contracts
        .create_engagement(&ctx(), contract.id, StudentSubjectId(1), TeacherId(7), 16.0)
        .expect("math engagement");
    contracts
        .create_engagement(&ctx(), contract.id, StudentSubjectId(2), TeacherId(7), 15.0)
        .expect("english engagement");
    contracts
        .sign_contract(&ctx(), contract.id, b"signed.png", None)
        .expect("signature");

    let student = store
        .fetch_student(StudentId(1))
        .expect("fetch")
        .expect("exists");
    assert_eq!(student.status, StudentStatus::ContractedCustomers);

    for row in [StudentSubjectId(1), StudentSubjectId(2)] {
        let subject = store.fetch_subject(row).expect("fetch").expect("exists");
        assert_eq!(subject.contract_id, Some(contract.id.0));
        assert!(subject.engagement_id.is_some());
    }
}
