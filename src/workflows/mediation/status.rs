use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::StudentStatus;

/// Per-subject mediation state fed into [`derive_status`]. One value per
/// StudentSubject row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectMediationState {
    Unmediated,
    Matched,
}

/// Single derivation rule consumed by every mutation path, so the "match" and
/// "stage" flows cannot drift apart.
///
/// A student with no subjects stays `MediationOpen`: the historical behavior of
/// reporting such students as partially mediated was an else-branch accident,
/// not policy.
pub fn derive_status(subject_states: &[SubjectMediationState]) -> StudentStatus {
    if subject_states.is_empty() {
        return StudentStatus::MediationOpen;
    }

    let matched = subject_states
        .iter()
        .filter(|state| **state == SubjectMediationState::Matched)
        .count();

    if matched == subject_states.len() {
        StudentStatus::Mediated
    } else {
        StudentStatus::PartiallyMediated
    }
}

/// Configured lookup from mediation-type display name to the aggregate status
/// a student reaches once *every* subject carries an entry of that type.
///
/// Externalized so that adding a new stage to the catalog needs a policy row,
/// not new branching code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagePolicy {
    completion_status: BTreeMap<String, StudentStatus>,
}

impl StagePolicy {
    pub fn new(completion_status: BTreeMap<String, StudentStatus>) -> Self {
        Self { completion_status }
    }

    /// Policy matching the stage taxonomy of [`super::catalog::Catalog::standard`]:
    /// a fully covering "Specialist Consulting" stage labels the student with
    /// the stage's own display name.
    pub fn standard() -> Self {
        let mut completion_status = BTreeMap::new();
        completion_status.insert(
            "Specialist Consulting".to_string(),
            StudentStatus::SpecialistConsulting,
        );
        Self { completion_status }
    }

    /// Parse a `{"type name": "Status Label"}` JSON map, as carried in
    /// configuration.
    pub fn from_labels(labels: &BTreeMap<String, String>) -> Result<Self, String> {
        let mut completion_status = BTreeMap::new();
        for (type_name, status_label) in labels {
            let status = StudentStatus::from_label(status_label)
                .ok_or_else(|| format!("unknown student status label '{status_label}'"))?;
            completion_status.insert(type_name.clone(), status);
        }
        Ok(Self { completion_status })
    }

    pub fn completion_status_for(&self, mediation_type_name: &str) -> Option<StudentStatus> {
        self.completion_status.get(mediation_type_name).copied()
    }
}

impl Default for StagePolicy {
    fn default() -> Self {
        Self::standard()
    }
}
