use serde::{Deserialize, Serialize};

use super::repository::StoreError;

/// Canonical name of the mediation type recorded when a teacher is matched.
/// Name lookup is the single source of truth; match counting never compares
/// against a literal catalog id.
pub const MATCH_TYPE_NAME: &str = "Match";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: u32,
    pub name: String,
    pub active: bool,
}

/// Proficiency level. Ordering is monotonic: a higher id is a higher grade,
/// so level sufficiency checks compare ids directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: u32,
    pub name: String,
}

/// Distinguishes student-facing stages (e.g. "Specialist Consulting") from
/// teacher-facing ones (e.g. "Match", "Introductory Meeting Confirmed").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediationRole {
    StudentFacing,
    TeacherFacing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediationType {
    pub id: u32,
    pub name: String,
    pub role: MediationRole,
    pub active: bool,
}

/// Read-only reference catalog: subjects, levels, mediation types.
pub trait CatalogReader: Send + Sync {
    fn subjects(&self, only_active: bool) -> Result<Vec<Subject>, StoreError>;
    fn level(&self, id: u32) -> Result<Option<Level>, StoreError>;
    fn mediation_types(&self, only_active: bool) -> Result<Vec<MediationType>, StoreError>;

    fn mediation_type_by_name(&self, name: &str) -> Result<Option<MediationType>, StoreError> {
        Ok(self
            .mediation_types(false)?
            .into_iter()
            .find(|mediation_type| mediation_type.name == name))
    }
}

/// In-memory catalog used by the reference store and the test suites.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub subjects: Vec<Subject>,
    pub levels: Vec<Level>,
    pub mediation_types: Vec<MediationType>,
}

impl Catalog {
    /// Catalog seeded with the stages the agency workflow relies on.
    pub fn standard() -> Self {
        let mediation_types = vec![
            MediationType {
                id: 1,
                name: MATCH_TYPE_NAME.to_string(),
                role: MediationRole::TeacherFacing,
                active: true,
            },
            MediationType {
                id: 2,
                name: "Introductory Call Scheduled".to_string(),
                role: MediationRole::TeacherFacing,
                active: true,
            },
            MediationType {
                id: 3,
                name: "Introductory Meeting Confirmed".to_string(),
                role: MediationRole::TeacherFacing,
                active: true,
            },
            MediationType {
                id: 4,
                name: "Specialist Consulting".to_string(),
                role: MediationRole::StudentFacing,
                active: true,
            },
        ];

        Self {
            subjects: Vec::new(),
            levels: Vec::new(),
            mediation_types,
        }
    }
}

impl CatalogReader for Catalog {
    fn subjects(&self, only_active: bool) -> Result<Vec<Subject>, StoreError> {
        Ok(self
            .subjects
            .iter()
            .filter(|subject| !only_active || subject.active)
            .cloned()
            .collect())
    }

    fn level(&self, id: u32) -> Result<Option<Level>, StoreError> {
        Ok(self.levels.iter().find(|level| level.id == id).cloned())
    }

    fn mediation_types(&self, only_active: bool) -> Result<Vec<MediationType>, StoreError> {
        Ok(self
            .mediation_types
            .iter()
            .filter(|mediation_type| !only_active || mediation_type.active)
            .cloned()
            .collect())
    }
}
