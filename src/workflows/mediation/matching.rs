use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{Gender, Student, StudentSubject, Teacher, TeacherStatus};
use super::geo::haversine_km;
use super::repository::{LedgerRepository, StoreError, TeacherRepository};

/// Which part of the teacher pool a search draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeacherScope {
    Hired,
    Inactive,
    Applicant,
}

impl TeacherScope {
    fn status(self) -> TeacherStatus {
        match self {
            TeacherScope::Hired => TeacherStatus::Hired,
            TeacherScope::Inactive => TeacherStatus::Inactive,
            TeacherScope::Applicant => TeacherStatus::New,
        }
    }
}

/// How requested subjects combine during qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectRule {
    /// Teacher must cover every requested subject at or above the requested
    /// level.
    All,
    /// Any single overlapping subject qualifies, regardless of level.
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFilters {
    pub scope: TeacherScope,
    pub gender: Option<Gender>,
    pub radius_km: f64,
    pub rule: SubjectRule,
}

/// Boolean fitness checks; a candidate is eligible only when all hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub subject_match: bool,
    pub level_match: bool,
    pub available: bool,
}

impl Compatibility {
    pub fn eligible(self) -> bool {
        self.subject_match && self.level_match && self.available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub teacher: Teacher,
    pub compatibility: Compatibility,
    /// `None` when either end lacks coordinates; unknown distance never
    /// excludes a candidate, it only ranks after known distances.
    pub distance_km: Option<f64>,
    pub active_students: usize,
}

/// Rank the teacher pool against a student's outstanding subjects.
///
/// Pure query: no side effects, and any retrieval failure propagates as-is
/// rather than producing a partial result.
pub fn find_candidates<T, L>(
    student: &Student,
    outstanding: &[StudentSubject],
    filters: &CandidateFilters,
    teachers: &T,
    ledger: &L,
) -> Result<Vec<RankedCandidate>, StoreError>
where
    T: TeacherRepository,
    L: LedgerRepository,
{
    let pool = teachers.teachers_with_status(filters.scope.status())?;

    let mut candidates = Vec::new();
    for teacher in pool {
        if let Some(required) = filters.gender {
            if teacher.gender != required {
                continue;
            }
        }

        let subject_match = outstanding
            .iter()
            .any(|subject| teacher.expertise_for(subject.subject_id).is_some());
        if !subject_match {
            continue;
        }

        let level_match = match filters.rule {
            SubjectRule::Any => true,
            SubjectRule::All => outstanding.iter().all(|subject| {
                teacher
                    .expertise_for(subject.subject_id)
                    .map(|row| row.level_id >= subject.requested_level_id)
                    .unwrap_or(false)
            }),
        };
        if !level_match {
            continue;
        }

        let distance_km = match (student.coordinates, teacher.coordinates) {
            (Some(origin), Some(target)) => Some(haversine_km(origin, target)),
            _ => None,
        };
        if let Some(distance) = distance_km {
            // Inclusive boundary: a candidate exactly on the radius stays in.
            if distance > filters.radius_km {
                continue;
            }
        }

        let active_students = ledger.active_assignment_count(teacher.id)?;
        let available = teacher
            .capacity
            .map(|capacity| active_students < capacity as usize)
            .unwrap_or(true);
        if !available {
            continue;
        }

        candidates.push(RankedCandidate {
            compatibility: Compatibility {
                subject_match,
                level_match,
                available,
            },
            teacher,
            distance_km,
            active_students,
        });
    }

    candidates.sort_by(|a, b| {
        compare_distance(a.distance_km, b.distance_km)
            .then_with(|| a.active_students.cmp(&b.active_students))
    });

    Ok(candidates)
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
