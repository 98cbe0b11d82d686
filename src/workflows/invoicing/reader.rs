use std::io::Read;

use serde::{Deserialize, Deserializer};

use crate::workflows::mediation::domain::StudentId;
use crate::workflows::mediation::repository::StoreError;

use super::domain::RawLessonRow;

/// Source of raw per-lesson rows, keyed by (student, subject reference).
pub trait LessonHistoryReader: Send + Sync {
    fn lessons_for(
        &self,
        student: StudentId,
        subject_ref: &str,
    ) -> Result<Vec<RawLessonRow>, StoreError>;
}

/// Parse a lesson-history CSV export into raw rows ready for aggregation.
pub fn parse_lesson_rows<R: Read>(reader: R) -> Result<Vec<RawLessonRow>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for record in csv_reader.deserialize::<LessonRow>() {
        let row = record?;
        rows.push(RawLessonRow {
            subject_ref: row.subject,
            description: row.description,
            duration_label: row.duration.unwrap_or_default(),
            rate: row.rate,
            period_label: row.period.unwrap_or_default(),
            lesson_count: row.lessons,
        });
    }

    Ok(rows)
}

#[derive(Debug, Deserialize)]
struct LessonRow {
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Duration", default, deserialize_with = "empty_string_as_none")]
    duration: Option<String>,
    #[serde(rename = "Rate")]
    rate: f64,
    #[serde(rename = "Period", default, deserialize_with = "empty_string_as_none")]
    period: Option<String>,
    #[serde(rename = "Lessons")]
    lessons: f64,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|text| !text.trim().is_empty()))
}
