use serde::{Deserialize, Serialize};

/// Error raised when raw rows cannot be priced.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("lesson rate {0} is not a usable amount")]
    InvalidRate(f64),
}

/// Which party a billing run addresses. The side only determines which rate
/// populated the raw rows; aggregation itself is side-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceSide {
    /// Student-facing invoice, priced at the contract's student rate.
    Receivable,
    /// Teacher-facing credit note, priced at the engagement's teacher rate.
    Payable,
}

impl InvoiceSide {
    pub fn select_rate(self, student_rate: f64, teacher_rate: f64) -> f64 {
        match self {
            InvoiceSide::Receivable => student_rate,
            InvoiceSide::Payable => teacher_rate,
        }
    }
}

/// One raw lesson-detail row as delivered by the lesson-history reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLessonRow {
    pub subject_ref: String,
    pub description: String,
    pub duration_label: String,
    pub rate: f64,
    pub period_label: String,
    pub lesson_count: f64,
}

/// Composite grouping key. The rate participates in cents so float noise in
/// the source data cannot split a group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct LineKey {
    pub subject_ref: String,
    pub description: String,
    pub duration_label: String,
    pub rate_cents: i64,
    pub period_label: String,
}

impl LineKey {
    pub(crate) fn for_row(row: &RawLessonRow) -> Result<Self, InvoiceError> {
        let cents = (row.rate * 100.0).round();
        if !cents.is_finite() || cents.abs() >= i64::MAX as f64 {
            return Err(InvoiceError::InvalidRate(row.rate));
        }
        Ok(Self {
            subject_ref: row.subject_ref.clone(),
            description: row.description.clone(),
            duration_label: row.duration_label.clone(),
            rate_cents: cents as i64,
            period_label: row.period_label.clone(),
        })
    }
}

/// Billable line item produced by aggregation. `raw_lesson_count` is the
/// recorded truth; `billed_lesson_count` may be raised by the contract's
/// minimum-lessons floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillableLine {
    pub subject_ref: String,
    pub description: String,
    pub duration_label: String,
    pub period_label: String,
    pub rate: f64,
    pub raw_lesson_count: f64,
    pub billed_lesson_count: u32,
    /// Line total rounded to 2 decimal places at render time only.
    pub total: f64,
}
