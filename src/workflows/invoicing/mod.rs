//! Invoice aggregation: groups raw lesson-detail rows into billable line
//! items, applying the contractual minimum-lesson floor. One parameterized
//! path serves receivables and payables alike.

pub mod domain;
pub mod reader;

pub use domain::{BillableLine, InvoiceError, InvoiceSide, RawLessonRow};
pub use reader::{parse_lesson_rows, LessonHistoryReader};

use std::collections::BTreeMap;

use crate::workflows::contracts::domain::ContractTerms;
use domain::LineKey;

/// Description text identifying the one-time registration-fee line item, which
/// is never lesson-denominated and therefore exempt from the floor rule.
pub const REGISTRATION_FEE_DESCRIPTION: &str = "Registration Fee";

struct LineAccumulator {
    summed_count: f64,
    raw_total: f64,
}

/// Group raw lesson rows into billable lines under the given contract terms.
///
/// Counts are rounded to the nearest integer before the floor comparison and
/// before display; money is rounded to 2 decimal places only on the final
/// line total, never during accumulation. A row whose rate is not a finite,
/// representable amount rejects the whole run rather than folding into a
/// wrong group. Pure function of its inputs.
pub fn aggregate_line_items(
    rows: &[RawLessonRow],
    terms: &ContractTerms,
) -> Result<Vec<BillableLine>, InvoiceError> {
    let mut groups: BTreeMap<LineKey, LineAccumulator> = BTreeMap::new();

    for row in rows {
        let key = LineKey::for_row(row)?;
        let entry = groups.entry(key).or_insert(LineAccumulator {
            summed_count: 0.0,
            raw_total: 0.0,
        });
        entry.summed_count += row.lesson_count;
        entry.raw_total += row.lesson_count * row.rate;
    }

    let lines = groups
        .into_iter()
        .map(|(key, accumulator)| {
            let rate = key.rate_cents as f64 / 100.0;
            let rounded_count = accumulator.summed_count.round().max(0.0) as u32;
            let is_registration_fee = key.description == REGISTRATION_FEE_DESCRIPTION;

            let billed_lesson_count = if !is_registration_fee
                && terms.charge_minimum_lessons
                && terms.minimum_lessons > rounded_count
            {
                terms.minimum_lessons
            } else {
                rounded_count
            };

            let total = if is_registration_fee {
                round_money(accumulator.raw_total)
            } else {
                round_money(rate * f64::from(billed_lesson_count))
            };

            BillableLine {
                subject_ref: key.subject_ref,
                description: key.description,
                duration_label: key.duration_label,
                period_label: key.period_label,
                rate,
                raw_lesson_count: accumulator.summed_count,
                billed_lesson_count,
                total,
            }
        })
        .collect();
    Ok(lines)
}

fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
