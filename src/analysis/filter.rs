//! Priority threshold filtering.

use crate::models::Record;

/// Keep records whose priority score meets the threshold, in input order.
///
/// No clamping is applied: a threshold above 100 simply matches nothing.
pub fn filter_by_priority(records: &[Record], threshold: u8) -> Vec<&Record> {
    records
        .iter()
        .filter(|record| record.priority_score >= threshold)
        .collect()
}
