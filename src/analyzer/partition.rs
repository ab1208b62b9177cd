use indexmap::IndexMap;

use crate::error::AppError;
use crate::parser::types::RecordSet;

/// Bot name → that bot's rows, in key-list order.
pub type PartitionMap = IndexMap<String, RecordSet>;

/// Distinct bot names of a record set, in first-seen order.
/// Computed once on the unfiltered records so every partitioning call of a run
/// shares the same keys.
pub fn bot_keys(records: &RecordSet, bot_column: &str) -> Vec<String> {
    records.distinct_text(bot_column)
}

/// Splits `records` into one record set per key, including empty ones.
/// Rows whose bot is not in `keys` are dropped.
pub fn split_by_bot_name(
    records: &RecordSet,
    keys: &[String],
    bot_column: &str,
) -> Result<PartitionMap, AppError> {
    let idx = records
        .column_index(bot_column)
        .ok_or_else(|| AppError::missing_column(bot_column))?;

    let mut partitions: PartitionMap = keys
        .iter()
        .map(|k| (k.clone(), records.empty_like()))
        .collect();

    let mut dropped = 0usize;
    for row in records.rows() {
        match row[idx].as_text().and_then(|bot| partitions.get_mut(bot)) {
            Some(part) => part.push_row(row.clone()),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("{} row(s) with an unlisted bot dropped from partitions", dropped);
    }
    Ok(partitions)
}
