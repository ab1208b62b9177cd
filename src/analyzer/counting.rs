//! Ticket counting over bot partitions.
//!
//! Every table is built from one primitive, [`grouped_count`], which walks each
//! requested partition once and tallies a fixed list of values. The public
//! functions only reshape its output for the report layouts.
//!
//! Missing data policy, shared by all tables: a key absent from the partition
//! map, or a partition lacking the tallied or status column, is skipped with a
//! warning and contributes no entry. An absent entry means "unavailable"; a
//! present `0` means "no matching ticket".

use std::collections::HashMap;

use indexmap::IndexMap;

use super::partition::PartitionMap;
use crate::parser::columns::MODE;
use crate::parser::types::RecordSet;

pub type CountTable = IndexMap<String, usize>;
pub type NestedCountTable = IndexMap<String, IndexMap<String, usize>>;

/// Restricts a tally to rows where `column == value`.
#[derive(Debug, Clone, Copy)]
pub struct StatusFilter<'a> {
    pub column: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, Copy)]
pub struct TallySpec<'a> {
    /// Column whose cells are compared against `values`.
    pub column: &'a str,
    pub values: &'a [String],
    pub filter: Option<StatusFilter<'a>>,
    /// Compare lower-cased, trimmed text on both sides.
    pub normalize: bool,
}

/// Counts for one partition, aligned with `TallySpec::values`.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTally {
    pub key: String,
    pub counts: Vec<usize>,
}

impl GroupTally {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Tallies `spec.values` in each listed partition. Keys that cannot be
/// counted are skipped (see module docs), so the output may be shorter than `keys`.
pub fn grouped_count(partitions: &PartitionMap, keys: &[String], spec: &TallySpec) -> Vec<GroupTally> {
    // value → every position it occupies in `values` (duplicates are tallied twice)
    let mut lookup: HashMap<String, Vec<usize>> = HashMap::new();
    for (pos, value) in spec.values.iter().enumerate() {
        let v = if spec.normalize {
            normalize_text(value)
        } else {
            value.clone()
        };
        lookup.entry(v).or_default().push(pos);
    }

    let mut out = Vec::with_capacity(keys.len());
    for key in keys {
        let Some(records) = partitions.get(key) else {
            log::warn!("Key '{}' does not exist in the partitions, skipping", key);
            continue;
        };
        let Some(col) = records.column_index(spec.column) else {
            log::warn!(
                "Column '{}' does not exist in partition '{}', skipping",
                spec.column,
                key
            );
            continue;
        };
        let filter = match spec.filter {
            Some(f) => match records.column_index(f.column) {
                Some(idx) => Some((idx, f.value)),
                None => {
                    log::warn!(
                        "Column '{}' does not exist in partition '{}', skipping",
                        f.column,
                        key
                    );
                    continue;
                }
            },
            None => None,
        };

        let mut counts = vec![0usize; spec.values.len()];
        for row in records.rows() {
            if let Some((idx, wanted)) = filter {
                if row[idx].as_text() != Some(wanted) {
                    continue;
                }
            }
            let Some(text) = row[col].as_text() else {
                continue;
            };
            let hit = if spec.normalize {
                lookup.get(&normalize_text(text))
            } else {
                lookup.get(text)
            };
            for &pos in hit.into_iter().flatten() {
                counts[pos] += 1;
            }
        }

        out.push(GroupTally {
            key: key.clone(),
            counts,
        });
    }
    out
}

/// `"{bot}_{value}"` → number of the bot's rows with `column == value`.
pub fn total_ticket_received_count(
    partitions: &PartitionMap,
    keys: &[String],
    values: &[String],
    column: &str,
) -> CountTable {
    let spec = TallySpec {
        column,
        values,
        filter: None,
        normalize: false,
    };
    let mut table = CountTable::new();
    for tally in grouped_count(partitions, keys, &spec) {
        for (value, count) in values.iter().zip(&tally.counts) {
            table.insert(format!("{}_{}", tally.key, value), *count);
        }
    }
    table
}

/// `"total_{status}_ticket_{bot}_{mode}"` → number of the bot's rows with
/// `status_column == status_value` and `Mode == mode`.
pub fn count_tickets_for_unique_modes(
    partitions: &PartitionMap,
    keys: &[String],
    modes: &[String],
    status_column: &str,
    status_value: &str,
) -> CountTable {
    let spec = TallySpec {
        column: MODE,
        values: modes,
        filter: Some(StatusFilter {
            column: status_column,
            value: status_value,
        }),
        normalize: false,
    };
    let mut table = CountTable::new();
    for tally in grouped_count(partitions, keys, &spec) {
        for (mode, count) in modes.iter().zip(&tally.counts) {
            table.insert(
                format!("total_{}_ticket_{}_{}", status_value, tally.key, mode),
                *count,
            );
        }
    }
    table
}

/// Value → bot → count. Same numbers as [`total_ticket_received_count`],
/// transposed for the mode-as-column pivot. Every value gets an entry.
pub fn total_ticket_received_count_modewise(
    partitions: &PartitionMap,
    keys: &[String],
    values: &[String],
    column: &str,
) -> NestedCountTable {
    let spec = TallySpec {
        column,
        values,
        filter: None,
        normalize: false,
    };
    transpose(values, grouped_count(partitions, keys, &spec))
}

/// Bot → number of the bot's rows with `status_column == status_value` whose
/// `Mode` is any of `modes`.
pub fn count_bot_wise_status_tickets(
    partitions: &PartitionMap,
    keys: &[String],
    modes: &[String],
    status_column: &str,
    status_value: &str,
) -> CountTable {
    let spec = TallySpec {
        column: MODE,
        values: modes,
        filter: Some(StatusFilter {
            column: status_column,
            value: status_value,
        }),
        normalize: false,
    };
    grouped_count(partitions, keys, &spec)
        .into_iter()
        .map(|t| {
            let total = t.total();
            (t.key, total)
        })
        .collect()
}

/// Problem text → bot → count, comparing lower-cased, trimmed text.
/// Outer keys keep the spelling given in `values`.
pub fn problem_reported_count_botwise(
    partitions: &PartitionMap,
    keys: &[String],
    values: &[String],
    column: &str,
) -> NestedCountTable {
    let spec = TallySpec {
        column,
        values,
        filter: None,
        normalize: true,
    };
    transpose(values, grouped_count(partitions, keys, &spec))
}

/// Distinct problem texts of `column` after normalization, in first-seen order.
/// A missing column yields an empty list.
pub fn normalize_problem_values(records: &RecordSet, column: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .distinct_text(column)
        .iter()
        .map(|v| normalize_text(v))
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

fn transpose(values: &[String], tallies: Vec<GroupTally>) -> NestedCountTable {
    let mut table: NestedCountTable = values
        .iter()
        .map(|v| (v.clone(), IndexMap::new()))
        .collect();
    for tally in tallies {
        for (value, count) in values.iter().zip(&tally.counts) {
            if let Some(inner) = table.get_mut(value) {
                inner.insert(tally.key.clone(), *count);
            }
        }
    }
    table
}
