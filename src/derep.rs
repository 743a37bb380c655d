use crate::io::until_err;
use crate::record::AbundanceRecord;
use anyhow::Result;
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeMap;

/// Occurrence counts of exact sequences, in the order each sequence was first seen.
pub struct AbundanceMap {
    pub by_seq: IndexMap<Vec<u8>, usize>,
}

impl AbundanceMap {
    pub fn new() -> Self {
        AbundanceMap {
            by_seq: Default::default(),
        }
    }

    pub fn insert(&mut self, seq: Vec<u8>) {
        self.by_seq
            .entry(seq)
            .and_modify(|e| *e += 1)
            .or_insert(1);
    }

    /// Consumes the map, returning every sequence with `count >= min_count` ordered by count
    /// (descending). The sort is stable, so ties stay in first-seen order.
    pub fn into_records(self, min_count: usize) -> Vec<AbundanceRecord> {
        self.by_seq
            .into_iter()
            .filter(|(_, count)| *count >= min_count)
            .map(|(seq, count)| AbundanceRecord::new(seq, count))
            .sorted_by(|a, b| b.count.cmp(&a.count))
            .collect()
    }
}

#[derive(Serialize, Debug, Default)]
pub struct DerepStatistics {
    /// sequences received, after the length filter
    pub total_reads: usize,
    pub unique_sequences: usize,
    pub retained_sequences: usize,
    pub retained_reads: usize,
    pub singletons: usize,
    /// abundance -> number of unique sequences with that abundance
    pub distribution: BTreeMap<usize, usize>,
}

/// Collapses identical sequences into abundance records.
///
/// # Arguments
///
/// * `sequences` - The sequences to dereplicate, already filtered by length.
/// * `min_count` - The minimum number of occurrences for a sequence to be kept.
///
/// # Returns
///
/// A tuple containing:
/// - `Vec<AbundanceRecord>`: the retained sequences in descending count order, ties broken by
///   first occurrence.
/// - `DerepStatistics`: statistics about the dereplication.
///
/// # Errors
///
/// Iteration stops at the first error from `sequences`, which is then returned.
pub fn dereplicate(
    sequences: impl Iterator<Item = Result<Vec<u8>>>,
    min_count: usize,
) -> Result<(Vec<AbundanceRecord>, DerepStatistics)> {
    info!("Dereplicating sequences...");

    let mut err = Ok(());
    let mut map = AbundanceMap::new();
    let mut stats = DerepStatistics::default();

    sequences.scan(&mut err, until_err).for_each(|seq| {
        stats.total_reads += 1;
        map.insert(seq);
    });
    err?;

    stats.unique_sequences = map.by_seq.len();
    for count in map.by_seq.values() {
        *stats.distribution.entry(*count).or_insert(0) += 1;
    }
    stats.singletons = stats.distribution.get(&1).copied().unwrap_or(0);

    let records = map.into_records(min_count);

    stats.retained_sequences = records.len();
    stats.retained_reads = records.iter().map(|r| r.count).sum();

    info!(
        "{} reads collapsed into {} unique sequences, {} with count >= {min_count}",
        stats.total_reads, stats.unique_sequences, stats.retained_sequences
    );

    Ok((records, stats))
}
