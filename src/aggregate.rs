//! Read aggregation
//!
//! Extracts and classifies every read over a region and tallies how many
//! reads support each repeat label.

use std::collections::HashMap;

use log::debug;
use rayon::prelude::*;

use crate::alignment::AlignedRead;
use crate::extract::extract_region_bases;
use crate::repeat::classify;
use crate::types::{Region, VariantLabel};

/// Read counts per repeat label for one region
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    counts: HashMap<VariantLabel, u64>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, label: VariantLabel) {
        self.add_count(label, 1);
    }

    pub fn add_count(&mut self, label: VariantLabel, count: u64) {
        *self.counts.entry(label).or_insert(0) += count;
    }

    pub fn get(&self, label: &VariantLabel) -> u64 {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Number of classified reads
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct labels
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VariantLabel, &u64)> {
        self.counts.iter()
    }

    /// Share of reads supporting `label`; 0 for an empty table
    pub fn fraction(&self, label: &VariantLabel) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.get(label) as f64 / total as f64
        }
    }

    /// Labels by descending count, ties broken by ascending label
    pub fn ranked(&self) -> Vec<(VariantLabel, u64)> {
        let mut ranked: Vec<(VariantLabel, u64)> =
            self.counts.iter().map(|(label, count)| (*label, *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    /// Add another table's counts into this one
    pub fn merge(&mut self, other: CountTable) {
        for (label, count) in other.counts {
            self.add_count(label, count);
        }
    }
}

impl FromIterator<VariantLabel> for CountTable {
    fn from_iter<I: IntoIterator<Item = VariantLabel>>(iter: I) -> Self {
        let mut table = CountTable::new();
        for label in iter {
            table.add(label);
        }
        table
    }
}

/// Label and share of reads for one of the most supported alleles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlleleSupport {
    pub label: VariantLabel,
    pub count: u64,
    pub fraction: f64,
}

/// Classify one read over `region`
pub fn classify_read<R: AlignedRead + ?Sized>(read: &R, region: &Region) -> VariantLabel {
    let bases = extract_region_bases(read, region.start_pos, region.end_pos);
    let label = classify(&bases);
    debug!(
        "{} {}: {:?} -> {}",
        region.region_name,
        read.query_name(),
        bases,
        label
    );
    label
}

/// Count labels over one region. Reads without coverage are counted under
/// the empty-sequence label.
pub fn aggregate_region<R: AlignedRead>(reads: &[R], region: &Region) -> CountTable {
    reads.iter().map(|read| classify_read(read, region)).collect()
}

/// One count table per region, in region order
pub fn aggregate<R: AlignedRead>(reads: &[R], regions: &[Region]) -> Vec<CountTable> {
    regions
        .iter()
        .map(|region| aggregate_region(reads, region))
        .collect()
}

/// Parallel version of [`aggregate_region`]: per-thread tables merged at the end
pub fn par_aggregate_region<R: AlignedRead + Sync>(reads: &[R], region: &Region) -> CountTable {
    reads
        .par_iter()
        .fold(CountTable::new, |mut table, read| {
            table.add(classify_read(read, region));
            table
        })
        .reduce(CountTable::new, |mut left, right| {
            left.merge(right);
            left
        })
}

/// The `max_alleles` best supported labels with their read fractions
pub fn support_fractions(table: &CountTable, max_alleles: usize) -> Vec<AlleleSupport> {
    let total = table.total();
    table
        .ranked()
        .into_iter()
        .take(max_alleles)
        .map(|(label, count)| AlleleSupport {
            label,
            count,
            fraction: if total == 0 { 0.0 } else { count as f64 / total as f64 },
        })
        .collect()
}
