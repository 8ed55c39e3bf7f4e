//! BAM file access
//!
//! This module provides:
//! - [`ReadFilter`]: which alignments take part in genotyping
//! - [`IndexedBamSource`]: an [`AlignmentSource`] over an indexed BAM/CRAM file

use std::path::{Path, PathBuf};

use log::{debug, warn};
use rust_htslib::bam::{self, Read, Record};

use crate::alignment::AlignmentSource;
use crate::error::Result;

/// Alignment filters applied while fetching reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadFilter {
    pub min_mapq: u8,
    pub skip_unmapped: bool,
    pub skip_secondary: bool,
    pub skip_supplementary: bool,
    pub skip_qc_failed: bool,
    pub skip_duplicates: bool,
}

impl Default for ReadFilter {
    fn default() -> Self {
        ReadFilter {
            min_mapq: 0,
            skip_unmapped: true,
            skip_secondary: true,
            skip_supplementary: true,
            skip_qc_failed: true,
            skip_duplicates: true,
        }
    }
}

impl ReadFilter {
    /// Keep every record the index returns
    pub fn permissive() -> Self {
        ReadFilter {
            min_mapq: 0,
            skip_unmapped: false,
            skip_secondary: false,
            skip_supplementary: false,
            skip_qc_failed: false,
            skip_duplicates: false,
        }
    }

    pub fn accepts(&self, record: &Record) -> bool {
        if self.skip_unmapped && record.is_unmapped() {
            return false;
        }
        if self.skip_secondary && record.is_secondary() {
            return false;
        }
        if self.skip_supplementary && record.is_supplementary() {
            return false;
        }
        if self.skip_qc_failed && record.is_quality_check_failed() {
            return false;
        }
        if self.skip_duplicates && record.is_duplicate() {
            return false;
        }
        record.mapq() >= self.min_mapq
    }
}

/// Indexed BAM reader handing out the filtered reads of a region.
///
/// The underlying reader is not `Sync`; open one source per worker thread.
pub struct IndexedBamSource {
    reader: bam::IndexedReader,
    path: PathBuf,
    filter: ReadFilter,
}

impl IndexedBamSource {
    /// Open `path`; the index (`.bai`/`.csi`) must sit next to it
    pub fn open<P: AsRef<Path>>(path: P, filter: ReadFilter) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Opening indexed BAM {path:?}");
        let reader = bam::IndexedReader::from_path(&path)?;
        Ok(IndexedBamSource {
            reader,
            path,
            filter,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filter(&self) -> &ReadFilter {
        &self.filter
    }

    /// Whether the BAM header declares `chrom`
    pub fn has_contig(&self, chrom: &str) -> bool {
        self.reader.header().tid(chrom.as_bytes()).is_some()
    }
}

impl AlignmentSource for IndexedBamSource {
    type Read = Record;

    fn fetch(&mut self, chrom: &str, start: usize, end: usize) -> Result<Vec<Record>> {
        let Some(tid) = self.reader.header().tid(chrom.as_bytes()) else {
            warn!("Contig '{chrom}' not found in {:?}; no reads for {chrom}:{start}-{end}", self.path);
            return Ok(Vec::new());
        };

        // htslib windows are half-open
        self.reader.fetch((tid as i32, start as i64, end as i64 + 1))?;

        let mut reads = Vec::new();
        let mut skipped = 0usize;
        for result in self.reader.records() {
            let record = result?;
            if self.filter.accepts(&record) {
                reads.push(record);
            } else {
                skipped += 1;
            }
        }

        debug!(
            "BAM query {chrom}:{start}-{end}: {} reads kept, {skipped} filtered",
            reads.len()
        );
        Ok(reads)
    }
}
