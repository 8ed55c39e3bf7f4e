//! Read and alignment-source capabilities
//!
//! The genotyping core only needs two things from an alignment file:
//! - the reads overlapping a genomic interval ([`AlignmentSource`])
//! - for each read, which query base sits on which reference position ([`AlignedRead`])
//!
//! Both are traits so the core does not depend on a particular BAM library.
//! [`MemoryRead`]/[`MemorySource`] keep reads in memory, and
//! `rust_htslib::bam::Record` implements [`AlignedRead`] directly.

use std::collections::HashMap;

use rust_htslib::bam;
use rust_htslib::bam::record::{Cigar, CigarString};

use crate::error::Result;

/// One step of an alignment, in the style of pysam's
/// `get_aligned_pairs(matches_only=False)`.
///
/// Insertions and soft clips have no reference position; deletions and
/// reference skips have no query position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignedPair {
    pub query_pos: Option<usize>,
    pub ref_pos: Option<usize>,
}

impl AlignedPair {
    pub fn new(query_pos: Option<usize>, ref_pos: Option<usize>) -> Self {
        AlignedPair { query_pos, ref_pos }
    }
}

/// Read-only view of an aligned read
pub trait AlignedRead {
    fn query_name(&self) -> String;

    /// Query/reference position pairs in alignment order
    fn aligned_pairs(&self) -> Vec<AlignedPair>;

    /// Decoded base (`A`, `C`, `G`, `T`, `N`, ...) at a query position
    fn query_base(&self, query_pos: usize) -> Option<u8>;

    /// First and last reference positions consumed by the alignment
    fn reference_span(&self) -> Option<(usize, usize)> {
        let mut positions = self.aligned_pairs().into_iter().filter_map(|p| p.ref_pos);
        let first = positions.next()?;
        let last = positions.last().unwrap_or(first);
        Some((first, last))
    }
}

/// Anything that can hand out the reads overlapping a genomic interval
pub trait AlignmentSource {
    type Read: AlignedRead;

    /// Reads overlapping the closed interval `[start, end]` on `chrom`
    fn fetch(&mut self, chrom: &str, start: usize, end: usize) -> Result<Vec<Self::Read>>;
}

/// Expand CIGAR operations into aligned pairs.
///
/// `alignment_start` is the 0-based reference position of the first
/// reference-consuming operation. Hard clips and padding consume neither
/// sequence.
pub fn pairs_from_cigar(alignment_start: i64, ops: &[Cigar]) -> Vec<AlignedPair> {
    let mut pairs = Vec::new();
    if alignment_start < 0 {
        return pairs;
    }

    let mut ref_pos = alignment_start as usize;
    let mut read_pos = 0usize;

    for op in ops {
        match *op {
            Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => {
                for _ in 0..len {
                    pairs.push(AlignedPair::new(Some(read_pos), Some(ref_pos)));
                    read_pos += 1;
                    ref_pos += 1;
                }
            }
            Cigar::Ins(len) | Cigar::SoftClip(len) => {
                for _ in 0..len {
                    pairs.push(AlignedPair::new(Some(read_pos), None));
                    read_pos += 1;
                }
            }
            Cigar::Del(len) | Cigar::RefSkip(len) => {
                for _ in 0..len {
                    pairs.push(AlignedPair::new(None, Some(ref_pos)));
                    ref_pos += 1;
                }
            }
            Cigar::HardClip(_) | Cigar::Pad(_) => {}
        }
    }

    pairs
}

impl AlignedRead for bam::Record {
    fn query_name(&self) -> String {
        String::from_utf8_lossy(self.qname()).into_owned()
    }

    fn aligned_pairs(&self) -> Vec<AlignedPair> {
        if self.is_unmapped() {
            return Vec::new();
        }
        let cigar = self.cigar();
        let ops: Vec<Cigar> = cigar.iter().copied().collect();
        pairs_from_cigar(self.pos(), &ops)
    }

    fn query_base(&self, query_pos: usize) -> Option<u8> {
        let seq = self.seq();
        if query_pos < seq.len() {
            Some(seq[query_pos])
        } else {
            None
        }
    }
}

/// A read held in memory: name, alignment start, CIGAR and bases
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRead {
    pub name: String,
    pub alignment_start: usize,
    pub cigar: Vec<Cigar>,
    pub sequence: Vec<u8>,
}

impl MemoryRead {
    /// Build a read from a CIGAR string such as `"3M1I10M"`
    pub fn new(name: &str, alignment_start: usize, cigar: &str, sequence: &str) -> Result<Self> {
        let cigar = CigarString::try_from(cigar)?;
        Ok(MemoryRead {
            name: name.to_string(),
            alignment_start,
            cigar: cigar.0,
            sequence: sequence.as_bytes().to_vec(),
        })
    }

    /// Fully matched read (`<len>M`)
    pub fn matched(name: &str, alignment_start: usize, sequence: &str) -> Self {
        MemoryRead {
            name: name.to_string(),
            alignment_start,
            cigar: vec![Cigar::Match(sequence.len() as u32)],
            sequence: sequence.as_bytes().to_vec(),
        }
    }
}

impl AlignedRead for MemoryRead {
    fn query_name(&self) -> String {
        self.name.clone()
    }

    fn aligned_pairs(&self) -> Vec<AlignedPair> {
        pairs_from_cigar(self.alignment_start as i64, &self.cigar)
    }

    fn query_base(&self, query_pos: usize) -> Option<u8> {
        self.sequence.get(query_pos).copied()
    }
}

/// In-memory [`AlignmentSource`], reads grouped by contig
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    reads: HashMap<String, Vec<MemoryRead>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_read(&mut self, chrom: &str, read: MemoryRead) {
        self.reads.entry(chrom.to_string()).or_default().push(read);
    }

    pub fn len(&self) -> usize {
        self.reads.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AlignmentSource for MemorySource {
    type Read = MemoryRead;

    fn fetch(&mut self, chrom: &str, start: usize, end: usize) -> Result<Vec<MemoryRead>> {
        let Some(reads) = self.reads.get(chrom) else {
            return Ok(Vec::new());
        };

        Ok(reads
            .iter()
            .filter(|read| match read.reference_span() {
                Some((first, last)) => first <= end && last >= start,
                None => false,
            })
            .cloned()
            .collect())
    }
}
