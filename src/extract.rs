//! Region base extraction
//!
//! Collects the read bases aligned to a reference interval, in reference
//! order. Deleted positions contribute nothing; inserted bases contribute
//! when the insertion sits strictly inside the interval.

use crate::alignment::AlignedRead;
use crate::types::Region;

/// Extract the bases of `read` aligned to the closed interval `[start, end]`
///
/// **Returns:**
/// - The aligned bases, exactly as stored in the read
/// - An empty string when the read has no aligned base in the interval
pub fn extract_region_bases<R: AlignedRead + ?Sized>(read: &R, start: usize, end: usize) -> String {
    let mut bases = String::new();

    // Inserted bases seen since the last reference position
    let mut pending: Vec<u8> = Vec::new();
    let mut last_ref: Option<usize> = None;

    for pair in read.aligned_pairs() {
        match pair.ref_pos {
            Some(ref_pos) => {
                // Flush an insertion lying between two positions of the interval
                if !pending.is_empty() {
                    let opened_inside = last_ref.is_some_and(|last| last >= start);
                    if opened_inside && ref_pos <= end {
                        bases.extend(pending.iter().map(|&b| b as char));
                    }
                    pending.clear();
                }
                last_ref = Some(ref_pos);

                if ref_pos < start || ref_pos > end {
                    continue;
                }
                if let Some(base) = pair.query_pos.and_then(|q| read.query_base(q)) {
                    bases.push(base as char);
                }
            }
            None => {
                if let Some(base) = pair.query_pos.and_then(|q| read.query_base(q)) {
                    pending.push(base);
                }
            }
        }
    }

    bases
}

/// Extract every read's bases over `region`, one (possibly empty) string per read
pub fn extract_reads<R: AlignedRead>(reads: &[R], region: &Region) -> Vec<String> {
    reads
        .iter()
        .map(|read| extract_region_bases(read, region.start_pos, region.end_pos))
        .collect()
}
