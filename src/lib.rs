// tgpolyt library - TG-polyT repeat genotyping from aligned reads
//
// This library genotypes a TG-polyT repeat locus by:
// 1. Reading loci from BED files
// 2. Fetching overlapping reads from indexed BAM files
// 3. Extracting each read's bases over the locus and classifying them as (TG)n-mT
// 4. Counting reads per allele and calling zygosity from the support fractions
// 5. Writing one report line per locus

pub mod aggregate; // Per-region read counts and support fractions
pub mod alignment; // Read and alignment-source traits, in-memory implementations
pub mod bam; // Indexed BAM access and read filters
pub mod bed; // BED file parsing and region loading
pub mod error;
pub mod extract; // Region base extraction from aligned reads
pub mod output; // Plain or BGZF report output
pub mod repeat; // (TG)n-mT classification
pub mod report; // Per-locus TSV report
pub mod types; // Common data structures and types
pub mod zygosity; // hom / hom alt / het / -- calls

// Re-export commonly used types for convenience
pub use aggregate::{
    aggregate, aggregate_region, par_aggregate_region, support_fractions, AlleleSupport,
    CountTable,
};
pub use alignment::{AlignedPair, AlignedRead, AlignmentSource, MemoryRead, MemorySource};
pub use bam::{IndexedBamSource, ReadFilter};
pub use bed::load_bed_regions;
pub use error::{Error, Result};
pub use extract::{extract_reads, extract_region_bases};
pub use output::ReportOutput;
pub use repeat::{classify, NO_REPEAT};
pub use report::{LocusReport, TSV_HEADER};
pub use types::{Region, VariantLabel};
pub use zygosity::{call, call_with_threshold, CallerConfig, Zygosity};

/// Fetch, classify and count the reads of one region
pub fn genotype_region<S: AlignmentSource>(source: &mut S, region: &Region) -> Result<CountTable> {
    let reads = source.fetch(&region.chrom, region.start_pos, region.end_pos)?;
    log::debug!(
        "{} ({}): {} reads",
        region.region_name,
        region.region_string(),
        reads.len()
    );
    Ok(aggregate_region(&reads, region))
}
