//! Per-locus genotype report
//!
//! One TSV line per region:
//!
//! ```text
//! region_name  contig  start  end  depth  alleles  fractions  call  allele_counts
//! TG-polyT     7       ...    ...  17     (TG)11-7T;(TG)5-2T  0.9412;0.0588  hom/--  (TG)11-7T:16;(TG)5-2T:1
//! ```
//!
//! Empty lists are written as `.`.

use crate::aggregate::{support_fractions, AlleleSupport, CountTable};
use crate::error::Result;
use crate::types::{Region, VariantLabel};
use crate::zygosity::{call, CallerConfig, Zygosity};

pub const TSV_HEADER: &str =
    "region_name\tcontig\tstart\tend\tdepth\talleles\tfractions\tcall\tallele_counts";

/// Allele ranking and zygosity call for one region
#[derive(Debug, Clone, PartialEq)]
pub struct LocusReport {
    pub region: Region,
    /// Number of classified reads
    pub depth: u64,
    /// Top alleles passed to the caller
    pub alleles: Vec<AlleleSupport>,
    /// Every observed label, most supported first
    pub counts: Vec<(VariantLabel, u64)>,
    pub call: String,
}

impl LocusReport {
    /// Rank the table, keep the `max_alleles` best supported labels and call them
    pub fn from_table(
        region: &Region,
        table: &CountTable,
        max_alleles: usize,
        config: &CallerConfig,
    ) -> Result<Self> {
        let depth = table.total();
        let alleles = support_fractions(table, max_alleles);

        let call = if depth == 0 || alleles.is_empty() {
            Zygosity::NoCall.to_string()
        } else {
            let labels: Vec<String> = alleles.iter().map(|a| a.label.suffix()).collect();
            let fractions: Vec<f64> = alleles.iter().map(|a| a.fraction).collect();
            call(&labels, &fractions, config)?
        };

        Ok(LocusReport {
            region: region.clone(),
            depth,
            alleles,
            counts: table.ranked(),
            call,
        })
    }

    /// Report for a region without any classified read
    pub fn empty(region: &Region) -> Self {
        LocusReport {
            region: region.clone(),
            depth: 0,
            alleles: Vec::new(),
            counts: Vec::new(),
            call: Zygosity::NoCall.to_string(),
        }
    }

    pub fn to_tsv_line(&self) -> String {
        let alleles = join_or_dot(self.alleles.iter().map(|a| a.label.to_string()));
        let fractions = join_or_dot(self.alleles.iter().map(|a| format!("{:.4}", a.fraction)));
        let counts = join_or_dot(
            self.counts
                .iter()
                .map(|(label, count)| format!("{label}:{count}")),
        );

        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.region.region_name,
            self.region.chrom,
            self.region.start_pos,
            self.region.end_pos,
            self.depth,
            alleles,
            fractions,
            self.call,
            counts
        )
    }
}

fn join_or_dot<I: Iterator<Item = String>>(items: I) -> String {
    let joined = items.collect::<Vec<_>>().join(";");
    if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locus() -> Region {
        Region::new("7", 117188661, 117188690, "TG-polyT")
    }

    #[test]
    fn test_report_for_reference_homozygote() {
        let mut table = CountTable::new();
        table.add_count(VariantLabel::new(11, 7), 16);
        table.add_count(VariantLabel::new(5, 2), 1);

        let report = LocusReport::from_table(&locus(), &table, 2, &CallerConfig::default()).unwrap();
        assert_eq!(report.depth, 17);
        assert_eq!(report.call, "hom/--");
        assert_eq!(
            report.to_tsv_line(),
            "TG-polyT\t7\t117188661\t117188690\t17\t(TG)11-7T;(TG)5-2T\t0.9412;0.0588\thom/--\t(TG)11-7T:16;(TG)5-2T:1"
        );
    }

    #[test]
    fn test_report_keeps_all_counts_but_calls_top_alleles() {
        let mut table = CountTable::new();
        table.add_count(VariantLabel::new(11, 9), 8);
        table.add_count(VariantLabel::new(5, 2), 7);
        table.add_count(VariantLabel::new(0, 0), 5);

        let report = LocusReport::from_table(&locus(), &table, 2, &CallerConfig::default()).unwrap();
        assert_eq!(report.alleles.len(), 2);
        assert_eq!(report.counts.len(), 3);
        assert_eq!(report.call, "het/het");
        assert!(report.to_tsv_line().ends_with("(TG)11-9T:8;(TG)5-2T:7;(TG)0-0T:5"));
    }

    #[test]
    fn test_report_without_reads() {
        let report =
            LocusReport::from_table(&locus(), &CountTable::new(), 2, &CallerConfig::default()).unwrap();
        assert_eq!(report, LocusReport::empty(&locus()));
        assert_eq!(
            report.to_tsv_line(),
            "TG-polyT\t7\t117188661\t117188690\t0\t.\t.\t--\t."
        );
    }

    #[test]
    fn test_header_matches_line_width() {
        let columns = TSV_HEADER.split('\t').count();
        assert_eq!(columns, 9);
        assert_eq!(LocusReport::empty(&locus()).to_tsv_line().split('\t').count(), columns);
    }
}
