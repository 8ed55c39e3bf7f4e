// Common data structures and types used throughout tgpolyt

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A genomic locus to genotype, usually one line of a BED file.
///
/// `start_pos` and `end_pos` are 0-based and both inclusive: the extractor
/// collects every read base aligned to `start_pos..=end_pos`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub chrom: String,
    pub start_pos: usize,
    pub end_pos: usize,
    pub region_name: String,
}

impl Region {
    pub fn new(chrom: &str, start_pos: usize, end_pos: usize, region_name: &str) -> Self {
        Region {
            chrom: chrom.to_string(),
            start_pos,
            end_pos,
            region_name: region_name.to_string(),
        }
    }

    /// Number of reference positions covered by the region
    pub fn len(&self) -> usize {
        (self.end_pos + 1).saturating_sub(self.start_pos)
    }

    pub fn is_empty(&self) -> bool {
        self.end_pos < self.start_pos
    }

    /// `chrom:start-end` form used in logs and reports
    pub fn region_string(&self) -> String {
        format!("{}:{}-{}", self.chrom, self.start_pos, self.end_pos)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.region_string())
    }
}

/// Parses `chrom:start-end`, optionally followed by `:name`.
/// Thousands separators (`,`) in the coordinates are accepted.
impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidRegion(s.to_string());

        let (head, last) = s.rsplit_once(':').ok_or_else(invalid)?;
        let (chrom, (start_pos, end_pos), name) = match parse_coordinates(last) {
            Some(coords) => (head, coords, "NA"),
            // `chrom:start-end:name`
            None => {
                let (chrom, coords) = head.rsplit_once(':').ok_or_else(invalid)?;
                (chrom, parse_coordinates(coords).ok_or_else(invalid)?, last)
            }
        };

        if chrom.is_empty() || end_pos < start_pos {
            return Err(invalid());
        }

        Ok(Region::new(chrom, start_pos, end_pos, name))
    }
}

fn parse_coordinates(coords: &str) -> Option<(usize, usize)> {
    let (start, end) = coords.split_once('-')?;
    let parse = |v: &str| v.replace(',', "").trim().parse::<usize>().ok();
    Some((parse(start)?, parse(end)?))
}

/// Canonical description of one TG-polyT allele: `(TG)<n>-<m>T`.
///
/// Ordering is by TG repeat count, then T run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct VariantLabel {
    pub tg_repeats: usize,
    pub t_run: usize,
}

impl VariantLabel {
    pub fn new(tg_repeats: usize, t_run: usize) -> Self {
        VariantLabel { tg_repeats, t_run }
    }

    /// The label without its `(TG)` prefix, e.g. `11-7T`
    pub fn suffix(&self) -> String {
        format!("{}-{}T", self.tg_repeats, self.t_run)
    }
}

impl fmt::Display for VariantLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(TG){}-{}T", self.tg_repeats, self.t_run)
    }
}

/// Accepts both `(TG)11-7T` and the bare suffix `11-7T`.
impl FromStr for VariantLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidLabel(s.to_string());

        let body = s.trim();
        let body = body.strip_prefix("(TG)").unwrap_or(body);
        let body = body.strip_suffix('T').ok_or_else(invalid)?;
        let (tg, t) = body.split_once('-').ok_or_else(invalid)?;

        Ok(VariantLabel {
            tg_repeats: tg.parse().map_err(|_| invalid())?,
            t_run: t.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_parsing() {
        let region: Region = "7:117188661-117188690".parse().unwrap();
        assert_eq!(region, Region::new("7", 117188661, 117188690, "NA"));
        assert_eq!(region.len(), 30);

        let named: Region = "chr7:117,188,661-117,188,690:TG-polyT".parse().unwrap();
        assert_eq!(named.chrom, "chr7");
        assert_eq!(named.start_pos, 117188661);
        assert_eq!(named.region_name, "TG-polyT");

        // HLA-style contig names keep their colons
        let hla: Region = "HLA-A*01:01:01:01:100-200".parse().unwrap();
        assert_eq!(hla.chrom, "HLA-A*01:01:01:01");
        assert_eq!(hla.start_pos, 100);

        assert!("7".parse::<Region>().is_err());
        assert!("7:200-100".parse::<Region>().is_err());
        assert!("7:abc-100".parse::<Region>().is_err());
    }

    #[test]
    fn test_region_display() {
        let region = Region::new("7", 117188661, 117188690, "TG-polyT");
        assert_eq!(region.to_string(), "7:117188661-117188690");
    }

    #[test]
    fn test_variant_label_forms() {
        let label = VariantLabel::new(11, 7);
        assert_eq!(label.to_string(), "(TG)11-7T");
        assert_eq!(label.suffix(), "11-7T");

        assert_eq!("(TG)11-7T".parse::<VariantLabel>().unwrap(), label);
        assert_eq!("11-7T".parse::<VariantLabel>().unwrap(), label);
        assert!("11-7".parse::<VariantLabel>().is_err());
        assert!("TG11T7".parse::<VariantLabel>().is_err());
    }

    #[test]
    fn test_variant_label_ordering() {
        let mut labels = vec![
            VariantLabel::new(11, 9),
            VariantLabel::new(5, 2),
            VariantLabel::new(11, 7),
        ];
        labels.sort();
        assert_eq!(
            labels,
            vec![
                VariantLabel::new(5, 2),
                VariantLabel::new(11, 7),
                VariantLabel::new(11, 9)
            ]
        );
    }
}
