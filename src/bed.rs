// BED file parsing and region loading

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::{debug, info};
use rust_htslib::bgzf;

use crate::error::{Error, Result};
use crate::types::Region;

/// Open a BED file, decompressing `.gz` input.
///
/// BGZF files go through htslib; other gzip files fall back to flate2.
fn get_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let is_gz = path.extension().map(|ext| ext == "gz").unwrap_or(false);

    if is_gz {
        if bgzf::is_bgzip(path)? {
            let reader = bgzf::Reader::from_path(path)?;
            Ok(Box::new(BufReader::new(reader)))
        } else {
            let file = File::open(path)?;
            Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
        }
    } else {
        let file = File::open(path)?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn is_header_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Parse one BED line; `line_number` is 1-based and only used for errors
pub fn parse_bed_line(line: &str, line_number: usize) -> Result<Region> {
    let bed_error = |msg: String| Error::Bed {
        line: line_number,
        msg,
    };

    let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
    if fields.len() < 3 {
        return Err(bed_error(format!(
            "expected at least 3 tab-separated columns, found {}",
            fields.len()
        )));
    }

    let chrom = fields[0];
    if chrom.is_empty() {
        return Err(bed_error("empty contig name".to_string()));
    }
    let start_pos: usize = fields[1]
        .parse()
        .map_err(|_| bed_error(format!("invalid start '{}'", fields[1])))?;
    let end_pos: usize = fields[2]
        .parse()
        .map_err(|_| bed_error(format!("invalid end '{}'", fields[2])))?;
    if end_pos < start_pos {
        return Err(bed_error(format!("end {end_pos} is before start {start_pos}")));
    }

    let region_name = match fields.get(3) {
        Some(name) if !name.is_empty() => name,
        _ => "NA",
    };

    Ok(Region::new(chrom, start_pos, end_pos, region_name))
}

/// Load all BED regions from file, in file order
pub fn load_bed_regions<P: AsRef<Path>>(bed_path: P) -> Result<Vec<Region>> {
    let bed_path = bed_path.as_ref();
    let reader = get_reader(bed_path)?;
    let mut regions = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() || is_header_line(line) {
            continue;
        }

        let region = parse_bed_line(line, index + 1)?;
        debug!(
            "Loaded BED region: {} (chromosome: '{}', start: {}, end: {}, name: '{}')",
            region.region_string(),
            region.chrom,
            region.start_pos,
            region.end_pos,
            region.region_name
        );
        regions.push(region);
    }

    if regions.is_empty() {
        return Err(Error::Bed {
            line: 0,
            msg: format!("no regions found in {}", bed_path.display()),
        });
    }

    info!("Loaded {} BED regions from {}", regions.len(), bed_path.display());
    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::tempdir;

    const BED: &str = "track name=cftr\n\
                       # TG-polyT locus\n\
                       7\t117188661\t117188690\tTG-polyT\n\
                       \n\
                       7\t117199000\t117199010\n";

    #[test]
    fn test_load_plain_bed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.bed");
        std::fs::write(&path, BED).unwrap();

        let regions = load_bed_regions(&path).unwrap();
        assert_eq!(
            regions,
            vec![
                Region::new("7", 117188661, 117188690, "TG-polyT"),
                Region::new("7", 117199000, 117199010, "NA"),
            ]
        );
    }

    #[test]
    fn test_load_gzip_bed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.bed.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(BED.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let regions = load_bed_regions(&path).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region_name, "TG-polyT");
    }

    #[test]
    fn test_load_bgzf_bed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.bed.gz");
        {
            let mut writer = bgzf::Writer::from_path(&path).unwrap();
            writer.write_all(BED.as_bytes()).unwrap();
        }

        let regions = load_bed_regions(&path).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].start_pos, 117199000);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.bed");
        std::fs::write(&path, "7\t100\t200\tok\n7\tabc\t200\n").unwrap();

        match load_bed_regions(&path) {
            Err(Error::Bed { line, msg }) => {
                assert_eq!(line, 2);
                assert!(msg.contains("abc"));
            }
            other => panic!("expected BED error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_and_missing_files_fail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.bed");
        std::fs::write(&path, "# nothing here\n").unwrap();
        assert!(matches!(load_bed_regions(&path), Err(Error::Bed { .. })));

        assert!(load_bed_regions(dir.path().join("missing.bed")).is_err());
    }

    #[test]
    fn test_parse_bed_line() {
        assert_eq!(
            parse_bed_line("chr7\t10\t20\tlocus\t0\t+", 1).unwrap(),
            Region::new("chr7", 10, 20, "locus")
        );
        assert!(parse_bed_line("chr7\t10", 3).is_err());
        assert!(parse_bed_line("chr7\t20\t10", 4).is_err());
        // Space-separated lines are not BED
        assert!(parse_bed_line("chr7 10 20", 5).is_err());
    }
}
