//! Report output
//!
//! Writes the TSV report to stdout or a file, optionally BGZF-compressed so
//! it can be read back with `zcat`/`bgzip -d` or indexed downstream.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;
use rust_htslib::bgzf;

use crate::error::Result;
use crate::report::{LocusReport, TSV_HEADER};

/// Destination of the TSV report
pub struct ReportOutput {
    writer: Box<dyn Write>,
    path: Option<PathBuf>,
    lines: usize,
}

impl ReportOutput {
    /// Plain text on stdout
    pub fn stdout() -> Self {
        ReportOutput {
            writer: Box::new(BufWriter::new(io::stdout())),
            path: None,
            lines: 0,
        }
    }

    /// BGZF-compressed text on stdout
    pub fn bgzf_stdout() -> Result<Self> {
        Ok(ReportOutput {
            writer: Box::new(bgzf::Writer::from_stdout()?),
            path: None,
            lines: 0,
        })
    }

    /// Create (or overwrite) `path`, BGZF-compressed when `compress` is set
    pub fn create<P: AsRef<Path>>(path: P, compress: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer: Box<dyn Write> = if compress {
            Box::new(bgzf::Writer::from_path(&path)?)
        } else {
            Box::new(BufWriter::new(File::create(&path)?))
        };

        Ok(ReportOutput {
            writer,
            path: Some(path),
            lines: 0,
        })
    }

    /// Write a line to the output
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")?;
        self.lines += 1;
        Ok(())
    }

    pub fn write_header(&mut self) -> Result<()> {
        self.write_line(TSV_HEADER)
    }

    pub fn write_report(&mut self, report: &LocusReport) -> Result<()> {
        self.write_line(&report.to_tsv_line())
    }

    /// Lines written so far, header included
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flush and close the output; BGZF files get their EOF block here
    pub fn finalize(mut self) -> Result<()> {
        self.writer.flush()?;
        match &self.path {
            Some(path) => debug!("Wrote {} lines to {path:?}", self.lines),
            None => debug!("Wrote {} lines to stdout", self.lines),
        }
        Ok(())
    }
}

impl Write for ReportOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use flate2::read::MultiGzDecoder;
    use tempfile::tempdir;

    use crate::types::Region;

    fn write_sample(output: &mut ReportOutput) {
        output.write_header().unwrap();
        output
            .write_report(&LocusReport::empty(&Region::new("7", 10, 20, "locus")))
            .unwrap();
    }

    #[test]
    fn test_plain_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.tsv");

        let mut output = ReportOutput::create(&path, false).unwrap();
        write_sample(&mut output);
        assert_eq!(output.lines_written(), 2);
        output.finalize().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![TSV_HEADER, "locus\t7\t10\t20\t0\t.\t.\t--\t."]);
    }

    #[test]
    fn test_compressed_output_is_bgzf() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.tsv.gz");

        let mut output = ReportOutput::create(&path, true).unwrap();
        write_sample(&mut output);
        output.finalize().unwrap();

        assert!(bgzf::is_bgzip(&path).unwrap());

        let mut text = String::new();
        MultiGzDecoder::new(File::open(&path).unwrap())
            .read_to_string(&mut text)
            .unwrap();
        assert!(text.starts_with(TSV_HEADER));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_unwritable_path_fails() {
        assert!(ReportOutput::create("/nonexistent/dir/report.tsv", false).is_err());
    }
}
