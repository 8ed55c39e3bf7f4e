use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use rayon::prelude::*;

use tgpolyt::zygosity::{
    DEFAULT_HET_FREQ_THRESHOLD, DEFAULT_HOM_FREQ_THRESHOLD, DEFAULT_REFERENCE_ALLELE,
};
use tgpolyt::{
    genotype_region, load_bed_regions, CallerConfig, CountTable, IndexedBamSource, LocusReport,
    ReadFilter, Region, ReportOutput, VariantLabel,
};

/// Genotype TG-polyT repeat loci from an indexed BAM file
#[derive(Parser, Debug)]
#[command(name = "tgpolyt", version, about)]
struct Args {
    /// Input BAM file containing aligned sequencing reads (indexed)
    /// Note: Uses -a flag to avoid conflict with -b (bed file)
    #[arg(short = 'a', long)]
    bam: PathBuf,

    /// BED file of loci to genotype (plain, gzip or bgzip)
    #[arg(short, long, required_unless_present = "region", conflicts_with = "region")]
    bed: Option<PathBuf>,

    /// Single locus to genotype, as contig:start-end[:name] (0-based, inclusive)
    #[arg(short, long)]
    region: Option<String>,

    /// Output TSV path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// BGZF-compress the output
    #[arg(short = 'z', long)]
    compress: bool,

    /// Number of parallel threads to use for processing (default: number of CPU cores)
    #[arg(short, long, default_value_t = num_cpus::get())]
    threads: usize,

    /// Support fraction above which an allele is called homozygous
    #[arg(long, default_value_t = DEFAULT_HOM_FREQ_THRESHOLD)]
    hom_threshold: f64,

    /// Minimum support fraction for a heterozygous call
    #[arg(long, default_value_t = DEFAULT_HET_FREQ_THRESHOLD)]
    het_threshold: f64,

    /// Reference allele, as 11-7T or (TG)11-7T
    #[arg(long, default_value = DEFAULT_REFERENCE_ALLELE)]
    reference_allele: String,

    /// Number of top alleles passed to the zygosity caller
    #[arg(long, default_value_t = 2)]
    max_alleles: usize,

    /// Minimum mapping quality of a read
    #[arg(long, default_value_t = 0)]
    min_mapq: u8,

    /// Count reads flagged as PCR/optical duplicates
    #[arg(long)]
    keep_duplicates: bool,

    /// Print debug messages
    #[arg(short, long)]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Args {
    fn caller_config(&self) -> Result<CallerConfig> {
        if !(0.0..=1.0).contains(&self.het_threshold) || !(0.0..=1.0).contains(&self.hom_threshold) {
            bail!("Thresholds must lie between 0 and 1");
        }
        if self.het_threshold > self.hom_threshold {
            bail!(
                "--het-threshold ({}) is above --hom-threshold ({})",
                self.het_threshold,
                self.hom_threshold
            );
        }
        let reference: VariantLabel = self
            .reference_allele
            .parse()
            .with_context(|| format!("Invalid --reference-allele '{}'", self.reference_allele))?;

        Ok(CallerConfig {
            hom_freq_threshold: self.hom_threshold,
            het_freq_threshold: self.het_threshold,
            reference_allele: reference.suffix(),
        })
    }

    fn read_filter(&self) -> ReadFilter {
        ReadFilter {
            min_mapq: self.min_mapq,
            skip_duplicates: !self.keep_duplicates,
            ..ReadFilter::default()
        }
    }

    fn regions(&self) -> Result<Vec<Region>> {
        match (&self.bed, &self.region) {
            (Some(bed), _) => load_bed_regions(bed)
                .with_context(|| format!("Failed to load BED regions from {bed:?}")),
            (None, Some(region)) => {
                let region: Region = region
                    .parse()
                    .with_context(|| format!("Invalid --region '{region}'"))?;
                Ok(vec![region])
            }
            (None, None) => bail!("One of --bed or --region is required"),
        }
    }

    fn report_output(&self) -> Result<ReportOutput> {
        match &self.output {
            Some(path) => ReportOutput::create(path, self.compress)
                .with_context(|| format!("Failed to create output file {path:?}")),
            None if self.compress => {
                ReportOutput::bgzf_stdout().context("Failed to open compressed stdout")
            }
            None => Ok(ReportOutput::stdout()),
        }
    }
}

fn set_log_level(verbose: bool, quiet: bool) {
    let mut log_level = LevelFilter::Info;
    if verbose {
        log_level = LevelFilter::Debug;
    }
    if quiet {
        log_level = LevelFilter::Error;
    }

    let mut builder = Builder::new();
    builder.filter_level(log_level);
    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    if builder.try_init().is_err() {
        eprintln!("Failed to set log level - has it been specified multiple times?");
    }
}

/// Genotype every region; a region that cannot be read gets an empty table
fn count_regions(args: &Args, regions: &[Region], filter: &ReadFilter) -> Vec<CountTable> {
    regions
        .par_iter()
        .map_init(
            // IndexedReader is not Sync; one reader per worker thread
            || IndexedBamSource::open(&args.bam, filter.clone()),
            |source, region| {
                let source = match source {
                    Ok(source) => source,
                    Err(e) => {
                        error!("{}: cannot open {:?}: {e}", region.region_name, args.bam);
                        return CountTable::new();
                    }
                };
                match genotype_region(source, region) {
                    Ok(table) => table,
                    Err(e) => {
                        error!(
                            "{} ({}): failed to genotype region: {e}",
                            region.region_name,
                            region.region_string()
                        );
                        CountTable::new()
                    }
                }
            },
        )
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();
    set_log_level(args.verbose, args.quiet);

    let config = args.caller_config()?;
    let filter = args.read_filter();
    if args.max_alleles == 0 {
        bail!("--max-alleles must be at least 1");
    }

    info!("Starting tgpolyt with {} threads", args.threads);
    info!("  BAM file: {:?}", args.bam);
    if let Some(bed) = &args.bed {
        info!("  BED file: {bed:?}");
    }
    if let Some(output) = &args.output {
        info!("  Output file: {output:?}");
    }

    // A missing BAM or index is fatal
    IndexedBamSource::open(&args.bam, filter.clone())
        .with_context(|| format!("Failed to open indexed BAM {:?}", args.bam))?;

    let regions = args.regions()?;
    info!("Processing {} regions", regions.len());

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build()
        .context("Failed to build thread pool")?;
    let tables = pool.install(|| count_regions(&args, &regions, &filter));

    let mut output = args.report_output()?;
    output.write_header()?;
    for (region, table) in regions.iter().zip(&tables) {
        let report = LocusReport::from_table(region, table, args.max_alleles, &config)?;
        info!(
            "{} ({}): depth {}, call {}",
            region.region_name,
            region.region_string(),
            report.depth,
            report.call
        );
        output.write_report(&report)?;
    }
    output.finalize().context("Failed to finish writing output")?;

    info!("Done: {} regions genotyped", regions.len());
    Ok(())
}
