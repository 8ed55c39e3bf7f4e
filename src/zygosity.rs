//! Zygosity calling from per-allele read support
//!
//! Every allele is judged on its own support fraction (fractions are not
//! expected to sum to 1):
//!
//! | support                                   | reference allele | other allele |
//! |-------------------------------------------|------------------|--------------|
//! | `f > hom_freq_threshold`                  | `hom`            | `hom alt`    |
//! | `het_freq_threshold <= f <= hom_freq_threshold` | `het`      | `het`        |
//! | below `het_freq_threshold`, or NaN        | `--`             | `--`         |
//!
//! Calls for several alleles are joined with `/` in input order.

use std::fmt;

use crate::error::{Error, Result};

pub const DEFAULT_HOM_FREQ_THRESHOLD: f64 = 0.8;
pub const DEFAULT_HET_FREQ_THRESHOLD: f64 = 0.3;
/// hg19/GRCh38 reference allele of the CFTR intron 8 TG-polyT locus
pub const DEFAULT_REFERENCE_ALLELE: &str = "11-7T";

/// Thresholds and reference allele used by [`call`]
#[derive(Debug, Clone, PartialEq)]
pub struct CallerConfig {
    /// Support above which an allele is called homozygous
    pub hom_freq_threshold: f64,
    /// Minimum support for a heterozygous call
    pub het_freq_threshold: f64,
    /// Label suffix (`<n>-<m>T`) of the reference allele
    pub reference_allele: String,
}

impl Default for CallerConfig {
    fn default() -> Self {
        CallerConfig {
            hom_freq_threshold: DEFAULT_HOM_FREQ_THRESHOLD,
            het_freq_threshold: DEFAULT_HET_FREQ_THRESHOLD,
            reference_allele: DEFAULT_REFERENCE_ALLELE.to_string(),
        }
    }
}

impl CallerConfig {
    pub fn with_hom_threshold(hom_freq_threshold: f64) -> Self {
        CallerConfig {
            hom_freq_threshold,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zygosity {
    Hom,
    HomAlt,
    Het,
    NoCall,
}

impl Zygosity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zygosity::Hom => "hom",
            Zygosity::HomAlt => "hom alt",
            Zygosity::Het => "het",
            Zygosity::NoCall => "--",
        }
    }
}

impl fmt::Display for Zygosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Support band of a single fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Support {
    Dominant,
    Partial,
    Insufficient,
}

fn support_band(fraction: f64, config: &CallerConfig) -> Support {
    if fraction > config.hom_freq_threshold {
        Support::Dominant
    } else if fraction >= config.het_freq_threshold {
        Support::Partial
    } else {
        // Also reached by NaN
        Support::Insufficient
    }
}

/// Call a single allele
pub fn call_allele(label: &str, fraction: f64, config: &CallerConfig) -> Zygosity {
    let is_reference = label.trim() == config.reference_allele;
    match (support_band(fraction, config), is_reference) {
        (Support::Dominant, true) => Zygosity::Hom,
        (Support::Dominant, false) => Zygosity::HomAlt,
        (Support::Partial, _) => Zygosity::Het,
        (Support::Insufficient, _) => Zygosity::NoCall,
    }
}

/// Per-allele calls, in input order
pub fn call_alleles<S: AsRef<str>>(
    labels: &[S],
    fractions: &[f64],
    config: &CallerConfig,
) -> Result<Vec<Zygosity>> {
    if labels.len() != fractions.len() {
        return Err(Error::InputMismatch {
            labels: labels.len(),
            fractions: fractions.len(),
        });
    }

    Ok(labels
        .iter()
        .zip(fractions)
        .map(|(label, &fraction)| call_allele(label.as_ref(), fraction, config))
        .collect())
}

/// Combined call string such as `hom`, `het/het` or `hom alt/--`
///
/// **Parameters:**
/// - `labels`: label suffixes (`11-7T`, without the `(TG)` prefix)
/// - `fractions`: read support of each label, same length as `labels`
/// - `config`: thresholds and reference allele
pub fn call<S: AsRef<str>>(labels: &[S], fractions: &[f64], config: &CallerConfig) -> Result<String> {
    let calls = call_alleles(labels, fractions, config)?;
    Ok(calls
        .iter()
        .map(Zygosity::as_str)
        .collect::<Vec<_>>()
        .join("/"))
}

/// [`call`] with a custom homozygous threshold and default everything else
pub fn call_with_threshold<S: AsRef<str>>(
    labels: &[S],
    fractions: &[f64],
    hom_freq_threshold: f64,
) -> Result<String> {
    call(labels, fractions, &CallerConfig::with_hom_threshold(hom_freq_threshold))
}
