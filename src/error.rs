//! Error types shared across the library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Labels and support fractions passed to the caller differ in length
    #[error("got {labels} allele labels but {fractions} support fractions")]
    InputMismatch { labels: usize, fractions: usize },

    #[error("invalid repeat label: {0}")]
    InvalidLabel(String),

    #[error("invalid region: {0}")]
    InvalidRegion(String),

    #[error("BED line {line}: {msg}")]
    Bed { line: usize, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Htslib(#[from] rust_htslib::errors::Error),
}
