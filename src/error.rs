//! Error kinds surfaced by the two pipelines.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("column {0:?} not found in guide table")]
    MissingColumn(String),

    #[error("row {row}: invalid location: {reason}")]
    InvalidLocation { row: usize, reason: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("API related problems: {failed} of {total} ranges could not be fetched")]
    ApiProblem { failed: usize, total: usize },

    #[error("still throttled after {retries} retries on {ranges} range(s); no output written")]
    RetriesExhausted { ranges: usize, retries: u32 },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum GenomeError {
    #[error(
        "{assembly} genome not found at {path:?}; please download the human reference genome \
         from Ensembl (release {version}) before continuing, or rerun with --mode check-then-index"
    )]
    NotFound {
        assembly: String,
        version: String,
        path: PathBuf,
    },

    #[error(
        "error in downloading genome, missing: {}. Please download all chromosomes manually from \
         {remote_dir} named as {pattern}",
        .missing.join(", ")
    )]
    DownloadIncomplete {
        missing: Vec<String>,
        remote_dir: String,
        pattern: String,
    },

    #[error("chromosome {chrom}: archive {path:?} is missing")]
    ArchiveMissing { chrom: String, path: PathBuf },

    #[error("{path:?} does not look like FASTA: {reason}")]
    InvalidFasta { path: PathBuf, reason: String },

    #[error("{tool} failed with status {status}")]
    ToolFailed { tool: String, status: String },

    #[error("{tool} finished but {path:?} was not produced")]
    ArtifactMissing { tool: String, path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
