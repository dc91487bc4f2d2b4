use std::path::PathBuf;

use crate::genome::layout::GenomeLayout;
use crate::model::{Assembly, TRANSFER_PARALLEL_MAX, TRANSFER_RETRIES};

/// Executables and scripts the pipeline hands work to.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub curl: PathBuf,
    pub python: PathBuf,
    /// chromosome FASTA + PAM -> per-chromosome table
    pub gather_script: PathBuf,
    /// per-chromosome tables -> local database
    pub index_script: PathBuf,
    pub crispr_analyser: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            curl: PathBuf::from("curl"),
            python: PathBuf::from("python3"),
            gather_script: PathBuf::from("x_gather.py"),
            index_script: PathBuf::from("x_index.py"),
            crispr_analyser: PathBuf::from("crispr_analyser"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TransferLimits {
    pub parallel_max: u32,
    pub retries: u32,
}

impl Default for TransferLimits {
    fn default() -> Self {
        Self {
            parallel_max: TRANSFER_PARALLEL_MAX,
            retries: TRANSFER_RETRIES,
        }
    }
}

/// Everything one (assembly, Ensembl release) run needs, built once by the CLI.
#[derive(Debug, Clone)]
pub struct GenomeConfig {
    pub root: PathBuf,
    pub assembly: Assembly,
    pub ensembl_version: String,
    pub pam: String,
    pub tools: ToolPaths,
    pub transfer: TransferLimits,
}

impl GenomeConfig {
    pub fn new(root: PathBuf, assembly: Assembly, ensembl_version: &str, pam: &str) -> Self {
        Self {
            root,
            assembly,
            ensembl_version: ensembl_version.to_string(),
            pam: pam.to_string(),
            tools: ToolPaths::default(),
            transfer: TransferLimits::default(),
        }
    }

    pub fn layout(&self) -> GenomeLayout {
        GenomeLayout::new(&self.root, self.assembly, &self.ensembl_version)
    }
}
