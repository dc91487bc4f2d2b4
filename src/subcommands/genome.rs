//! `bestimate genome` — acquire and index the reference genome for off-target search.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::genome::config::{GenomeConfig, ToolPaths};
use crate::genome::driver::{self, DriverMode, DriverOutcome};
use crate::model::{self, Assembly};
use crate::util::tools::{self, SystemRunner};

#[derive(Args, Debug)]
pub struct CmdGenome {
    /// PAM motif handed to the chromosome converter
    #[arg(long, default_value = model::DEFAULT_PAM)]
    pub pamseq: String,
    /// GRCh37 or GRCh38
    #[arg(long)]
    pub assembly: Assembly,
    /// Off-targets root holding genome/, the database and the index
    #[arg(long, short = 'o', default_value = "offtargets")]
    pub out: PathBuf,
    /// Ensembl release for download URLs (GRCh37 is only published up to 75).
    /// The indexer is told the assembly, not this release
    #[arg(long, default_value = model::DEFAULT_ENSEMBL_VERSION)]
    pub v_ensembl: String,
    /// CRISPR-Analyser installation directory (expects bin/crispr_analyser)
    #[arg(long, value_name = "DIR")]
    pub wge_path: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = DriverMode::CheckOnly)]
    pub mode: DriverMode,
    #[arg(long, value_name = "PATH")]
    pub curl: Option<PathBuf>,
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,
    #[arg(long, default_value = "x_gather.py")]
    pub gather_script: PathBuf,
    #[arg(long, default_value = "x_index.py")]
    pub index_script: PathBuf,
    /// Write the per-chromosome status as JSON when the run ends
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

impl CmdGenome {
    fn tool_paths(&self) -> Result<ToolPaths> {
        let curl = tools::resolve_bin("curl", self.curl.as_deref(), "BESTIMATE_CURL")?;
        let python = tools::resolve_bin("python3", self.python.as_deref(), "BESTIMATE_PYTHON")?;
        let crispr_analyser = tools::resolve_crispr_analyser(self.wge_path.as_deref())?;
        for bin in [&curl, &python, &crispr_analyser] {
            log::info!("Using {}", bin.display());
        }
        if let Ok(v) = tools::get_version(&curl) {
            log::info!("curl: {v}");
        }
        Ok(ToolPaths {
            curl,
            python,
            gather_script: self.gather_script.clone(),
            index_script: self.index_script.clone(),
            crispr_analyser,
        })
    }

    pub fn run(self) -> Result<()> {
        let mut cfg = GenomeConfig::new(
            self.out.clone(),
            self.assembly,
            &self.v_ensembl,
            &self.pamseq,
        );
        if self.mode == DriverMode::CheckThenIndex {
            cfg.tools = self.tool_paths()?;
            fs_err::create_dir_all(&cfg.root)?;
        }
        log::info!(
            "{} genome (Ensembl {}) under {}",
            cfg.assembly,
            cfg.ensembl_version,
            cfg.root.display()
        );

        let (inventory, res) = driver::run(&cfg, self.mode, &SystemRunner);
        if let Some(report) = &self.report {
            inventory.write_report(report)?;
        }

        match res {
            Ok(DriverOutcome::Ready) => {
                println!("{} genome is ready.", cfg.assembly);
                Ok(())
            }
            Ok(DriverOutcome::Indexed(bin)) => {
                println!("Genome indexed: {}", bin.display());
                Ok(())
            }
            Err(e) => {
                println!("Error: {e}");
                Err(e.into())
            }
        }
    }
}
