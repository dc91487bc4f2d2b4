//! `bestimate flank` — add gRNA flanking sequences from Ensembl.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::FetchError;
use crate::fetcher;
use crate::io::ensembl::UreqClient;
use crate::io::runfiles;
use crate::io::table::GuideTable;
use crate::model::{self, FetchConfig, RetryPolicy};

#[derive(Args, Debug)]
pub struct CmdFlank {
    /// Genome assembly (hg19/GRCh37 use the legacy Ensembl service)
    #[arg(long)]
    pub assembly: String,
    /// Nucleotides in the 3' flanking region
    #[arg(long, default_value_t = model::DEFAULT_FLANK3)]
    pub flank3: u32,
    /// Nucleotides in the 5' flanking region
    #[arg(long, default_value_t = model::DEFAULT_FLANK5)]
    pub flank5: u32,
    /// Directory holding the input table (default: current directory)
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// Table basename; reads <file>.csv, writes <file>_flaking.csv
    #[arg(long, default_value = model::DEFAULT_FILE)]
    pub file: String,
    /// Retries per range while Ensembl answers 429
    #[arg(long, default_value_t = 10)]
    pub max_retries: u32,
    /// First wait after a 429; doubles on each further 429
    #[arg(long, default_value = "1s", value_parser = humantime::parse_duration)]
    pub retry_delay: Duration,
    /// Longest single wait between retries
    #[arg(long, default_value = "30s", value_parser = humantime::parse_duration)]
    pub max_delay: Duration,
    /// Per-request timeout
    #[arg(long, default_value = "60s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,
}

impl CmdFlank {
    pub fn run(self) -> Result<()> {
        let dir = match self.path {
            Some(p) => p,
            None => std::env::current_dir()?,
        };
        let input = dir.join(format!("{}.csv", self.file));
        runfiles::ensure_exists(&input)?;

        let cfg = FetchConfig {
            assembly: self.assembly,
            flank5: self.flank5,
            flank3: self.flank3,
            retry: RetryPolicy {
                base_delay: self.retry_delay,
                max_delay: self.max_delay,
                max_retries: self.max_retries,
            },
        };
        log::info!(
            "Fetching flanks (5'={}, 3'={}) from {}",
            cfg.flank5,
            cfg.flank3,
            cfg.endpoint()
        );

        let table = GuideTable::read(&input)
            .with_context(|| format!("read guide table {}", input.display()))?;
        log::info!("{} guides in {}", table.len(), input.display());

        let out = fetcher::output_path(&dir, &self.file);
        let client = UreqClient::new(self.timeout);
        match fetcher::fetch_table(&client, &cfg, table, &out) {
            Ok(_) => {
                println!("Flaking sequences have been retrieved.");
                Ok(())
            }
            Err(e) => {
                if matches!(
                    e,
                    FetchError::ApiProblem { .. } | FetchError::RetriesExhausted { .. }
                ) {
                    println!("API related problems");
                }
                Err(e).context("flanking sequences were not written")
            }
        }
    }
}
