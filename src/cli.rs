//! CLI definition and top-level dispatch.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::subcommands::{flank::CmdFlank, genome::CmdGenome, syscheck::CmdSyscheck};

#[derive(Parser, Debug)]
#[command(
    name = "bestimate",
    version,
    about = "gRNA flanking sequences and off-target genome indexing for BEstimate"
)]
pub struct Cli {
    /// Also write log output to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Annotate a guide table with flanking sequences from Ensembl
    Flank(CmdFlank),

    /// Check for, download and index the reference genome
    Genome(CmdGenome),

    /// Check environment, external tools, and versions
    Syscheck(CmdSyscheck),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.cmd {
            Commands::Flank(cmd) => cmd.run(),
            Commands::Genome(cmd) => cmd.run(),
            Commands::Syscheck(cmd) => cmd.run(),
        }
    }
}
