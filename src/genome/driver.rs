//! Top-level genome driver.

use clap::ValueEnum;
use std::path::PathBuf;

use crate::error::GenomeError;
use crate::genome::config::GenomeConfig;
use crate::genome::stages;
use crate::genome::status::GenomeInventory;
use crate::util::tools::ToolRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DriverMode {
    /// Only confirm the genome archive is present; never download
    CheckOnly,
    /// Download when absent, then convert, load and index
    CheckThenIndex,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverOutcome {
    Ready,
    Indexed(PathBuf),
}

/// Run the stages `mode` asks for. The first failing stage stops the run.
/// The inventory reflects how far the run got, including on failure.
pub fn run(
    cfg: &GenomeConfig,
    mode: DriverMode,
    runner: &dyn ToolRunner,
) -> (GenomeInventory, Result<DriverOutcome, GenomeError>) {
    let mut inv = GenomeInventory::probe(&cfg.layout());
    let res = run_stages(cfg, mode, runner, &mut inv);
    (inv, res)
}

fn run_stages(
    cfg: &GenomeConfig,
    mode: DriverMode,
    runner: &dyn ToolRunner,
    inv: &mut GenomeInventory,
) -> Result<DriverOutcome, GenomeError> {
    let present = stages::check_exists(cfg, inv);
    match mode {
        DriverMode::CheckOnly => {
            present?;
            Ok(DriverOutcome::Ready)
        }
        DriverMode::CheckThenIndex => {
            if let Err(e) = present {
                log::info!("{e}");
                stages::download(cfg, runner, inv)?;
            }
            stages::convert(cfg, runner, inv)?;
            stages::load_and_index(cfg, runner, inv)?;
            Ok(DriverOutcome::Indexed(cfg.layout().index()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::stages::tests::{config, write_archive, RecordingRunner};
    use crate::genome::status::ChromosomeStatus;
    use crate::model::CHROMOSOMES;

    #[test]
    fn check_only_never_downloads() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let runner = RecordingRunner::default();

        let (_, res) = run(&cfg, DriverMode::CheckOnly, &runner);
        assert!(matches!(res, Err(GenomeError::NotFound { .. })));
        assert!(runner.calls.borrow().is_empty());
        assert!(!cfg.layout().manifest().exists());
    }

    #[test]
    fn check_only_reports_ready() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let layout = cfg.layout();
        fs_err::create_dir_all(layout.genome_dir()).unwrap();
        fs_err::write(layout.aggregate_archive(), "").unwrap();
        let runner = RecordingRunner::default();

        let (_, res) = run(&cfg, DriverMode::CheckOnly, &runner);
        assert_eq!(res.unwrap(), DriverOutcome::Ready);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn failed_download_stops_later_stages() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let runner = RecordingRunner {
            skip: vec![cfg.layout().archive("7")],
            ..Default::default()
        };

        let (inv, res) = run(&cfg, DriverMode::CheckThenIndex, &runner);
        assert!(matches!(res, Err(GenomeError::DownloadIncomplete { .. })));
        assert_eq!(runner.tools(), vec!["curl"]);
        assert_eq!(inv.status("7"), ChromosomeStatus::Missing);
    }

    #[test]
    fn full_run_from_archives() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let layout = cfg.layout();
        for c in CHROMOSOMES {
            write_archive(&layout.archive(c), c);
        }
        let runner = RecordingRunner::default();

        let (inv, res) = run(&cfg, DriverMode::CheckThenIndex, &runner);
        assert_eq!(res.unwrap(), DriverOutcome::Indexed(layout.index()));
        let tools = runner.tools();
        assert_eq!(tools.len(), CHROMOSOMES.len() + 2);
        assert!(tools[..CHROMOSOMES.len()].iter().all(|t| t == "gather"));
        assert_eq!(&tools[CHROMOSOMES.len()..], &["load", "crispr_analyser"]);
        assert!(inv.below(ChromosomeStatus::Indexed).is_empty());
    }

    #[test]
    fn present_genome_skips_download_and_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(dir.path());
        let layout = cfg.layout();
        for c in CHROMOSOMES {
            write_archive(&layout.archive(c), c);
        }
        fs_err::write(layout.aggregate_archive(), "").unwrap();
        let runner = RecordingRunner::default();

        let (inv, res) = run(&cfg, DriverMode::CheckThenIndex, &runner);
        assert_eq!(res.unwrap(), DriverOutcome::Indexed(layout.index()));
        let tools = runner.tools();
        assert!(!tools.iter().any(|t| t == "curl"));
        assert!(!layout.manifest().exists());
        assert!(tools[..CHROMOSOMES.len()].iter().all(|t| t == "gather"));
        assert_eq!(&tools[CHROMOSOMES.len()..], &["load", "crispr_analyser"]);
        assert!(inv.below(ChromosomeStatus::Indexed).is_empty());
    }
}
