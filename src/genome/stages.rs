//! The four pipeline stages. Each checks what is already on disk before
//! doing any work and fails fast when an external step leaves nothing behind.

use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::GenomeError;
use crate::genome::config::GenomeConfig;
use crate::genome::layout::GenomeLayout;
use crate::genome::status::{ChromosomeStatus, GenomeInventory};
use crate::io::{fasta, runfiles};
use crate::model::CHROMOSOMES;
use crate::util::tools::{ToolInvocation, ToolRunner};

type StageResult<T = ()> = Result<T, GenomeError>;

fn run_tool(runner: &dyn ToolRunner, inv: &ToolInvocation) -> StageResult {
    let outcome = runner.run(inv).map_err(|e| GenomeError::ToolFailed {
        tool: inv.tool.clone(),
        status: format!("{e:#}"),
    })?;
    if !outcome.success {
        return Err(GenomeError::ToolFailed {
            tool: inv.tool.clone(),
            status: outcome.describe(),
        });
    }
    if let Some(missing) = inv.missing_outputs().first() {
        return Err(GenomeError::ArtifactMissing {
            tool: inv.tool.clone(),
            path: missing.to_path_buf(),
        });
    }
    Ok(())
}

/// Stage A: the aggregate "all chromosomes" archive marks a ready genome.
pub fn check_exists(cfg: &GenomeConfig, inv: &GenomeInventory) -> StageResult {
    let layout = cfg.layout();
    if inv.aggregate_archive {
        log::info!(
            "{} genome found at {}",
            cfg.assembly,
            layout.aggregate_archive().display()
        );
        Ok(())
    } else {
        Err(GenomeError::NotFound {
            assembly: cfg.assembly.to_string(),
            version: cfg.ensembl_version.clone(),
            path: layout.aggregate_archive(),
        })
    }
}

pub fn transfer_invocation(cfg: &GenomeConfig, layout: &GenomeLayout) -> ToolInvocation {
    let mut inv = ToolInvocation::new("curl", &cfg.tools.curl)
        .arg("--parallel")
        .arg("--parallel-immediate")
        .arg("--parallel-max")
        .arg(cfg.transfer.parallel_max.to_string())
        .arg("--fail-with-body")
        .arg("--retry")
        .arg(cfg.transfer.retries.to_string())
        .arg("--config")
        .path_arg(&layout.manifest())
        .arg("-C")
        .arg("-");
    for chrom in CHROMOSOMES {
        inv = inv.produces(layout.archive(chrom));
    }
    inv
}

/// Stage B: fetch every per-chromosome archive with one parallel curl run.
pub fn download(
    cfg: &GenomeConfig,
    runner: &dyn ToolRunner,
    inv: &mut GenomeInventory,
) -> StageResult {
    let layout = cfg.layout();
    if inv.below(ChromosomeStatus::Downloaded).is_empty() {
        log::info!("All chromosome archives already present; skipping download");
        return Ok(());
    }
    log::info!(
        "Genome is not found, downloading the {} Ensembl genome - version {}",
        cfg.assembly,
        cfg.ensembl_version
    );

    fs::create_dir_all(layout.genome_dir())?;
    let manifest = layout.manifest();
    if manifest.exists() {
        log::info!("Reusing transfer manifest {}", manifest.display());
    } else {
        fs::write(&manifest, layout.manifest_text())?;
    }

    log::info!("Collecting the genome files from Ensembl FTP");
    let transfer = transfer_invocation(cfg, &layout);
    match runner.run(&transfer) {
        Ok(o) if !o.success => log::warn!("curl finished with {}", o.describe()),
        Ok(_) => {}
        Err(e) => log::warn!("curl could not be run: {e:#}"),
    }

    let mut missing = Vec::new();
    for chrom in CHROMOSOMES {
        if layout.archive(chrom).exists() {
            inv.advance(chrom, ChromosomeStatus::Downloaded);
        } else if inv.status(chrom) < ChromosomeStatus::Downloaded {
            missing.push(layout.archive_name(chrom));
        }
    }
    if !missing.is_empty() {
        return Err(GenomeError::DownloadIncomplete {
            missing,
            remote_dir: layout.remote_dir(),
            pattern: layout.archive_pattern(),
        });
    }
    Ok(())
}

pub fn gather_invocation(cfg: &GenomeConfig, layout: &GenomeLayout, chrom: &str) -> ToolInvocation {
    ToolInvocation::new("gather", &cfg.tools.python)
        .path_arg(&cfg.tools.gather_script)
        .arg("-i")
        .path_arg(&layout.fasta(chrom))
        .arg("-o")
        .path_arg(&layout.table(chrom))
        .arg("-p")
        .arg(cfg.pam.clone())
        .produces(layout.table(chrom))
}

/// Stage C: decompress and convert one chromosome at a time.
pub fn convert(
    cfg: &GenomeConfig,
    runner: &dyn ToolRunner,
    inv: &mut GenomeInventory,
) -> StageResult {
    let layout = cfg.layout();
    fs::create_dir_all(layout.csv_dir())?;

    let todo = inv.below(ChromosomeStatus::Converted);
    if todo.is_empty() {
        log::info!("All chromosomes already converted");
        return Ok(());
    }

    let pb = ProgressBar::new(todo.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    for chrom in todo {
        pb.set_message(format!("chromosome {chrom}"));
        if inv.status(chrom) < ChromosomeStatus::Decompressed {
            let archive = layout.archive(chrom);
            if !archive.exists() {
                pb.abandon();
                return Err(GenomeError::ArchiveMissing {
                    chrom: chrom.to_string(),
                    path: archive,
                });
            }
            let bytes = runfiles::gunzip_keep(&archive, &layout.fasta(chrom))?;
            log::debug!("chromosome {chrom}: {bytes} bytes decompressed");
            inv.advance(chrom, ChromosomeStatus::Decompressed);
        }
        fasta::validate_fasta(&layout.fasta(chrom))?;

        log::info!("Gathering chromosome {chrom}");
        if let Err(e) = run_tool(runner, &gather_invocation(cfg, &layout, chrom)) {
            pb.abandon();
            return Err(e);
        }
        inv.advance(chrom, ChromosomeStatus::Converted);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(())
}

pub fn load_invocation(cfg: &GenomeConfig, layout: &GenomeLayout) -> ToolInvocation {
    let mut inv = ToolInvocation::new("load", &cfg.tools.python)
        .path_arg(&cfg.tools.index_script);
    for table in layout.tables() {
        inv = inv.arg("-i").path_arg(&table);
    }
    inv.arg("-d")
        .path_arg(&layout.database())
        .produces(layout.database())
}

pub fn index_invocation(cfg: &GenomeConfig, layout: &GenomeLayout) -> ToolInvocation {
    let mut inv = ToolInvocation::new("crispr_analyser", &cfg.tools.crispr_analyser)
        .arg("index")
        // assembly name (GRCh37/GRCh38), not the Ensembl release given by --v-ensembl
        .arg("-a")
        .arg(cfg.assembly.as_str())
        .arg("-s")
        .arg("Human")
        .arg("-e")
        .arg("1");
    for table in layout.tables() {
        inv = inv.arg("-i").path_arg(&table);
    }
    inv.arg("-o").path_arg(&layout.index()).produces(layout.index())
}

/// Stage D: load every table into the database, then build the binary index.
pub fn load_and_index(
    cfg: &GenomeConfig,
    runner: &dyn ToolRunner,
    inv: &mut GenomeInventory,
) -> StageResult {
    let layout = cfg.layout();

    log::info!("Loading chromosome tables into {}", layout.database().display());
    run_tool(runner, &load_invocation(cfg, &layout))?;
    inv.database = true;
    inv.advance_all(ChromosomeStatus::Loaded);

    if layout.index().exists() {
        log::info!("Index already present at {}", layout.index().display());
    } else {
        log::info!("Indexing the genome");
        run_tool(runner, &index_invocation(cfg, &layout))?;
    }
    inv.index = true;
    inv.advance_all(ChromosomeStatus::Indexed);
    Ok(())
}
