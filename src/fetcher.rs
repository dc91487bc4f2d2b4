//! Flanking-sequence fetcher: one Ensembl lookup per location, all-or-nothing output.

use ahash::AHashSet;
use indicatif::{ProgressBar, ProgressStyle};
use itertools::Itertools;
use std::path::{Path, PathBuf};

use crate::error::FetchError;
use crate::io::ensembl::{self, HttpGet, RangeLookup};
use crate::io::table::{GuideRecord, GuideTable};
use crate::model::{parse_locations, FetchConfig, Strand, API_PROBLEM, FLANKING_COLUMN};

/// Per-record result: one lookup per input range, in input order.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub lookups: Vec<RangeLookup>,
}

impl Resolved {
    /// `;`-joined output field.
    pub fn field(&self) -> String {
        self.lookups.iter().map(RangeLookup::render).join(";")
    }
}

/// Resolve every range of one record against the configured endpoint.
pub fn resolve(
    client: &dyn HttpGet,
    cfg: &FetchConfig,
    record: &GuideRecord<'_>,
    row: usize,
) -> Result<Resolved, FetchError> {
    let strand = Strand::from_direction(record.direction);
    let ranges = parse_locations(record.location)
        .map_err(|reason| FetchError::InvalidLocation { row, reason })?;
    let mut lookups = Vec::with_capacity(ranges.len());
    for range in &ranges {
        let url = ensembl::sequence_url(cfg.endpoint(), range, strand, cfg.flank5, cfg.flank3);
        lookups.push(ensembl::lookup(client, &url, &cfg.retry)?);
    }
    Ok(Resolved { lookups })
}

/// Turn per-record results into the batch verdict.
///
/// Any failed range fails the batch; exhausted retries take precedence in the
/// reported kind.
pub fn aggregate(resolved: &[Resolved], cfg: &FetchConfig) -> Result<(), FetchError> {
    let distinct: AHashSet<&str> = resolved
        .iter()
        .flat_map(|r| r.lookups.iter().map(RangeLookup::render))
        .collect();
    if !distinct.contains(API_PROBLEM) {
        return Ok(());
    }

    let all = resolved.iter().flat_map(|r| r.lookups.iter());
    let total = all.clone().count();
    let throttled = all
        .clone()
        .filter(|l| matches!(l, RangeLookup::Throttled(_)))
        .count();
    if throttled > 0 {
        return Err(FetchError::RetriesExhausted {
            ranges: throttled,
            retries: cfg.retry.max_retries,
        });
    }
    Err(FetchError::ApiProblem {
        failed: all.filter(|l| l.is_failure()).count(),
        total,
    })
}

pub fn output_path(dir: &Path, file: &str) -> PathBuf {
    dir.join(format!("{file}_flaking.csv"))
}

/// Fetch flanks for every record of `table`; on success the augmented table
/// is written to `out` and returned.
pub fn fetch_table(
    client: &dyn HttpGet,
    cfg: &FetchConfig,
    mut table: GuideTable,
    out: &Path,
) -> Result<GuideTable, FetchError> {
    for (row, record) in table.records().enumerate() {
        parse_locations(record.location)
            .map_err(|reason| FetchError::InvalidLocation { row, reason })?;
    }

    let pb = ProgressBar::new(table.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len} guides")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut resolved = Vec::with_capacity(table.len());
    for (row, record) in table.records().enumerate() {
        resolved.push(resolve(client, cfg, &record, row)?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    aggregate(&resolved, cfg)?;

    table.set_column(FLANKING_COLUMN, resolved.iter().map(Resolved::field).collect());
    table.write(out)?;
    log::info!("Wrote {} guides to {}", table.len(), out.display());
    Ok(table)
}
