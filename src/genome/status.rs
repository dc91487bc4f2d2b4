//! Per-chromosome progress through the pipeline.
//!
//! The inventory is inferred from what is on disk when a run starts and then
//! advanced in memory as stages complete. It is never persisted; an optional
//! JSON report is written for auditing only.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::genome::layout::GenomeLayout;
use crate::model::CHROMOSOMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ChromosomeStatus {
    Missing,
    Downloaded,
    Decompressed,
    Converted,
    Loaded,
    Indexed,
}

/// Which files exist for one chromosome (plus the shared database/index).
#[derive(Debug, Clone, Copy, Default)]
pub struct Presence {
    pub archive: bool,
    pub fasta: bool,
    pub table: bool,
    pub database: bool,
    pub index: bool,
}

impl ChromosomeStatus {
    /// Latest state the files support. Loading and indexing only count once
    /// the chromosome has a converted table.
    pub fn infer(p: Presence) -> Self {
        match p {
            Presence {
                table: true,
                index: true,
                ..
            } => ChromosomeStatus::Indexed,
            Presence {
                table: true,
                database: true,
                ..
            } => ChromosomeStatus::Loaded,
            Presence { table: true, .. } => ChromosomeStatus::Converted,
            Presence { fasta: true, .. } => ChromosomeStatus::Decompressed,
            Presence { archive: true, .. } => ChromosomeStatus::Downloaded,
            _ => ChromosomeStatus::Missing,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenomeInventory {
    pub aggregate_archive: bool,
    pub database: bool,
    pub index: bool,
    pub chromosomes: BTreeMap<String, ChromosomeStatus>,
}

impl GenomeInventory {
    pub fn probe(layout: &GenomeLayout) -> Self {
        let database = layout.database().exists();
        let index = layout.index().exists();
        let chromosomes = CHROMOSOMES
            .iter()
            .map(|c| {
                let p = Presence {
                    archive: layout.archive(c).exists(),
                    fasta: layout.fasta(c).exists(),
                    table: layout.table(c).exists(),
                    database,
                    index,
                };
                (c.to_string(), ChromosomeStatus::infer(p))
            })
            .collect();
        Self {
            aggregate_archive: layout.aggregate_archive().exists(),
            database,
            index,
            chromosomes,
        }
    }

    pub fn status(&self, chrom: &str) -> ChromosomeStatus {
        self.chromosomes
            .get(chrom)
            .copied()
            .unwrap_or(ChromosomeStatus::Missing)
    }

    /// Move a chromosome forward; never moves it back.
    pub fn advance(&mut self, chrom: &str, to: ChromosomeStatus) {
        let cur = self
            .chromosomes
            .entry(chrom.to_string())
            .or_insert(ChromosomeStatus::Missing);
        if to > *cur {
            *cur = to;
        }
    }

    pub fn advance_all(&mut self, to: ChromosomeStatus) {
        for status in self.chromosomes.values_mut() {
            if to > *status {
                *status = to;
            }
        }
    }

    /// Chromosomes in processing order that are still below `status`.
    pub fn below(&self, status: ChromosomeStatus) -> Vec<&'static str> {
        CHROMOSOMES
            .iter()
            .copied()
            .filter(|c| self.status(c) < status)
            .collect()
    }

    pub fn write_report(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let f = fs_err::File::create(path)?;
        serde_json::to_writer_pretty(f, self)?;
        Ok(())
    }
}
