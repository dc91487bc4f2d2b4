//! Where every artifact of a genome run lives, locally and on the Ensembl FTP.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::model::{Assembly, CHROMOSOMES, ENSEMBL_FTP};

pub const MANIFEST_NAME: &str = "chromosome_ftps.txt";
pub const DATABASE_NAME: &str = "crisprs.db";

#[derive(Debug, Clone)]
pub struct GenomeLayout {
    root: PathBuf,
    stem: String,
    version: String,
}

impl GenomeLayout {
    pub fn new(root: &Path, assembly: Assembly, ensembl_version: &str) -> Self {
        Self {
            root: root.to_path_buf(),
            stem: assembly.file_stem(ensembl_version),
            version: ensembl_version.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn genome_dir(&self) -> PathBuf {
        self.root.join("genome")
    }

    pub fn csv_dir(&self) -> PathBuf {
        self.genome_dir().join("csv")
    }

    pub fn aggregate_archive(&self) -> PathBuf {
        self.genome_dir().join(format!("{}.all.fa.gz", self.stem))
    }

    pub fn archive_name(&self, chrom: &str) -> String {
        format!("{}.{chrom}.fa.gz", self.stem)
    }

    pub fn archive(&self, chrom: &str) -> PathBuf {
        self.genome_dir().join(self.archive_name(chrom))
    }

    pub fn fasta(&self, chrom: &str) -> PathBuf {
        self.genome_dir().join(format!("{}.{chrom}.fa", self.stem))
    }

    pub fn table(&self, chrom: &str) -> PathBuf {
        self.csv_dir().join(format!("c_{chrom}.csv"))
    }

    pub fn tables(&self) -> Vec<PathBuf> {
        CHROMOSOMES.iter().map(|c| self.table(c)).collect()
    }

    pub fn manifest(&self) -> PathBuf {
        self.genome_dir().join(MANIFEST_NAME)
    }

    pub fn database(&self) -> PathBuf {
        self.root.join(DATABASE_NAME)
    }

    pub fn index(&self) -> PathBuf {
        self.root.join(format!("{}.bin", self.stem))
    }

    pub fn remote_dir(&self) -> String {
        format!(
            "{ENSEMBL_FTP}/release-{}/fasta/homo_sapiens/dna/",
            self.version
        )
    }

    pub fn remote_url(&self, chrom: &str) -> String {
        format!("{}{}", self.remote_dir(), self.archive_name(chrom))
    }

    /// Filename pattern an operator should fetch by hand.
    pub fn archive_pattern(&self) -> String {
        format!("{}.<chromosome>.fa.gz", self.stem)
    }

    /// curl `--config` body: one url/output pair per chromosome.
    pub fn manifest_text(&self) -> String {
        let mut s = String::new();
        for chrom in CHROMOSOMES {
            let _ = writeln!(s, "url={}", self.remote_url(chrom));
            let _ = writeln!(s, "output={}", self.archive(chrom).display());
        }
        s
    }
}
