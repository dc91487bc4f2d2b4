use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Literal CLI defaults
pub const DEFAULT_FLANK3: u32 = 7;
pub const DEFAULT_FLANK5: u32 = 11;
pub const DEFAULT_PAM: &str = "NGG";
pub const DEFAULT_ENSEMBL_VERSION: &str = "113";
pub const DEFAULT_FILE: &str = "output";

/// Guide table columns
pub const LOCATION_COLUMN: &str = "CRISPR_PAM_Location";
pub const DIRECTION_COLUMN: &str = "Direction";
pub const FLANKING_COLUMN: &str = "gRNA_flanking_sequences";

/// Rendered in place of a sequence when a range could not be fetched.
pub const API_PROBLEM: &str = "API problem";

pub const LEGACY_ENDPOINT: &str = "http://grch37.rest.ensembl.org";
pub const CURRENT_ENDPOINT: &str = "https://rest.ensembl.org";
pub const ENSEMBL_FTP: &str = "https://ftp.ensembl.org/pub";

// Transfer limits handed to curl
pub const TRANSFER_PARALLEL_MAX: u32 = 25;
pub const TRANSFER_RETRIES: u32 = 5;

/// Chromosomes distributed per assembly, in processing order.
pub const CHROMOSOMES: [&str; 25] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y", "MT",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Assembly {
    GRCh37,
    GRCh38,
}

impl Assembly {
    /// Stem shared by every chromosome file of this assembly.
    /// GRCh37 names carry the Ensembl release, GRCh38 names do not.
    pub fn file_stem(&self, ensembl_version: &str) -> String {
        match self {
            Assembly::GRCh37 => format!("Homo_sapiens.GRCh37.{ensembl_version}.dna.chromosome"),
            Assembly::GRCh38 => "Homo_sapiens.GRCh38.dna.chromosome".to_string(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Assembly::GRCh37 => "GRCh37",
            Assembly::GRCh38 => "GRCh38",
        }
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Assembly {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GRCh37" | "hg19" => Ok(Assembly::GRCh37),
            "GRCh38" | "hg38" => Ok(Assembly::GRCh38),
            other => Err(format!("unknown assembly {other}; use GRCh37|GRCh38")),
        }
    }
}

/// REST endpoint serving the given assembly name.
/// Anything that is not the historical assembly goes to the current service.
pub fn endpoint_for(assembly: &str) -> &'static str {
    match assembly.parse::<Assembly>() {
        Ok(Assembly::GRCh37) => LEGACY_ENDPOINT,
        _ => CURRENT_ENDPOINT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn from_direction(direction: &str) -> Self {
        if direction == "left" {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Strand::Forward => "1",
            Strand::Reverse => "-1",
        }
    }
}

/// `chrom:start-end`, coordinates as given by the upstream design tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomicRange {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([A-Za-z0-9_.]+):(\d+)-(\d+)$").expect("static range regex")
    })
}

impl FromStr for GenomicRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let caps = range_re()
            .captures(s)
            .ok_or_else(|| format!("expected chrom:start-end, got {s:?}"))?;
        let start: u64 = caps[2].parse().map_err(|e| format!("{s:?}: {e}"))?;
        let end: u64 = caps[3].parse().map_err(|e| format!("{s:?}: {e}"))?;
        if start > end {
            return Err(format!("{s:?}: start is after end"));
        }
        Ok(GenomicRange {
            chrom: caps[1].to_string(),
            start,
            end,
        })
    }
}

impl fmt::Display for GenomicRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}", self.chrom, self.start, self.end)
    }
}

/// Split a `;`-delimited location field, keeping input order.
pub fn parse_locations(field: &str) -> Result<Vec<GenomicRange>, String> {
    field.split(';').map(str::parse).collect()
}

/// Throttling policy for 429 responses.
/// Delay doubles per consecutive 429, capped at `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub assembly: String,
    pub flank5: u32,
    pub flank3: u32,
    pub retry: RetryPolicy,
}

impl FetchConfig {
    pub fn endpoint(&self) -> &'static str {
        endpoint_for(&self.assembly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_maps_to_strand() {
        assert_eq!(Strand::from_direction("left").as_param(), "-1");
        assert_eq!(Strand::from_direction("right").as_param(), "1");
        assert_eq!(Strand::from_direction("").as_param(), "1");
        assert_eq!(Strand::from_direction("Left").as_param(), "1");
    }

    #[test]
    fn legacy_endpoint_only_for_grch37() {
        assert_eq!(endpoint_for("hg19"), LEGACY_ENDPOINT);
        assert_eq!(endpoint_for("GRCh37"), LEGACY_ENDPOINT);
        assert_eq!(endpoint_for("GRCh38"), CURRENT_ENDPOINT);
        assert_eq!(endpoint_for("mm10"), CURRENT_ENDPOINT);
    }

    #[test]
    fn locations_keep_order() {
        let v = parse_locations("X:154444204-154444226;X:154444207-154444229").unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].start, 154444204);
        assert_eq!(v[1].to_string(), "X:154444207-154444229");
    }

    #[test]
    fn bad_location_rejected() {
        assert!(parse_locations("X:120-100").is_err());
        assert!(parse_locations("X:100").is_err());
        assert!(parse_locations("X:1-2;").is_err());
    }

    #[test]
    fn file_stems() {
        assert_eq!(
            Assembly::GRCh37.file_stem("75"),
            "Homo_sapiens.GRCh37.75.dna.chromosome"
        );
        assert_eq!(
            Assembly::GRCh38.file_stem("113"),
            "Homo_sapiens.GRCh38.dna.chromosome"
        );
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = RetryPolicy {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            max_retries: 10,
        };
        assert_eq!(p.delay_for(1), Duration::from_secs(1));
        assert_eq!(p.delay_for(2), Duration::from_secs(2));
        assert_eq!(p.delay_for(3), Duration::from_secs(4));
        assert_eq!(p.delay_for(4), Duration::from_secs(5));
        assert_eq!(p.delay_for(40), Duration::from_secs(5));
    }
}
