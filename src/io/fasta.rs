use needletail::parse_fastx_reader;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::GenomeError;

/// Bytes inspected by [`validate_fasta`]. Whole chromosomes run to hundreds of MB.
const SNIFF_BYTES: u64 = 64 * 1024;

/// Checks file exists, is readable, and looks like FASTA: the first record
/// within the leading [`SNIFF_BYTES`] must carry a header and some sequence.
pub fn validate_fasta(p: &Path) -> Result<(), GenomeError> {
    let invalid = |reason: String| GenomeError::InvalidFasta {
        path: p.to_path_buf(),
        reason,
    };
    if !p.exists() {
        return Err(invalid("file not found".into()));
    }
    let mut head = Vec::new();
    fs_err::File::open(p)?
        .take(SNIFF_BYTES)
        .read_to_end(&mut head)?;
    let mut rdr = parse_fastx_reader(Cursor::new(head)).map_err(|e| invalid(e.to_string()))?;
    match rdr.next() {
        Some(Ok(rec)) if !rec.seq().is_empty() => Ok(()),
        Some(Ok(_)) => Err(invalid("first record has no sequence".into())),
        Some(Err(e)) => Err(invalid(e.to_string())),
        None => Err(invalid("no records".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn accepts_chromosome_fasta() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, ">MT dna:chromosome\nGATCACAGGTCT\nATCACCCTATTA\n").unwrap();
        validate_fasta(f.path()).unwrap();
    }

    #[test]
    fn rejects_html_error_page() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "<html><body>404 Not Found</body></html>").unwrap();
        let err = validate_fasta(f.path()).unwrap_err();
        assert!(matches!(err, GenomeError::InvalidFasta { .. }));
    }

    #[test]
    fn long_first_record_is_checked_from_its_start() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, ">1 dna:chromosome").unwrap();
        let line = "ACGTNNACGT".repeat(6);
        for _ in 0..20_000 {
            writeln!(f, "{line}").unwrap();
        }
        f.flush().unwrap();
        assert!(f.as_file().metadata().unwrap().len() > SNIFF_BYTES * 10);
        validate_fasta(f.path()).unwrap();
    }

    #[test]
    fn rejects_header_without_sequence() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, ">1 dna:chromosome").unwrap();
        let err = validate_fasta(f.path()).unwrap_err();
        assert!(matches!(err, GenomeError::InvalidFasta { .. }));
    }
}
