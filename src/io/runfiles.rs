//! Small file helpers for the genome directory.

use anyhow::{anyhow, Result};
use flate2::read::MultiGzDecoder;
use fs_err as fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        Err(anyhow!("Path not found: {:?}", path))
    } else {
        Ok(())
    }
}

/// Decompress `src` into `dst`, leaving `src` in place.
///
/// Output goes through a sibling `.part` file so an interrupted run never
/// leaves a truncated `dst` behind.
pub fn gunzip_keep(src: &Path, dst: &Path) -> std::io::Result<u64> {
    let part = dst.with_extension("fa.part");
    let reader = MultiGzDecoder::new(BufReader::new(fs::File::open(src)?));
    let mut reader = BufReader::new(reader);
    let mut writer = BufWriter::new(fs::File::create(&part)?);
    let n = std::io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    drop(writer);
    fs::rename(&part, dst)?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;

    #[test]
    fn gunzip_keeps_archive() {
        let dir = tempfile::tempdir().unwrap();
        let gz = dir.path().join("c.1.fa.gz");
        let fa = dir.path().join("c.1.fa");
        let mut enc = GzEncoder::new(fs::File::create(&gz).unwrap(), Compression::fast());
        enc.write_all(b">1\nACGTNNNN\n").unwrap();
        enc.finish().unwrap();

        let n = gunzip_keep(&gz, &fa).unwrap();
        assert_eq!(n, 12);
        assert!(gz.exists());
        assert_eq!(fs::read_to_string(&fa).unwrap(), ">1\nACGTNNNN\n");
        assert!(!dir.path().join("c.1.fa.part").exists());
    }

    #[test]
    fn ensure_exists_names_path() {
        let err = ensure_exists(Path::new("/no/such/table.csv")).unwrap_err();
        assert!(err.to_string().contains("table.csv"));
    }
}
