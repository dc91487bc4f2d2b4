//! Guide-RNA tables as written by the upstream design step.
//!
//! Only the location and direction columns are interpreted; every other cell,
//! the leading index column included, is written back untouched.

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::path::Path;

use crate::error::FetchError;
use crate::model::{DIRECTION_COLUMN, LOCATION_COLUMN};

#[derive(Debug, Clone)]
pub struct GuideTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
    location_idx: usize,
    direction_idx: usize,
}

/// Borrowed view of the two columns the fetcher needs.
#[derive(Debug, Clone, Copy)]
pub struct GuideRecord<'a> {
    pub location: &'a str,
    pub direction: &'a str,
}

impl GuideTable {
    pub fn read(path: &Path) -> Result<Self, FetchError> {
        let file = fs_err::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: std::io::Read>(rdr: R) -> Result<Self, FetchError> {
        let mut rdr = ReaderBuilder::new().flexible(false).from_reader(rdr);
        let headers = rdr.headers()?.clone();
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| FetchError::MissingColumn(name.to_string()))
        };
        let location_idx = find(LOCATION_COLUMN)?;
        let direction_idx = find(DIRECTION_COLUMN)?;
        let rows = rdr.records().collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            headers,
            rows,
            location_idx,
            direction_idx,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = GuideRecord<'_>> {
        self.rows.iter().map(|r| GuideRecord {
            location: r.get(self.location_idx).unwrap_or_default(),
            direction: r.get(self.direction_idx).unwrap_or_default(),
        })
    }

    /// Set `column` to `values` (one per row), replacing it if present.
    pub fn set_column(&mut self, column: &str, values: Vec<String>) {
        debug_assert_eq!(values.len(), self.rows.len());
        let existing = self.headers.iter().position(|h| h == column);
        match existing {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    *row = row
                        .iter()
                        .enumerate()
                        .map(|(i, cell)| if i == idx { v.as_str() } else { cell })
                        .collect();
                }
            }
            None => {
                self.headers.push_field(column);
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push_field(&v);
                }
            }
        }
    }

    pub fn column(&self, column: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == column)?;
        Some(
            self.rows
                .iter()
                .map(|r| r.get(idx).unwrap_or_default())
                .collect(),
        )
    }

    pub fn write(&self, path: &Path) -> Result<(), FetchError> {
        let file = fs_err::File::create(path)?;
        self.to_writer(file)
    }

    pub fn to_writer<W: std::io::Write>(&self, w: W) -> Result<(), FetchError> {
        let mut wtr = WriterBuilder::new().from_writer(w);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = ",gRNA_Target,CRISPR_PAM_Location,Direction\n\
                         0,ACGT,X:1-20,left\n\
                         1,TTGA,\"X:5-25;X:8-28\",right\n";

    #[test]
    fn reads_named_columns() {
        let t = GuideTable::from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(t.len(), 2);
        let recs: Vec<_> = t.records().collect();
        assert_eq!(recs[0].direction, "left");
        assert_eq!(recs[1].location, "X:5-25;X:8-28");
    }

    #[test]
    fn missing_column_is_reported() {
        let err = GuideTable::from_reader(",Direction\n0,left\n".as_bytes()).unwrap_err();
        assert!(matches!(err, FetchError::MissingColumn(c) if c == LOCATION_COLUMN));
    }

    #[test]
    fn appends_then_replaces_column() {
        let mut t = GuideTable::from_reader(TABLE.as_bytes()).unwrap();
        t.set_column("extra", vec!["a".into(), "b".into()]);
        t.set_column("extra", vec!["c".into(), "d".into()]);
        assert_eq!(t.headers.len(), 5);
        assert_eq!(t.column("extra").unwrap(), vec!["c", "d"]);

        let mut out = Vec::new();
        t.to_writer(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with(",gRNA_Target,CRISPR_PAM_Location,Direction,extra\n"));
        assert!(text.contains("0,ACGT,X:1-20,left,c\n"));
    }
}
