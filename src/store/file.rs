//! CSV-backed [`CommitStore`].
//!
//! Writes use the `csv` crate's default quoting, so fields holding commas,
//! quotes, or line breaks are quoted and come back byte-for-byte on read.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::models::{CommitRecord, STORE_HEADER};

use super::{CommitStore, TableSource};

/// A commit store persisted as a single CSV file.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl CommitStore for CsvStore {
    /// A missing file loads as an empty store. A zero-byte file has no
    /// header row and is rejected like any other unparseable file.
    fn load(&self) -> Result<Vec<CommitRecord>> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(m) if m.is_file() => m,
            _ => return Ok(Vec::new()),
        };
        if metadata.len() == 0 {
            bail!("Store has no header row: {}", self.path.display());
        }
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Failed to open store: {}", self.path.display()))?;
        read_records(file).with_context(|| format!("Failed to parse store: {}", self.path.display()))
    }

    fn save(&self, records: &[CommitRecord]) -> Result<()> {
        let bytes = write_records(records)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create store directory: {}", parent.display())
                })?;
            }
        }
        std::fs::write(&self.path, bytes)
            .with_context(|| format!("Failed to write store: {}", self.path.display()))
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    /// Classifies missing, empty, and unparseable files instead of failing.
    fn read_table(&self) -> TableSource {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(m) if m.is_file() => m,
            _ => return TableSource::Missing,
        };
        if metadata.len() == 0 {
            return TableSource::Empty;
        }
        match self.load() {
            Ok(records) => TableSource::Records(records),
            Err(e) => TableSource::Unreadable(format!("{:#}", e)),
        }
    }
}

/// Parses CSV rows with a header into records.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<CommitRecord>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut records = Vec::new();
    for (i, row) in rdr.deserialize::<CommitRecord>().enumerate() {
        let record = row.with_context(|| format!("Invalid store row {}", i + 1))?;
        records.push(record);
    }
    Ok(records)
}

/// Serializes records as CSV, always emitting the header row.
pub fn write_records(records: &[CommitRecord]) -> Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(STORE_HEADER)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))
}
