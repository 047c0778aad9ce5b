//! In-memory [`CommitStore`] implementation for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use anyhow::{anyhow, Result};

use crate::models::CommitRecord;

use super::{CommitStore, TableSource};

/// In-memory store. Counts saves so tests can assert full rewrites.
///
/// A store built with [`MemoryStore::new`] is absent until its first save,
/// matching a store file that does not exist yet.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Option<Vec<CommitRecord>>>,
    saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<CommitRecord>) -> Self {
        Self {
            records: RwLock::new(Some(records)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl CommitStore for MemoryStore {
    fn load(&self) -> Result<Vec<CommitRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(records.clone().unwrap_or_default())
    }

    fn save(&self, records: &[CommitRecord]) -> Result<()> {
        let mut stored = self
            .records
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        *stored = Some(records.to_vec());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }

    fn read_table(&self) -> TableSource {
        match self.records.read() {
            Ok(records) => match records.as_ref() {
                Some(records) => TableSource::Records(records.clone()),
                None => TableSource::Missing,
            },
            Err(_) => TableSource::Unreadable("memory store lock poisoned".to_string()),
        }
    }
}
