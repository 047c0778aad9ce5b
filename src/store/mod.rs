//! Storage abstraction for commit records.
//!
//! The [`CommitStore`] trait captures the whole persistence contract used by
//! the sync and filter stages: load everything, save everything. Each save
//! replaces the previous content in full.
//!
//! | Backend | Purpose |
//! |---------|---------|
//! | [`CsvStore`] | Delimited text file with an `author,date,hash,message` header |
//! | [`MemoryStore`] | In-process store for tests |

pub mod file;
pub mod memory;

use anyhow::Result;

use crate::models::CommitRecord;

pub use file::CsvStore;
pub use memory::MemoryStore;

/// Persisted, ordered sequence of [`CommitRecord`]s.
///
/// An absent backing resource is equivalent to an empty store. No locking
/// is performed; concurrent savers race and the last writer wins.
pub trait CommitStore: Send + Sync {
    /// Returns every stored record in stored order.
    fn load(&self) -> Result<Vec<CommitRecord>>;

    /// Replaces the stored sequence with `records`.
    fn save(&self, records: &[CommitRecord]) -> Result<()>;

    /// Where the store lives, for log messages.
    fn location(&self) -> String;

    /// Opens the store for display, turning read failures into values.
    ///
    /// The default cannot tell an absent store from an empty one; backends
    /// that can should override it.
    fn read_table(&self) -> TableSource {
        match self.load() {
            Ok(records) => TableSource::Records(records),
            Err(e) => TableSource::Unreadable(format!("{:#}", e)),
        }
    }
}

/// Result of opening a store for display.
///
/// Read failures are values here, not errors: the HTML layer turns each
/// variant into a user-visible message.
#[derive(Debug)]
pub enum TableSource {
    Missing,
    Empty,
    Unreadable(String),
    Records(Vec<CommitRecord>),
}
