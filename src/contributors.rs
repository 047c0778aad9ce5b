//! Contributor aggregation.
//!
//! Counts records per author in a single pass and ranks authors by count,
//! highest first. Equal counts keep the order in which authors were first
//! seen; there is no alphabetical tie-break.

use std::collections::HashMap;

use crate::models::{AuthorCount, CommitRecord};
use crate::store::{CommitStore, TableSource};

/// Ranked author frequencies of `records`.
pub fn author_frequencies(records: &[CommitRecord]) -> Vec<AuthorCount> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<AuthorCount> = Vec::new();

    for record in records {
        match slots.get(record.author.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                slots.insert(record.author.as_str(), counts.len());
                counts.push(AuthorCount::new(record.author.clone(), 1));
            }
        }
    }

    // Stable sort: first-seen order survives among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Ranked author frequencies of the records in `store`.
///
/// A missing or unreadable store is logged and yields no authors.
pub fn store_frequencies(store: &dyn CommitStore) -> Vec<AuthorCount> {
    match store.read_table() {
        TableSource::Records(records) => author_frequencies(&records),
        TableSource::Empty => Vec::new(),
        TableSource::Missing => {
            log::warn!("The file {} was not found", store.location());
            Vec::new()
        }
        TableSource::Unreadable(e) => {
            log::error!("Could not aggregate {}: {}", store.location(), e);
            Vec::new()
        }
    }
}

/// The first `n` ranked entries, fewer when there are fewer authors.
pub fn top_n(frequencies: &[AuthorCount], n: usize) -> &[AuthorCount] {
    &frequencies[..n.min(frequencies.len())]
}
