//! Incremental commit sync.
//!
//! Reads the existing store, asks the remote for everything authored on or
//! after the newest stored date, prepends what comes back, and rewrites the
//! store in full.
//!
//! The cutoff is inclusive, so the newest stored commit is normally fetched
//! again and stored twice. Records are not deduplicated by hash.

use anyhow::Result;
use chrono::NaiveDateTime;

use crate::models::{CommitRecord, RepoId};
use crate::progress::{SyncProgressEvent, SyncProgressReporter};
use crate::remote::CommitSource;
use crate::store::CommitStore;

/// Counts reported by [`sync_commits`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Cutoff sent to the remote, `None` for a full fetch.
    pub since: Option<NaiveDateTime>,
    pub fetched: usize,
    pub total: usize,
}

/// Brings `store` up to date with `repo` on `source`.
///
/// Store read failures and remote failures propagate unchanged; nothing is
/// written in that case. Pages are reported to `progress` by the source;
/// this function adds the opening and closing events.
pub async fn sync_commits(
    store: &dyn CommitStore,
    source: &dyn CommitSource,
    repo: &RepoId,
    progress: &dyn SyncProgressReporter,
) -> Result<SyncReport> {
    let existing = store.load()?;
    let since = latest_date(&existing);

    match since {
        Some(cutoff) => log::info!(
            "Syncing {} incrementally since {} ({} stored)",
            repo,
            cutoff,
            existing.len()
        ),
        None => log::info!("Syncing full history of {}", repo),
    }

    progress.report(SyncProgressEvent::Fetching {
        repo: repo.to_string(),
        since,
    });
    let fetched: Vec<CommitRecord> = source
        .list_commits_since(repo, since, progress)
        .await?
        .into_iter()
        .map(CommitRecord::from_raw)
        .collect();
    let fetched_count = fetched.len();

    let mut combined = fetched;
    combined.extend(existing);
    store.save(&combined)?;
    progress.report(SyncProgressEvent::Stored {
        fetched: fetched_count,
        total: combined.len(),
    });

    log::info!(
        "Fetched {} commits from {}; store now holds {}",
        fetched_count,
        repo,
        combined.len()
    );

    Ok(SyncReport {
        since,
        fetched: fetched_count,
        total: combined.len(),
    })
}

/// Newest `date` across `records`.
pub fn latest_date(records: &[CommitRecord]) -> Option<NaiveDateTime> {
    records.iter().map(|r| r.date).max()
}
