//! Sync progress reporting.
//!
//! Fetching the full history of a large repository takes hundreds of pages,
//! so `fixwatch sync` shows a live spinner with the running commit count.
//! Progress goes to **stderr** so stdout stays parseable for scripts; the
//! HTTP routes pass [`NoProgress`].

use chrono::NaiveDateTime;
use indicatif::{ProgressBar, ProgressStyle};

/// A single progress event for sync.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncProgressEvent {
    /// The remote listing is starting. `since` is `None` for a full fetch.
    Fetching {
        repo: String,
        since: Option<NaiveDateTime>,
    },
    /// One more page arrived; `fetched` is the running total so far.
    Page { page: usize, fetched: usize },
    /// The store was rewritten.
    Stored { fetched: usize, total: usize },
}

/// Receives progress events from the sync pipeline.
pub trait SyncProgressReporter: Send + Sync {
    fn report(&self, event: SyncProgressEvent);
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SyncProgressReporter for NoProgress {
    fn report(&self, _event: SyncProgressEvent) {}
}

/// Spinner on stderr: `⠙ sync tensorflow/tensorflow  page 12  1,200 commits`.
///
/// indicatif hides the spinner when stderr is not a terminal.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncProgressReporter for BarProgress {
    fn report(&self, event: SyncProgressEvent) {
        match event {
            SyncProgressEvent::Fetching { repo, since } => {
                let scope = match since {
                    Some(cutoff) => format!("since {}", cutoff),
                    None => "full history".to_string(),
                };
                self.bar.set_prefix(repo.clone());
                self.bar.set_message(format!("sync {}  {}", repo, scope));
                self.bar.tick();
            }
            SyncProgressEvent::Page { page, fetched } => {
                self.bar.set_position(fetched as u64);
                self.bar.set_message(format!(
                    "sync {}  page {}  {} commits",
                    self.bar.prefix(),
                    page,
                    format_number(fetched as u64)
                ));
            }
            SyncProgressEvent::Stored { fetched, total } => {
                self.bar.finish_with_message(format!(
                    "sync {}  fetched {}  stored {}",
                    self.bar.prefix(),
                    format_number(fetched as u64),
                    format_number(total as u64)
                ));
            }
        }
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + (s.len() - 1) / 3);
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_number_comma() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn bar_progress_accepts_full_sequence() {
        let progress = BarProgress::new();
        progress.report(SyncProgressEvent::Fetching {
            repo: "acme/widgets".to_string(),
            since: None,
        });
        progress.report(SyncProgressEvent::Page {
            page: 1,
            fetched: 100,
        });
        assert_eq!(progress.bar.position(), 100);
        progress.report(SyncProgressEvent::Stored {
            fetched: 100,
            total: 100,
        });
        assert!(progress.bar.is_finished());
        assert_eq!(progress.bar.prefix(), "acme/widgets");
    }
}
