//! Security-fix commit filter.
//!
//! A message qualifies when it contains the whole word `fix` and at least
//! one of the whole words `security`, `vulnerability`, `vulnerabilities`,
//! case-insensitively. The filtered store is a view: every run overwrites it.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::CommitRecord;
use crate::store::{CommitStore, TableSource};

fn fix_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bfix\b").expect("valid fix pattern"))
}

fn security_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(security|vulnerability|vulnerabilities)\b")
            .expect("valid security pattern")
    })
}

/// Whether `message` describes a security fix.
pub fn is_security_fix(message: &str) -> bool {
    fix_pattern().is_match(message) && security_pattern().is_match(message)
}

/// Records of `records` that are security fixes, in input order.
pub fn security_fixes(records: &[CommitRecord]) -> Vec<CommitRecord> {
    records
        .iter()
        .filter(|r| is_security_fix(&r.message))
        .cloned()
        .collect()
}

/// What a filter run did. None of these are errors to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome {
    Saved { scanned: usize, kept: usize },
    MissingInput,
    EmptyInput,
    Failed(String),
}

/// Filters `input` into `output`, replacing whatever `output` held.
///
/// Missing or empty input leaves `output` untouched and is only logged.
pub fn filter_commits(input: &dyn CommitStore, output: &dyn CommitStore) -> FilterOutcome {
    let records = match input.read_table() {
        TableSource::Records(records) => records,
        TableSource::Missing => {
            log::warn!("Input file {} was not found", input.location());
            return FilterOutcome::MissingInput;
        }
        TableSource::Empty => {
            log::warn!("Input file {} is empty", input.location());
            return FilterOutcome::EmptyInput;
        }
        TableSource::Unreadable(e) => {
            log::error!("Filtering failed: {}", e);
            return FilterOutcome::Failed(e);
        }
    };

    let kept = security_fixes(&records);
    if let Err(e) = output.save(&kept) {
        log::error!("Filtering failed: {:#}", e);
        return FilterOutcome::Failed(format!("{:#}", e));
    }

    log::info!(
        "Results successfully saved: {} of {} commits kept",
        kept.len(),
        records.len()
    );
    FilterOutcome::Saved {
        scanned: records.len(),
        kept: kept.len(),
    }
}
