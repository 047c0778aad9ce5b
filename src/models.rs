//! Core data models shared by the sync, filter, and aggregation stages.

use anyhow::bail;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp layout used in persisted stores (second precision, no offset).
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column header of every persisted store, in order.
pub const STORE_HEADER: [&str; 4] = ["author", "date", "hash", "message"];

/// One row of a commit store.
///
/// Identity is `hash`. Field order matches [`STORE_HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub author: String,
    #[serde(with = "store_date")]
    pub date: NaiveDateTime,
    pub hash: String,
    pub message: String,
}

impl CommitRecord {
    /// Maps a commit reported by the remote source into a store row.
    pub fn from_raw(raw: RawCommit) -> Self {
        Self {
            author: raw.author_name,
            date: truncate_to_seconds(raw.authored_at.naive_utc()),
            hash: raw.sha,
            message: raw.message,
        }
    }

    pub fn date_string(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Commit as reported by a [`CommitSource`](crate::remote::CommitSource).
#[derive(Debug, Clone)]
pub struct RawCommit {
    pub sha: String,
    pub author_name: String,
    pub authored_at: DateTime<Utc>,
    pub message: String,
}

/// Repository identity on the remote host (`owner/name`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                })
            }
            _ => bail!("repository must be in 'owner/name' form, got '{}'", s),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Number of records attributed to one author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub count: usize,
}

impl AuthorCount {
    pub fn new(author: impl Into<String>, count: usize) -> Self {
        Self {
            author: author.into(),
            count,
        }
    }
}

fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    use chrono::Timelike;
    ts.with_nanosecond(0).unwrap_or(ts)
}

mod store_date {
    use super::DATE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
