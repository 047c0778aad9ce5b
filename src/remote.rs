//! Remote commit-history sources.
//!
//! A [`CommitSource`] answers one question: which commits of a repository
//! were authored on or after a cutoff. [`GitHubSource`] asks the GitHub REST
//! API and reports each page it receives to a [`SyncProgressReporter`].
//!
//! # GitHub requests
//!
//! ```text
//! GET {api_base}/repos/{owner}/{name}/commits?per_page=100[&since=2024-01-02T03:04:05Z]
//! Accept: application/vnd.github+json
//! Authorization: Bearer <token>        (only when a token is configured)
//! ```
//!
//! Pages are followed through the `Link: <…>; rel="next"` header until the
//! server stops sending one. There is no retry and no rate-limit handling:
//! the first failing page aborts the listing.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use reqwest::header::{ACCEPT, LINK, USER_AGENT};
use serde::Deserialize;

use crate::config::GitHubConfig;
use crate::models::{RawCommit, RepoId};
use crate::progress::{SyncProgressEvent, SyncProgressReporter};

/// Paginated commit-history query keyed by repository identity.
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Lists commits of `repo`, newest first, authored at or after `since`
    /// (inclusive). `None` lists the full history.
    ///
    /// `since` is a naive UTC wall-clock time, matching stored dates.
    /// Each received page is reported as [`SyncProgressEvent::Page`].
    async fn list_commits_since(
        &self,
        repo: &RepoId,
        since: Option<NaiveDateTime>,
        progress: &dyn SyncProgressReporter,
    ) -> Result<Vec<RawCommit>>;
}

// ═══════════════════════════════════════════════════════════════════════
// GitHub
// ═══════════════════════════════════════════════════════════════════════

/// GitHub REST API client for the commits endpoint.
pub struct GitHubSource {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
    per_page: u32,
}

impl GitHubSource {
    pub fn new(api_base: impl Into<String>, token: Option<String>, per_page: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
            per_page,
        }
    }

    /// Builds a client from configuration, reading the bearer token from
    /// the configured environment variable.
    pub fn from_config(config: &GitHubConfig) -> Self {
        let token = config.token();
        if token.is_none() {
            log::warn!(
                "{} is not set; GitHub requests will be unauthenticated",
                config.token_env
            );
        }
        Self::new(config.api_base.clone(), token, config.per_page)
    }

    fn first_page_url(&self, repo: &RepoId, since: Option<NaiveDateTime>) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/repos/{}/{}/commits",
            self.api_base, repo.owner, repo.name
        ))
        .with_context(|| format!("Invalid GitHub API base: {}", self.api_base))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("per_page", &self.per_page.to_string());
            if let Some(cutoff) = since {
                query.append_pair(
                    "since",
                    &cutoff.and_utc().to_rfc3339_opts(SecondsFormat::Secs, true),
                );
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl CommitSource for GitHubSource {
    async fn list_commits_since(
        &self,
        repo: &RepoId,
        since: Option<NaiveDateTime>,
        progress: &dyn SyncProgressReporter,
    ) -> Result<Vec<RawCommit>> {
        let mut next = Some(self.first_page_url(repo, since)?.to_string());
        let mut commits = Vec::new();
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let mut request = self
                .client
                .get(&url)
                .header(ACCEPT, "application/vnd.github+json")
                .header(USER_AGENT, concat!("fixwatch/", env!("CARGO_PKG_VERSION")));
            if let Some(ref token) = self.token {
                request = request.bearer_auth(token);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("GitHub request failed: {}", url))?;

            let status = response.status();
            let link = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_url);

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                bail!("GitHub API error ({}) for {}: {}", status, repo, body.trim());
            }

            let page: Vec<ApiCommit> = response
                .json()
                .await
                .with_context(|| format!("Invalid commit listing from {}", url))?;
            pages += 1;
            log::debug!("{}: page {} with {} commits", repo, pages, page.len());

            commits.extend(page.into_iter().filter_map(ApiCommit::into_raw));
            progress.report(SyncProgressEvent::Page {
                page: pages,
                fetched: commits.len(),
            });
            next = link;
        }

        Ok(commits)
    }
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    commit: ApiCommitDetail,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    author: Option<ApiSignature>,
    committer: Option<ApiSignature>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    name: Option<String>,
    date: Option<DateTime<Utc>>,
}

impl ApiCommit {
    fn into_raw(self) -> Option<RawCommit> {
        let author_date = self.commit.author.as_ref().and_then(|a| a.date);
        let committer_date = self.commit.committer.as_ref().and_then(|c| c.date);
        let Some(authored_at) = author_date.or(committer_date) else {
            log::warn!("Skipping commit {} without a timestamp", self.sha);
            return None;
        };
        let author_name = self
            .commit
            .author
            .and_then(|a| a.name)
            .unwrap_or_default();

        Some(RawCommit {
            sha: self.sha,
            author_name,
            authored_at,
            message: self.commit.message,
        })
    }
}

/// Extracts the `rel="next"` target from an RFC 8288 `Link` header.
fn next_page_url(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut segments = part.split(';');
        let target = segments.next()?.trim();
        let is_next = segments.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}
