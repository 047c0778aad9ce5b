//! End-to-end tests for the HTTP routes, served on an ephemeral port with a
//! fixture commit source and stores in a temp directory.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use fixwatch::config::Config;
use fixwatch::models::{RawCommit, RepoId};
use fixwatch::progress::SyncProgressReporter;
use fixwatch::remote::CommitSource;
use fixwatch::server::{serve, AppState};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Serves a fixed commit list with GitHub's inclusive `since` filter.
#[derive(Default)]
struct FixtureSource {
    commits: Vec<RawCommit>,
}

impl FixtureSource {
    fn new(commits: Vec<RawCommit>) -> Self {
        Self { commits }
    }
}

#[async_trait]
impl CommitSource for FixtureSource {
    async fn list_commits_since(
        &self,
        _repo: &RepoId,
        since: Option<NaiveDateTime>,
        _progress: &dyn SyncProgressReporter,
    ) -> Result<Vec<RawCommit>> {
        Ok(self
            .commits
            .iter()
            .filter(|c| since.map_or(true, |cutoff| c.authored_at.naive_utc() >= cutoff))
            .cloned()
            .collect())
    }
}

fn raw(sha: &str, author: &str, day: u32, message: &str) -> RawCommit {
    RawCommit {
        sha: sha.to_string(),
        author_name: author.to_string(),
        authored_at: Utc.with_ymd_and_hms(2024, 2, day, 10, 0, 0).unwrap(),
        message: message.to_string(),
    }
}

fn fixture() -> Vec<RawCommit> {
    vec![
        raw("e5", "Alice", 5, "Fix security bug in <tensor> ops"),
        raw("e4", "Bob", 4, "Fix vulnerability, CVE-2024-0001\n\nBackport."),
        raw("e3", "Alice", 3, "fix: security hardening"),
        raw("e2", "Carol", 2, "Fixing flaky test"),
        raw("e1", "Bob", 1, "Fix security of loader"),
    ]
}

fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.github.repo = "acme/widgets".to_string();
    config.storage.commits_path = root.join("commit_data.csv");
    config.storage.results_path = root.join("results.csv");
    config
}

async fn start(config: Config, source: Arc<FixtureSource>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let state = AppState::new(config, source).unwrap();
    tokio::spawn(async move {
        serve(listener, state).await.unwrap();
    });
    base
}

async fn get(base: &str, path: &str) -> reqwest::Response {
    reqwest::get(format!("{}{}", base, path)).await.unwrap()
}

#[tokio::test]
async fn test_health() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(tmp.path()), Arc::new(FixtureSource::default())).await;
    let resp = get(&base, "/health").await;
    assert!(resp.status().is_success());
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_repo_commits_syncs_and_lists() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    let commits_path = config.storage.commits_path.clone();
    let base = start(config, Arc::new(FixtureSource::new(fixture()))).await;

    let resp = get(&base, "/repo-commits").await;
    assert_eq!(resp.status(), 200);
    assert!(resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .starts_with("text/html"));
    let html = resp.text().await.unwrap();

    assert!(html.starts_with("<html><head><style>"));
    assert!(html.contains("Fix security bug in &lt;tensor&gt; ops"));
    assert!(html.contains("2024-02-05 10:00:00"));
    assert!(commits_path.exists());

    // Second request re-fetches the boundary commit.
    let html = get(&base, "/repo-commits").await.text().await.unwrap();
    assert_eq!(html.matches("<td>e5</td>").count(), 2);
}

#[tokio::test]
async fn test_filter_commit_lists_security_fixes() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(tmp.path()), Arc::new(FixtureSource::new(fixture()))).await;

    get(&base, "/repo-commits").await;
    let html = get(&base, "/filter-commit").await.text().await.unwrap();

    for kept in ["e5", "e4", "e3", "e1"] {
        assert!(html.contains(&format!("<td>{}</td>", kept)), "missing {}", kept);
    }
    assert!(!html.contains("<td>e2</td>"));
}

#[tokio::test]
async fn test_filter_commit_without_store_reports_missing_file() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(tmp.path()), Arc::new(FixtureSource::default())).await;

    let resp = get(&base, "/filter-commit").await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "File not found");
}

#[tokio::test]
async fn test_contributor_views() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(tmp.path()), Arc::new(FixtureSource::new(fixture()))).await;

    get(&base, "/repo-commits").await;
    get(&base, "/filter-commit").await;

    let resp = get(&base, "/major_contributors").await;
    assert_eq!(
        resp.headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok()),
        Some("inline")
    );
    let html = resp.text().await.unwrap();
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("Major contributors developer"));

    let html = get(&base, "/top_contributors").await.text().await.unwrap();
    // Alice: e5, e3. Bob: e4, e1. Tie keeps first-seen order.
    let alice = html.find("<li><span>Alice:</span> 2</li>").unwrap();
    let bob = html.find("<li><span>Bob:</span> 2</li>").unwrap();
    assert!(alice < bob);
    assert_eq!(html.matches("<li>").count(), 2);
}

#[tokio::test]
async fn test_contributor_views_without_data() {
    let tmp = TempDir::new().unwrap();
    let base = start(test_config(tmp.path()), Arc::new(FixtureSource::default())).await;

    let html = get(&base, "/major_contributors").await.text().await.unwrap();
    assert_eq!(html, "<h1>No authors found</h1>");

    let html = get(&base, "/top_contributors").await.text().await.unwrap();
    assert!(html.contains("Top 10 Contributors"));
    assert_eq!(html.matches("<li>").count(), 0);
}

#[tokio::test]
async fn test_zero_byte_store_fails_sync() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    std::fs::write(&config.storage.commits_path, "").unwrap();
    let base = start(config, Arc::new(FixtureSource::new(fixture()))).await;

    let resp = get(&base, "/repo-commits").await;
    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "sync_failed");
}

#[tokio::test]
async fn test_unreadable_store_fails_sync() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(tmp.path());
    std::fs::write(
        &config.storage.commits_path,
        "author,date,hash,message\nAda,garbage,h1,m\n",
    )
    .unwrap();
    let base = start(config, Arc::new(FixtureSource::new(fixture()))).await;

    let resp = get(&base, "/repo-commits").await;
    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "sync_failed");
}
