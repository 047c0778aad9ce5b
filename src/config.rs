use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::models::RepoId;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitHubConfig {
    /// Repository in `owner/name` form.
    #[serde(default = "default_repo")]
    pub repo: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Name of the environment variable holding the bearer token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            repo: default_repo(),
            api_base: default_api_base(),
            token_env: default_token_env(),
            per_page: default_per_page(),
        }
    }
}

fn default_repo() -> String {
    "tensorflow/tensorflow".to_string()
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "ACCESS_TOKEN".to_string()
}
fn default_per_page() -> u32 {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_commits_path")]
    pub commits_path: PathBuf,
    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            commits_path: default_commits_path(),
            results_path: default_results_path(),
        }
    }
}

fn default_commits_path() -> PathBuf {
    PathBuf::from("commit_data.csv")
}
fn default_results_path() -> PathBuf {
    PathBuf::from("results.csv")
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenderConfig {
    #[serde(default = "default_commits_chunk_size")]
    pub commits_chunk_size: usize,
    #[serde(default = "default_results_chunk_size")]
    pub results_chunk_size: usize,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            commits_chunk_size: default_commits_chunk_size(),
            results_chunk_size: default_results_chunk_size(),
            top_n: default_top_n(),
        }
    }
}

fn default_commits_chunk_size() -> usize {
    30
}
fn default_results_chunk_size() -> usize {
    80
}
fn default_top_n() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}

impl GitHubConfig {
    pub fn repo_id(&self) -> Result<RepoId> {
        self.repo.parse()
    }

    /// Reads the bearer token from the configured environment variable.
    ///
    /// Unset or blank variables yield `None` (unauthenticated requests).
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

/// Loads configuration from `path`, falling back to defaults when the file
/// does not exist.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        log::info!(
            "Config file {} not found, using built-in defaults",
            path.display()
        );
        let config = Config::default();
        validate(&config)?;
        Ok(config)
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;

    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    config
        .github
        .repo_id()
        .with_context(|| "Invalid github.repo")?;

    if !(1..=100).contains(&config.github.per_page) {
        anyhow::bail!("github.per_page must be in [1, 100]");
    }

    if config.render.commits_chunk_size == 0 || config.render.results_chunk_size == 0 {
        anyhow::bail!("render chunk sizes must be > 0");
    }

    if config.render.top_n == 0 {
        anyhow::bail!("render.top_n must be > 0");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.github.repo, "tensorflow/tensorflow");
        assert_eq!(config.render.commits_chunk_size, 30);
        assert_eq!(config.render.results_chunk_size, 80);
        assert_eq!(config.render.top_n, 10);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            r#"
            [github]
            repo = "rust-lang/rust"

            [render]
            top_n = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.github.repo_id().unwrap().to_string(), "rust-lang/rust");
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.render.top_n, 3);
        assert_eq!(config.render.commits_chunk_size, 30);
    }

    #[test]
    fn test_rejects_bad_repo() {
        for repo in ["tensorflow", "/tensorflow", "a/b/c", "owner/"] {
            let mut config = Config::default();
            config.github.repo = repo.to_string();
            assert!(validate(&config).is_err(), "accepted '{}'", repo);
        }
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let mut config = Config::default();
        config.render.results_chunk_size = 0;
        assert!(validate(&config).is_err());
    }
}
