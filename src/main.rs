//! # fixwatch CLI
//!
//! ## Usage
//!
//! ```bash
//! fixwatch --config ./config/fixwatch.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fixwatch serve` | Start the HTTP server |
//! | `fixwatch sync` | Bring the commit store up to date |
//! | `fixwatch filter` | Rebuild the security-fix store |
//! | `fixwatch contributors` | Print authors ranked by security fixes |
//!
//! The GitHub token is read from the environment variable named by
//! `[github].token_env` (default `ACCESS_TOKEN`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fixwatch::config;
use fixwatch::contributors::{store_frequencies, top_n};
use fixwatch::filter::{filter_commits, FilterOutcome};
use fixwatch::progress::BarProgress;
use fixwatch::remote::GitHubSource;
use fixwatch::server;
use fixwatch::store::CsvStore;
use fixwatch::sync::sync_commits;

/// fixwatch: security-fix commit tracker for a GitHub repository.
#[derive(Parser)]
#[command(name = "fixwatch", version)]
struct Cli {
    /// Path to configuration file (TOML). Defaults apply when it is absent.
    #[arg(long, global = true, default_value = "./config/fixwatch.toml")]
    config: PathBuf,

    /// Log level (overridden by RUST_LOG).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Fetch new commits into the commit store.
    Sync,

    /// Rebuild the security-fix store from the commit store.
    Filter,

    /// Print authors of security fixes ranked by commit count.
    Contributors {
        /// Only print the first N authors.
        #[arg(long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let cfg = config::load_config_or_default(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Sync => {
            let store = CsvStore::new(&cfg.storage.commits_path);
            let source = GitHubSource::from_config(&cfg.github);
            let repo = cfg.github.repo_id()?;
            let report = sync_commits(&store, &source, &repo, &BarProgress::new()).await?;
            println!("sync {}", repo);
            match report.since {
                Some(cutoff) => println!("  since: {}", cutoff),
                None => println!("  since: (full history)"),
            }
            println!("  fetched: {}", report.fetched);
            println!("  stored: {}", report.total);
        }
        Commands::Filter => {
            let input = CsvStore::new(&cfg.storage.commits_path);
            let output = CsvStore::new(&cfg.storage.results_path);
            match filter_commits(&input, &output) {
                FilterOutcome::Saved { scanned, kept } => {
                    println!("filter {}", output.path().display());
                    println!("  scanned: {}", scanned);
                    println!("  kept: {}", kept);
                }
                FilterOutcome::MissingInput => {
                    println!("The file {} was not found.", input.path().display());
                }
                FilterOutcome::EmptyInput => {
                    println!("The input file is empty.");
                }
                FilterOutcome::Failed(e) => {
                    println!("An error occurred during filtering and saving: {}", e);
                }
            }
        }
        Commands::Contributors { top } => {
            let frequencies = store_frequencies(&CsvStore::new(&cfg.storage.results_path));
            let shown = match top {
                Some(n) => top_n(&frequencies, n),
                None => &frequencies[..],
            };
            if shown.is_empty() {
                println!("No authors found");
            }
            for (rank, entry) in shown.iter().enumerate() {
                println!("{:>3}. {:<40} {:>6}", rank + 1, entry.author, entry.count);
            }
        }
    }

    Ok(())
}
