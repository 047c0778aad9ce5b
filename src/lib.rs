//! # fixwatch
//!
//! Tracks the commit history of one GitHub repository, picks out commits
//! that fix security problems, and serves HTML views of both alongside
//! contributor rankings.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │ CommitSource │──▶│ commit store │──▶│ fix filter   │──▶│ contributors   │
//! │ (GitHub API) │   │  (CSV file)  │   │  (CSV file)  │   │ chart / top-N  │
//! └──────────────┘   └──────────────┘   └──────────────┘   └────────────────┘
//!                                  │                 │              │
//!                                  └──────── HTTP (axum) ──────────┘
//! ```
//!
//! Each stage reads the previous stage's file. Nothing is shared in memory
//! between requests.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration |
//! | [`models`] | Commit records, repository ids, author counts |
//! | [`store`] | Load/save abstraction with CSV and in-memory backends |
//! | [`remote`] | Commit-history sources (GitHub) |
//! | [`sync`] | Incremental store refresh |
//! | [`progress`] | Sync progress reporting on stderr |
//! | [`filter`] | Security-fix filter |
//! | [`contributors`] | Author frequency ranking |
//! | [`chart`] | PNG bar chart |
//! | [`render`] | HTML output |
//! | [`server`] | HTTP routes |

pub mod chart;
pub mod config;
pub mod contributors;
pub mod filter;
pub mod models;
pub mod progress;
pub mod remote;
pub mod render;
pub mod server;
pub mod store;
pub mod sync;
