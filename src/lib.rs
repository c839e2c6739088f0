//! # shieldaudit - SiteShield Coverage Audit
//!
//! Classifies every active CDN property as protected (bound to a SiteShield
//! map) or unprotected, resolves the hostnames each property serves, and
//! reports per-map and global counts.
//!
//! ## Features
//!
//! - **Exact partition** - Every active property lands in one map bucket or in the unprotected list
//! - **Bounded concurrency** - Hostname lookups run on a fixed-width worker pool
//! - **Failure isolation** - A failed map or hostname lookup is recorded, the run continues
//! - **Three views** - Full audit, protected only, unprotected only
//! - **Exports** - CSV and JSON, written atomically
//! - **Secure** - Token from environment variables, memory zeroed on drop, header validation
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       shieldaudit                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: audit, maps, version                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  API (reqwest + rustls)                                     │
//! │    ├── PropertySearch (bulk rule search, map discovery)     │
//! │    └── HostnameResolver (property hostnames)                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Auditor                                                    │
//! │    ├── Classifier (per-map buckets, unprotected remainder)  │
//! │    ├── HostnameEnricher (tokio worker pool)                 │
//! │    └── AuditStats (deduplicated counts, protection rate)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Assembler → Report (console) / Export (csv, json)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use shieldaudit::api::HttpApi;
//! use shieldaudit::audit::{AuditRequest, Auditor};
//! use shieldaudit::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("shieldaudit.yaml")?;
//!     config.require_api()?;
//!
//!     let api = Arc::new(HttpApi::new(&config.api)?);
//!     let auditor = Auditor::new(api.clone(), api).with_workers(config.audit.workers);
//!
//!     let outcome = auditor.run(&AuditRequest::default()).await?;
//!     println!("{:.2}% protected", outcome.stats.protection_rate);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Collaborator traits and the HTTP client
//! - [`assembler`] - Mode-specific views of a result
//! - [`audit`] - Run pipeline
//! - [`classifier`] - Map discovery and partitioning
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`diagnostics`] - Recoverable failures collected during a run
//! - [`enricher`] - Hostname worker pool
//! - [`export`] - CSV and JSON writers
//! - [`keyset`] - Property identity keys
//! - [`model`] - Shared data model
//! - [`report`] - Console rendering
//! - [`stats`] - Count aggregation
//! - [`utils`] - Common utility functions (formatting, truncation)
//! - [`validation`] - Input validation

pub mod api;
pub mod assembler;
pub mod audit;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod diagnostics;
pub mod enricher;
pub mod error;
pub mod export;
pub mod keyset;
pub mod model;
pub mod report;
pub mod stats;
pub mod utils;
pub mod validation;

pub use cli::{Cli, Commands};
pub use config::Config;
