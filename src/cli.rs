//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shieldaudit")]
#[command(author, version, about = "SiteShield coverage audit for CDN properties")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "shieldaudit.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (errors and final status only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output, warning details)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify active properties as protected or unprotected
    Audit(AuditArgs),

    /// List shield maps and how many active properties use a shield behavior
    Maps {
        /// Use staging activation status instead of production
        #[arg(long)]
        staging: bool,
    },

    /// Show version
    Version,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct AuditArgs {
    /// Audit a single shield map (implies --protected)
    #[arg(long, short)]
    pub map: Option<String>,

    /// Show protected properties only
    #[arg(long)]
    pub protected: bool,

    /// Show unprotected properties only
    #[arg(long)]
    pub unprotected: bool,

    /// Use staging activation status instead of production
    #[arg(long)]
    pub staging: bool,

    /// Concurrent hostname lookups (overrides audit.workers)
    #[arg(long)]
    pub workers: Option<usize>,

    /// Behavior marking a property as addressable (overrides audit.universe_behavior)
    #[arg(long)]
    pub universe_behavior: Option<String>,

    /// Output format (text, csv, json)
    #[arg(long, short, default_value = "text")]
    pub format: String,

    /// Write the output to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}
