//! shieldaudit - SiteShield coverage audit for CDN properties
//!
//! Classifies every active property as protected by a shield map or exposed.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use shieldaudit::cli::{Cli, Commands};
use shieldaudit::commands::audit::Verbosity;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let verbosity = Verbosity {
        quiet: cli.quiet,
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Audit(args) => {
            shieldaudit::commands::audit::run(args, &cli.config, verbosity).await
        }
        Commands::Maps { staging } => shieldaudit::commands::maps::run(staging, &cli.config).await,
        Commands::Version => {
            println!("shieldaudit {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
