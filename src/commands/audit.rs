//! Audit command implementation.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::HttpApi;
use crate::assembler::AuditMode;
use crate::audit::{AuditOutcome, AuditRequest, Auditor};
use crate::cli::AuditArgs;
use crate::config::Config;
use crate::error::AuditError;
use crate::export::{to_csv, to_json, write_atomic, ExportFormat};
use crate::model::Environment;
use crate::report::{completion_message, render_diagnostics, render_text, summary_line};
use crate::validation::{validate_behavior_name, validate_map_name, validate_workers};

/// Output flags shared with the printer
#[derive(Debug, Clone, Copy, Default)]
pub struct Verbosity {
    pub quiet: bool,
    pub verbose: bool,
}

/// Fully validated audit invocation
#[derive(Debug, Clone)]
pub struct AuditPlan {
    pub request: AuditRequest,
    pub format: ExportFormat,
    pub environment: Environment,
    pub workers: usize,
    pub universe_behavior: String,
    pub output: Option<PathBuf>,
}

/// Merge CLI flags over the configuration and validate the result.
///
/// Runs before any network activity; every failure is a usage error.
pub fn plan(args: &AuditArgs, config: &Config) -> Result<AuditPlan, AuditError> {
    if let Some(map) = &args.map {
        validate_map_name(map)?;
    }
    let mode = AuditMode::resolve(args.map.as_deref(), args.protected, args.unprotected)?;
    let format: ExportFormat = args.format.parse().map_err(AuditError::Usage)?;

    let workers = args.workers.unwrap_or(config.audit.workers);
    validate_workers(workers)?;

    let universe_behavior = args
        .universe_behavior
        .clone()
        .unwrap_or_else(|| config.audit.universe_behavior.clone());
    validate_behavior_name(&universe_behavior)?;

    let environment = if args.staging {
        Environment::Staging
    } else {
        config.audit.environment
    };

    Ok(AuditPlan {
        request: AuditRequest {
            map: args.map.clone(),
            mode,
        },
        format,
        environment,
        workers,
        universe_behavior,
        output: args.output.clone(),
    })
}

/// Run the audit command
pub async fn run(args: AuditArgs, config_path: &Path, verbosity: Verbosity) -> Result<()> {
    let config = Config::load_or_default(config_path)?;

    let plan = match plan(&args, &config) {
        Ok(plan) => plan,
        Err(e) if !e.is_fatal() => {
            eprintln!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    config.require_api()?;
    let api = Arc::new(HttpApi::new(&config.api)?);

    let auditor = Auditor::new(api.clone(), api)
        .with_workers(plan.workers)
        .with_environment(plan.environment)
        .with_universe_behavior(plan.universe_behavior.clone());

    let outcome = match auditor.run(&plan.request).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    emit(&plan, &outcome, verbosity)
}

/// Print and/or write the outcome according to the plan
pub fn emit(plan: &AuditPlan, outcome: &AuditOutcome, verbosity: Verbosity) -> Result<()> {
    let content = match plan.format {
        ExportFormat::Text => render_text(outcome),
        ExportFormat::Csv => to_csv(&outcome.result, outcome.mode)?,
        ExportFormat::Json => to_json(&outcome.result, outcome.mode)?,
    };

    // Machine-readable output on stdout keeps status lines on stderr
    let stdout_is_data = plan.output.is_none() && plan.format != ExportFormat::Text;

    match &plan.output {
        Some(path) => {
            write_atomic(path, &content)?;
            info!("Wrote {:?}", path);
            if verbosity.quiet || plan.format == ExportFormat::Text {
                println!("{}", summary_line(&outcome.stats));
            } else {
                print!("{}", render_text(outcome));
            }
        }
        None if verbosity.quiet && plan.format == ExportFormat::Text => {
            println!("{}", summary_line(&outcome.stats));
        }
        None => print!("{}", content),
    }

    let status = completion_message(&outcome.diagnostics);
    let details = if verbosity.verbose && !outcome.diagnostics.is_empty() {
        Some(render_diagnostics(&outcome.diagnostics))
    } else {
        None
    };

    if stdout_is_data {
        eprintln!("{}", status);
        if let Some(details) = details {
            eprint!("{}", details);
        }
    } else {
        println!("{}", status);
        if let Some(details) = details {
            print!("{}", details);
        }
    }

    Ok(())
}
