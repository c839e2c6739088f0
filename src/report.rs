//! Console rendering of audit outcomes.

use chrono::{DateTime, Local};

use crate::assembler::{assemble, audit_rows, AuditMode, AuditView, Status};
use crate::audit::AuditOutcome;
use crate::diagnostics::Diagnostics;
use crate::model::AuditResult;
use crate::stats::AuditStats;
use crate::utils::{format_count, format_rate, truncate};

const RULE: &str = "══════════════════════════════════════════════════════════════════";
const THIN_RULE: &str = " ────────────────────────────────────────────────────────────────";

const MAP_WIDTH: usize = 34;
const NAME_WIDTH: usize = 32;
const HOSTS_WIDTH: usize = 48;

/// Summary and the mode's table, as printed by `shieldaudit audit`
pub fn render_text(outcome: &AuditOutcome) -> String {
    let mut out = render_summary(outcome);
    out.push_str(&render_table(&outcome.result, outcome.mode));
    out.push_str(RULE);
    out.push('\n');
    out
}

/// Box-drawn summary with per-map counts and totals
pub fn render_summary(outcome: &AuditOutcome) -> String {
    let stats = &outcome.stats;
    let mode = outcome.mode;
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(" SITESHIELD AUDIT ({})\n", outcome.environment));
    out.push_str(RULE);
    out.push_str("\n\n");

    let local: DateTime<Local> = Local::now();
    out.push_str(&format!(
        " Generated: {}\n\n",
        local.format("%Y-%m-%d %H:%M:%S")
    ));

    out.push_str(&format!(
        " {:<w$} {:>12} {:>12}\n",
        "SHIELD MAP",
        "PROPERTIES",
        "HOSTNAMES",
        w = MAP_WIDTH
    ));
    out.push_str(&format!(
        " {} ──────────── ────────────\n",
        "─".repeat(MAP_WIDTH)
    ));

    if mode.needs_protected() {
        for map in &stats.maps {
            out.push_str(&count_line(
                &map.shield_map,
                map.property_count,
                map.hostname_count,
            ));
        }
        out.push_str(&format!(
            " {} ──────────── ────────────\n",
            "─".repeat(MAP_WIDTH)
        ));
        out.push_str(&count_line(
            "PROTECTED",
            stats.protected_properties,
            stats.protected_hostnames,
        ));
    }
    if mode.needs_unprotected() {
        out.push_str(&count_line(
            "UNPROTECTED",
            stats.unprotected_properties,
            stats.unprotected_hostnames,
        ));
    }
    if mode == AuditMode::Audit {
        out.push_str(&count_line(
            "TOTAL",
            stats.total_properties,
            stats.total_hostnames,
        ));
        out.push('\n');
        out.push_str(&format!(
            " Protection rate: {}\n",
            format_rate(stats.protection_rate)
        ));
    } else {
        out.push('\n');
    }
    out.push_str(&format!(" Warnings: {}\n\n", outcome.diagnostics.len()));

    out
}

fn count_line(label: &str, properties: usize, hostnames: usize) -> String {
    format!(
        " {:<w$} {:>12} {:>12}\n",
        truncate(label, MAP_WIDTH),
        format_count(properties),
        format_count(hostnames),
        w = MAP_WIDTH
    )
}

/// Row table for `mode`, one line per entry
pub fn render_table(result: &AuditResult, mode: AuditMode) -> String {
    let mut out = String::new();

    match assemble(result, mode) {
        AuditView::Audit(_) => {
            out.push_str(" PROPERTIES\n");
            out.push_str(THIN_RULE);
            out.push('\n');
            for row in audit_rows(result) {
                let map = match row.status {
                    Status::Protected => row.shield_map.as_str(),
                    Status::Unprotected => "UNPROTECTED",
                };
                out.push_str(&row_line(map, &row.property_name, &row.hostnames));
            }
        }
        AuditView::ProtectedOnly(rows) => {
            out.push_str(" PROTECTED PROPERTIES\n");
            out.push_str(THIN_RULE);
            out.push('\n');
            for row in rows {
                out.push_str(&row_line(&row.shield_map, &row.property_name, &row.hostnames));
            }
        }
        AuditView::UnprotectedOnly(rows) => {
            out.push_str(" UNPROTECTED PROPERTIES\n");
            out.push_str(THIN_RULE);
            out.push('\n');
            for row in rows {
                out.push_str(&format!(
                    " {:<w$} {}\n",
                    truncate(&row.property_name, NAME_WIDTH),
                    truncate(&row.hostnames, HOSTS_WIDTH),
                    w = NAME_WIDTH
                ));
            }
        }
    }
    out.push('\n');

    out
}

fn row_line(map: &str, property: &str, hostnames: &str) -> String {
    format!(
        " {:<mw$} {:<nw$} {}\n",
        truncate(map, MAP_WIDTH),
        truncate(property, NAME_WIDTH),
        truncate(hostnames, HOSTS_WIDTH),
        mw = MAP_WIDTH,
        nw = NAME_WIDTH
    )
}

/// Final status line of a run
pub fn completion_message(diagnostics: &Diagnostics) -> String {
    if diagnostics.is_empty() {
        "[OK] Audit complete".to_string()
    } else {
        format!(
            "[WARN] Audit complete with {} warnings",
            diagnostics.len()
        )
    }
}

/// One line per recorded failure
pub fn render_diagnostics(diagnostics: &Diagnostics) -> String {
    diagnostics
        .entries()
        .iter()
        .map(|e| {
            let local: DateTime<Local> = e.timestamp.into();
            format!(
                "  {} {} - {}\n",
                local.format("%H:%M:%S"),
                e.context,
                e.message
            )
        })
        .collect()
}

/// Compact one-line summary for quiet runs
pub fn summary_line(stats: &AuditStats) -> String {
    format!(
        "{} protected / {} total properties, {} hostnames, {} protected",
        format_count(stats.protected_properties),
        format_count(stats.total_properties),
        format_count(stats.total_hostnames),
        format_rate(stats.protection_rate)
    )
}
