// src/commands/refresh.rs
//! Package-app status refresh

use super::{backend, notifier};
use anyhow::{Context, Result};
use pkgapp::{Config, Outcome, Reconciler, RefreshReport, Transition, editor_for};
use tracing::info;

/// Refresh one app (optionally against an explicit package) or every package app
pub fn cmd_refresh(config: &Config, app: Option<&str>, package: Option<&str>, json: bool) -> Result<()> {
    let backend = backend(config);
    let editor = editor_for(config);
    let notifier = notifier(config);
    let reconciler = Reconciler::new(config, &backend, editor.as_ref(), notifier.as_ref());

    match app {
        Some(app) => {
            let outcome = match package {
                Some(package) => reconciler.refresh_app_with(app, package),
                None => reconciler.refresh_app(app),
            }
            .with_context(|| format!("Failed to refresh status of '{}'", app))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print_outcome(&outcome);
            }
        }
        None => {
            info!("Refreshing all package apps");
            let report = reconciler
                .refresh_all()
                .context("Failed to refresh package apps")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn describe(transition: Transition) -> &'static str {
    match transition {
        Transition::Unchanged => "unchanged",
        Transition::MarkedInstalled => "marked installed",
        Transition::MarkedUninstalled => "marked uninstalled",
        Transition::Hidden => "hidden",
        Transition::SkippedDisabled => "skipped (disabled)",
    }
}

fn print_outcome(outcome: &Outcome) {
    print!("{}: {}", outcome.app, describe(outcome.transition));
    if let Some(category) = &outcome.restored_category {
        print!(", restored to category '{}'", category);
    }
    println!();
}

fn print_report(report: &RefreshReport) {
    for outcome in report.outcomes.iter().filter(|o| o.changed()) {
        print_outcome(outcome);
    }
    for failure in &report.failures {
        eprintln!("{}: {}", failure.app, failure.error);
    }

    println!();
    println!("Package apps: {}", report.outcomes.len() + report.failures.len());
    println!("  Marked installed:   {}", report.count(Transition::MarkedInstalled));
    println!("  Marked uninstalled: {}", report.count(Transition::MarkedUninstalled));
    println!("  Hidden:             {}", report.count(Transition::Hidden));
    println!("  Unhidden:           {}", report.restored());
    println!("  Failed:             {}", report.failures.len());
}
