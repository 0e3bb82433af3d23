// src/commands/analytics.rs
//! Manual analytics ping

use anyhow::{Context, Result};
use pkgapp::{AnalyticsNotifier, Config, Notifier, Trigger};

/// Queue one ping and wait for the worker to attempt it
pub fn cmd_ping(config: &Config, app: &str, trigger: Trigger) -> Result<()> {
    if !config.analytics_enabled() {
        println!("Analytics are disabled");
        return Ok(());
    }

    let notifier = AnalyticsNotifier::from_config(config).context("Failed to set up analytics")?;
    notifier.notify(app, trigger);
    notifier.drain();
    Ok(())
}
