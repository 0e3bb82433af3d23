// src/commands/status.rs
//! App status and listing commands

use anyhow::Result;
use pkgapp::{AppStatus, Config, ListFilter, StatusStore, list_apps};

/// Print an app's status
pub fn cmd_status(config: &Config, app: &str) -> Result<()> {
    let status = StatusStore::new(config).get(app)?;
    println!("{}", status);
    Ok(())
}

/// Overwrite an app's status file
pub fn cmd_set_status(config: &Config, app: &str, status: AppStatus) -> Result<()> {
    StatusStore::new(config).set(app, status)?;
    println!("{} is now {}", app, status);
    Ok(())
}

/// Print the apps matching a filter, one per line
pub fn cmd_list(config: &Config, filter: ListFilter) -> Result<()> {
    for app in list_apps(config, filter)? {
        println!("{}", app);
    }
    Ok(())
}
