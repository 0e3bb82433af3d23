// src/status.rs

//! Status store
//!
//! One file per app under `<dir>/data/status`. The file holds the literal
//! status (`installed`, `disabled`, `corrupted`); a missing file means the
//! app is uninstalled.

use crate::apps::validate_app_name;
use crate::config::Config;
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumString};
use tracing::{debug, warn};

/// Persisted lifecycle status of an app
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr, Serialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AppStatus {
    Installed,
    /// Default when no status file exists
    Uninstalled,
    /// Marked by the user; reconciliation leaves it alone
    Disabled,
    /// A previous install or uninstall failed
    Corrupted,
}

/// Flat-file status store rooted at `<dir>/data/status`
#[derive(Debug, Clone)]
pub struct StatusStore {
    config: Config,
}

impl StatusStore {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn path(&self, app: &str) -> Result<PathBuf> {
        validate_app_name(app)?;
        Ok(self.config.status_file(app))
    }

    /// Current status of an app
    ///
    /// Content that is not a known status is a `ParseError`.
    pub fn get(&self, app: &str) -> Result<AppStatus> {
        let path = self.path(app)?;
        match fs::read_to_string(&path) {
            Ok(content) => {
                let content = content.trim();
                AppStatus::from_str(content).map_err(|_| {
                    Error::ParseError(format!(
                        "Unrecognized status '{}' in {}",
                        content,
                        path.display()
                    ))
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AppStatus::Uninstalled),
            Err(e) => Err(Error::IoError(format!(
                "Failed to read status file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// Whether a status file exists for the app
    pub fn has_status(&self, app: &str) -> bool {
        self.path(app).map(|p| p.is_file()).unwrap_or(false)
    }

    /// Persist a status; `Uninstalled` removes the file
    pub fn set(&self, app: &str, status: AppStatus) -> Result<()> {
        if status == AppStatus::Uninstalled {
            self.remove(app)?;
            return Ok(());
        }

        let path = self.path(app)?;
        let dir = self.config.status_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            Error::IoError(format!(
                "Failed to create status directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        fs::write(&path, status.as_ref()).map_err(|e| {
            Error::IoError(format!(
                "Failed to write status file {}: {}",
                path.display(),
                e
            ))
        })?;
        debug!("Wrote status {} for {}", status, app);
        Ok(())
    }

    /// Remove the status file; returns whether one existed
    pub fn remove(&self, app: &str) -> Result<bool> {
        let path = self.path(app)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed status file for {}", app);
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::IoError(format!(
                "Failed to remove status file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// All apps with a status file and their status, sorted by name
    ///
    /// Files with unrecognized content are skipped with a warning.
    pub fn list(&self) -> Result<Vec<(String, AppStatus)>> {
        let dir = self.config.status_dir();
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::IoError(format!(
                    "Failed to read status directory {}: {}",
                    dir.display(),
                    e
                )));
            }
        };

        let mut statuses = Vec::new();
        for entry in entries.flatten() {
            if !entry.path().is_file() {
                continue;
            }
            let app = entry.file_name().to_string_lossy().to_string();
            match self.get(&app) {
                Ok(status) => statuses.push((app, status)),
                Err(e) => warn!("Skipping status file for {}: {}", app, e),
            }
        }

        statuses.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(statuses)
    }

    /// Apps whose status file holds the given status
    pub fn apps_with(&self, status: AppStatus) -> Result<Vec<String>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|(_, s)| *s == status)
            .map(|(app, _)| app)
            .collect())
    }
}
