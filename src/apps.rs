// src/apps.rs

//! App catalogue
//!
//! Apps live in `<dir>/apps/<name>`. A *package app* declares OS packages in
//! a `packages` file instead of shipping install scripts:
//!
//! ```text
//! firefox-esr | firefox
//! libfoo
//! ```
//!
//! Tokens are whitespace separated; a token containing `|` is a group of
//! interchangeable alternatives.

use crate::category::CategoryData;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::packages::PackageFacts;
use crate::status::{AppStatus, StatusStore};
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use strum_macros::{Display, EnumString};
use tracing::debug;

/// Script files that make an app a standard app
const INSTALL_SCRIPTS: &[&str] = &["install", "install-32", "install-64", "uninstall"];

/// Reject names that would escape the apps or status directories
pub fn validate_app_name(app: &str) -> Result<()> {
    if app.is_empty() {
        return Err(Error::ParseError("no app specified".to_string()));
    }
    if app == "." || app == ".." || app.contains('/') || app.contains('\0') {
        return Err(Error::ParseError(format!("invalid app name '{}'", app)));
    }
    Ok(())
}

/// How an app gets installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum AppType {
    /// Install/uninstall scripts
    Standard,
    /// Alias for OS packages listed in a `packages` file
    Package,
}

/// Parsed `packages` file: groups of alternatives, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDeclaration {
    groups: Vec<Vec<String>>,
}

impl PackageDeclaration {
    /// Parse the text of a packages file
    pub fn parse(text: &str) -> Result<Self> {
        // "a | b" and "a|b" mean the same thing
        let normalized = text.split('|').map(str::trim).collect::<Vec<_>>().join("|");

        let mut groups = Vec::new();
        for (index, token) in normalized.split_whitespace().enumerate() {
            let group: Vec<String> = token.split('|').map(str::to_string).collect();
            if group.iter().any(String::is_empty) {
                return Err(Error::ParseError(format!(
                    "empty alternative in token {} ('{}')",
                    index + 1,
                    token
                )));
            }
            groups.push(group);
        }

        Ok(Self { groups })
    }

    /// Read `<dir>/apps/<app>/packages`
    pub fn read(config: &Config, app: &str) -> Result<Self> {
        validate_app_name(app)?;
        let path = config.packages_file(app);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFoundError(format!(
                    "app '{}' does not have a packages file",
                    app
                )));
            }
            Err(e) => {
                return Err(Error::IoError(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        Self::parse(&text)
            .map_err(|e| Error::ParseError(format!("{}: {}", path.display(), e)))
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Every declared package name, in order, alternatives included
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().flatten().map(String::as_str)
    }

    /// Packages to hand to the package manager when installing the app
    ///
    /// Each group resolves to its first installed alternative, else its first
    /// available one. `None` when some group cannot be satisfied.
    pub fn required_packages(&self, facts: &PackageFacts) -> Option<Vec<String>> {
        let mut required = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let chosen = group
                .iter()
                .find(|pkg| facts.is_installed(pkg))
                .or_else(|| group.iter().find(|pkg| facts.is_available(pkg)))?;
            required.push(chosen.clone());
        }
        Some(required)
    }
}

/// Names of all local apps, sorted
pub fn list_local_apps(config: &Config) -> Result<Vec<String>> {
    let apps_dir = config.apps_dir();
    let entries = fs::read_dir(&apps_dir).map_err(|e| {
        Error::IoError(format!(
            "Failed to read apps directory {}: {}",
            apps_dir.display(),
            e
        ))
    })?;

    let mut apps: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| !name.starts_with('.'))
        .collect();
    apps.sort();

    debug!("Found {} local apps", apps.len());
    Ok(apps)
}

/// Classify an app as a package app or a standard app
pub fn app_type(config: &Config, app: &str) -> Result<AppType> {
    validate_app_name(app)?;
    let dir = config.app_dir(app);

    if dir.join("packages").is_file() {
        return Ok(AppType::Package);
    }
    if INSTALL_SCRIPTS.iter().any(|script| dir.join(script).is_file()) {
        return Ok(AppType::Standard);
    }

    Err(Error::NotFoundError(format!(
        "'{}' is not a valid app (no packages file or install scripts)",
        app
    )))
}

/// Filters accepted by [`list_apps`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum ListFilter {
    /// Every app directory
    Local,
    Package,
    Standard,
    Installed,
    /// Local apps without a status file
    Uninstalled,
    Disabled,
    Corrupted,
    /// Apps with any status file, including ones no longer in `apps/`
    HaveStatus,
    Hidden,
    /// Local apps not in the hidden category
    Visible,
}

/// List apps matching a filter, sorted by name
pub fn list_apps(config: &Config, filter: ListFilter) -> Result<Vec<String>> {
    let store = StatusStore::new(config);

    let apps = match filter {
        ListFilter::Local => list_local_apps(config)?,
        ListFilter::Package => list_local_apps(config)?
            .into_iter()
            .filter(|app| matches!(app_type(config, app), Ok(AppType::Package)))
            .collect(),
        ListFilter::Standard => list_local_apps(config)?
            .into_iter()
            .filter(|app| matches!(app_type(config, app), Ok(AppType::Standard)))
            .collect(),
        ListFilter::Installed => store.apps_with(AppStatus::Installed)?,
        ListFilter::Disabled => store.apps_with(AppStatus::Disabled)?,
        ListFilter::Corrupted => store.apps_with(AppStatus::Corrupted)?,
        ListFilter::HaveStatus => store.list()?.into_iter().map(|(app, _)| app).collect(),
        ListFilter::Uninstalled => list_local_apps(config)?
            .into_iter()
            .filter(|app| !store.has_status(app))
            .collect(),
        ListFilter::Hidden => CategoryData::load(config)?.apps_in(crate::category::HIDDEN),
        ListFilter::Visible => {
            let hidden: HashSet<String> = CategoryData::load(config)?
                .apps_in(crate::category::HIDDEN)
                .into_iter()
                .collect();
            list_local_apps(config)?
                .into_iter()
                .filter(|app| !hidden.contains(app))
                .collect()
        }
    };

    Ok(apps)
}
