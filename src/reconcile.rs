// src/reconcile.rs

//! Package-app status reconciliation
//!
//! Brings the store's view of package apps in line with the OS package
//! manager:
//!
//! - a declared package is installed -> status `installed`
//! - nothing installed, something available -> status file removed
//! - nothing installed or available -> app moved to the `hidden` category
//!
//! Writes only happen on change, so repeated passes over unchanged package
//! facts touch nothing and send no analytics. An app hidden through the
//! override file gets its original category back once one of its packages
//! is available again.

use crate::analytics::{Notifier, Trigger};
use crate::apps::{ListFilter, PackageDeclaration, list_apps, validate_app_name};
use crate::category::{CategoryData, CategoryEditor, DEFAULT_CATEGORY, HIDDEN};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::packages::{PackageBackend, PackageFacts};
use crate::status::{AppStatus, StatusStore};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Where an app should end up given the current package facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum TargetState {
    /// `package` is installed and stays authoritative
    Installed { package: String },
    /// Nothing installed; `package` is the first installable candidate
    Uninstalled { package: String },
    /// No declared package is installed or available
    Hidden,
}

/// Decide the target state for a declaration
///
/// The first installed package wins; otherwise the first available one.
pub fn plan(declaration: &PackageDeclaration, facts: &PackageFacts) -> TargetState {
    if declaration.is_empty() {
        return TargetState::Hidden;
    }
    if let Some(package) = declaration.packages().find(|p| facts.is_installed(p)) {
        return TargetState::Installed {
            package: package.to_string(),
        };
    }
    if let Some(package) = declaration.packages().find(|p| facts.is_available(p)) {
        return TargetState::Uninstalled {
            package: package.to_string(),
        };
    }
    TargetState::Hidden
}

/// What reconciliation did to one app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Transition {
    Unchanged,
    MarkedInstalled,
    MarkedUninstalled,
    Hidden,
    /// Disabled apps are left alone
    SkippedDisabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub app: String,
    pub target: TargetState,
    pub transition: Transition,
    /// Category restored after an earlier hide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_category: Option<String>,
}

impl Outcome {
    fn new(app: &str, target: TargetState, transition: Transition) -> Self {
        Self {
            app: app.to_string(),
            target,
            transition,
            restored_category: None,
        }
    }

    /// Whether anything was written
    pub fn changed(&self) -> bool {
        !matches!(
            self.transition,
            Transition::Unchanged | Transition::SkippedDisabled
        ) || self.restored_category.is_some()
    }
}

/// An app that could not be reconciled in a batch pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub app: String,
    pub error: String,
}

/// Result of [`Reconciler::refresh_all`]
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefreshReport {
    pub outcomes: Vec<Outcome>,
    pub failures: Vec<Failure>,
}

impl RefreshReport {
    pub fn count(&self, transition: Transition) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.transition == transition)
            .count()
    }

    pub fn restored(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.restored_category.is_some())
            .count()
    }

    pub fn changed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.changed()).count()
    }
}

/// Applies package facts to the status store and categories
pub struct Reconciler<'a> {
    config: &'a Config,
    backend: &'a dyn PackageBackend,
    categories: &'a dyn CategoryEditor,
    notifier: &'a dyn Notifier,
    store: StatusStore,
}

impl<'a> Reconciler<'a> {
    pub fn new(
        config: &'a Config,
        backend: &'a dyn PackageBackend,
        categories: &'a dyn CategoryEditor,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            config,
            backend,
            categories,
            notifier,
            store: StatusStore::new(config),
        }
    }

    /// Refresh one package app from its packages file
    ///
    /// Every error, including category edits, is returned to the caller.
    pub fn refresh_app(&self, app: &str) -> Result<Outcome> {
        let declaration = PackageDeclaration::read(self.config, app)?;
        let packages: Vec<String> = declaration.packages().map(str::to_string).collect();
        let facts = self.backend.facts(&packages)?;
        self.apply(app, plan(&declaration, &facts))
    }

    /// Refresh one app against an explicit package (or `a|b` alternatives)
    /// instead of its packages file
    pub fn refresh_app_with(&self, app: &str, package: &str) -> Result<Outcome> {
        validate_app_name(app)?;
        let declaration = PackageDeclaration::parse(package)?;
        let packages: Vec<String> = declaration.packages().map(str::to_string).collect();
        let facts = self.backend.facts(&packages)?;
        self.apply(app, plan(&declaration, &facts))
    }

    /// Refresh every package app with one batched package query
    ///
    /// Per-app failures are logged and collected in the report; only a
    /// failing app listing or package query aborts the pass.
    pub fn refresh_all(&self) -> Result<RefreshReport> {
        let mut report = RefreshReport::default();

        let mut declarations = Vec::new();
        for app in list_apps(self.config, ListFilter::Package)? {
            match PackageDeclaration::read(self.config, &app) {
                Ok(declaration) => declarations.push((app, declaration)),
                Err(e) => {
                    warn!("Skipping {}: {}", app, e);
                    report.failures.push(Failure {
                        app,
                        error: e.to_string(),
                    });
                }
            }
        }

        let packages: Vec<String> = declarations
            .iter()
            .flat_map(|(_, declaration)| declaration.packages().map(str::to_string))
            .collect();
        debug!(
            "Querying {} packages for {} package apps via {}",
            packages.len(),
            declarations.len(),
            self.backend.name()
        );
        let facts = self.backend.facts(&packages)?;

        for (app, declaration) in &declarations {
            match self.apply(app, plan(declaration, &facts)) {
                Ok(outcome) => report.outcomes.push(outcome),
                Err(e) => {
                    warn!("Failed to refresh status for {}: {}", app, e);
                    report.failures.push(Failure {
                        app: app.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Refreshed {} package apps: {} changed, {} failed",
            report.outcomes.len(),
            report.changed(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Move an app to `target`, writing only what differs
    pub fn apply(&self, app: &str, target: TargetState) -> Result<Outcome> {
        // Unrecognised status content is an unknown state and gets overwritten
        let current = match self.store.get(app) {
            Ok(status) => Some(status),
            Err(Error::ParseError(e)) => {
                warn!("Ignoring status of {}: {}", app, e);
                None
            }
            Err(e) => return Err(e),
        };
        if current == Some(AppStatus::Disabled) {
            debug!("{} is disabled, leaving it alone", app);
            return Ok(Outcome::new(app, target, Transition::SkippedDisabled));
        }

        let categories = CategoryData::load(self.config)?;

        let transition = match &target {
            TargetState::Hidden => {
                if categories.is_hidden(app) {
                    Transition::Unchanged
                } else {
                    info!("Marking {} as hidden, no package is available", app);
                    self.categories.set_category(app, HIDDEN)?;
                    Transition::Hidden
                }
            }
            TargetState::Installed { package } => {
                if current == Some(AppStatus::Installed) {
                    Transition::Unchanged
                } else {
                    info!("Marking {} as installed ({} is installed)", app, package);
                    self.store.set(app, AppStatus::Installed)?;
                    self.notifier.notify(app, Trigger::Install);
                    Transition::MarkedInstalled
                }
            }
            TargetState::Uninstalled { package } => {
                if current == Some(AppStatus::Uninstalled) {
                    Transition::Unchanged
                } else {
                    info!("Marking {} as uninstalled ({} is not installed)", app, package);
                    self.store.remove(app)?;
                    self.notifier.notify(app, Trigger::Uninstall);
                    Transition::MarkedUninstalled
                }
            }
        };

        // Hidden apps keep their status file untouched
        if target == TargetState::Hidden {
            return Ok(Outcome::new(app, target, transition));
        }

        let mut outcome = Outcome::new(app, target, transition);

        if categories.is_hidden_override(app) {
            let category = match categories.original_category(app) {
                Ok(category) => category.to_string(),
                Err(e) => {
                    debug!("No original category for {}: {}", app, e);
                    DEFAULT_CATEGORY.to_string()
                }
            };
            info!("Unhiding {} into '{}', its packages are available again", app, category);
            self.categories.set_category(app, &category)?;
            outcome.restored_category = Some(category);
        }

        Ok(outcome)
    }
}
