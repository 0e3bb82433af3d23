// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use pkgapp::{
    AppStatus, CategoryEditor, Config, Error, Notifier, PackageBackend, PackageFacts, Result,
    StatusStore, Trigger,
};
use std::cell::{Cell, RefCell};
use std::fs;
use tempfile::TempDir;

/// Apps directory laid out like a real store.
///
/// Keep the TempDir alive to prevent cleanup.
pub struct StoreFixture {
    pub dir: TempDir,
    pub config: Config,
}

impl StoreFixture {
    /// Create an empty store with the given `etc/categories` content
    pub fn new(categories: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("apps")).unwrap();
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::create_dir_all(dir.path().join("data/status")).unwrap();
        fs::write(dir.path().join("etc/categories"), categories).unwrap();

        let mut config = Config::new(dir.path());
        config.analytics.enabled = false;
        Self { dir, config }
    }

    /// Add an app with a `packages` file
    pub fn add_package_app(&self, app: &str, packages: &str) {
        let app_dir = self.config.app_dir(app);
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join("packages"), packages).unwrap();
    }

    /// Add an app with install scripts
    pub fn add_standard_app(&self, app: &str) {
        let app_dir = self.config.app_dir(app);
        fs::create_dir_all(&app_dir).unwrap();
        fs::write(app_dir.join("install"), "#!/bin/bash\n").unwrap();
        fs::write(app_dir.join("uninstall"), "#!/bin/bash\n").unwrap();
    }

    /// Install an executable `etc/categoryedit` with the given shell body
    pub fn write_categoryedit(&self, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let script = self.config.categoryedit_script();
        fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    }

    pub fn write_overrides(&self, content: &str) {
        fs::write(self.config.category_overrides_file(), content).unwrap();
    }

    pub fn overrides(&self) -> String {
        fs::read_to_string(self.config.category_overrides_file()).unwrap_or_default()
    }

    pub fn set_status(&self, app: &str, status: AppStatus) {
        StatusStore::new(&self.config).set(app, status).unwrap();
    }

    /// Write a status file with arbitrary content
    pub fn write_status_raw(&self, app: &str, content: &str) {
        fs::write(self.config.status_file(app), content).unwrap();
    }

    pub fn status_raw(&self, app: &str) -> Option<String> {
        fs::read_to_string(self.config.status_file(app)).ok()
    }

    pub fn status(&self, app: &str) -> AppStatus {
        StatusStore::new(&self.config).get(app).unwrap()
    }

    pub fn has_status_file(&self, app: &str) -> bool {
        self.config.status_file(app).exists()
    }
}

/// Package backend answering from fixed facts
pub struct StaticBackend {
    pub facts: PackageFacts,
    pub queries: Cell<usize>,
}

impl StaticBackend {
    pub fn new(installed: &[&str], available: &[&str]) -> Self {
        let mut facts = PackageFacts::new();
        for package in installed {
            facts.mark_installed(package);
        }
        for package in available {
            facts.mark_available(package);
        }
        Self {
            facts,
            queries: Cell::new(0),
        }
    }
}

impl PackageBackend for StaticBackend {
    fn name(&self) -> &'static str {
        "static"
    }

    fn facts(&self, packages: &[String]) -> Result<PackageFacts> {
        self.queries.set(self.queries.get() + 1);
        let mut facts = PackageFacts::new();
        for package in packages {
            if self.facts.is_installed(package) {
                facts.mark_installed(package);
            }
            if self.facts.is_available(package) {
                facts.mark_available(package);
            }
        }
        Ok(facts)
    }
}

/// Notifier that records every ping
#[derive(Default)]
pub struct RecordingNotifier {
    pub pings: RefCell<Vec<(String, Trigger)>>,
}

impl RecordingNotifier {
    pub fn pings(&self) -> Vec<(String, Trigger)> {
        self.pings.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, app: &str, trigger: Trigger) {
        self.pings.borrow_mut().push((app.to_string(), trigger));
    }
}

/// Category editor whose writes always fail
pub struct FailingEditor;

impl CategoryEditor for FailingEditor {
    fn set_category(&self, app: &str, _category: &str) -> Result<()> {
        Err(Error::CommandError(format!("categoryedit failed for {}", app)))
    }

    fn category(&self, _app: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
