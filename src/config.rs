// src/config.rs

//! Runtime configuration
//!
//! Every component receives a [`Config`] instead of reading `PI_APPS_DIR`
//! itself. The CLI builds one from `--dir` (or the environment variable),
//! optionally layered with a TOML file:
//!
//! ```toml
//! [paths]
//! directory = "/home/pi/pi-apps"
//! dpkg_status = "/var/lib/dpkg/status"
//! system_root = "/"
//!
//! [categories]
//! editor = "script"        # or "file" (default)
//!
//! [analytics]
//! enabled = true
//! endpoint = "https://analytics.pi-apps.io"
//! timeout_secs = 10
//! ```

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable naming the apps directory
pub const ENV_APPS_DIR: &str = "PI_APPS_DIR";

/// Default location of the dpkg status database
pub const DEFAULT_DPKG_STATUS: &str = "/var/lib/dpkg/status";

/// Default analytics endpoint
pub const DEFAULT_ANALYTICS_ENDPOINT: &str = "https://analytics.pi-apps.io";

/// Default analytics request timeout
pub const DEFAULT_ANALYTICS_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings file that disables analytics when it contains `No`
pub const ANALYTICS_SETTING: &str = "Enable analytics";

/// How category changes are applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryEditorKind {
    /// Edit `data/category-overrides` directly
    #[default]
    File,
    /// Run the `etc/categoryedit` script shipped in the apps directory
    Script,
}

/// Analytics endpoint settings
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Master switch; the per-user setting file is checked on top of this
    pub enabled: bool,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_ANALYTICS_ENDPOINT.to_string(),
            timeout: DEFAULT_ANALYTICS_TIMEOUT,
        }
    }
}

/// Resolved configuration threaded through all components
#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the app store (`PI_APPS_DIR`)
    pub directory: PathBuf,
    /// dpkg status database read by the apt backend
    pub dpkg_status: PathBuf,
    /// Root used for machine files (`/etc/os-release`, `/proc/cpuinfo`, ...)
    pub system_root: PathBuf,
    pub category_editor: CategoryEditorKind,
    pub analytics: AnalyticsConfig,
}

impl Config {
    /// Create a configuration for an apps directory with default paths
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            dpkg_status: PathBuf::from(DEFAULT_DPKG_STATUS),
            system_root: PathBuf::from("/"),
            category_editor: CategoryEditorKind::default(),
            analytics: AnalyticsConfig::default(),
        }
    }

    /// Resolve the configuration from an explicit directory and optional config file
    ///
    /// The explicit directory wins over the file's `paths.directory`.
    pub fn resolve(directory: Option<PathBuf>, config_file: Option<&Path>) -> Result<Self> {
        let file = match config_file {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let directory = directory
            .or_else(|| file.paths.directory.clone())
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "{ENV_APPS_DIR} environment variable not set and no --dir given"
                ))
            })?;

        let config = Self::new(directory).with_file(&file);
        config.validate()?;
        Ok(config)
    }

    /// Apply the values present in a config file
    pub fn with_file(mut self, file: &ConfigFile) -> Self {
        if let Some(path) = &file.paths.dpkg_status {
            self.dpkg_status = path.clone();
        }
        if let Some(root) = &file.paths.system_root {
            self.system_root = root.clone();
        }
        if let Some(editor) = file.categories.editor {
            self.category_editor = editor;
        }
        if let Some(enabled) = file.analytics.enabled {
            self.analytics.enabled = enabled;
        }
        if let Some(endpoint) = &file.analytics.endpoint {
            self.analytics.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(secs) = file.analytics.timeout_secs {
            self.analytics.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Check that the apps directory exists
    pub fn validate(&self) -> Result<()> {
        if !self.directory.is_dir() {
            return Err(Error::ConfigError(format!(
                "apps directory does not exist: {}",
                self.directory.display()
            )));
        }
        Ok(())
    }

    pub fn apps_dir(&self) -> PathBuf {
        self.directory.join("apps")
    }

    pub fn app_dir(&self, app: &str) -> PathBuf {
        self.apps_dir().join(app)
    }

    /// `<dir>/apps/<app>/packages`
    pub fn packages_file(&self, app: &str) -> PathBuf {
        self.app_dir(app).join("packages")
    }

    pub fn status_dir(&self) -> PathBuf {
        self.directory.join("data").join("status")
    }

    /// `<dir>/data/status/<app>`
    pub fn status_file(&self, app: &str) -> PathBuf {
        self.status_dir().join(app)
    }

    /// `<dir>/etc/categories`
    pub fn categories_file(&self) -> PathBuf {
        self.directory.join("etc").join("categories")
    }

    /// `<dir>/data/category-overrides`
    pub fn category_overrides_file(&self) -> PathBuf {
        self.directory.join("data").join("category-overrides")
    }

    pub fn categoryedit_script(&self) -> PathBuf {
        self.directory.join("etc").join("categoryedit")
    }

    pub fn settings_file(&self, name: &str) -> PathBuf {
        self.directory.join("data").join("settings").join(name)
    }

    /// Read a user setting, trimmed; `None` when the file is absent or unreadable
    pub fn read_setting(&self, name: &str) -> Option<String> {
        let path = self.settings_file(name);
        match fs::read_to_string(&path) {
            Ok(value) => Some(value.trim().to_string()),
            Err(e) => {
                debug!("Setting {} not readable: {}", path.display(), e);
                None
            }
        }
    }

    /// Whether analytics pings may be sent
    ///
    /// Only the literal setting `No` disables them.
    pub fn analytics_enabled(&self) -> bool {
        self.analytics.enabled && self.read_setting(ANALYTICS_SETTING).as_deref() != Some("No")
    }

    /// Map an absolute system path under the configured system root
    pub fn system_path(&self, path: &str) -> PathBuf {
        self.system_root.join(path.trim_start_matches('/'))
    }
}

/// On-disk TOML configuration; every field is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub paths: PathsSection,
    pub categories: CategoriesSection,
    pub analytics: AnalyticsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    pub directory: Option<PathBuf>,
    pub dpkg_status: Option<PathBuf>,
    pub system_root: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoriesSection {
    pub editor: Option<CategoryEditorKind>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyticsSection {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Load and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Parse TOML config text
    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
