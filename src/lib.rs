// src/lib.rs

//! pkgapp - package-app status reconciliation
//!
//! Keeps an app store's view of *package apps* (apps that are just aliases
//! for OS packages) in line with what dpkg and apt report.
//!
//! # Architecture
//!
//! - Status store: one flat file per app under `data/status`
//! - Package query layer: batched dpkg/apt-cache facts behind `PackageBackend`
//! - Reconciler: per-app target state, writes only on change
//! - Categories: `etc/categories` plus `data/category-overrides` for hides
//! - Analytics: fire-and-forget pings on install/uninstall transitions

pub mod analytics;
pub mod apps;
pub mod category;
pub mod config;
mod error;
pub mod packages;
pub mod reconcile;
pub mod status;

pub use analytics::{AnalyticsNotifier, DeviceInfo, Notifier, NullNotifier, Trigger};
pub use apps::{AppType, ListFilter, PackageDeclaration, app_type, list_apps};
pub use category::{
    CategoryData, CategoryEditor, FileCategoryEditor, ScriptCategoryEditor, editor_for,
};
pub use config::{CategoryEditorKind, Config, ConfigFile};
pub use error::{Error, Result};
pub use packages::{AptBackend, PackageBackend, PackageFacts};
pub use reconcile::{Outcome, Reconciler, RefreshReport, TargetState, Transition, plan};
pub use status::{AppStatus, StatusStore};
