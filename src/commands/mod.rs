// src/commands/mod.rs
//! Command handlers for the pkgapp CLI

mod analytics;
mod category;
mod query;
mod refresh;
mod status;

pub use analytics::cmd_ping;
pub use category::{cmd_category_apps, cmd_category_get, cmd_category_set};
pub use query::{cmd_query, cmd_required_packages};
pub use refresh::cmd_refresh;
pub use status::{cmd_list, cmd_set_status, cmd_status};

use pkgapp::packages::dpkg_query::is_dpkg_available;
use pkgapp::{AnalyticsNotifier, AptBackend, Config, Notifier, NullNotifier};
use tracing::{debug, warn};

/// Package backend for this system
fn backend(config: &Config) -> AptBackend {
    if !is_dpkg_available() {
        warn!("dpkg not found; package queries will fail on this system");
    }
    AptBackend::new(config)
}

/// Analytics notifier, or a no-op one when analytics cannot be set up
fn notifier(config: &Config) -> Box<dyn Notifier> {
    if !config.analytics.enabled {
        return Box::new(NullNotifier);
    }
    match AnalyticsNotifier::from_config(config) {
        Ok(notifier) => Box::new(notifier),
        Err(e) => {
            debug!("Analytics unavailable: {}", e);
            Box::new(NullNotifier)
        }
    }
}
