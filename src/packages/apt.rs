// src/packages/apt.rs

//! APT/dpkg package backend

use super::traits::{PackageBackend, PackageFacts, base_name};
use super::{apt_policy, dpkg_query};
use crate::config::Config;
use crate::error::Result;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info};

/// Backend reading the dpkg status database and `apt-cache policy`
pub struct AptBackend {
    status_file: PathBuf,
    architecture: OnceCell<String>,
}

impl AptBackend {
    pub fn new(config: &Config) -> Self {
        Self {
            status_file: config.dpkg_status.clone(),
            architecture: OnceCell::new(),
        }
    }

    /// Use a fixed architecture instead of asking dpkg
    pub fn with_architecture(self, arch: impl Into<String>) -> Self {
        let _ = self.architecture.set(arch.into());
        self
    }

    /// Native architecture, queried once
    pub fn architecture(&self) -> Result<&str> {
        if let Some(arch) = self.architecture.get() {
            return Ok(arch.as_str());
        }
        let arch = dpkg_query::print_architecture()?;
        debug!("dpkg architecture: {}", arch);
        Ok(self.architecture.get_or_init(|| arch).as_str())
    }
}

/// Deduplicate by base name, keeping first-seen order
fn unique_packages(packages: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    packages
        .iter()
        .map(|p| base_name(p).to_string())
        .filter(|p| seen.insert(p.clone()))
        .collect()
}

impl PackageBackend for AptBackend {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn facts(&self, packages: &[String]) -> Result<PackageFacts> {
        let packages = unique_packages(packages);
        let mut facts = PackageFacts::new();
        if packages.is_empty() {
            return Ok(facts);
        }

        for package in dpkg_query::installed_packages(&self.status_file, &packages)? {
            facts.mark_installed(&package);
        }

        let arch = self.architecture()?;
        let mut available = PackageFacts::new();
        for (package, candidate) in apt_policy::query_policy(&packages, Some(arch))? {
            if candidate.is_some() {
                available.mark_available(&package);
            }
        }
        facts.merge(available);

        info!(
            "Queried {} packages: {} installed, {} available",
            packages.len(),
            facts.installed_count(),
            facts.available_count()
        );
        Ok(facts)
    }
}
