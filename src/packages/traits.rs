// src/packages/traits.rs

//! Package backend capability trait and the facts snapshot it produces

use crate::error::Result;
use std::collections::HashSet;

/// Strip a `:arch` qualifier (`libc6:armhf` -> `libc6`)
pub fn base_name(package: &str) -> &str {
    package.split(':').next().unwrap_or(package)
}

/// Snapshot of install/availability facts for a set of packages
///
/// Taken once per reconciliation pass and never persisted. Packages missing
/// from the snapshot count as neither installed nor available.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageFacts {
    installed: HashSet<String>,
    available: HashSet<String>,
}

impl PackageFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_installed(&self, package: &str) -> bool {
        self.installed.contains(base_name(package))
    }

    /// Whether a repository offers a candidate version
    pub fn is_available(&self, package: &str) -> bool {
        self.available.contains(base_name(package))
    }

    pub fn mark_installed(&mut self, package: &str) {
        self.installed.insert(base_name(package).to_string());
    }

    pub fn mark_available(&mut self, package: &str) {
        self.available.insert(base_name(package).to_string());
    }

    /// Fold another snapshot into this one
    pub fn merge(&mut self, other: PackageFacts) {
        self.installed.extend(other.installed);
        self.available.extend(other.available);
    }

    pub fn installed_count(&self) -> usize {
        self.installed.len()
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }
}

/// A package manager that can answer install/availability questions
///
/// Implementations batch the whole package list into as few queries as the
/// underlying tool allows.
pub trait PackageBackend {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Query facts for every package in `packages`
    fn facts(&self, packages: &[String]) -> Result<PackageFacts>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arch_qualifier_ignored() {
        let mut facts = PackageFacts::new();
        facts.mark_installed("libc6:armhf");
        assert!(facts.is_installed("libc6"));
        assert!(facts.is_installed("libc6:arm64"));
        assert!(!facts.is_available("libc6"));
    }

    #[test]
    fn test_merge() {
        let mut a = PackageFacts::new();
        a.mark_installed("foo");
        let mut b = PackageFacts::new();
        b.mark_available("bar");
        a.merge(b);
        assert!(a.is_installed("foo"));
        assert!(a.is_available("bar"));
        assert_eq!(a.installed_count(), 1);
        assert_eq!(a.available_count(), 1);
    }
}
