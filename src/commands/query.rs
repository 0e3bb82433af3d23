// src/commands/query.rs
//! Package manager queries

use super::backend;
use anyhow::Result;
use pkgapp::{Config, PackageBackend, PackageDeclaration};

/// Print the packages a package app would install
///
/// Prints nothing when some requirement has no installable alternative.
pub fn cmd_required_packages(config: &Config, app: &str) -> Result<()> {
    let declaration = PackageDeclaration::read(config, app)?;
    let packages: Vec<String> = declaration.packages().map(str::to_string).collect();
    let facts = backend(config).facts(&packages)?;

    if let Some(required) = declaration.required_packages(&facts) {
        println!("{}", required.join(" "));
    }
    Ok(())
}

/// Print install/availability facts for packages
pub fn cmd_query(config: &Config, packages: &[String]) -> Result<()> {
    let facts = backend(config).facts(packages)?;

    for package in packages {
        let installed = if facts.is_installed(package) { "installed" } else { "not installed" };
        let available = if facts.is_available(package) { "available" } else { "not available" };
        println!("{}: {}, {}", package, installed, available);
    }
    Ok(())
}
