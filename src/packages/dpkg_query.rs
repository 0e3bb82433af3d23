// src/packages/dpkg_query.rs

//! Query installed dpkg packages
//!
//! Install state comes from the dpkg status database (`/var/lib/dpkg/status`)
//! read once per pass, rather than one `dpkg -s` per package.

use super::traits::base_name;
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{debug, warn};

/// One stanza of the status database
#[derive(Debug, Default)]
struct Stanza<'a> {
    package: Option<&'a str>,
    status: Option<&'a str>,
    /// 1-based line where the stanza starts
    line: usize,
}

impl Stanza<'_> {
    /// `install ok installed` / `hold ok installed`
    fn is_installed(&self) -> bool {
        let Some(status) = self.status else {
            return false;
        };
        let words: Vec<&str> = status.split_whitespace().collect();
        matches!(words.as_slice(), [want, "ok", "installed"] if *want == "install" || *want == "hold")
    }
}

/// Return which of `wanted` are installed according to dpkg status text
///
/// Malformed stanzas are skipped and their line positions logged; they
/// count as not installed.
pub fn parse_dpkg_status(text: &str, wanted: &HashSet<&str>) -> HashSet<String> {
    let wanted: HashSet<&str> = wanted.iter().map(|p| base_name(p)).collect();
    let mut installed = HashSet::new();

    let mut finish = |stanza: &Stanza<'_>| match stanza.package {
        Some(name) => {
            if wanted.contains(name) && stanza.is_installed() {
                installed.insert(name.to_string());
            }
        }
        None => warn!(
            "dpkg status stanza at line {} has no Package field, skipping",
            stanza.line
        ),
    };

    let mut current: Option<Stanza<'_>> = None;
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;

        if line.trim().is_empty() {
            if let Some(stanza) = current.take() {
                finish(&stanza);
            }
            continue;
        }

        let stanza = current.get_or_insert_with(|| Stanza {
            line: line_no,
            ..Default::default()
        });

        // Continuation of a multi-line field
        if line.starts_with(' ') || line.starts_with('\t') {
            continue;
        }

        match line.split_once(':') {
            Some(("Package", value)) => stanza.package = Some(value.trim()),
            Some(("Status", value)) => stanza.status = Some(value.trim()),
            Some(_) => {}
            None => warn!("Malformed dpkg status line {}: {:?}", line_no, line),
        }
    }
    if let Some(stanza) = current.take() {
        finish(&stanza);
    }

    debug!("{} of {} queried packages installed", installed.len(), wanted.len());
    installed
}

/// Read the status database and return which of `packages` are installed
pub fn installed_packages(status_file: &Path, packages: &[String]) -> Result<HashSet<String>> {
    if packages.is_empty() {
        return Ok(HashSet::new());
    }

    let text = fs::read_to_string(status_file).map_err(|e| {
        Error::IoError(format!(
            "Failed to read dpkg status file {}: {}",
            status_file.display(),
            e
        ))
    })?;

    let wanted: HashSet<&str> = packages.iter().map(String::as_str).collect();
    Ok(parse_dpkg_status(&text, &wanted))
}

/// Native dpkg architecture (`dpkg --print-architecture`)
pub fn print_architecture() -> Result<String> {
    let output = Command::new("dpkg")
        .arg("--print-architecture")
        .env("LC_ALL", "C")
        .output()
        .map_err(|e| {
            Error::CommandError(format!("Failed to run dpkg: {}. Is dpkg installed?", e))
        })?;

    if !output.status.success() {
        return Err(Error::CommandError(format!(
            "dpkg --print-architecture failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let arch = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if arch.is_empty() {
        return Err(Error::CommandError(
            "dpkg --print-architecture printed nothing".to_string(),
        ));
    }
    Ok(arch)
}

/// Check if dpkg is available on this system
pub fn is_dpkg_available() -> bool {
    Command::new("dpkg")
        .args(["--version"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
