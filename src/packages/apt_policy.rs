// src/packages/apt_policy.rs

//! `apt-cache policy` output parsing
//!
//! ```text
//! firefox-esr:
//!   Installed: (none)
//!   Candidate: 115.6.0esr-1~deb12u1
//!   Version table:
//!      115.6.0esr-1~deb12u1 500
//!         500 http://deb.debian.org/debian bookworm/main arm64 Packages
//! N: Unable to locate package not-a-package
//! ```

use super::traits::base_name;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::process::Command;
use tracing::{debug, warn};

const UNABLE_TO_LOCATE: &str = "Unable to locate package ";

/// apt notice/warning/error lines (`N: `, `W: `, `E: `); package names are lowercase
fn is_diagnostic(line: &str) -> bool {
    matches!(line.get(..3), Some("N: " | "W: " | "E: "))
}

/// Parse policy text into package -> candidate version
///
/// `None` means the package is known but has no candidate (`(none)`), or
/// apt could not locate it. Lines that fit nowhere are logged with their
/// position and ignored.
pub fn parse_apt_policy(text: &str) -> HashMap<String, Option<String>> {
    let mut policies: HashMap<String, Option<String>> = HashMap::new();
    let mut current: Option<String> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            // Diagnostics: "N: Unable to locate package foo", "W: ..."
            if is_diagnostic(line) {
                if let Some(index) = line.find(UNABLE_TO_LOCATE) {
                    let rest = &line[index + UNABLE_TO_LOCATE.len()..];
                    let name = base_name(rest.trim()).to_string();
                    policies.entry(name).or_insert(None);
                }
                current = None;
                continue;
            }

            // Package header: "name:" or "name:arch:"
            if let Some(header) = line.trim_end().strip_suffix(':') {
                let name = base_name(header);
                if !name.is_empty() && !name.contains(char::is_whitespace) {
                    policies.entry(name.to_string()).or_insert(None);
                    current = Some(name.to_string());
                    continue;
                }
            }

            debug!("Ignoring apt-cache policy line {}: {:?}", line_no, line);
            current = None;
            continue;
        }

        let trimmed = line.trim();
        if let Some(value) = trimmed.strip_prefix("Candidate:") {
            let Some(name) = current.as_ref() else {
                warn!(
                    "apt-cache policy Candidate line {} outside a package block: {:?}",
                    line_no, trimmed
                );
                continue;
            };
            let value = value.trim();
            let candidate = if value.is_empty() || value == "(none)" {
                None
            } else {
                Some(value.to_string())
            };
            policies.insert(name.clone(), candidate);
        }
    }

    policies
}

/// Run one `apt-cache policy` for all packages and parse the output
///
/// `arch` qualifies every query (`pkg:arch`) so foreign-architecture
/// candidates are not mistaken for native ones.
pub fn query_policy(packages: &[String], arch: Option<&str>) -> Result<HashMap<String, Option<String>>> {
    if packages.is_empty() {
        return Ok(HashMap::new());
    }

    let args: Vec<String> = packages
        .iter()
        .map(|pkg| match arch {
            Some(arch) if !pkg.contains(':') => format!("{}:{}", pkg, arch),
            _ => pkg.clone(),
        })
        .collect();

    debug!("Running apt-cache policy for {} packages", args.len());
    let output = Command::new("apt-cache")
        .arg("policy")
        .args(&args)
        .env("LC_ALL", "C")
        .output()
        .map_err(|e| Error::CommandError(format!("Failed to run apt-cache: {}", e)))?;

    if !output.status.success() {
        return Err(Error::CommandError(format!(
            "apt-cache policy failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    // "Unable to locate" notices go to stderr
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push('\n');
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    Ok(parse_apt_policy(&text))
}
