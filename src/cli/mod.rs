// src/cli/mod.rs
//! CLI definitions for pkgapp
//!
//! This module contains all command-line interface definitions using clap.
//! The actual command implementations are in the `commands` module.
//!
//! - `refresh` - Reconcile one package app, or all of them
//! - `status` / `set-status` - Read or write an app's status file
//! - `list` - List apps by type, status or visibility
//! - `category` - Get or set an app's category
//! - `required-packages` / `query` - Package manager facts
//! - `ping` - Send an analytics ping

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use pkgapp::{AppStatus, ListFilter, Trigger};
use std::path::PathBuf;

mod category;

pub use category::CategoryCommands;

#[derive(Parser)]
#[command(name = "pkgapp")]
#[command(author = "pkgapp Contributors")]
#[command(version)]
#[command(about = "Keep package-app status in sync with the system package manager", long_about = None)]
pub struct Cli {
    /// App store directory
    #[arg(short, long, global = true, env = "PI_APPS_DIR")]
    pub dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Refresh the status of one package app, or of every package app
    Refresh {
        /// App to refresh (all package apps when omitted)
        app: Option<String>,

        /// Check this package (or `a|b` alternatives) instead of the app's packages file
        #[arg(long, requires = "app")]
        package: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an app's status
    Status {
        /// App name
        app: String,
    },

    /// Write an app's status (installed, uninstalled, disabled, corrupted)
    SetStatus {
        /// App name
        app: String,

        /// New status
        status: AppStatus,
    },

    /// List apps
    List {
        /// local, package, standard, installed, uninstalled, disabled,
        /// corrupted, have-status, hidden or visible
        #[arg(default_value = "local")]
        filter: ListFilter,
    },

    /// Category management
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Show the packages that installing a package app would pull in
    RequiredPackages {
        /// App name
        app: String,
    },

    /// Show whether packages are installed and available
    Query {
        /// Package names
        #[arg(required = true)]
        packages: Vec<String>,
    },

    /// Send an analytics ping and wait for it to be attempted
    Ping {
        /// App name
        app: String,

        /// install or uninstall
        trigger: Trigger,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
