// src/cli/category.rs
//! Category commands

use clap::Subcommand;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// Show an app's effective category
    Get {
        /// App name
        app: String,
    },

    /// Move an app to a category (`hidden` hides it)
    Set {
        /// App name
        app: String,

        /// Category name
        category: String,
    },

    /// List the apps in a category
    Apps {
        /// Category name
        category: String,
    },
}
