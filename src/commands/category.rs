// src/commands/category.rs
//! Category commands

use anyhow::{Context, Result};
use pkgapp::{CategoryData, Config, editor_for};

/// Print an app's effective category
pub fn cmd_category_get(config: &Config, app: &str) -> Result<()> {
    match editor_for(config).category(app)? {
        Some(category) => println!("{}", category),
        None => println!("{} has no category", app),
    }
    Ok(())
}

/// Move an app to a category
pub fn cmd_category_set(config: &Config, app: &str, category: &str) -> Result<()> {
    editor_for(config)
        .set_category(app, category)
        .with_context(|| format!("Failed to move '{}' to '{}'", app, category))?;
    println!("Moved {} to {}", app, category);
    Ok(())
}

/// Print the apps in a category
pub fn cmd_category_apps(config: &Config, category: &str) -> Result<()> {
    let data = CategoryData::load(config)?;
    for app in data.apps_in(category) {
        println!("{}", app);
    }
    Ok(())
}
