// src/category.rs

//! Category and visibility layer
//!
//! Categories come from two `app|category` files:
//! - `<dir>/etc/categories`: the store's global assignments
//! - `<dir>/data/category-overrides`: local changes, including `app|hidden`
//!
//! Overrides take precedence. Hiding an app writes an override; unhiding
//! restores the global category, which drops the override again.

use crate::apps::validate_app_name;
use crate::config::{CategoryEditorKind, Config};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

/// Pseudo-category for apps with no installable package
pub const HIDDEN: &str = "hidden";

/// Category used when an app's original category cannot be found
pub const DEFAULT_CATEGORY: &str = "Other";

/// Read an `app|category` file; a missing file is empty
///
/// Blank lines and `#` comments are ignored; malformed lines are logged
/// with their position and skipped. The category is the second field, and
/// the first line for an app wins.
pub fn read_category_file(path: &Path) -> Result<BTreeMap<String, String>> {
    Ok(parse_category_file(path)?.0)
}

/// Parsed entries plus the comment and malformed lines, in file order
fn parse_category_file(path: &Path) -> Result<(BTreeMap<String, String>, Vec<String>)> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Default::default()),
        Err(e) => {
            return Err(Error::IoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )));
        }
    };

    let mut categories = BTreeMap::new();
    let mut unparsed = Vec::new();
    for (index, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('#') {
            unparsed.push(raw.to_string());
            continue;
        }

        let mut fields = line.split('|').map(str::trim);
        match (fields.next(), fields.next()) {
            (Some(app), Some(category)) if !app.is_empty() => {
                if categories.contains_key(app) {
                    debug!(
                        "Ignoring duplicate entry for {} on line {} of {}",
                        app,
                        index + 1,
                        path.display()
                    );
                    continue;
                }
                categories.insert(app.to_string(), category.to_string());
            }
            _ => {
                warn!(
                    "Skipping malformed line {} in {}: {:?}",
                    index + 1,
                    path.display(),
                    line
                );
                unparsed.push(raw.to_string());
            }
        }
    }

    Ok((categories, unparsed))
}

/// Global and local category assignments
#[derive(Debug, Clone, Default)]
pub struct CategoryData {
    pub global: BTreeMap<String, String>,
    pub overrides: BTreeMap<String, String>,
    /// Comment and malformed lines of the override file, written back as-is
    unparsed_overrides: Vec<String>,
}

impl CategoryData {
    pub fn load(config: &Config) -> Result<Self> {
        let (overrides, unparsed_overrides) =
            parse_category_file(&config.category_overrides_file())?;
        Ok(Self {
            global: read_category_file(&config.categories_file())?,
            overrides,
            unparsed_overrides,
        })
    }

    /// Effective category: override, then global
    pub fn category_of(&self, app: &str) -> Option<&str> {
        self.overrides
            .get(app)
            .or_else(|| self.global.get(app))
            .map(String::as_str)
    }

    /// Category from the global file, ignoring overrides
    pub fn original_category(&self, app: &str) -> Result<&str> {
        if self.global.is_empty() {
            return Err(Error::NotFoundError(
                "categories file is missing or empty".to_string(),
            ));
        }
        self.global
            .get(app)
            .map(String::as_str)
            .ok_or_else(|| Error::NotFoundError(format!("app '{}' not in categories file", app)))
    }

    /// Whether the override file records the app as hidden
    pub fn is_hidden_override(&self, app: &str) -> bool {
        self.overrides.get(app).map(String::as_str) == Some(HIDDEN)
    }

    pub fn is_hidden(&self, app: &str) -> bool {
        self.category_of(app) == Some(HIDDEN)
    }

    /// Apps whose effective category is `category`, sorted
    pub fn apps_in(&self, category: &str) -> Vec<String> {
        let mut apps: Vec<String> = self
            .global
            .keys()
            .chain(self.overrides.keys())
            .filter(|app| self.category_of(app) == Some(category))
            .cloned()
            .collect();
        apps.sort();
        apps.dedup();
        apps
    }

    /// Set an app's category in the overrides
    ///
    /// Matching the global category removes the override.
    pub fn set(&mut self, app: &str, category: &str) {
        if self.global.get(app).map(String::as_str) == Some(category) {
            self.overrides.remove(app);
        } else {
            self.overrides.insert(app.to_string(), category.to_string());
        }
    }

    /// Write the override file, sorted by app
    ///
    /// Comment and malformed lines read by [`CategoryData::load`] are kept
    /// at the top of the file.
    pub fn save_overrides(&self, config: &Config) -> Result<()> {
        let path = config.category_overrides_file();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::IoError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let mut content = String::new();
        for line in &self.unparsed_overrides {
            content.push_str(line);
            content.push('\n');
        }
        for (app, category) in &self.overrides {
            content.push_str(app);
            content.push('|');
            content.push_str(category);
            content.push('\n');
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|e| Error::IoError(format!("Failed to write {}: {}", path.display(), e)))
    }
}

/// Sets and reads app categories
pub trait CategoryEditor {
    /// Move `app` to `category`
    fn set_category(&self, app: &str, category: &str) -> Result<()>;

    /// Effective category of `app`, if any
    fn category(&self, app: &str) -> Result<Option<String>>;
}

fn validate_category(category: &str) -> Result<()> {
    if category.contains('|') || category.contains('\n') {
        return Err(Error::ParseError(format!("invalid category '{}'", category)));
    }
    Ok(())
}

/// Edits `data/category-overrides` directly
pub struct FileCategoryEditor {
    config: Config,
}

impl FileCategoryEditor {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl CategoryEditor for FileCategoryEditor {
    fn set_category(&self, app: &str, category: &str) -> Result<()> {
        validate_app_name(app)?;
        validate_category(category)?;

        let mut data = CategoryData::load(&self.config)?;
        data.set(app, category);
        data.save_overrides(&self.config)?;

        info!("Moved {} to category '{}'", app, category);
        Ok(())
    }

    fn category(&self, app: &str) -> Result<Option<String>> {
        let data = CategoryData::load(&self.config)?;
        Ok(data.category_of(app).map(str::to_string))
    }
}

/// Runs `<dir>/etc/categoryedit <app> <category>`
pub struct ScriptCategoryEditor {
    config: Config,
}

impl ScriptCategoryEditor {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl CategoryEditor for ScriptCategoryEditor {
    fn set_category(&self, app: &str, category: &str) -> Result<()> {
        validate_app_name(app)?;
        validate_category(category)?;

        let script = self.config.categoryedit_script();
        debug!("Running {} {:?} {:?}", script.display(), app, category);

        let output = Command::new(&script)
            .args([app, category])
            .env(crate::config::ENV_APPS_DIR, &self.config.directory)
            .output()
            .map_err(|e| {
                Error::CommandError(format!("Failed to run {}: {}", script.display(), e))
            })?;

        if !output.status.success() {
            return Err(Error::CommandError(format!(
                "categoryedit failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        info!("Moved {} to category '{}'", app, category);
        Ok(())
    }

    fn category(&self, app: &str) -> Result<Option<String>> {
        let data = CategoryData::load(&self.config)?;
        Ok(data.category_of(app).map(str::to_string))
    }
}

/// Category editor selected by the configuration
pub fn editor_for(config: &Config) -> Box<dyn CategoryEditor> {
    match config.category_editor {
        CategoryEditorKind::File => Box::new(FileCategoryEditor::new(config)),
        CategoryEditorKind::Script => Box::new(ScriptCategoryEditor::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup(categories: &str) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path());
        fs::create_dir_all(dir.path().join("etc")).unwrap();
        fs::write(config.categories_file(), categories).unwrap();
        (dir, config)
    }

    #[test]
    fn test_read_skips_comments_and_garbage() {
        let (_dir, config) = setup("# comment\n\nFirefox|Internet\nnot a category line\nZoom|Internet/Communication\n");
        let data = CategoryData::load(&config).unwrap();
        assert_eq!(data.global.len(), 2);
        assert_eq!(data.category_of("Zoom"), Some("Internet/Communication"));
        assert!(data.overrides.is_empty());
    }

    #[test]
    fn test_hide_and_restore_roundtrip() {
        let (_dir, config) = setup("Firefox|Internet\n");
        let editor = FileCategoryEditor::new(&config);

        editor.set_category("Firefox", HIDDEN).unwrap();
        let overrides = fs::read_to_string(config.category_overrides_file()).unwrap();
        assert_eq!(overrides, "Firefox|hidden\n");
        assert_eq!(editor.category("Firefox").unwrap().as_deref(), Some(HIDDEN));

        editor.set_category("Firefox", "Internet").unwrap();
        let overrides = fs::read_to_string(config.category_overrides_file()).unwrap();
        assert!(overrides.is_empty());
        assert_eq!(editor.category("Firefox").unwrap().as_deref(), Some("Internet"));
    }

    #[test]
    fn test_overrides_sorted() {
        let (_dir, config) = setup("");
        let editor = FileCategoryEditor::new(&config);
        editor.set_category("b", "Games").unwrap();
        editor.set_category("a", HIDDEN).unwrap();
        let overrides = fs::read_to_string(config.category_overrides_file()).unwrap();
        assert_eq!(overrides, "a|hidden\nb|Games\n");
    }

    #[test]
    fn test_original_category_lookup() {
        let (_dir, config) = setup("Firefox|Internet\n");
        let mut data = CategoryData::load(&config).unwrap();
        data.set("Firefox", HIDDEN);
        assert!(data.is_hidden_override("Firefox"));
        assert_eq!(data.original_category("Firefox").unwrap(), "Internet");
        assert!(data.original_category("Zoom").is_err());
    }

    #[test]
    fn test_original_category_without_file() {
        let dir = TempDir::new().unwrap();
        let data = CategoryData::load(&Config::new(dir.path())).unwrap();
        assert!(matches!(
            data.original_category("Firefox"),
            Err(Error::NotFoundError(_))
        ));
    }

    #[test]
    fn test_apps_in_category() {
        let (_dir, config) = setup("a|Games\nb|Games\nc|Tools\n");
        let mut data = CategoryData::load(&config).unwrap();
        data.set("b", HIDDEN);
        data.set("d", HIDDEN);
        assert_eq!(data.apps_in("Games"), vec!["a"]);
        assert_eq!(data.apps_in(HIDDEN), vec!["b", "d"]);
    }

    #[test]
    fn test_rejects_bad_category() {
        let (_dir, config) = setup("");
        let editor = FileCategoryEditor::new(&config);
        assert!(editor.set_category("a", "Games|Tools").is_err());
    }

    #[test]
    fn test_second_field_and_first_entry_win() {
        let (_dir, config) = setup("Firefox|Internet|extra\nFirefox|Games\nZoom|Tools\n");
        let data = CategoryData::load(&config).unwrap();
        assert_eq!(data.category_of("Firefox"), Some("Internet"));
        assert_eq!(data.original_category("Firefox").unwrap(), "Internet");
        assert_eq!(data.category_of("Zoom"), Some("Tools"));
    }

    #[test]
    fn test_save_keeps_comments_and_unknown_lines() {
        let (_dir, config) = setup("Firefox|Internet\n");
        fs::create_dir_all(config.directory.join("data")).unwrap();
        fs::write(
            config.category_overrides_file(),
            "# local changes\nZoom|Tools\nnot an entry\n",
        )
        .unwrap();

        FileCategoryEditor::new(&config)
            .set_category("Firefox", HIDDEN)
            .unwrap();

        let overrides = fs::read_to_string(config.category_overrides_file()).unwrap();
        assert_eq!(
            overrides,
            "# local changes\nnot an entry\nFirefox|hidden\nZoom|Tools\n"
        );
    }

    fn write_script(config: &Config, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let script = config.categoryedit_script();
        fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_script_editor_passes_app_category_and_dir() {
        let (dir, config) = setup("");
        write_script(
            &config,
            r#"printf '%s\n%s\n%s\n' "$1" "$2" "$PI_APPS_DIR" > "$PI_APPS_DIR/categoryedit.log""#,
        );

        ScriptCategoryEditor::new(&config)
            .set_category("Zoom", "Internet/Communication")
            .unwrap();

        let log = fs::read_to_string(dir.path().join("categoryedit.log")).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines[0], "Zoom");
        assert_eq!(lines[1], "Internet/Communication");
        assert_eq!(Path::new(lines[2]), dir.path());
    }

    #[test]
    fn test_script_editor_failure_carries_stderr() {
        let (_dir, config) = setup("");
        write_script(&config, "echo \"unknown category '$2'\" >&2\nexit 3");

        let err = ScriptCategoryEditor::new(&config)
            .set_category("Zoom", "Nowhere")
            .unwrap_err();
        match err {
            Error::CommandError(msg) => assert!(msg.contains("unknown category 'Nowhere'"), "{}", msg),
            other => panic!("expected CommandError, got {:?}", other),
        }
    }

    #[test]
    fn test_script_editor_missing_script() {
        let (_dir, config) = setup("");
        let editor = ScriptCategoryEditor::new(&config);
        assert!(matches!(
            editor.set_category("a", HIDDEN),
            Err(Error::CommandError(_))
        ));
    }
}
