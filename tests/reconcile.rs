// tests/reconcile.rs

//! Package-app reconciliation against a temporary store.

mod common;

use common::{FailingEditor, RecordingNotifier, StaticBackend, StoreFixture};
use pkgapp::{
    AppStatus, CategoryEditorKind, FileCategoryEditor, ListFilter, Reconciler, TargetState,
    Transition, Trigger, editor_for, list_apps,
};

const CATEGORIES: &str = "Firefox|Internet\nZoom|Internet\nSteam|Games\n";

#[test]
fn test_installed_alternative_marks_app_installed() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Firefox", "foo|bar");

    let backend = StaticBackend::new(&["bar"], &["foo", "bar"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app("Firefox").unwrap();

    assert_eq!(outcome.transition, Transition::MarkedInstalled);
    assert_eq!(
        outcome.target,
        TargetState::Installed {
            package: "bar".to_string()
        }
    );
    assert_eq!(store.status("Firefox"), AppStatus::Installed);
    assert_eq!(
        notifier.pings(),
        vec![("Firefox".to_string(), Trigger::Install)]
    );
}

#[test]
fn test_available_package_removes_status_file() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Zoom", "zoom");
    store.set_status("Zoom", AppStatus::Installed);

    let backend = StaticBackend::new(&[], &["zoom"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app("Zoom").unwrap();

    assert_eq!(outcome.transition, Transition::MarkedUninstalled);
    assert!(!store.has_status_file("Zoom"));
    assert_eq!(store.status("Zoom"), AppStatus::Uninstalled);
    assert_eq!(notifier.pings(), vec![("Zoom".to_string(), Trigger::Uninstall)]);
}

#[test]
fn test_unavailable_package_hides_app() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Steam", "baz");

    let backend = StaticBackend::new(&[], &[]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app("Steam").unwrap();

    assert_eq!(outcome.target, TargetState::Hidden);
    assert_eq!(outcome.transition, Transition::Hidden);
    assert!(store.overrides().contains("Steam|hidden"));
    assert!(!store.has_status_file("Steam"));
    assert!(notifier.pings().is_empty());
    assert_eq!(
        list_apps(&store.config, ListFilter::Hidden).unwrap(),
        vec!["Steam".to_string()]
    );
}

#[test]
fn test_second_pass_writes_nothing() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Firefox", "firefox-esr | firefox");
    store.add_package_app("Zoom", "zoom");
    store.add_package_app("Steam", "steam");
    store.set_status("Zoom", AppStatus::Installed);

    let backend = StaticBackend::new(&["firefox-esr"], &["firefox-esr", "zoom"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let first = reconciler.refresh_all().unwrap();
    assert_eq!(first.changed(), 3);
    assert_eq!(notifier.pings().len(), 2);
    let overrides = store.overrides();

    let second = reconciler.refresh_all().unwrap();
    assert_eq!(second.changed(), 0);
    assert!(second.failures.is_empty());
    assert!(
        second
            .outcomes
            .iter()
            .all(|o| o.transition == Transition::Unchanged)
    );
    assert_eq!(notifier.pings().len(), 2, "no pings on an unchanged pass");
    assert_eq!(store.overrides(), overrides);
}

#[test]
fn test_available_again_restores_category() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Steam", "steam");
    store.write_overrides("Steam|hidden\n");

    let backend = StaticBackend::new(&[], &["steam"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app("Steam").unwrap();

    assert_eq!(outcome.restored_category.as_deref(), Some("Games"));
    assert!(outcome.changed());
    assert!(!store.overrides().contains("Steam"));
    assert_eq!(
        list_apps(&store.config, ListFilter::Visible).unwrap(),
        vec!["Steam".to_string()]
    );
}

#[test]
fn test_restore_without_original_category_uses_other() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Newapp", "newpkg");
    store.write_overrides("Newapp|hidden\n");

    let backend = StaticBackend::new(&["newpkg"], &["newpkg"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app("Newapp").unwrap();

    assert_eq!(outcome.transition, Transition::MarkedInstalled);
    assert_eq!(outcome.restored_category.as_deref(), Some("Other"));
    assert!(store.overrides().contains("Newapp|Other"));
}

#[test]
fn test_disabled_app_is_left_alone() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Zoom", "zoom");
    store.set_status("Zoom", AppStatus::Disabled);

    let backend = StaticBackend::new(&["zoom"], &["zoom"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app("Zoom").unwrap();

    assert_eq!(outcome.transition, Transition::SkippedDisabled);
    assert_eq!(store.status("Zoom"), AppStatus::Disabled);
    assert!(notifier.pings().is_empty());
}

#[test]
fn test_batch_skips_unreadable_app_and_queries_once() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Firefox", "firefox");
    store.add_package_app("Broken", "foo |");
    store.add_standard_app("Scripted");

    let backend = StaticBackend::new(&["firefox"], &["firefox"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let report = reconciler.refresh_all().unwrap();

    assert_eq!(backend.queries.get(), 1);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].app, "Firefox");
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].app, "Broken");
    assert_eq!(store.status("Firefox"), AppStatus::Installed);
    assert!(!store.has_status_file("Scripted"));
}

#[test]
fn test_category_failure_propagates_for_single_app() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Steam", "steam");

    let backend = StaticBackend::new(&[], &[]);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &FailingEditor, &notifier);

    let err = reconciler.refresh_app("Steam").unwrap_err();
    assert!(err.to_string().contains("categoryedit failed"));
}

#[test]
fn test_category_failure_is_collected_in_batch() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Steam", "steam");
    store.add_package_app("Zoom", "zoom");

    let backend = StaticBackend::new(&["zoom"], &["zoom"]);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &FailingEditor, &notifier);

    let report = reconciler.refresh_all().unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].app, "Steam");
    assert_eq!(report.count(Transition::MarkedInstalled), 1);
    assert_eq!(store.status("Zoom"), AppStatus::Installed);
}

#[test]
fn test_explicit_package_overrides_packages_file() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Zoom", "zoom");

    let backend = StaticBackend::new(&["zoom-beta"], &["zoom", "zoom-beta"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app_with("Zoom", "zoom | zoom-beta").unwrap();

    assert_eq!(
        outcome.target,
        TargetState::Installed {
            package: "zoom-beta".to_string()
        }
    );
    assert_eq!(store.status("Zoom"), AppStatus::Installed);
}

#[test]
fn test_empty_status_file_is_repaired() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Zoom", "zoom");
    store.write_status_raw("Zoom", "");

    let backend = StaticBackend::new(&["zoom"], &["zoom"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let outcome = reconciler.refresh_app("Zoom").unwrap();

    assert_eq!(outcome.transition, Transition::MarkedInstalled);
    assert_eq!(store.status_raw("Zoom").as_deref(), Some("installed"));
    assert_eq!(notifier.pings(), vec![("Zoom".to_string(), Trigger::Install)]);

    let report = reconciler.refresh_all().unwrap();
    assert!(report.failures.is_empty());
    assert_eq!(report.count(Transition::Unchanged), 1);
}

#[test]
fn test_garbage_status_file_is_repaired_in_batch() {
    let store = StoreFixture::new(CATEGORIES);
    store.add_package_app("Firefox", "firefox");
    store.add_package_app("Zoom", "zoom");
    store.write_status_raw("Firefox", "instal\0led??");
    store.write_status_raw("Zoom", "maybe\n");

    let backend = StaticBackend::new(&["firefox"], &["firefox", "zoom"]);
    let editor = FileCategoryEditor::new(&store.config);
    let notifier = RecordingNotifier::default();
    let reconciler = Reconciler::new(&store.config, &backend, &editor, &notifier);

    let report = reconciler.refresh_all().unwrap();

    assert!(report.failures.is_empty());
    assert_eq!(report.count(Transition::MarkedInstalled), 1);
    assert_eq!(report.count(Transition::MarkedUninstalled), 1);
    assert_eq!(store.status_raw("Firefox").as_deref(), Some("installed"));
    assert!(!store.has_status_file("Zoom"));
}

#[test]
fn test_hide_and_restore_through_categoryedit_script() {
    let mut store = StoreFixture::new(CATEGORIES);
    store.config.category_editor = CategoryEditorKind::Script;
    store.add_package_app("Steam", "steam");
    store.write_categoryedit(
        r#"f="$PI_APPS_DIR/data/category-overrides"
touch "$f"
grep -v "^$1|" "$f" > "$f.new"
echo "$1|$2" >> "$f.new"
mv "$f.new" "$f""#,
    );

    let editor = editor_for(&store.config);
    let notifier = RecordingNotifier::default();

    let gone = StaticBackend::new(&[], &[]);
    let reconciler = Reconciler::new(&store.config, &gone, editor.as_ref(), &notifier);
    let outcome = reconciler.refresh_app("Steam").unwrap();
    assert_eq!(outcome.transition, Transition::Hidden);
    assert_eq!(store.overrides(), "Steam|hidden\n");

    let back = StaticBackend::new(&[], &["steam"]);
    let reconciler = Reconciler::new(&store.config, &back, editor.as_ref(), &notifier);
    let outcome = reconciler.refresh_app("Steam").unwrap();
    assert_eq!(outcome.restored_category.as_deref(), Some("Games"));
    assert_eq!(store.overrides(), "Steam|Games\n");
    assert!(notifier.pings().is_empty());
}
