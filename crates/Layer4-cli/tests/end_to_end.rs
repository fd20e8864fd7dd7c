//! End-to-end flow over a real project directory:
//! scan → reconcile → browse in the tree store → apply → rescan

use accessmap_core::{ConfigStore, FsSource, LoadOutcome, Reconciler};
use accessmap_foundation::{Settings, ADMIN, BASELINE_ROLES, USER};
use accessmap_tree::PermissionTreeStore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn seed(root: &Path) {
    write(
        root,
        "src/layout.html",
        r#"<nav access-marker="dashboard" access-description="Dashboard"></nav>
<section access-marker="projects" access-description="Проекты"></section>"#,
    );
    write(
        root,
        "src/projects/list.vue",
        r#"<button access-marker="projects.view" access-down="projects" access-description="View">
<button access-marker='projects.delete' access-down='projects' access-description='Delete'>"#,
    );
    write(
        root,
        "src/node_modules/lib/index.js",
        r#"el.setAttribute("x", 1) // access-marker="vendor.widget""#,
    );
    write(root, "src/readme.md", r#"access-marker="docs.only""#);
}

fn reconciler(root: &Path, settings: &Settings) -> Reconciler {
    Reconciler::new(ConfigStore::from_settings(root, settings))
}

#[test]
fn scan_builds_forest_and_bootstraps_roles() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let settings = Settings::default();

    let report = reconciler(dir.path(), &settings)
        .sync(&FsSource::from_settings(dir.path(), &settings))
        .unwrap();

    assert_eq!(report.load_outcome, LoadOutcome::Missing);
    assert_eq!(report.scan.files_scanned, 2);
    assert_eq!(report.config.markers.root_ids(), vec!["dashboard", "projects"]);
    assert!(!report.config.markers.contains("vendor.widget"));
    assert!(!report.config.markers.contains("docs.only"));
    for role in BASELINE_ROLES {
        assert!(report.config.has_role(role));
    }
    assert!(report.config.invariant_violations().is_empty());
}

#[test]
fn grants_survive_rescan_and_marker_removal() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let settings = Settings::default();
    let source = FsSource::from_settings(dir.path(), &settings);
    let reconciler = reconciler(dir.path(), &settings);

    let mut config = reconciler.sync(&source).unwrap().config;
    let mut store = PermissionTreeStore::from_config(&config);
    store.select_role(ADMIN);
    store.toggle_node("projects", true);
    let grants = store.role(ADMIN).unwrap().grants();
    reconciler.apply_grants(&mut config, ADMIN, grants).unwrap();

    // 마커 하나를 소스에서 제거
    write(
        dir.path(),
        "src/projects/list.vue",
        r#"<button access-marker="projects.view" access-down="projects">"#,
    );
    let report = reconciler.sync(&source).unwrap();

    assert!(report.markers_changed);
    assert!(!report.config.markers.contains("projects.delete"));
    assert_eq!(report.config.grants(ADMIN).unwrap().len(), 3);
    assert_eq!(
        report.config.stale_grants().get(ADMIN),
        Some(&vec!["projects.delete".to_string()])
    );

    let store = PermissionTreeStore::from_config(&report.config);
    let c = store.counters_for(ADMIN);
    assert_eq!(c.active, 3);
    assert_eq!(c.denied, 0);
    assert_eq!(store.total_rows(), 3);
}

#[test]
fn rescan_is_idempotent_on_disk() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let settings = Settings::default();
    let source = FsSource::from_settings(dir.path(), &settings);
    let reconciler = reconciler(dir.path(), &settings);

    let first = reconciler.sync(&source).unwrap();
    let second = reconciler.sync(&source).unwrap();
    assert_eq!(second.load_outcome, LoadOutcome::Loaded);
    assert!(!second.markers_changed);
    assert_eq!(
        serde_json::to_string(&first.config.markers).unwrap(),
        serde_json::to_string(&second.config.markers).unwrap()
    );
}

#[test]
fn corrupt_document_is_backed_up_and_replaced() {
    let dir = tempdir().unwrap();
    seed(dir.path());
    let settings = Settings::default();
    let config_path = settings.config_path_in(dir.path());
    write(dir.path(), ".accessmap/access.json", "{ not json");

    let report = reconciler(dir.path(), &settings)
        .sync(&FsSource::from_settings(dir.path(), &settings))
        .unwrap();

    assert!(matches!(report.load_outcome, LoadOutcome::Corrupt { backup: Some(_), .. }));
    let backups: Vec<_> = fs::read_dir(config_path.parent().unwrap())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().contains(".corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "{ not json");

    let saved = fs::read_to_string(&config_path).unwrap();
    assert!(saved.contains("\"generatedAt\""));
    assert!(saved.contains(USER));
}

#[test]
fn missing_source_root_saves_nothing() {
    let dir = tempdir().unwrap();
    let settings = Settings::default();

    let result = reconciler(dir.path(), &settings)
        .sync(&FsSource::from_settings(dir.path(), &settings));

    assert!(result.is_err());
    assert!(!settings.config_path_in(dir.path()).exists());
}
