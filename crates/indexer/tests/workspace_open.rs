use context_indexer::{index_cache_path, OpenMode, PathChangeListener, Workspace};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, body).expect("write file");
}

fn project() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "package.json", "{}\n");
    write(temp.path(), "src/index.ts", "import { api } from './api'\nexport function start() {}\n");
    write(temp.path(), "src/api.ts", "export const api = {}\n");
    temp
}

#[test]
fn first_open_scans_and_second_open_uses_cache() {
    let temp = project();

    let mut first = Workspace::new(temp.path()).expect("workspace");
    let report = first.open();
    assert_eq!(report.mode, OpenMode::FullScan);
    assert_eq!(report.files, 3);
    assert!(index_cache_path(first.root()).is_file());
    assert_eq!(first.project_types().to_vec(), vec!["node".to_string()]);

    let mut second = Workspace::new(temp.path()).expect("workspace");
    let report = second.open();
    assert_eq!(report.mode, OpenMode::CacheSeeded);
    assert_eq!((report.changed, report.removed), (0, 0));
    assert_eq!(second.index(), first.index());
}

#[test]
fn cache_seeded_open_reports_offline_edits() {
    let temp = project();
    Workspace::new(temp.path()).expect("workspace").open();

    write(temp.path(), "src/api.ts", "export const api = { ready: true }\n");
    fs::remove_file(temp.path().join("package.json")).expect("remove");

    let mut ws = Workspace::new(temp.path()).expect("workspace");
    let report = ws.open();
    assert_eq!(report.mode, OpenMode::CacheSeeded);
    assert_eq!((report.changed, report.removed), (1, 1));
    assert!(ws.project_types().is_empty());
}

#[test]
fn refresh_returns_changed_and_removed_paths() {
    let temp = project();
    let mut ws = Workspace::new(temp.path()).expect("workspace");
    ws.open();
    assert_eq!(ws.refresh(), (Vec::new(), Vec::new()));

    write(temp.path(), "src/new.ts", "export class Fresh {}\n");
    fs::remove_file(temp.path().join("src/api.ts")).expect("remove");
    let (changed, removed) = ws.refresh();
    assert_eq!(changed, vec!["src/new.ts".to_string()]);
    assert_eq!(removed, vec!["src/api.ts".to_string()]);
    assert_eq!(ws.stats().files, 3);
}

#[test]
fn change_notifications_refresh_single_paths() {
    let temp = project();
    let mut ws = Workspace::new(temp.path()).expect("workspace");
    ws.open();
    let root = ws.root().to_path_buf();

    write(&root, "src/added.ts", "export function added() {}\n");
    ws.path_changed(&root.join("src/added.ts"));
    assert_eq!(ws.record("src/added.ts").expect("indexed").symbols[0].name, "added");
    assert_eq!(ws.stats().files, 4);

    fs::remove_file(root.join("src/added.ts")).expect("remove");
    ws.path_changed(&root.join("src/added.ts"));
    assert!(ws.record("src/added.ts").is_none());

    let outside = TempDir::new().expect("tempdir");
    write(outside.path(), "other.ts", "export function other() {}\n");
    ws.path_changed(&outside.path().join("other.ts"));
    assert_eq!(ws.index().len(), 3);
}

#[test]
fn unwritable_cache_does_not_fail_open_or_refresh() {
    let temp = project();
    write(temp.path(), ".localai/cache", "not a directory\n");

    let mut ws = Workspace::new(temp.path()).expect("workspace");
    let report = ws.open();
    assert_eq!(report.mode, OpenMode::FullScan);
    assert_eq!(report.files, 3);
    assert!(!index_cache_path(ws.root()).exists());

    write(temp.path(), "src/extra.ts", "export function extra() {}\n");
    let (changed, removed) = ws.refresh();
    assert_eq!(changed, vec!["src/extra.ts".to_string()]);
    assert!(removed.is_empty());
    assert_eq!(ws.index().len(), 4);
}
