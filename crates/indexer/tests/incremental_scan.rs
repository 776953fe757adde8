use context_indexer::{FileIndex, IgnoreRules, Indexer};
use pretty_assertions::assert_eq;
use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, body).expect("write file");
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .expect("open for mtime")
        .set_modified(time)
        .expect("set mtime");
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).expect("stat").modified().expect("mtime")
}

fn seeded_project() -> (TempDir, Indexer, FileIndex) {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), "src/lib.rs", "pub fn alpha() {}\n");
    write(temp.path(), "src/util.rs", "pub fn beta() {}\n");
    write(temp.path(), "README.md", "# demo\n");

    let indexer = Indexer::new(temp.path(), IgnoreRules::new(), 1_000_000);
    let index = indexer.scan();
    (temp, indexer, index)
}

#[test]
fn rescan_without_changes_is_a_noop() {
    let (_temp, indexer, index) = seeded_project();

    let delta = indexer.rescan_changed(&index);
    assert!(delta.is_noop());
    assert_eq!(delta.index, index);
}

#[test]
fn content_change_is_reported() {
    let (temp, indexer, index) = seeded_project();
    write(temp.path(), "src/lib.rs", "pub fn alpha() {}\npub fn gamma() {}\n");

    let delta = indexer.rescan_changed(&index);
    assert_eq!(delta.changed, vec!["src/lib.rs".to_string()]);
    assert!(delta.removed.is_empty());
    let names: Vec<&str> = delta.index["src/lib.rs"]
        .symbols
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(names, vec!["alpha", "gamma"]);
}

#[test]
fn same_size_rewrite_with_new_mtime_is_reported() {
    let (temp, indexer, index) = seeded_project();
    let path = temp.path().join("src/util.rs");
    let before = mtime(&path);
    fs::write(&path, "pub fn gama() {}\n").expect("rewrite");
    set_mtime(&path, before + Duration::from_secs(5));

    let delta = indexer.rescan_changed(&index);
    assert_eq!(delta.changed, vec!["src/util.rs".to_string()]);
}

#[test]
fn touch_without_content_change_is_not_reported() {
    let (temp, indexer, index) = seeded_project();
    let path = temp.path().join("README.md");
    set_mtime(&path, mtime(&path) + Duration::from_secs(5));

    let delta = indexer.rescan_changed(&index);
    assert!(delta.changed.is_empty());
    assert_ne!(
        delta.index["README.md"].last_modified,
        index["README.md"].last_modified
    );
}

#[test]
fn new_and_removed_paths_are_reported() {
    let (temp, indexer, index) = seeded_project();
    fs::remove_file(temp.path().join("src/util.rs")).expect("remove");
    write(temp.path(), "src/extra.rs", "pub struct Extra;\n");

    let delta = indexer.rescan_changed(&index);
    assert_eq!(delta.changed, vec!["src/extra.rs".to_string()]);
    assert_eq!(delta.removed, vec!["src/util.rs".to_string()]);
    assert!(!delta.index.contains_key("src/util.rs"));
}

#[test]
fn newly_ignored_paths_count_as_removed() {
    let (temp, _indexer, index) = seeded_project();
    let mut ignore = IgnoreRules::new();
    ignore.add_source("*.md\n");
    let indexer = Indexer::new(temp.path(), ignore, 1_000_000);

    let delta = indexer.rescan_changed(&index);
    assert_eq!(delta.removed, vec!["README.md".to_string()]);
}

#[test]
fn verification_catches_rewrites_hidden_by_metadata() {
    let (temp, indexer, index) = seeded_project();
    let path = temp.path().join("src/util.rs");
    let before = mtime(&path);
    fs::write(&path, "pub fn gama() {}\n").expect("rewrite");
    set_mtime(&path, before);

    assert!(indexer.rescan_changed(&index).changed.is_empty());

    let verifying = Indexer::new(temp.path(), IgnoreRules::new(), 1_000_000)
        .with_content_verification(true);
    let delta = verifying.rescan_changed(&index);
    assert_eq!(delta.changed, vec!["src/util.rs".to_string()]);
    assert_eq!(delta.index["src/util.rs"].symbols[0].name, "gama");
}
