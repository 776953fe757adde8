use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[allow(deprecated)]
fn context_cmd(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("context").expect("binary");
    cmd.arg("--root").arg(root);
    cmd
}

fn run_json(root: &Path, args: &[&str]) -> Value {
    let output = context_cmd(root).args(args).output().expect("command run");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid json")
}

fn setup_repo() -> tempfile::TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("Cargo.toml"), "[package]\nname = \"demo\"\n").unwrap();
    fs::write(
        root.join("src/lib.rs"),
        "pub struct Parser;\n\nimpl Parser {\n    pub fn parse_expr() {}\n}\n",
    )
    .unwrap();
    fs::write(root.join("src/main.rs"), "use demo::Parser;\n\nfn main() {}\n").unwrap();
    temp
}

#[test]
fn init_scaffolds_state_dir() {
    let temp = tempdir().unwrap();
    context_cmd(temp.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));
    assert!(temp.path().join(".localai/config.json").is_file());
    assert!(temp.path().join(".localai/rules.md").is_file());
}

#[test]
fn index_then_refresh_uses_cache() {
    let temp = setup_repo();
    let index = run_json(temp.path(), &["index", "--json"]);
    assert_eq!(index["report"]["mode"], "full_scan");
    assert_eq!(index["report"]["files"], 3);
    assert_eq!(index["project_types"][0], "rust");

    fs::write(temp.path().join("src/extra.rs"), "pub fn extra() {}\n").unwrap();
    let refresh = run_json(temp.path(), &["refresh", "--json"]);
    assert_eq!(refresh["mode"], "cache_seeded");
    assert_eq!(refresh["changed"], 1);
    assert_eq!(refresh["removed"], 0);
}

#[test]
fn symbols_lists_matches() {
    let temp = setup_repo();
    let body = run_json(temp.path(), &["symbols", "parse", "--json"]);
    let hits: Vec<&str> = body["hits"]
        .as_array()
        .expect("hits")
        .iter()
        .filter_map(|hit| hit["symbol"].as_str())
        .collect();
    assert_eq!(
        hits,
        vec!["struct:Parser:1", "impl:Parser:3", "function:parse_expr:4"]
    );
}

#[test]
fn build_prints_ranked_summaries() {
    let temp = setup_repo();
    context_cmd(temp.path())
        .args(["build", "rename Parser in src/lib.rs", "--active", "src/main.rs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Potentially relevant files"))
        .stdout(predicate::str::contains("src/lib.rs (6 lines, rust)"));
}

#[test]
fn build_minimal_skips_ranking() {
    let temp = setup_repo();
    context_cmd(temp.path())
        .args(["build", "anything", "--minimal"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("## Workspace Context"))
        .stdout(predicate::str::contains("Potentially relevant files").not());
}

#[test]
fn related_rejects_unknown_files() {
    let temp = setup_repo();
    context_cmd(temp.path())
        .args(["related", "src/missing.rs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not indexed"));

    let body = run_json(temp.path(), &["related", "src/main.rs", "--json"]);
    assert_eq!(body["related"][0], "src/lib.rs");
}
