use context_indexer::Workspace;
use context_search::{ContextAssembler, TRUNCATION_MARKER};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
    fs::write(path, body).expect("write file");
}

fn opened(files: &[(&str, &str)]) -> (TempDir, Workspace) {
    let temp = TempDir::new().expect("tempdir");
    for (rel, body) in files {
        write(temp.path(), rel, body);
    }
    let mut workspace = Workspace::new(temp.path()).expect("workspace");
    workspace.open();
    (temp, workspace)
}

const A_PY: &str = "def foo():\n    return 1\n";
const B_PY: &str = "import a\n";

#[test]
fn mentioned_file_is_ranked_and_summarised() {
    let (_temp, ws) = opened(&[("a.py", A_PY), ("b.py", B_PY)]);
    let assembler = ContextAssembler::new(&ws);

    let ranked = assembler.rank_files("fix foo in a.py", None);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].path, "a.py");
    assert!(ranked[0].score >= 11.0);

    let context = assembler.build("fix foo in a.py", None);
    assert!(context.starts_with("Project: "));
    assert!(context.contains(
        "Potentially relevant files (use read_file for content):\na.py (3 lines, python)\n  function foo L1"
    ));
    assert!(!context.contains("b.py ("));
}

#[test]
fn build_is_idempotent() {
    let (_temp, ws) = opened(&[("a.py", A_PY), ("b.py", B_PY), ("src/main.rs", "fn main() {}\n")]);
    let assembler = ContextAssembler::new(&ws);
    assert_eq!(
        assembler.build("fix foo in a.py", Some("b.py")),
        assembler.build("fix foo in a.py", Some("b.py"))
    );
}

#[test]
fn active_file_is_never_listed() {
    let (_temp, ws) = opened(&[("a.py", A_PY), ("b.py", B_PY)]);
    let ranked = ContextAssembler::new(&ws).rank_files("fix foo in a.py", Some("a.py"));
    let paths: Vec<&str> = ranked.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["b.py"]);
}

#[test]
fn ranking_is_capped_by_config() {
    let temp = TempDir::new().expect("tempdir");
    write(temp.path(), ".localai/config.json", r#"{"max_context_files": 2}"#);
    for name in ["one", "two", "three"] {
        write(temp.path(), &format!("{name}.py"), "def handler():\n    pass\n");
    }
    let mut ws = Workspace::new(temp.path()).expect("workspace");
    ws.open();

    let ranked = ContextAssembler::new(&ws).rank_files("update handler for pytest", None);
    let paths: Vec<&str> = ranked.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["one.py", "three.py"]);
}

#[test]
fn rules_follow_summaries() {
    let (_temp, ws) = opened(&[
        ("a.py", A_PY),
        (".localai/rules.md", "Prefer small functions."),
    ]);
    let context = ContextAssembler::new(&ws).build("fix foo in a.py", None);
    let summaries = context.find("Potentially relevant files").expect("summaries");
    let rules = context
        .find("## Workspace Rules\nPrefer small functions.")
        .expect("rules");
    assert!(summaries < rules);
}

#[test]
fn tiny_budget_yields_empty_context() {
    let (_temp, ws) = opened(&[("a.py", A_PY)]);
    assert_eq!(
        ContextAssembler::new(&ws).with_token_budget(10).build("anything", None),
        ""
    );
}

#[test]
fn minimal_context_has_overview_and_trimmed_rules() {
    let long_rules = "r".repeat(20_000);
    let (_temp, ws) = opened(&[("a.py", A_PY), (".localai/rules.md", long_rules.as_str())]);
    let assembler = ContextAssembler::new(&ws).with_token_budget(100_000);

    let minimal = assembler.build_minimal();
    assert!(minimal.starts_with("## Workspace Context\n\nProject: "));
    let rules = minimal
        .split("\n\n## Workspace Rules\n")
        .nth(1)
        .expect("rules section");
    assert!(rules.ends_with(TRUNCATION_MARKER));
    assert_eq!(rules.len(), 2_000 * 38 / 10 + TRUNCATION_MARKER.len());
}
