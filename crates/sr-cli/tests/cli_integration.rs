//! End-to-end tests driving the sqlreg binary

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const SOURCE: &str = r#"import frappe


def get_user(uid):
    return frappe.db.sql("SELECT name FROM tabUser WHERE name = %(uid)s", {"uid": uid})


def stale_logs():
    frappe.db.sql("DELETE FROM tabLog")


def dynamic(table):
    frappe.db.sql(f"SELECT name FROM {table}")


def computed(self):
    rows = frappe.db.sql("SELECT name FROM tabItem WHERE x = {self.get_value()}")
    return rows
"#;

fn sqlreg(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sqlreg"))
        .args(args)
        .arg("--directory")
        .arg(dir)
        .arg("--no-color")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sqlreg")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("app")).unwrap();
    fs::write(dir.path().join("app/users.py"), SOURCE).unwrap();
    dir
}

#[test]
fn test_scan_writes_registry() {
    let dir = project();
    let output = sqlreg(dir.path(), &["scan"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("Found and registered 3 SQL operations (3 new)"));

    let registry = fs::read_to_string(dir.path().join(".sql_registry.json")).unwrap();
    assert!(registry.contains("\"total_calls\": 3"));
    assert!(registry.contains("app/users.py"));
}

#[test]
fn test_rescan_finds_nothing_new() {
    let dir = project();
    assert!(sqlreg(dir.path(), &["scan"]).status.success());
    let output = sqlreg(dir.path(), &["scan"]);
    assert!(stdout(&output).contains("(0 new)"));
}

#[test]
fn test_report_to_file() {
    let dir = project();
    sqlreg(dir.path(), &["scan"]);
    let report_path = dir.path().join("report.md");
    let output = sqlreg(
        dir.path(),
        &["report", "--output", report_path.to_str().unwrap()],
    );
    assert!(output.status.success(), "{output:?}");

    let report = fs::read_to_string(&report_path).unwrap();
    assert!(report.contains("# SQL Operations Registry Report"));
    assert!(report.contains("**Total SQL Operations**: 3"));
    assert!(report.contains("### users.py (3 operations)"));
}

#[test]
fn test_status_listings() {
    let dir = project();
    sqlreg(dir.path(), &["scan"]);

    let orm = stdout(&sqlreg(dir.path(), &["orm"]));
    assert!(orm.contains("Found 1 calls that can use simple ORM"));
    assert!(orm.contains("users.py:5"));

    let manual = stdout(&sqlreg(dir.path(), &["manual"]));
    assert!(manual.contains("Function call in f-string block: {self.get_value()}"));

    let todos = stdout(&sqlreg(dir.path(), &["todos"]));
    assert!(todos.contains("No TODOs found"));

    let list = stdout(&sqlreg(dir.path(), &["list", "--file-filter", "nothing-matches"]));
    assert!(list.contains("Found 0 SQL calls"));
}

#[test]
fn test_show_by_prefix() {
    let dir = project();
    sqlreg(dir.path(), &["scan"]);
    let registry = fs::read_to_string(dir.path().join(".sql_registry.json")).unwrap();
    let marker = "\"call_id\": \"";
    let start = registry.find(marker).unwrap() + marker.len();
    let id = &registry[start..start + 12];

    let output = sqlreg(dir.path(), &["show", &id[..8]]);
    assert!(output.status.success(), "{output:?}");
    let text = stdout(&output);
    assert!(text.contains(&format!("SQL Call Details: {id}")));
    assert!(text.contains("Original SQL:"));

    let missing = sqlreg(dir.path(), &["show", "zzzzzzzz"]);
    assert!(!missing.status.success());
}

#[test]
fn test_prune_removes_deleted_file() {
    let dir = project();
    sqlreg(dir.path(), &["scan"]);
    fs::remove_file(dir.path().join("app/users.py")).unwrap();

    let output = sqlreg(dir.path(), &["prune"]);
    assert!(output.status.success(), "{output:?}");
    assert!(stdout(&output).contains("Pruned 3 call(s)"));
    let registry = fs::read_to_string(dir.path().join(".sql_registry.json")).unwrap();
    assert!(registry.contains("\"total_calls\": 0"));
}

#[test]
fn test_config_file_is_honoured() {
    let dir = project();
    fs::write(dir.path().join("sqlreg.yml"), "registry: custom.json\n").unwrap();
    assert!(sqlreg(dir.path(), &["scan"]).status.success());
    assert!(dir.path().join("custom.json").exists());
}

#[test]
fn test_missing_directory_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_sqlreg"))
        .args(["scan", "--directory", "/definitely/not/here"])
        .output()
        .unwrap();
    assert!(!output.status.success());
}
