use super::*;
use sr_core::ConsumptionMode;
use std::fs;
use tempfile::TempDir;

const USERS_PY: &str = r#"import frappe


def get_users():
    return frappe.db.sql("SELECT name FROM tabUser WHERE enabled = 1")


def purge():
    frappe.db.sql("DELETE FROM tabLog")
"#;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn open(dir: &TempDir) -> Registry {
    Registry::open(&dir.path().join("registry.json"), &Config::default()).unwrap()
}

fn site(file: &str, line: usize, sql: &str) -> CallSite {
    CallSite {
        file_path: file.to_string(),
        line_number: line,
        function_context: "global scope".to_string(),
        sql: sql.to_string(),
        params: None,
        kwargs: None,
        consumption: ConsumptionMode::Unknown,
    }
}

#[test]
fn test_scan_directory_registers_calls() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/users.py", USERS_PY);
    let mut registry = open(&dir);

    let summary = registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(summary.calls_found, 2);
    assert_eq!(summary.new_calls, 2);
    assert_eq!(registry.len(), 2);
    assert!(registry.data().metadata.last_scan.is_some());

    let lines: Vec<usize> = {
        let mut l: Vec<usize> = registry.calls().map(|c| c.line_number).collect();
        l.sort();
        l
    };
    assert_eq!(lines, vec![5, 9]);
    assert!(registry.calls().all(|c| c.file_path == "app/users.py"));
}

#[test]
fn test_rescan_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/users.py", USERS_PY);
    let mut registry = open(&dir);
    registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    let before: Vec<(String, String)> = registry
        .calls()
        .map(|c| (c.call_id.clone(), c.generated_code.clone()))
        .collect();

    let summary = registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    assert_eq!(summary.new_calls, 0);
    assert_eq!(summary.calls_found, 2);
    let after: Vec<(String, String)> = registry
        .calls()
        .map(|c| (c.call_id.clone(), c.generated_code.clone()))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn test_call_id_is_stable_across_registries() {
    let dir = TempDir::new().unwrap();
    let mut a = open(&dir);
    let mut b = Registry::open(&dir.path().join("other.json"), &Config::default()).unwrap();
    let id_a = a.register(site("app/x.py", 4, "SELECT name FROM tabUser"));
    let id_b = b.register(site("app/x.py", 4, "SELECT name FROM tabUser"));
    assert_eq!(id_a, id_b);
    assert_eq!(id_a, call_id("app/x.py", 4, "SELECT name FROM tabUser"));

    let moved = a.register(site("app/x.py", 5, "SELECT name FROM tabUser"));
    assert_ne!(id_a, moved);
}

#[test]
fn test_register_known_id_refreshes_bindings_only() {
    let dir = TempDir::new().unwrap();
    let mut registry = open(&dir);
    let id = registry.register(site("app/x.py", 4, "SELECT name FROM tabUser"));
    let created = registry.get(&id).unwrap().clone();

    let mut again = site("app/x.py", 4, "SELECT name FROM tabUser");
    again.consumption = ConsumptionMode::Returned;
    again.function_context = "def other():".to_string();
    assert_eq!(registry.register(again), id);

    let updated = registry.get(&id).unwrap();
    assert_eq!(updated.consumption, ConsumptionMode::Returned);
    assert_eq!(updated.generated_code, created.generated_code);
    assert_eq!(updated.function_context, created.function_context);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_find_by_prefix() {
    let dir = TempDir::new().unwrap();
    let mut registry = open(&dir);
    let id = registry.register(site("app/x.py", 4, "SELECT name FROM tabUser"));
    registry.register(site("app/x.py", 8, "SELECT name FROM tabRole"));

    assert_eq!(registry.find_by_prefix(&id[..10]).unwrap().call_id, id);
    assert_eq!(registry.find_by_prefix(&id).unwrap().call_id, id);
    assert!(matches!(
        registry.find_by_prefix("zzzz-not-an-id"),
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.find_by_prefix(""),
        Err(RegistryError::Ambiguous { count: 2, .. })
    ));
}

#[test]
fn test_with_status() {
    let dir = TempDir::new().unwrap();
    let mut registry = open(&dir);
    registry.register(site("app/x.py", 4, "SELECT name FROM tabUser WHERE x = {self.get_value()}"));
    registry.register(site("app/x.py", 8, "DELETE FROM tabLog"));

    assert_eq!(registry.with_status(ConversionStatus::ManualReview).count(), 1);
    assert_eq!(registry.with_status(ConversionStatus::QueryBuilder).count(), 1);
}

#[test]
fn test_syntax_error_file_is_skipped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/broken.py", "def broken(:\n    frappe.db.sql(\"SELECT 1\")\n");
    write(dir.path(), "app/users.py", USERS_PY);
    let mut registry = open(&dir);

    let summary = registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    assert_eq!(summary.files_skipped, 1);
    assert_eq!(summary.files_scanned, 1);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_patch_files_excluded_by_default() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/patches/v1/fix.py", USERS_PY);
    let mut registry = open(&dir);
    let summary = registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    assert_eq!(summary.files_scanned, 0);
    assert!(registry.is_empty());
}

#[test]
fn test_prune_missing_files() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/users.py", USERS_PY);
    write(dir.path(), "app/gone.py", "frappe.db.sql(\"SELECT name FROM tabRole\")\n");
    let mut registry = open(&dir);
    registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    assert_eq!(registry.len(), 3);

    fs::remove_file(dir.path().join("app/gone.py")).unwrap();
    let pruned = registry.prune_missing_files(dir.path());
    assert_eq!(pruned.len(), 1);
    assert_eq!(registry.len(), 2);
    assert!(registry.calls().all(|c| c.file_path == "app/users.py"));
}

#[test]
fn test_save_and_reopen() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/users.py", USERS_PY);
    let mut registry = open(&dir);
    registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    registry.save().unwrap();

    let reopened = open(&dir);
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.data().metadata.total_calls, 2);
    assert_eq!(reopened.data().calls, registry.data().calls);
}

#[test]
fn test_legacy_pickle_path_maps_to_json() {
    let dir = TempDir::new().unwrap();
    let registry = Registry::open(&dir.path().join("registry.pkl"), &Config::default()).unwrap();
    assert_eq!(registry.path(), dir.path().join("registry.json"));
}

#[test]
fn test_reformatting_below_a_call_keeps_its_id() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "app/users.py", USERS_PY);
    let mut registry = open(&dir);
    registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();
    let first = registry
        .calls()
        .find(|c| c.line_number == 5)
        .unwrap()
        .call_id
        .clone();

    let reformatted = format!(
        "{}\n\n\n\ndef   helper( x ):\n        return    x\n",
        USERS_PY.replace("def purge():", "def purge( ):")
    );
    write(dir.path(), "app/users.py", &reformatted);
    let summary = registry.scan_directory(dir.path(), &Config::default(), |_, _| {}).unwrap();

    assert_eq!(summary.new_calls, 0);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(&first).unwrap().line_number, 5);
}
