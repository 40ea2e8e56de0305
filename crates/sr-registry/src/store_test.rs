use super::*;
use tempfile::TempDir;

#[test]
fn test_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let data = RegistryData::load(&dir.path().join("none.json")).unwrap();
    assert!(data.calls.is_empty());
    assert_eq!(data.metadata.version, SCHEMA_VERSION);
}

#[test]
fn test_corrupt_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reg.json");
    std::fs::write(&path, "{ not json").unwrap();
    let data = RegistryData::load(&path).unwrap();
    assert!(data.calls.is_empty());
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("reg.json");
    let mut data = RegistryData::default();
    data.metadata.repository = "acme/app".to_string();
    data.metadata.total_calls = 3;
    data.save(&path).unwrap();

    let loaded = RegistryData::load(&path).unwrap();
    assert_eq!(loaded, data);
    let leftovers: Vec<_> = std::fs::read_dir(path.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_pkl_path_redirects_to_json() {
    let dir = TempDir::new().unwrap();
    let pkl = dir.path().join(".sql_registry.pkl");
    std::fs::write(&pkl, [0x80u8, 0x04, 0x95]).unwrap();
    assert_eq!(resolve_path(&pkl), dir.path().join(".sql_registry.json"));
    assert_eq!(resolve_path(Path::new("reg.json")), PathBuf::from("reg.json"));
}
