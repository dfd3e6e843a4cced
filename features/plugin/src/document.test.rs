use super::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::json;

#[test]
fn test_missing_file_returns_default() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nope.json");

    let doc: Value = read_document(&FsDocumentStore, &path, json!({})).unwrap();
    assert_eq!(doc, json!({}));
    assert!(!path.exists());
}

#[test]
fn test_corrupt_file_reports_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("settings.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = read_document::<Value>(&FsDocumentStore, &path, json!({})).unwrap_err();
    match &err {
        crate::PluginError::ConfigCorrupt { path: reported, .. } => {
            assert_eq!(reported, &path);
        }
        other => panic!("expected ConfigCorrupt, got {other:?}"),
    }
    assert!(err.to_string().contains(&path.display().to_string()));
}

#[test]
fn test_whitespace_file_counts_as_missing() {
    let store = MemoryDocumentStore::new();
    store.insert("/x/settings.json", "  \n");

    let doc: Value = read_document(&store, Path::new("/x/settings.json"), json!({"a": 1})).unwrap();
    assert_eq!(doc, json!({"a": 1}));
}

#[test]
fn test_write_creates_nested_parents() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("a").join("b").join("c").join("doc.json");

    write_document(&FsDocumentStore, &path, &json!({"k": "v"})).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.ends_with('\n'));
    let parsed: Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed, json!({"k": "v"}));
}

#[test]
fn test_write_leaves_no_temp_files() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("doc.json");

    write_document(&FsDocumentStore, &path, &json!({"n": 1})).unwrap();
    write_document(&FsDocumentStore, &path, &json!({"n": 2})).unwrap();

    let names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["doc.json".to_string()]);
}

#[test]
fn test_overlapping_writes_to_one_file_all_succeed() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join(".claude").join("settings.json");
    let bodies: Vec<String> = (0..8).map(|i| format!("{{\"writer\":{i}}}\n")).collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = bodies
            .iter()
            .map(|body| scope.spawn(|| FsDocumentStore.write_raw(&path, body)))
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
    });

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(bodies.contains(&written));
    let entries = std::fs::read_dir(path.parent().unwrap()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_read_error_other_than_missing_propagates() {
    let tmp = tempfile::tempdir().unwrap();
    // A directory where a file is expected cannot be read as text.
    let err = FsDocumentStore.read_raw(tmp.path()).unwrap_err();
    assert!(matches!(err, crate::PluginError::Io { .. }));
}

#[test]
fn test_memory_store_roundtrip() {
    let store = MemoryDocumentStore::new();
    let path = Path::new("/mem/doc.json");
    write_document(&store, path, &json!({"x": [1, 2]})).unwrap();

    let doc: Value = read_document(&store, path, Value::Null).unwrap();
    assert_eq!(doc, json!({"x": [1, 2]}));
    assert_eq!(store.paths(), vec![path.to_path_buf()]);
}
