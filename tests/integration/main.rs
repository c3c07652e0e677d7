//! Integration tests for Classmap
//!
//! These run the built binary against export files on disk.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const EXPORT: &str = r#"{
  "namespaces": ["NS"],
  "classes": [
    {"id": "classNS_1_1A", "qualifiedName": "NS::A", "sourceFile": "a.h"},
    {"id": "classNS_1_1B", "qualifiedName": "NS::B", "sourceFile": "b.h",
     "inheritance": [{"targetTypeName": "A", "protection": "public", "isVirtual": false}],
     "members": [{"name": "m_a", "type": "A*", "protection": "private"}],
     "methods": [{"name": "run", "id": "classNS_1_1B_1a0", "returnType": "void",
                  "protection": "public", "bodyFile": "b.cpp",
                  "bodyBeginLine": 1, "bodyEndLine": 3}]}
  ],
  "listings": [{"file": "b.cpp", "lines": [
    {"number": 1, "spans": [{"text": "void B::run() {", "isComment": false}]},
    {"number": 2, "spans": [{"text": "    m_a = nullptr;", "isComment": false}]},
    {"number": 3, "spans": [{"text": "}", "isComment": false}]}
  ]}]
}"#;

fn classmap(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_classmap"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute classmap")
}

fn export_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("ns.json"), EXPORT).unwrap();
    dir
}

fn read_view(dir: &Path, name: &str) -> Value {
    let text = fs::read_to_string(dir.join(format!("{name}.json"))).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn node_ids(view: &Value) -> Vec<String> {
    view["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_version() {
    let output = classmap(&["version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("Classmap v{}", env!("CARGO_PKG_VERSION"))));
}

#[test]
fn test_analyze_writes_every_view() {
    let input = export_dir();
    let out = TempDir::new().unwrap();
    let output = classmap(&[
        "analyze",
        input.path().to_str().unwrap(),
        "-o",
        out.path().to_str().unwrap(),
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    for name in [
        "classes",
        "classNS_1_1A",
        "classNS_1_1B",
        "namespaceNS_internal",
        "namespaceNS_external",
    ] {
        assert!(out.path().join(format!("{name}.json")).is_file(), "missing {name}");
    }

    let global = read_view(out.path(), "classes");
    let ids = node_ids(&global);
    assert!(ids.contains(&"NS".to_string()));
    assert!(ids.contains(&"NS::A".to_string()));
    assert!(ids.contains(&"NS::B".to_string()));
    let derives = global["edges"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["source"] == "NS::B" && e["target"] == "NS::A" && e["type"] == "derives");
    assert!(derives);

    let b = read_view(out.path(), "classNS_1_1B");
    let access = b["edges"]
        .as_array()
        .unwrap()
        .iter()
        .find(|e| e["type"] == "access")
        .cloned()
        .unwrap_or_else(|| panic!("no access edge in {b}"));
    assert_eq!(access["source"], "classNS_1_1B_1a0");
    assert_eq!(access["target"], "m_a");
    assert_eq!(access["description"], "b.cpp(2):\nm_a = nullptr;");
}

#[test]
fn test_config_file_and_flags() {
    let input = export_dir();
    fs::write(
        input.path().join("classmap.toml"),
        "[output]\nglobal_name = \"overview\"\n\n[views]\nclasses = false\nnamespaces = false\n",
    )
    .unwrap();
    let out = TempDir::new().unwrap();

    let output = classmap(&[
        "analyze",
        input.path().to_str().unwrap(),
        "-o",
        out.path().to_str().unwrap(),
        "--hide-utility",
        "--no-usages",
        "--pretty",
    ]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let written: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
    assert_eq!(written.len(), 1);

    let text = fs::read_to_string(out.path().join("overview.json")).unwrap();
    assert!(text.contains("\n  "));
    let ids = node_ids(&serde_json::from_str(&text).unwrap());
    assert!(ids.contains(&"NS::B".to_string()));
    assert!(!ids.contains(&"NS::A".to_string()));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing");
    let output = classmap(&[
        "analyze",
        missing.to_str().unwrap(),
        "-o",
        dir.path().join("out").to_str().unwrap(),
    ]);
    assert!(!output.status.success());
    assert!(!dir.path().join("out").exists());
}
