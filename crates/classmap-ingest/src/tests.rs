//! Unit tests for classmap-ingest

use std::fs;
use std::path::Path;

use classmap_core::{Analyzer, AnalysisError, Protection, SourceProvider, UsageKind};
use tempfile::TempDir;

use crate::config::Config;
use crate::error::{ConfigError, IngestError};
use crate::{find_export_files, load_declarations, read_export, ExportSources};

const RUNNER_EXPORT: &str = r#"{
  "namespaces": ["NS"],
  "classes": [{
    "id": "classNS_1_1B", "qualifiedName": "NS::B", "kind": "class",
    "isAbstract": false, "sourceFile": "b.h", "briefDescription": "Runs things",
    "inheritance": [{"targetTypeName": "A", "protection": "public", "isVirtual": false}],
    "methods": [{"name": "run", "id": "classNS_1_1B_1a0", "briefDescription": "",
                 "returnType": "void", "isConst": false, "isVirtual": true,
                 "hasOverrideKeyword": true, "protection": "public",
                 "params": [{"type": "int", "name": "n"}],
                 "bodyFile": "b.cpp", "bodyBeginLine": 10, "bodyEndLine": 12}],
    "members": [{"name": "m_a", "type": "A*", "protection": "private", "briefDescription": ""}]
  }],
  "listings": [{"file": "b.cpp", "lines": [
    {"number": 10, "spans": [{"text": "void B::run(int n) {", "isComment": false}]},
    {"number": 11, "spans": [{"text": "    m_a = nullptr; ", "isComment": false},
                             {"text": "// reset", "isComment": true}]},
    {"number": 12, "spans": [{"text": "}", "isComment": false}]}
  ]}]
}"#;

const BASE_EXPORT: &str = r#"{"classes": [{"id": "classNS_1_1A", "qualifiedName": "NS::A"}]}"#;

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn export_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "b.json", RUNNER_EXPORT);
    write(dir.path(), "nested/a.json", BASE_EXPORT);
    dir
}

// ── Discovery ──────────────────────────────────────────────

#[test]
fn test_find_export_files_filters_and_sorts() {
    let dir = export_dir();
    write(dir.path(), "notes.txt", "not an export");
    write(dir.path(), "classmap.toml", "[views]\nclasses = false\n");
    write(dir.path(), "skipped.json", "{}");
    write(dir.path(), ".gitignore", "skipped.json\n");

    let files = find_export_files(dir.path(), "json").unwrap();
    assert_eq!(files, vec![dir.path().join("b.json"), dir.path().join("nested/a.json")]);
}

#[test]
fn test_find_export_files_custom_extension() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one.export", "{}");
    write(dir.path(), "two.json", "{}");

    let files = find_export_files(dir.path(), "export").unwrap();
    assert_eq!(files, vec![dir.path().join("one.export")]);
}

#[test]
fn test_find_export_files_accepts_single_file() {
    let dir = export_dir();
    let file = dir.path().join("b.json");
    assert_eq!(find_export_files(&file, "json").unwrap(), vec![file]);
}

#[test]
fn test_missing_input_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    assert!(matches!(
        find_export_files(&missing, "json"),
        Err(IngestError::NotFound(path)) if path == missing
    ));
}

// ── Loading ────────────────────────────────────────────────

#[test]
fn test_load_declarations_reads_camel_case_fields() {
    let dir = export_dir();
    let files = find_export_files(dir.path(), "json").unwrap();
    let declarations = load_declarations(&files).unwrap();

    assert_eq!(declarations.namespaces, vec!["NS".to_string()]);
    assert_eq!(declarations.classes.len(), 2);

    let b = &declarations.classes[0];
    assert_eq!(b.qualified_name, "NS::B");
    assert_eq!(b.brief_description, "Runs things");
    assert_eq!(b.inheritance[0].target_type_name, "A");
    assert_eq!(b.inheritance[0].protection, Protection::Public);
    let run = &b.methods[0];
    assert!(run.is_virtual && run.has_override_keyword);
    assert_eq!(run.params[0].type_name, "int");
    assert_eq!(run.body_range(), Some((10, 12)));
    assert_eq!(b.members[0].type_name, "A*");
}

#[test]
fn test_missing_fields_default() {
    let dir = export_dir();
    let export = read_export(&dir.path().join("nested/a.json")).unwrap();

    assert!(export.namespaces.is_empty());
    assert!(export.listings.is_empty());
    let a = &export.classes[0];
    assert_eq!(a.qualified_name, "NS::A");
    assert!(a.methods.is_empty());
    assert!(a.source_file.is_empty());
    assert!(!a.is_abstract);
}

#[test]
fn test_malformed_export_is_an_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.json", "{\"classes\": [");
    let files = vec![dir.path().join("bad.json")];

    let err = load_declarations(&files).unwrap_err();
    assert!(matches!(err, IngestError::Parse { .. }));
    assert!(err.to_string().contains("bad.json"));
}

#[test]
fn test_export_sources_load_listings_per_file() {
    let dir = export_dir();
    let files = find_export_files(dir.path(), "json").unwrap();
    let sources = ExportSources::new(files);

    let units = sources.units();
    assert_eq!(units.len(), 2);
    let listings = sources.load(&units[0]).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].file, "b.cpp");
    assert_eq!(listings[0].lines[1].code(), "    m_a = nullptr; ");
    assert!(sources.load(&units[1]).unwrap().is_empty());
}

#[test]
fn test_export_sources_report_bad_units() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.json", "not json");
    let sources = ExportSources::new(vec![dir.path().join("bad.json"), dir.path().join("gone.json")]);
    let units = sources.units();

    assert!(matches!(sources.load(&units[0]), Err(AnalysisError::SourceFormat { .. })));
    assert!(matches!(sources.load(&units[1]), Err(AnalysisError::SourceRead { .. })));
}

#[test]
fn test_exports_drive_the_analyzer() {
    let dir = export_dir();
    let files = find_export_files(dir.path(), "json").unwrap();
    let mut analyzer = Analyzer::new(load_declarations(&files).unwrap());
    analyzer.resolve();
    analyzer.detect_usages(&ExportSources::new(files)).unwrap();

    let b = analyzer.table().class("NS::B").unwrap();
    assert_eq!(b.connections.len(), 2);
    assert_eq!(b.usages.len(), 1);
    assert_eq!(b.usages[0].kind, UsageKind::MemberAccess);
    assert_eq!(b.usages[0].target_id, "m_a");
    assert_eq!(b.usages[0].code, "b.cpp(11):\nm_a = nullptr; // reset");
}

// ── Configuration ──────────────────────────────────────────

#[test]
fn test_config_defaults_when_absent() {
    let dir = TempDir::new().unwrap();
    let config = Config::discover(dir.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.input.extension, "json");
    assert_eq!(config.output.global_name, "classes");
    assert!(config.views.classes && config.views.namespaces);
    assert!(config.analysis.usages);
}

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "classmap.toml",
        "[output]\nglobal_name = \"overview\"\n\n[views]\nhide_utility = true\n\n[analysis]\nthreads = 4\n",
    );

    let config = Config::discover(dir.path()).unwrap();
    assert_eq!(config.output.global_name, "overview");
    assert!(!config.output.pretty);
    assert_eq!(config.analysis.threads, 4);
    assert!(config.analysis.usages);

    let options = config.view_options();
    assert_eq!(options.global_name, "overview");
    assert!(options.hide_utility);
    assert!(options.classes);
}

#[test]
fn test_invalid_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "classmap.toml", "[views]\nclasses = \"sometimes\"\n");

    let err = Config::discover(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}
