//! Config load error-message and lookup-order tests.

use std::fs;

use recite_core::{
    config::{self, StorageBackend, TabularBackend},
    ConfigError,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_config_returns_not_found() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("recite.yaml");
    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("recite.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("recite.yaml");
    fs::write(&path, b": : corrupt : yaml : !!!\n  - broken: [unclosed").expect("write");

    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("recite.yaml"), "must contain file path, got: {err}");
}

#[test]
fn load_wrong_type_yaml_returns_parse_error() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("recite.yaml");
    fs::write(&path, b"- this is a list, not a mapping\n").expect("write");

    let err = config::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Successful load
// ---------------------------------------------------------------------------

#[test]
fn load_resolves_local_paths_against_config_dir() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("recite.yaml");
    fs::write(
        &path,
        r#"
source: { sheet_id: lessons, start_cell: B2 }
dry_run: false
backend:
  tabular: { kind: local, path: workbook.json }
  storage: { kind: local, dir: out }
"#,
    )
    .expect("write");

    let config = config::load_at(&path).expect("load");
    config.validate().expect("valid");
    assert!(!config.dry_run);
    assert_eq!(config.source_range().a1_notation(), "Sheet1!B2:B");
    assert_eq!(
        config.backend.tabular,
        TabularBackend::Local {
            path: dir.path().join("workbook.json")
        }
    );
    assert_eq!(
        config.backend.storage,
        StorageBackend::Local {
            dir: dir.path().join("out")
        }
    );
}

// ---------------------------------------------------------------------------
// 3. Default lookup
// ---------------------------------------------------------------------------

#[test]
fn cwd_config_wins_over_home_config() {
    let cwd = TempDir::new().expect("cwd");
    let home = TempDir::new().expect("home");
    fs::create_dir_all(home.path().join(".recite")).expect("mkdir");
    fs::write(home.path().join(".recite").join("config.yaml"), "{}").expect("write home");
    fs::write(cwd.path().join("recite.yaml"), "{}").expect("write cwd");

    let found = config::find_default_at(cwd.path(), home.path()).expect("found");
    assert_eq!(found, cwd.path().join("recite.yaml"));
}

#[test]
fn home_config_used_when_cwd_has_none() {
    let cwd = TempDir::new().expect("cwd");
    let home = TempDir::new().expect("home");
    fs::create_dir_all(home.path().join(".recite")).expect("mkdir");
    fs::write(home.path().join(".recite").join("config.yaml"), "{}").expect("write home");

    let found = config::find_default_at(cwd.path(), home.path()).expect("found");
    assert_eq!(found, home.path().join(".recite").join("config.yaml"));
}

#[test]
fn no_default_lists_searched_paths() {
    let cwd = TempDir::new().expect("cwd");
    let home = TempDir::new().expect("home");
    let err = config::find_default_at(cwd.path(), home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::NoDefault { .. }));
    let msg = err.to_string();
    assert!(msg.contains("recite.yaml") && msg.contains("config.yaml"), "got: {msg}");
}
