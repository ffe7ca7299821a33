use std::fs;
use std::path::Path;

use logofetch::{canonicalize_or_current, default_log_filter, infer_project_name, init_logging};
use tempfile::tempdir;

#[test]
fn canonicalize_or_current_resolves_existing_and_missing_paths() {
    let tmp = tempdir().expect("tempdir");
    let nested = tmp.path().join("nested");
    fs::create_dir_all(&nested).expect("create nested");

    let existing = canonicalize_or_current(nested.to_str().expect("utf8")).expect("existing");
    assert_eq!(existing, nested.canonicalize().expect("canonicalize nested"));

    let missing = canonicalize_or_current("does-not-exist-yet").expect("missing");
    assert!(missing.is_absolute());
    assert!(missing.ends_with("does-not-exist-yet"));

    let cwd = std::env::current_dir().expect("cwd");
    assert_eq!(canonicalize_or_current(".").expect("dot"), cwd);
}

#[test]
fn infer_project_name_uses_last_path_component() {
    assert_eq!(infer_project_name(Path::new("/srv/shop-frontend")), "shop-frontend");
    assert_eq!(infer_project_name(Path::new("/")), "unnamed-project");
}

#[test]
fn verbosity_maps_to_log_filter() {
    assert_eq!(default_log_filter(0), "warn");
    assert_eq!(default_log_filter(1), "debug");
    assert_eq!(default_log_filter(2), "trace");
    assert_eq!(default_log_filter(9), "trace");
}

#[test]
fn init_logging_can_be_called_twice() {
    init_logging(0);
    init_logging(2);
}
