use nbtrack_core::{
    collect_properties, files_in_properties, read_notebook, Namespace, PropertyError,
    PropertyValue,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

fn write_notebook(dir: &Path, cells: Vec<serde_json::Value>) -> PathBuf {
    let path = dir.join("experiment.ipynb");
    let doc = json!({"cells": cells, "nbformat": 4, "nbformat_minor": 5});
    fs::write(&path, doc.to_string()).expect("write notebook fixture");
    path
}

fn code_cell(source: &str) -> serde_json::Value {
    json!({"cell_type": "code", "source": source})
}

#[test]
fn single_property_cell_resolves_against_namespace() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_notebook(dir.path(), vec![code_cell("#property\nz = 5")]);
    let notebook = read_notebook(&path).expect("read notebook");

    let mut namespace = Namespace::new();
    namespace.insert("z".to_string(), PropertyValue::Int(5));

    let properties = collect_properties(&notebook, &namespace).expect("resolvable namespace");
    assert_eq!(properties.len(), 1);
    assert_eq!(properties["z"], PropertyValue::Int(5));
    assert!(files_in_properties(&properties).is_empty());
}

#[test]
fn undefined_name_is_a_hard_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_notebook(dir.path(), vec![code_cell("#property\nz = 5\nmissing = 1")]);
    let notebook = read_notebook(&path).expect("read notebook");

    let mut namespace = Namespace::new();
    namespace.insert("z".to_string(), PropertyValue::Int(5));

    let err = collect_properties(&notebook, &namespace).expect_err("missing binding must fail");
    let PropertyError::Undefined { name } = err;
    assert_eq!(name, "missing");
}

#[test]
fn later_property_cells_overwrite_earlier_keys() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_notebook(
        dir.path(),
        vec![
            code_cell("#property\nepochs = 10\nseed = 1"),
            code_cell("#property\nepochs = 20"),
        ],
    );
    let notebook = read_notebook(&path).expect("read notebook");

    // The namespace holds final values; the overwrite behavior under test
    // is about key accumulation across cells.
    let mut namespace = Namespace::new();
    namespace.insert("epochs".to_string(), PropertyValue::Int(20));
    namespace.insert("seed".to_string(), PropertyValue::Int(1));

    let properties = collect_properties(&notebook, &namespace).expect("resolvable namespace");
    let keys: Vec<&str> = properties.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["epochs", "seed"]);
    assert_eq!(properties["epochs"], PropertyValue::Int(20));
}

#[test]
fn untagged_cells_contribute_no_properties() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = write_notebook(
        dir.path(),
        vec![code_cell("z = 5"), code_cell("#code\nx = 1")],
    );
    let notebook = read_notebook(&path).expect("read notebook");

    let properties =
        collect_properties(&notebook, &Namespace::new()).expect("nothing to resolve");
    assert!(properties.is_empty());
}

#[test]
fn file_valued_properties_are_listed_in_map_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let first = dir.path().join("train.csv");
    let second = dir.path().join("eval.csv");
    fs::write(&first, "a,b\n").expect("write fixture");
    fs::write(&second, "c,d\n").expect("write fixture");

    let path = write_notebook(
        dir.path(),
        vec![code_cell("#property\ntrain = 0\ngone = 0\neval = 0")],
    );
    let notebook = read_notebook(&path).expect("read notebook");

    let mut namespace = Namespace::new();
    namespace.insert("train".to_string(), PropertyValue::FilePath(first.clone()));
    namespace.insert(
        "gone".to_string(),
        PropertyValue::FilePath(dir.path().join("deleted.csv")),
    );
    namespace.insert("eval".to_string(), PropertyValue::FilePath(second.clone()));

    let properties = collect_properties(&notebook, &namespace).expect("resolvable namespace");
    let files = files_in_properties(&properties);
    assert_eq!(
        files,
        vec![first.display().to_string(), second.display().to_string()]
    );
}
