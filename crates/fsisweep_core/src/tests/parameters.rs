//! Tests for the parameter file
//!
//! These tests verify:
//! - Typed parsing of the flat `name:type:value:note` format
//! - Errors for missing files, malformed lines, and duplicate names
//! - In-place rewrite of a single value, leaving every other line intact

use std::fs;

use tempfile::tempdir;

use super::{INPUT_FILE, write_input};
use crate::error::ParameterError;
use crate::params::{ParameterTable, Value, ValueKind};

#[test]
fn test_parse_typed_tables() {
    let table = ParameterTable::parse(INPUT_FILE).unwrap();

    assert_eq!(table.string("CFDOrFSI").unwrap(), "FSI");
    assert_eq!(table.float("avgChVelocity").unwrap(), 1.0);
    assert_eq!(table.float("plateThickness").unwrap(), 0.001016);
    assert_eq!(table.integer("numOfPlates").unwrap(), 1);
    assert_eq!(table.string("parameter2Change").unwrap(), "avgChVelocity");
    assert_eq!(table.kind_of("stepSize"), Some(ValueKind::Float));
    assert_eq!(table.len(), 18);
}

#[test]
fn test_whitespace_is_insignificant() {
    let table = ParameterTable::parse("  plate Geometry :\tstring : wavy plate : -\n").unwrap();
    assert_eq!(table.string("plateGeometry").unwrap(), "wavyplate");
}

#[test]
fn test_lookup_with_wrong_type_names_key_and_type() {
    let table = ParameterTable::parse(INPUT_FILE).unwrap();

    let err = table.integer("avgChVelocity").unwrap_err();
    assert!(matches!(
        &err,
        ParameterError::Unknown { name, kind: ValueKind::Integer } if name == "avgChVelocity"
    ));
    assert_eq!(err.to_string(), "unknown integer parameter avgChVelocity");
}

#[test]
fn test_missing_file_is_distinct_from_malformed() {
    let dir = tempdir().unwrap();

    let err = ParameterTable::load(&dir.path().join("InputFile.txt")).unwrap_err();
    assert!(matches!(err, ParameterError::NotFound(_)));

    let path = write_input(dir.path(), "numOfPlates:integer\n");
    let err = ParameterTable::load(&path).unwrap_err();
    assert!(matches!(err, ParameterError::Malformed { line: 1, .. }));
}

#[test]
fn test_non_numeric_value_rejected() {
    let err = ParameterTable::parse("# geometry\nsmChHeight:float:two:m\n").unwrap_err();
    match err {
        ParameterError::InvalidValue {
            name, kind, line, ..
        } => {
            assert_eq!(name, "smChHeight");
            assert_eq!(kind, ValueKind::Float);
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(ParameterTable::parse("numOfPlates:integer:1.5:-\n").is_err());
}

#[test]
fn test_duplicate_names_rejected() {
    let text = "smChHeight:float:0.002:m\nsmChHeight:string:small:-\n";
    let err = ParameterTable::parse(text).unwrap_err();
    assert!(matches!(err, ParameterError::Duplicate { line: 2, .. }));
}

#[test]
fn test_unknown_type_tag_skipped() {
    let table = ParameterTable::parse("flag:bool:true:-\nnumOfPlates:integer:2:-\n").unwrap();
    assert!(!table.contains("flag"));
    assert_eq!(table.integer("numOfPlates").unwrap(), 2);
}

#[test]
fn test_serialized_tables_parse_back_identically() {
    let table = ParameterTable::parse(INPUT_FILE).unwrap();

    let text: String = table
        .entries()
        .iter()
        .map(|(name, value)| format!("{name}:{}:{value}:-\n", value.kind()))
        .collect();
    let reparsed = ParameterTable::parse(&text).unwrap();

    assert_eq!(reparsed.entries(), table.entries());
    assert_eq!(
        reparsed.get("numOfPlates"),
        Some(Value::Integer(1)),
        "integers keep their type"
    );
}

#[test]
fn test_rewrite_changes_only_matching_value() {
    let dir = tempdir().unwrap();
    let path = write_input(dir.path(), INPUT_FILE);

    let replaced = ParameterTable::rewrite(&path, "avgChVelocity", "1.5").unwrap();
    assert_eq!(replaced, 1);

    let rewritten = fs::read_to_string(&path).unwrap();
    let before: Vec<&str> = INPUT_FILE.lines().collect();
    let after: Vec<&str> = rewritten.split("\r\n").collect();

    // Trailing CRLF leaves one empty element at the end
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(after.last(), Some(&""));

    for (old, new) in before.iter().zip(&after) {
        if old.starts_with("avgChVelocity:") {
            assert_eq!(*new, "avgChVelocity:\t\tfloat:\t\t1.5:\t\tm/s");
        } else {
            assert_eq!(old, new);
        }
    }

    let table = ParameterTable::load(&path).unwrap();
    assert_eq!(table.float("avgChVelocity").unwrap(), 1.5);
    assert_eq!(table.float("avgChVelocityMax").unwrap(), 9.0);
}

#[test]
fn test_rewrite_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = write_input(dir.path(), INPUT_FILE);

    ParameterTable::rewrite(&path, "stepSize", "0.25").unwrap();
    let first = fs::read(&path).unwrap();
    ParameterTable::rewrite(&path, "stepSize", "0.25").unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_rewrite_of_absent_name_only_normalizes_line_endings() {
    let dir = tempdir().unwrap();
    let path = write_input(dir.path(), "# only a comment\n\nnumOfPlates:integer:1:-");

    let replaced = ParameterTable::rewrite(&path, "avgChVelocity", "2").unwrap();

    assert_eq!(replaced, 0);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# only a comment\r\n\r\nnumOfPlates:integer:1:-\r\n"
    );
}

#[test]
fn test_loaded_table_is_not_refreshed_by_rewrite() {
    let dir = tempdir().unwrap();
    let path = write_input(dir.path(), INPUT_FILE);
    let table = ParameterTable::load(&path).unwrap();

    ParameterTable::rewrite(&path, "avgChVelocity", "3").unwrap();

    assert_eq!(table.float("avgChVelocity").unwrap(), 1.0);
}
