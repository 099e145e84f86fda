//! Flat parameter file shared with the external model-building scripts.
//!
//! Each significant line has the shape `name:type:value:note`, for example
//!
//! ```text
//! # Channel geometry
//! smChHeight:     float:      0.002:      m
//! numOfPlates:    integer:    1:          -
//! CFDOrFSI:       string:     FSI:        CFD or FSI
//! ```
//!
//! Tabs and spaces are insignificant when reading. The file is also read by the
//! Abaqus and Star-CCM+ scripts, which is why a sweep rewrites it in place instead
//! of passing values on the command line.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::io::atomic_write;

/// Type tag in the second field of a parameter line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Float,
    String,
    Integer,
}

impl ValueKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "float" => Some(ValueKind::Float),
            "string" => Some(ValueKind::String),
            "integer" => Some(ValueKind::Integer),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single typed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Float(f64),
    String(String),
    Integer(i64),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Integer(v) => write!(f, "{v}"),
        }
    }
}

/// Parameters read from an input file, split by type.
///
/// Read-only once built. Rewriting the file with [`ParameterTable::rewrite`]
/// does not update a table that was loaded earlier.
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    floats: FxHashMap<String, f64>,
    strings: FxHashMap<String, String>,
    integers: FxHashMap<String, i64>,
}

impl ParameterTable {
    /// Load and parse a parameter file.
    ///
    /// A missing file is reported as [`ParameterError::NotFound`] so callers can
    /// tell it apart from a file that exists but does not parse.
    pub fn load(path: &Path) -> Result<Self, ParameterError> {
        let content = read_file(path)?;
        let table = Self::parse(&content)?;
        tracing::debug!(
            path = %path.display(),
            parameters = table.len(),
            "Loaded parameter file"
        );
        Ok(table)
    }

    /// Parse parameter file text.
    pub fn parse(content: &str) -> Result<Self, ParameterError> {
        let mut table = Self::default();

        for (index, raw) in content.lines().enumerate() {
            let line_no = index + 1;
            if is_passthrough(raw) {
                continue;
            }

            let line = strip_blanks(raw);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields = split_fields(&line);
            if fields.len() < 3 {
                return Err(ParameterError::Malformed {
                    line: line_no,
                    reason: format!("expected name:type:value, found {} field(s)", fields.len()),
                });
            }

            let (name, tag, value) = (fields[0], fields[1], fields[2]);
            let Some(kind) = ValueKind::from_tag(tag) else {
                tracing::warn!(line = line_no, name, tag, "Skipping parameter with unknown type");
                continue;
            };

            if table.contains(name) {
                return Err(ParameterError::Duplicate {
                    name: name.to_string(),
                    line: line_no,
                });
            }

            let invalid = || ParameterError::InvalidValue {
                name: name.to_string(),
                kind,
                value: value.to_string(),
                line: line_no,
            };
            match kind {
                ValueKind::Float => {
                    let parsed = value.parse::<f64>().map_err(|_| invalid())?;
                    table.floats.insert(name.to_string(), parsed);
                }
                ValueKind::String => {
                    table.strings.insert(name.to_string(), value.to_string());
                }
                ValueKind::Integer => {
                    let parsed = value.parse::<i64>().map_err(|_| invalid())?;
                    table.integers.insert(name.to_string(), parsed);
                }
            }
        }

        Ok(table)
    }

    pub fn float(&self, name: &str) -> Result<f64, ParameterError> {
        self.floats
            .get(name)
            .copied()
            .ok_or_else(|| unknown(name, ValueKind::Float))
    }

    pub fn string(&self, name: &str) -> Result<&str, ParameterError> {
        self.strings
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| unknown(name, ValueKind::String))
    }

    pub fn integer(&self, name: &str) -> Result<i64, ParameterError> {
        self.integers
            .get(name)
            .copied()
            .ok_or_else(|| unknown(name, ValueKind::Integer))
    }

    /// Look up a parameter regardless of its type.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.floats.get(name) {
            return Some(Value::Float(*v));
        }
        if let Some(v) = self.strings.get(name) {
            return Some(Value::String(v.clone()));
        }
        self.integers.get(name).map(|v| Value::Integer(*v))
    }

    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        if self.floats.contains_key(name) {
            Some(ValueKind::Float)
        } else if self.strings.contains_key(name) {
            Some(ValueKind::String)
        } else if self.integers.contains_key(name) {
            Some(ValueKind::Integer)
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.floats.len() + self.strings.len() + self.integers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All parameters sorted by name.
    pub fn entries(&self) -> Vec<(&str, Value)> {
        let mut entries: Vec<(&str, Value)> = self
            .floats
            .iter()
            .map(|(k, v)| (k.as_str(), Value::Float(*v)))
            .chain(
                self.strings
                    .iter()
                    .map(|(k, v)| (k.as_str(), Value::String(v.clone()))),
            )
            .chain(
                self.integers
                    .iter()
                    .map(|(k, v)| (k.as_str(), Value::Integer(*v))),
            )
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Replace the value field of parameter `name` in the file at `path`.
    ///
    /// Only lines whose key field is exactly `name` are touched; the type tag and
    /// the trailing note are kept, every other line is written back verbatim.
    /// All lines are terminated with CRLF. Returns how many lines were replaced.
    ///
    /// Read-modify-write of the whole file with no locking: a single writer is assumed.
    pub fn rewrite(path: &Path, name: &str, new_value: &str) -> Result<usize, ParameterError> {
        let content = read_file(path)?;

        let mut output = String::with_capacity(content.len() + 64);
        let mut replaced = 0;
        for line in content.lines() {
            match rewrite_line(line, name, new_value) {
                Some(new_line) => {
                    output.push_str(&new_line);
                    replaced += 1;
                }
                None => output.push_str(line),
            }
            output.push_str("\r\n");
        }

        atomic_write(path, output.as_bytes()).map_err(|source| ParameterError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            path = %path.display(),
            name,
            value = new_value,
            replaced,
            "Rewrote parameter"
        );
        Ok(replaced)
    }
}

/// Render a sweep value for the parameter file: `1`, `1.5`, `0.3`.
///
/// Values are rounded to 12 decimals so that binary noise such as
/// `0.30000000000000004` is not written out.
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let text = format!("{value:.12}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn unknown(name: &str, kind: ValueKind) -> ParameterError {
    ParameterError::Unknown {
        name: name.to_string(),
        kind,
    }
}

fn read_file(path: &Path) -> Result<String, ParameterError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ParameterError::NotFound(path.to_path_buf()),
        _ => ParameterError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Comment and blank lines are never interpreted.
fn is_passthrough(line: &str) -> bool {
    line.starts_with('#') || line.is_empty()
}

fn strip_blanks(line: &str) -> String {
    line.chars().filter(|c| *c != ' ' && *c != '\t').collect()
}

fn split_fields(line: &str) -> Vec<&str> {
    line.split(':').filter(|f| !f.is_empty()).collect()
}

fn rewrite_line(line: &str, name: &str, new_value: &str) -> Option<String> {
    if is_passthrough(line) {
        return None;
    }

    let fields = split_fields(line);
    if fields.len() < 2 || strip_blanks(fields[0]) != name {
        return None;
    }

    let mut new_line = format!("{}:{}:\t\t{new_value}", fields[0], fields[1]);
    for trailing in fields.iter().skip(3) {
        new_line.push(':');
        new_line.push_str(trailing);
    }
    Some(new_line)
}
