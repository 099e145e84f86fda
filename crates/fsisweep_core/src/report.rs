//! Record of a parametric sweep, saved next to the renamed outputs.

use std::path::Path;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::error::ReportError;
use crate::io::atomic_write;
use crate::runner::RunOutcome;

/// How one tool invocation ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub exit_code: Option<i32>,
    pub success: bool,
    pub elapsed_secs: f64,
}

impl From<&RunOutcome> for ToolRecord {
    fn from(outcome: &RunOutcome) -> Self {
        Self {
            exit_code: outcome.exit_code,
            success: outcome.success,
            elapsed_secs: outcome.elapsed.as_secs_f64(),
        }
    }
}

/// One completed sweep iteration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// 1-based model number
    pub index: usize,
    pub value: f64,
    pub structural: ToolRecord,
    pub cfd: ToolRecord,
    /// File names the outputs were renamed to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub renamed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    pub parameter: String,
    pub mode: Mode,
    pub values: Vec<f64>,
    pub started_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
    pub iterations: Vec<IterationRecord>,
    /// Why the sweep stopped early
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl SweepSummary {
    pub fn new(parameter: &str, mode: Mode, values: Vec<f64>) -> Self {
        Self {
            parameter: parameter.to_string(),
            mode,
            values,
            started_at: Timestamp::now(),
            finished_at: None,
            iterations: Vec::new(),
            aborted: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.aborted.is_none() && self.iterations.len() == self.values.len()
    }

    pub fn finish(&mut self, aborted: Option<String>) {
        self.finished_at = Some(Timestamp::now());
        self.aborted = aborted;
    }

    pub fn write(&self, path: &Path) -> Result<(), ReportError> {
        let yaml =
            serde_saphyr::to_string(self).map_err(|e| ReportError::Serialize(e.to_string()))?;
        atomic_write(path, yaml.as_bytes()).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_saphyr::from_str(&content).map_err(|e| ReportError::Parse(e.to_string()))
    }
}
