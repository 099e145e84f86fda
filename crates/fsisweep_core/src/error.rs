use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::params::ValueKind;
use crate::report::SweepSummary;
use crate::tools::Tool;

/// Errors from reading, querying, or rewriting the parameter file
#[derive(Debug)]
pub enum ParameterError {
    /// The parameter file does not exist
    NotFound(PathBuf),
    Io {
        path: PathBuf,
        source: io::Error,
    },
    /// A line does not have the `name:type:value` shape
    Malformed { line: usize, reason: String },
    /// A numeric parameter whose value does not parse
    InvalidValue {
        name: String,
        kind: ValueKind,
        value: String,
        line: usize,
    },
    /// The same parameter name appears twice
    Duplicate { name: String, line: usize },
    /// Lookup of a name absent from the typed table
    Unknown { name: String, kind: ValueKind },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::NotFound(path) => {
                write!(f, "parameter file {} not found", path.display())
            }
            ParameterError::Io { path, source } => {
                write!(f, "failed to access {}: {source}", path.display())
            }
            ParameterError::Malformed { line, reason } => {
                write!(f, "line {line}: {reason}")
            }
            ParameterError::InvalidValue {
                name,
                kind,
                value,
                line,
            } => write!(f, "line {line}: {kind} parameter {name} has invalid value {value:?}"),
            ParameterError::Duplicate { name, line } => {
                write!(f, "line {line}: parameter {name} is defined more than once")
            }
            ParameterError::Unknown { name, kind } => {
                write!(f, "unknown {kind} parameter {name}")
            }
        }
    }
}

impl Error for ParameterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParameterError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors decoding the study flags out of a parameter table
#[derive(Debug)]
pub enum ConfigError {
    Parameter(ParameterError),
    /// A string parameter holding a value outside its allowed set
    InvalidChoice {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parameter(e) => write!(f, "{e}"),
            ConfigError::InvalidChoice {
                name,
                value,
                expected,
            } => write!(f, "parameter {name} is {value:?}, expected {expected}"),
        }
    }
}

// Wrapper variants print their inner error, so `source` skips past it to keep
// the chain free of repeated messages.
impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Parameter(e) => e.source(),
            _ => None,
        }
    }
}

impl From<ParameterError> for ConfigError {
    fn from(e: ParameterError) -> Self {
        ConfigError::Parameter(e)
    }
}

/// Errors launching or waiting on an external tool
#[derive(Debug)]
pub enum RunError {
    Spawn { tool: Tool, source: io::Error },
    /// Writing the captured standard output failed
    Capture { path: PathBuf, source: io::Error },
    /// Non-zero exit under the strict exit policy
    Failed { tool: Tool, code: Option<i32> },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Spawn { tool, source } => write!(f, "failed to start {tool}: {source}"),
            RunError::Capture { path, source } => {
                write!(f, "failed to write output log {}: {source}", path.display())
            }
            RunError::Failed { tool, code: Some(code) } => {
                write!(f, "{tool} exited with status {code}")
            }
            RunError::Failed { tool, code: None } => {
                write!(f, "{tool} was terminated by a signal")
            }
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunError::Spawn { source, .. } | RunError::Capture { source, .. } => Some(source),
            RunError::Failed { .. } => None,
        }
    }
}

/// Errors renaming solver output files
#[derive(Debug)]
pub enum ArtifactError {
    /// An expected output file was not produced
    Missing { tool: Tool, path: PathBuf },
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Missing { tool, path } => {
                write!(f, "{tool} output {} is missing", path.display())
            }
            ArtifactError::Rename { from, to, source } => write!(
                f,
                "failed to rename {} to {}: {source}",
                from.display(),
                to.display()
            ),
        }
    }
}

impl Error for ArtifactError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ArtifactError::Rename { source, .. } => Some(source),
            ArtifactError::Missing { .. } => None,
        }
    }
}

/// Errors writing the sweep summary
#[derive(Debug)]
pub enum ReportError {
    Serialize(String),
    Parse(String),
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::Serialize(msg) => write!(f, "failed to serialize summary: {msg}"),
            ReportError::Parse(msg) => write!(f, "failed to parse summary: {msg}"),
            ReportError::Io { path, source } => {
                write!(f, "failed to access summary {}: {source}", path.display())
            }
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReportError::Io { source, .. } => Some(source),
            ReportError::Serialize(_) | ReportError::Parse(_) => None,
        }
    }
}

/// Errors from running an existing model
#[derive(Debug)]
pub enum SolveError {
    Parameter(ParameterError),
    Run(RunError),
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveError::Parameter(e) => write!(f, "{e}"),
            SolveError::Run(e) => write!(f, "{e}"),
        }
    }
}

impl Error for SolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SolveError::Parameter(e) => e.source(),
            SolveError::Run(e) => e.source(),
        }
    }
}

impl From<ParameterError> for SolveError {
    fn from(e: ParameterError) -> Self {
        SolveError::Parameter(e)
    }
}

impl From<RunError> for SolveError {
    fn from(e: RunError) -> Self {
        SolveError::Run(e)
    }
}

/// Errors from a parametric sweep
#[derive(Debug)]
pub enum SweepError {
    /// The step size is not a positive finite number, or is too small for the range
    InvalidStep(f64),
    /// Sweep bounds that are not finite numbers
    InvalidRange { min: f64, max: f64 },
    /// The parameter to sweep is not defined in the parameter file
    UnknownParameter(String),
    Parameter(ParameterError),
    Run(RunError),
    Artifact(ArtifactError),
    /// An iteration failed; carries the summary of everything up to the failure
    Aborted {
        summary: Box<SweepSummary>,
        cause: Box<SweepError>,
    },
}

impl SweepError {
    /// Summary of the iterations completed before an abort, if any ran.
    pub fn partial_summary(&self) -> Option<&SweepSummary> {
        match self {
            SweepError::Aborted { summary, .. } => Some(&**summary),
            _ => None,
        }
    }
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SweepError::InvalidStep(step) => {
                write!(
                    f,
                    "sweep step size {step} must be positive and give at most {} models",
                    crate::sweep::MAX_SWEEP_VALUES
                )
            }
            SweepError::InvalidRange { min, max } => {
                write!(f, "sweep range {min} to {max} is not finite")
            }
            SweepError::UnknownParameter(name) => {
                write!(f, "parameter to change {name} is not defined in the parameter file")
            }
            SweepError::Parameter(e) => write!(f, "{e}"),
            SweepError::Run(e) => write!(f, "{e}"),
            SweepError::Artifact(e) => write!(f, "{e}"),
            SweepError::Aborted { summary, cause } => write!(
                f,
                "sweep aborted at model {} of {}: {cause}",
                summary.iterations.len() + 1,
                summary.values.len()
            ),
        }
    }
}

impl Error for SweepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SweepError::InvalidStep(_)
            | SweepError::InvalidRange { .. }
            | SweepError::UnknownParameter(_) => None,
            SweepError::Parameter(e) => e.source(),
            SweepError::Run(e) => e.source(),
            SweepError::Artifact(e) => e.source(),
            SweepError::Aborted { cause, .. } => cause.source(),
        }
    }
}

impl From<ParameterError> for SweepError {
    fn from(e: ParameterError) -> Self {
        SweepError::Parameter(e)
    }
}

impl From<RunError> for SweepError {
    fn from(e: RunError) -> Self {
        SweepError::Run(e)
    }
}

impl From<ArtifactError> for SweepError {
    fn from(e: ArtifactError) -> Self {
        SweepError::Artifact(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Mode;

    fn chain<'a>(err: &'a (dyn Error + 'static)) -> Vec<String> {
        std::iter::successors(Some(err), |&e: &&'a (dyn Error + 'static)| e.source())
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_wrapped_errors_are_reported_once() {
        let err = ConfigError::from(ParameterError::Unknown {
            name: "runStar".to_string(),
            kind: ValueKind::String,
        });
        assert_eq!(chain(&err), vec!["unknown string parameter runStar"]);

        let err = SolveError::from(RunError::Spawn {
            tool: Tool::Solve,
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        });
        assert_eq!(
            chain(&err),
            vec!["failed to start Star-CCM+ solve: no such file", "no such file"]
        );
    }

    #[test]
    fn test_aborted_sweep_reports_cause_once() {
        let err = SweepError::Aborted {
            summary: Box::new(SweepSummary::new("avgChVelocity", Mode::Fsi, vec![1.0, 2.0])),
            cause: Box::new(SweepError::Artifact(ArtifactError::Missing {
                tool: Tool::Structural,
                path: PathBuf::from("Parametric_Study_FSI_Model_Abaqus.odb"),
            })),
        };

        let messages = chain(&err);
        assert_eq!(messages.len(), 1, "{messages:?}");
        assert_eq!(
            messages[0],
            "sweep aborted at model 1 of 2: Abaqus output Parametric_Study_FSI_Model_Abaqus.odb is missing"
        );
    }
}
