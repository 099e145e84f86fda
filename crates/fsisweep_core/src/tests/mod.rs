//! Integration tests for the study orchestrator
//!
//! Tests are organized by topic:
//! - `parameters` - Parameter file parsing and in-place rewrite
//! - `artifacts` - Output renaming between iterations
//! - `sweep` - Parametric sweeps driven through a scripted runner

mod parameters;

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::artifacts::{ArtifactNaming, CFD_SUFFIXES, STRUCTURAL_SUFFIXES};
use crate::error::RunError;
use crate::runner::{ProcessRunner, RunOutcome};
use crate::tools::{Tool, ToolCommand};

/// Parameter file for a single-plate FSI study, swept over the channel velocity
pub(crate) const INPUT_FILE: &str = "\
# Parallel plate FSI study
#
# name:\t\ttype:\t\tvalue:\t\tunits

CFDOrFSI:\t\tstring:\t\tFSI:\t\t-
avgChVelocity:\t\tfloat:\t\t1.0:\t\tm/s
avgChVelocityMax:\tfloat:\t\t9.0:\t\tm/s
plateGeometry:\t\tstring:\t\tflat:\t\t-
plateThickness:\t\tfloat:\t\t0.001016:\tm
smChHeight:\t\tfloat:\t\t0.00254:\tm
lgChHeight:\t\tfloat:\t\t0.00254:\tm
numOfPlates:\t\tinteger:\t1:\t\t-

# Parametric study
parametricSwitch:\tstring:\t\ttrue:\t\ttrue or false
parameter2Change:\tstring:\t\tavgChVelocity:\t-
minParameter:\t\tfloat:\t\t1.0:\t\t-
maxParameter:\t\tfloat:\t\t2.0:\t\t-
stepSize:\t\tfloat:\t\t0.5:\t\t-

# Tool switches
runStar:\t\tstring:\t\tno:\t\tyes or no
createAbqInpFiles:\tstring:\t\tyes:\t\tyes or no
createStarFile:\t\tstring:\t\tyes:\t\tyes or no
starProcesses:\t\tstring:\t\t4:\t\t-
createLogFile:\t\tstring:\t\tno:\t\tyes or no
";

pub(crate) fn write_input(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("InputFile.txt");
    fs::write(&path, content).unwrap();
    path
}

pub(crate) fn touch_all(naming: &ArtifactNaming, suffixes: &[&str]) {
    for suffix in suffixes {
        fs::write(naming.generic(suffix), suffix.as_bytes()).unwrap();
    }
}

/// A call seen by [`ScriptedRunner`]
#[derive(Debug, Clone)]
pub(crate) struct Call {
    pub command: ToolCommand,
    pub capture: Option<PathBuf>,
    /// Parameter file contents when the tool was started
    pub input: String,
}

/// Stands in for Abaqus and Star-CCM+: records each call and writes the output
/// files the real tool would leave behind.
pub(crate) struct ScriptedRunner {
    naming: ArtifactNaming,
    input_path: PathBuf,
    /// Star-CCM+ also runs the model and leaves a `.sim~` backup
    cfd_runs: bool,
    /// Abaqus outputs not produced
    skip_structural: Vec<&'static str>,
    exit_code: i32,
    calls: RefCell<Vec<Call>>,
}

impl ScriptedRunner {
    pub fn new(naming: ArtifactNaming, input_path: &Path, cfd_runs: bool) -> Self {
        Self {
            naming,
            input_path: input_path.to_path_buf(),
            cfd_runs,
            skip_structural: Vec::new(),
            exit_code: 0,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn skipping(mut self, suffix: &'static str) -> Self {
        self.skip_structural.push(suffix);
        self
    }

    pub fn exiting_with(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.calls.borrow().iter().map(|c| c.command.tool).collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &ToolCommand, capture: Option<&Path>) -> Result<RunOutcome, RunError> {
        self.calls.borrow_mut().push(Call {
            command: command.clone(),
            capture: capture.map(Path::to_path_buf),
            input: fs::read_to_string(&self.input_path).unwrap_or_default(),
        });

        match command.tool {
            Tool::Structural => {
                let produced: Vec<&str> = STRUCTURAL_SUFFIXES
                    .iter()
                    .copied()
                    .filter(|s| !self.skip_structural.contains(s))
                    .collect();
                touch_all(&self.naming, &produced);
            }
            Tool::Cfd => {
                let produced = if self.cfd_runs {
                    CFD_SUFFIXES
                } else {
                    &CFD_SUFFIXES[..1]
                };
                touch_all(&self.naming, produced);
                if let Some(path) = capture {
                    fs::write(path, "Star-CCM+ batch report\n").unwrap();
                }
            }
            Tool::Solve => {}
        }

        Ok(RunOutcome {
            tool: command.tool,
            exit_code: Some(self.exit_code),
            success: self.exit_code == 0,
            elapsed: Duration::from_millis(5),
        })
    }
}
