//! Command lines for the external solvers.
//!
//! Abaqus builds the solid model and the fluid mesh from `AbaqusScript.py`;
//! Star-CCM+ builds the fluid model from `StarScript.java` and optionally runs it.
//! Both scripts read the parameter file themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{StudyConfig, keys};
use crate::error::ParameterError;
use crate::params::ParameterTable;

pub const STRUCTURAL_SCRIPT: &str = "AbaqusScript.py";
pub const CFD_SCRIPT: &str = "StarScript.java";
/// Captured Star-CCM+ output, overwritten by every build
pub const CFD_LOG_FILE: &str = "StarOutput.txt";

const METRES_PER_INCH: f64 = 0.0254;

/// The external programs the orchestrator drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    /// Abaqus model and mesh build
    Structural,
    /// Star-CCM+ model build (and run, when enabled)
    Cfd,
    /// Star-CCM+ batch run of an existing model
    Solve,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tool::Structural => f.write_str("Abaqus"),
            Tool::Cfd => f.write_str("Star-CCM+"),
            Tool::Solve => f.write_str("Star-CCM+ solve"),
        }
    }
}

/// A shell command line for one tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub tool: Tool,
    pub line: String,
}

impl ToolCommand {
    pub fn new(tool: Tool, line: impl Into<String>) -> Self {
        Self {
            tool,
            line: line.into(),
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}

/// Position of a model within a run, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl Progress {
    pub const SINGLE: Progress = Progress {
        current: 1,
        total: 1,
    };
}

pub fn structural_command(config: &StudyConfig) -> ToolCommand {
    ToolCommand::new(
        Tool::Structural,
        format!("{} cae noGUI={STRUCTURAL_SCRIPT}", config.structural_command),
    )
}

pub fn cfd_build_command(config: &StudyConfig) -> ToolCommand {
    ToolCommand::new(
        Tool::Cfd,
        format!(
            "{} -new -np {} -batch {CFD_SCRIPT} -batch-report",
            config.cfd_command, config.cfd_processes
        ),
    )
}

/// Batch run of a model that has already been built.
///
/// `model` selects a numbered parametric-study model; without it the model file
/// name is derived from the plate geometry.
pub fn solve_command(
    config: &StudyConfig,
    table: &ParameterTable,
    model: Option<usize>,
) -> Result<ToolCommand, ParameterError> {
    let file = model_file_name(config, table, model)?;
    let processes = match config.cfd_processes.as_str() {
        "" => table.string(keys::CFD_PROCESSES)?,
        decoded => decoded,
    };
    Ok(ToolCommand::new(
        Tool::Solve,
        format!("{} -np {processes} -time -batch {file}", config.cfd_command),
    ))
}

/// Name of the `.sim` file the Star-CCM+ script saves a model under.
pub fn model_file_name(
    config: &StudyConfig,
    table: &ParameterTable,
    model: Option<usize>,
) -> Result<String, ParameterError> {
    let mode = config.mode;
    if let Some(iteration) = model {
        return Ok(format!("Parametric_Study_{mode}_Model_{iteration}.sim"));
    }

    let velocity = table.float(keys::AVG_CHANNEL_VELOCITY)?;
    let geometry = table.string(keys::PLATE_GEOMETRY)?;
    let thickness = thousandths_of_inch(table.float(keys::PLATE_THICKNESS)?);
    let small = thousandths_of_inch(config.plates.small_channel_height);

    if config.plates.count == 1 {
        let large = thousandths_of_inch(config.plates.large_channel_height);
        Ok(format!(
            "{mode}_{velocity}_{geometry}_{thickness}_{small}_{large}.sim"
        ))
    } else {
        Ok(format!(
            "{mode}_{velocity}_{geometry}_{thickness}_{small}_{}_PlateStack.sim",
            config.plates.count
        ))
    }
}

/// Metres to thousandths of an inch, truncated.
fn thousandths_of_inch(metres: f64) -> i64 {
    (metres / METRES_PER_INCH * 1000.0) as i64
}

/// Console messages around a Star-CCM+ build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfdMessages {
    pub start: String,
    pub finish: String,
}

pub fn cfd_messages(config: &StudyConfig, progress: Progress) -> CfdMessages {
    let mode = config.mode;
    let mut start = format!(
        "Star-CCM+ is now building the fluid model and setting up the {mode} problem..."
    );
    let finish = match (config.run_cfd, config.is_parametric()) {
        (true, true) => {
            start.push_str(&format!(
                " Model {} of {} will automatically start running after it has completed building...",
                progress.current, progress.total
            ));
            format!(
                "Model {} of {} has finished running!",
                progress.current, progress.total
            )
        }
        (true, false) => {
            start.push_str(&format!(
                " The {mode} model will automatically start running after it has completed building..."
            ));
            format!("The {mode} model has finished running!")
        }
        (false, _) => format!(
            "Star-CCM+ has finished building the fluid model and the {mode} problem!"
        ),
    };
    CfdMessages { start, finish }
}
