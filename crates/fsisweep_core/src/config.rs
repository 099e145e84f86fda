//! Study configuration
//!
//! The parameter file stores its switches as strings (`"yes"`, `"true"`, `"FSI"`).
//! `StudyConfig` decodes them once so the rest of the crate works with enums and
//! booleans.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::params::ParameterTable;
use crate::sweep::SweepSpec;

/// Parameter names read by the orchestrator
pub mod keys {
    pub const MODE: &str = "CFDOrFSI";
    pub const SMALL_CHANNEL_HEIGHT: &str = "smChHeight";
    pub const LARGE_CHANNEL_HEIGHT: &str = "lgChHeight";
    pub const NUM_PLATES: &str = "numOfPlates";
    pub const PARAMETRIC_SWITCH: &str = "parametricSwitch";
    pub const PARAMETER_TO_CHANGE: &str = "parameter2Change";
    pub const MIN_PARAMETER: &str = "minParameter";
    pub const MAX_PARAMETER: &str = "maxParameter";
    pub const STEP_SIZE: &str = "stepSize";
    pub const RUN_CFD: &str = "runStar";
    pub const CREATE_STRUCTURAL: &str = "createAbqInpFiles";
    pub const CREATE_CFD: &str = "createStarFile";
    pub const CFD_PROCESSES: &str = "starProcesses";
    pub const CREATE_LOG: &str = "createLogFile";
    pub const STRUCTURAL_COMMAND: &str = "abaqusCommand";
    pub const CFD_COMMAND: &str = "starCommand";
    pub const AVG_CHANNEL_VELOCITY: &str = "avgChVelocity";
    pub const PLATE_GEOMETRY: &str = "plateGeometry";
    pub const PLATE_THICKNESS: &str = "plateThickness";
}

/// Which kind of coupled model the scripts build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "CFD")]
    Cfd,
    #[serde(rename = "FSI")]
    Fsi,
}

impl Mode {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "CFD" => Ok(Mode::Cfd),
            "FSI" => Ok(Mode::Fsi),
            other => Err(ConfigError::InvalidChoice {
                name: keys::MODE,
                value: other.to_string(),
                expected: "CFD or FSI",
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Cfd => "CFD",
            Mode::Fsi => "FSI",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel geometry of the plate assembly
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlateStack {
    pub small_channel_height: f64,
    pub large_channel_height: f64,
    pub count: i64,
}

impl PlateStack {
    pub fn from_table(table: &ParameterTable) -> Result<Self, ConfigError> {
        Ok(Self {
            small_channel_height: table.float(keys::SMALL_CHANNEL_HEIGHT)?,
            large_channel_height: table.float(keys::LARGE_CHANNEL_HEIGHT)?,
            count: table.integer(keys::NUM_PLATES)?,
        })
    }

    /// A stack of more than one plate needs equal small and large channel heights.
    pub fn is_buildable(&self) -> bool {
        self.count <= 1 || self.small_channel_height == self.large_channel_height
    }
}

/// Flags and settings decoded from the parameter table
#[derive(Debug, Clone, PartialEq)]
pub struct StudyConfig {
    pub mode: Mode,
    pub plates: PlateStack,
    /// Present when `parametricSwitch` is `true`
    pub sweep: Option<SweepSpec>,
    /// Star-CCM+ runs the model right after building it
    pub run_cfd: bool,
    /// Serial mode: build the Abaqus model
    pub create_structural: bool,
    /// Serial mode: build the Star-CCM+ model
    pub create_cfd: bool,
    /// Empty when no Star-CCM+ build is configured
    pub cfd_processes: String,
    /// Capture Star-CCM+ output to a log file
    pub create_log: bool,
    pub structural_command: String,
    pub cfd_command: String,
}

impl StudyConfig {
    pub fn from_table(table: &ParameterTable) -> Result<Self, ConfigError> {
        let mode = Mode::parse(table.string(keys::MODE)?)?;
        let plates = PlateStack::from_table(table)?;

        let sweep = if table.string(keys::PARAMETRIC_SWITCH)? == "true" {
            Some(SweepSpec {
                parameter: table.string(keys::PARAMETER_TO_CHANGE)?.to_string(),
                min: table.float(keys::MIN_PARAMETER)?,
                max: table.float(keys::MAX_PARAMETER)?,
                step: table.float(keys::STEP_SIZE)?,
            })
        } else {
            None
        };

        // Serial-mode switches only matter when no sweep is configured
        let (create_structural, create_cfd) = if sweep.is_some() {
            (false, false)
        } else {
            (
                is_yes(table.string(keys::CREATE_STRUCTURAL)?),
                is_yes(table.string(keys::CREATE_CFD)?),
            )
        };

        // Star-CCM+ settings are only read when Star-CCM+ will be launched
        let (run_cfd, cfd_processes, create_log) = if sweep.is_some() || create_cfd {
            (
                is_yes(table.string(keys::RUN_CFD)?),
                table.string(keys::CFD_PROCESSES)?.to_string(),
                is_yes(table.string(keys::CREATE_LOG)?),
            )
        } else {
            (false, String::new(), false)
        };

        Ok(Self {
            mode,
            plates,
            sweep,
            run_cfd,
            create_structural,
            create_cfd,
            cfd_processes,
            create_log,
            structural_command: optional_string(table, keys::STRUCTURAL_COMMAND, "abaqus"),
            cfd_command: optional_string(table, keys::CFD_COMMAND, "starccm+"),
        })
    }

    pub fn is_parametric(&self) -> bool {
        self.sweep.is_some()
    }
}

fn is_yes(value: &str) -> bool {
    value == "yes"
}

fn optional_string(table: &ParameterTable, name: &str, default: &str) -> String {
    table.string(name).unwrap_or(default).to_string()
}
