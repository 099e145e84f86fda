//! Fluid-structure interaction study orchestration
//!
//! This crate drives the Abaqus and Star-CCM+ model-building scripts for
//! parallel-plate FSI studies. It supports:
//! - A flat typed parameter file shared with the scripts, with in-place rewrite
//! - Serial builds and one-parameter parametric sweeps
//! - Renaming of each tool's outputs to per-iteration names
//! - Batch runs of already-built coupled models
//!
//! # Example
//!
//! ```ignore
//! use fsisweep_core::{ParameterTable, ShellRunner, Study, StudyConfig, run_sweep};
//!
//! let table = ParameterTable::load(Path::new("InputFile.txt"))?;
//! let config = StudyConfig::from_table(&table)?;
//! let spec = config.sweep.clone().expect("parametricSwitch is true");
//! let study = Study::new(config, table, "InputFile.txt", ".");
//! let summary = run_sweep(&study, &spec, &ShellRunner::new("."))?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod artifacts;
pub mod runner;
pub mod study;
pub mod sweep;
pub mod tools;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod error;
pub mod io;
pub mod params;
pub mod report;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use artifacts::{ArtifactNaming, rename_artifacts};
pub use config::{Mode, PlateStack, StudyConfig};
pub use error::{
    ArtifactError, ConfigError, ParameterError, ReportError, RunError, SolveError, SweepError,
};
pub use params::{ParameterTable, Value, ValueKind, format_value};
pub use report::{IterationRecord, SweepSummary, ToolRecord};
pub use runner::{ExitPolicy, ProcessRunner, RunOutcome, ShellRunner};
pub use study::Study;
pub use sweep::{SweepSpec, run_sweep};
pub use tools::{Progress, Tool, ToolCommand};
