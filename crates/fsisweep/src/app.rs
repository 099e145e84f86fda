//! Study entry point: load the parameter file, check the plate geometry, and
//! dispatch to a parametric sweep, a serial build, or a solve run.

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use fsisweep_core::{
    ExitPolicy, ParameterError, ParameterTable, PlateStack, ProcessRunner, Progress, Study,
    StudyConfig, SweepSpec, SweepSummary, run_sweep,
};

/// What to do with the study
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Build the models, sweeping when `parametricSwitch` is on
    #[default]
    Build,
    /// Batch-run an existing coupled model
    Solve { model: Option<usize> },
}

#[derive(Debug, Clone)]
pub struct Options {
    pub input: PathBuf,
    pub work_dir: PathBuf,
    pub policy: ExitPolicy,
    pub action: Action,
}

/// How a run ended, when it did not fail outright
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Plate stack with unequal channel heights; nothing was run
    InvalidGeometry,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::Completed => 0,
            Outcome::InvalidGeometry => 2,
        }
    }
}

pub fn run<R>(options: &Options, runner: &R) -> Result<Outcome>
where
    R: ProcessRunner + ?Sized,
{
    let table = load_parameters(options)?;

    tracing::info!(
        "The code is building/running fluid-structure interaction (FSI) models of parallel plate assemblies."
    );

    let plates = PlateStack::from_table(&table).wrap_err("Failed to read the plate geometry")?;
    if !plates.is_buildable() {
        tracing::error!(
            plates = plates.count,
            small = plates.small_channel_height,
            large = plates.large_channel_height,
            "Plate stack must have equal small and large channel heights!"
        );
        return Ok(Outcome::InvalidGeometry);
    }

    let config = StudyConfig::from_table(&table).wrap_err("Invalid study configuration")?;
    let study = Study::new(config, table, &options.input, &options.work_dir)
        .with_policy(options.policy);

    match options.action {
        Action::Solve { model } => {
            study.solve(runner, model)?;
        }
        Action::Build => match study.config.sweep.clone() {
            Some(spec) => run_parametric(&study, &spec, runner)?,
            None => run_serial(&study, runner)?,
        },
    }

    Ok(Outcome::Completed)
}

/// A missing parameter file is reported and the run continues with an empty
/// table; the first required lookup then names the missing parameter.
fn load_parameters(options: &Options) -> Result<ParameterTable> {
    match ParameterTable::load(&options.input) {
        Ok(table) => Ok(table),
        Err(ParameterError::NotFound(path)) => {
            tracing::error!(path = %path.display(), "Parameter file not found");
            Ok(ParameterTable::default())
        }
        Err(e) => Err(e).wrap_err_with(|| {
            format!(
                "Failed to read parameter file {}",
                options.input.display()
            )
        }),
    }
}

fn run_parametric<R>(study: &Study, spec: &SweepSpec, runner: &R) -> Result<()>
where
    R: ProcessRunner + ?Sized,
{
    let summary_path = study.naming().summary();
    match run_sweep(study, spec, runner) {
        Ok(summary) => {
            write_summary(&summary, &summary_path);
            Ok(())
        }
        Err(e) => {
            if let Some(summary) = e.partial_summary() {
                write_summary(summary, &summary_path);
            }
            Err(e).wrap_err("Parametric study failed")
        }
    }
}

fn run_serial<R>(study: &Study, runner: &R) -> Result<()>
where
    R: ProcessRunner + ?Sized,
{
    if study.config.create_structural {
        study.build_structural(runner)?;
    }
    if study.config.create_cfd {
        study.build_cfd(runner, Progress::SINGLE)?;
    }
    if !study.config.create_structural && !study.config.create_cfd {
        tracing::warn!("Neither createAbqInpFiles nor createStarFile is enabled; nothing to build");
    }
    Ok(())
}

fn write_summary(summary: &SweepSummary, path: &Path) {
    match summary.write(path) {
        Ok(()) => tracing::info!(path = %path.display(), "Wrote sweep summary"),
        Err(e) => tracing::warn!("Could not save sweep summary: {e}"),
    }
}
