//! Parametric study driver.
//!
//! Each iteration rewrites one parameter in the input file, rebuilds the Abaqus
//! and Star-CCM+ models from it, and moves the outputs to numbered names.
//! Iterations run strictly in order and the first failure ends the sweep; there
//! is no resume, a rerun starts again from model 1.

use serde::{Deserialize, Serialize};

use crate::artifacts::{ArtifactNaming, STRUCTURAL_SUFFIXES, cfd_suffixes, rename_artifacts};
use crate::config::Mode;
use crate::error::SweepError;
use crate::params::{ParameterTable, format_value};
use crate::report::{IterationRecord, SweepSummary};
use crate::runner::ProcessRunner;
use crate::study::Study;
use crate::tools::{Progress, Tool};

/// Relative tolerance on the step count so that `max` is kept despite rounding in `(max - min) / step`
const STEP_COUNT_EPSILON: f64 = 1e-9;

/// Upper bound on the number of models one sweep may build
pub const MAX_SWEEP_VALUES: usize = 10_000;

/// One swept parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSpec {
    /// Name of the parameter rewritten in the input file
    pub parameter: String,
    pub min: f64,
    /// Inclusive upper bound
    pub max: f64,
    pub step: f64,
}

impl SweepSpec {
    /// Generate the sweep values `min, min + step, ...` up to and including `max`.
    ///
    /// Values are computed as `min + k * step` rather than by repeated addition,
    /// so rounding does not accumulate across a long sweep. No value exceeds `max`.
    /// A step that would produce more than [`MAX_SWEEP_VALUES`] models is rejected.
    pub fn sweep_values(&self) -> Result<Vec<f64>, SweepError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(SweepError::InvalidStep(self.step));
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SweepError::InvalidRange {
                min: self.min,
                max: self.max,
            });
        }
        if self.max < self.min {
            return Ok(Vec::new());
        }

        let ratio = (self.max - self.min) / self.step;
        let steps = (ratio + STEP_COUNT_EPSILON * ratio.max(1.0)).floor();
        if !steps.is_finite() || steps >= MAX_SWEEP_VALUES as f64 {
            return Err(SweepError::InvalidStep(self.step));
        }

        Ok((0..=steps as usize)
            .map(|k| (self.min + self.step * k as f64).min(self.max))
            .collect())
    }
}

/// Run every model of a parametric study.
///
/// On failure the returned [`SweepError::Aborted`] carries a summary of the
/// iterations that completed. Outputs of the failed iteration are left under
/// their generic names.
pub fn run_sweep<R>(study: &Study, spec: &SweepSpec, runner: &R) -> Result<SweepSummary, SweepError>
where
    R: ProcessRunner + ?Sized,
{
    let values = spec.sweep_values()?;
    if !study.table.contains(&spec.parameter) {
        return Err(SweepError::UnknownParameter(spec.parameter.clone()));
    }

    tracing::info!(
        "A parametric study has been started where {} will be varied from {} to {} in increments of {}",
        spec.parameter,
        spec.min,
        spec.max,
        spec.step
    );

    let naming = study.naming();
    let total = values.len();
    let mut summary = SweepSummary::new(&spec.parameter, study.config.mode, values.clone());

    for (k, value) in values.into_iter().enumerate() {
        let progress = Progress {
            current: k + 1,
            total,
        };
        match run_iteration(study, spec, runner, &naming, progress, value) {
            Ok(record) => summary.iterations.push(record),
            Err(cause) => {
                tracing::error!(model = progress.current, total, "Parametric study aborted: {cause}");
                summary.finish(Some(cause.to_string()));
                return Err(SweepError::Aborted {
                    summary: Box::new(summary),
                    cause: Box::new(cause),
                });
            }
        }
    }

    summary.finish(None);
    tracing::info!(models = total, "Parametric study complete");
    Ok(summary)
}

fn run_iteration<R>(
    study: &Study,
    spec: &SweepSpec,
    runner: &R,
    naming: &ArtifactNaming,
    progress: Progress,
    value: f64,
) -> Result<IterationRecord, SweepError>
where
    R: ProcessRunner + ?Sized,
{
    let Progress { current, total } = progress;
    tracing::info!("Model {current} of {total} in the parametric study is being built...");

    let replaced = ParameterTable::rewrite(&study.input_path, &spec.parameter, &format_value(value))?;
    if replaced == 0 {
        tracing::warn!(
            parameter = %spec.parameter,
            path = %study.input_path.display(),
            "Parameter line not found; input file left unchanged"
        );
    }

    let structural = study.build_structural(runner)?;
    let cfd = study.build_cfd(runner, progress)?;

    let config = &study.config;
    let mut renamed = rename_artifacts(naming, Tool::Cfd, current, cfd_suffixes(config.run_cfd))?;
    if config.run_cfd && config.mode == Mode::Fsi {
        renamed.extend(rename_artifacts(
            naming,
            Tool::Structural,
            current,
            STRUCTURAL_SUFFIXES,
        )?);
    }

    Ok(IterationRecord {
        index: current,
        value,
        structural: (&structural).into(),
        cfd: (&cfd).into(),
        renamed: renamed
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect(),
    })
}
