//! A study directory: parameter file, decoded configuration, and the steps that
//! invoke the external tools.

use std::path::PathBuf;

use crate::artifacts::ArtifactNaming;
use crate::config::StudyConfig;
use crate::error::{RunError, SolveError};
use crate::params::ParameterTable;
use crate::runner::{ExitPolicy, ProcessRunner, RunOutcome};
use crate::tools::{self, CFD_LOG_FILE, Progress};

#[derive(Debug, Clone)]
pub struct Study {
    pub config: StudyConfig,
    /// Values as loaded at startup; not refreshed when a sweep rewrites the file
    pub table: ParameterTable,
    pub input_path: PathBuf,
    pub work_dir: PathBuf,
    pub policy: ExitPolicy,
}

impl Study {
    pub fn new(
        config: StudyConfig,
        table: ParameterTable,
        input_path: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            table,
            input_path: input_path.into(),
            work_dir: work_dir.into(),
            policy: ExitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn naming(&self) -> ArtifactNaming {
        ArtifactNaming::new(&self.work_dir, self.config.mode)
    }

    /// Path Star-CCM+ output is captured to, when logging is enabled
    pub fn cfd_log_path(&self) -> Option<PathBuf> {
        self.config
            .create_log
            .then(|| self.work_dir.join(CFD_LOG_FILE))
    }

    /// Build the solid model and the fluid geometry/mesh with Abaqus.
    pub fn build_structural<R>(&self, runner: &R) -> Result<RunOutcome, RunError>
    where
        R: ProcessRunner + ?Sized,
    {
        tracing::info!("Abaqus is building the solid model and the fluid geometry/mesh...");
        let outcome = runner
            .run(&tools::structural_command(&self.config), None)?
            .enforce(self.policy)?;
        tracing::info!("Abaqus has finished building the solid model and the fluid geometry/mesh!");
        Ok(outcome)
    }

    /// Build the fluid model with Star-CCM+, which also runs it when `runStar` is on.
    pub fn build_cfd<R>(&self, runner: &R, progress: Progress) -> Result<RunOutcome, RunError>
    where
        R: ProcessRunner + ?Sized,
    {
        let messages = tools::cfd_messages(&self.config, progress);
        tracing::info!("{}", messages.start);

        let log_path = self.cfd_log_path();
        let outcome = runner
            .run(&tools::cfd_build_command(&self.config), log_path.as_deref())?
            .enforce(self.policy)?;

        if let Some(path) = &log_path {
            tracing::debug!(path = %path.display(), "Star-CCM+ output captured");
        }
        tracing::info!("{}", messages.finish);
        Ok(outcome)
    }

    /// Batch-run an existing coupled model.
    pub fn solve<R>(&self, runner: &R, model: Option<usize>) -> Result<RunOutcome, SolveError>
    where
        R: ProcessRunner + ?Sized,
    {
        let command = tools::solve_command(&self.config, &self.table, model)?;
        tracing::info!(command = %command, "Running the {} simulation...", self.config.mode);
        let outcome = runner.run(&command, None)?.enforce(self.policy)?;
        tracing::info!("The {} simulation has finished running!", self.config.mode);
        Ok(outcome)
    }
}
