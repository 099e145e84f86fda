//! Renaming of solver output files between sweep iterations.
//!
//! The scripts always save under a generic name such as
//! `Parametric_Study_FSI_Model_Abaqus.odb`; after each iteration the files are
//! moved to `Parametric_Study_FSI_Model_3_Abaqus.odb` so the next iteration does
//! not overwrite them.

use std::path::PathBuf;

use crate::config::Mode;
use crate::error::ArtifactError;
use crate::tools::Tool;

/// Abaqus outputs of a coupled FSI run, in rename order
pub const STRUCTURAL_SUFFIXES: &[&str] = &[
    "Abaqus.com",
    "Abaqus.dat",
    "Abaqus.log",
    "Abaqus.msg",
    "Abaqus.odb",
    "Abaqus.prt",
    "Abaqus.sim",
    "Abaqus.sta",
    "AbaqusCSE.log",
    "AbaqusCSE_config.xml",
    "AbaqusCSE_statechart.xml",
];

/// Star-CCM+ outputs; the `.sim~` backup only exists once the model has been run
pub const CFD_SUFFIXES: &[&str] = &[".sim", ".sim~"];

/// Star-CCM+ outputs expected after a build, depending on whether it also ran.
pub fn cfd_suffixes(run_enabled: bool) -> &'static [&'static str] {
    if run_enabled {
        CFD_SUFFIXES
    } else {
        &CFD_SUFFIXES[..1]
    }
}

/// File naming for one study directory and mode
#[derive(Debug, Clone)]
pub struct ArtifactNaming {
    dir: PathBuf,
    mode: Mode,
}

impl ArtifactNaming {
    pub fn new(dir: impl Into<PathBuf>, mode: Mode) -> Self {
        Self {
            dir: dir.into(),
            mode,
        }
    }

    /// Name the scripts write to, e.g. `Parametric_Study_FSI_Model_.sim`
    pub fn generic(&self, suffix: &str) -> PathBuf {
        self.dir
            .join(format!("Parametric_Study_{}_Model_{suffix}", self.mode))
    }

    /// Name kept for one iteration, e.g. `Parametric_Study_FSI_Model_3.sim`
    pub fn numbered(&self, iteration: usize, suffix: &str) -> PathBuf {
        let separator = if suffix.starts_with('.') { "" } else { "_" };
        self.dir.join(format!(
            "Parametric_Study_{}_Model_{iteration}{separator}{suffix}",
            self.mode
        ))
    }

    /// Where the sweep summary is written
    pub fn summary(&self) -> PathBuf {
        self.dir
            .join(format!("Parametric_Study_{}_Summary.yaml", self.mode))
    }
}

/// Move each generic output to its numbered name, in order.
///
/// Stops at the first missing file. Files renamed before the failure stay
/// renamed.
pub fn rename_artifacts(
    naming: &ArtifactNaming,
    tool: Tool,
    iteration: usize,
    suffixes: &[&str],
) -> Result<Vec<PathBuf>, ArtifactError> {
    let mut renamed = Vec::with_capacity(suffixes.len());

    for suffix in suffixes {
        let from = naming.generic(suffix);
        let to = naming.numbered(iteration, suffix);

        if !from.exists() {
            return Err(ArtifactError::Missing { tool, path: from });
        }
        std::fs::rename(&from, &to).map_err(|source| ArtifactError::Rename {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;

        tracing::trace!(from = %from.display(), to = %to.display(), "Renamed output");
        renamed.push(to);
    }

    tracing::debug!(%tool, iteration, count = renamed.len(), "Renamed outputs");
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_templates() {
        let naming = ArtifactNaming::new("/study", Mode::Fsi);

        assert_eq!(
            naming.generic(".sim"),
            PathBuf::from("/study/Parametric_Study_FSI_Model_.sim")
        );
        assert_eq!(
            naming.numbered(3, ".sim"),
            PathBuf::from("/study/Parametric_Study_FSI_Model_3.sim")
        );
        assert_eq!(
            naming.generic("Abaqus.odb"),
            PathBuf::from("/study/Parametric_Study_FSI_Model_Abaqus.odb")
        );
        assert_eq!(
            naming.numbered(3, "Abaqus.odb"),
            PathBuf::from("/study/Parametric_Study_FSI_Model_3_Abaqus.odb")
        );
    }

    #[test]
    fn test_cfd_suffixes_follow_run_switch() {
        assert_eq!(cfd_suffixes(true), &[".sim", ".sim~"]);
        assert_eq!(cfd_suffixes(false), &[".sim"]);
    }
}
