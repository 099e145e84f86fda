//! I/O utility functions

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write content to a file atomically using write-then-rename pattern.
///
/// The parameter file is rewritten once per sweep iteration; an interrupted
/// write must never leave the external tools a truncated file to read.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = temp_path_for(path);

    fs::write(&temp_path, content)?;

    // Atomic on POSIX; replaces the target on Windows
    fs::rename(&temp_path, path)?;

    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
