//! Final archive assembly.
//!
//! The staged payload is packed into the output archive by delegating to
//! the system `zip` binary, located on `PATH` at assembly time.
//! [`ArchiveWriter`] is the seam the pipeline holds; tests substitute a
//! recording implementation so builds can run where `zip` is absent.

use std::path::Path;
use std::process::Command;

use crate::error::ArchiveError;

/// Packs a finished staging tree into an archive file.
pub trait ArchiveWriter: Send + Sync {
    /// Create `archive_path` from the contents of `stage_root`.
    ///
    /// `archive_path` should be absolute; implementations are free to
    /// change their working directory while packing.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] when the archive cannot be produced.
    fn assemble(&self, stage_root: &Path, archive_path: &Path) -> Result<(), ArchiveError>;
}

/// [`ArchiveWriter`] backed by the system `zip` binary.
///
/// Runs `zip -q -r -X <archive> .` from inside the stage root so archive
/// member names are stage-relative. A pre-existing archive is removed
/// first; `zip` would otherwise update it in place and keep stale members.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCommandWriter;

impl ZipCommandWriter {
    /// Create a writer. The `zip` binary is located lazily, per assembly.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ArchiveWriter for ZipCommandWriter {
    fn assemble(&self, stage_root: &Path, archive_path: &Path) -> Result<(), ArchiveError> {
        let zip = which::which("zip").map_err(|_| ArchiveError::ZipNotFound)?;

        if let Some(parent) = archive_path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ArchiveError::Prepare {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        if archive_path.exists() {
            std::fs::remove_file(archive_path).map_err(|source| ArchiveError::Prepare {
                path: archive_path.to_path_buf(),
                source,
            })?;
        }

        let output = Command::new(zip)
            .args(["-q", "-r", "-X"])
            .arg(archive_path)
            .arg(".")
            .current_dir(stage_root)
            .output()
            .map_err(ArchiveError::Spawn)?;

        if !output.status.success() {
            return Err(ArchiveError::Failed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
