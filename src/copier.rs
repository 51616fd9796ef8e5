//! Recursive tree copying that separates regular content from symlinks.
//!
//! [`TreeCopier`] walks a source tree depth-first and partitions what it
//! finds: regular files are copied to the destination with their attributes
//! carried over, real directories are recreated and descended into, and
//! symbolic links become [`LinkRecord`]s instead of being followed. A
//! symlink whose target is a directory is a leaf link, never a subtree.
//! Whether recorded links are also recreated on disk depends on the
//! [`CopyMode`] of the plan.

use std::path::{Path, PathBuf};

use crate::error::SourceError;
use crate::probe::{self, Entry};
use crate::registry::LinkRecord;

/// Prefix of transient NFS rename artifacts. Entries carrying it are
/// skipped entirely, on every platform.
const NFS_ARTIFACT_PREFIX: &str = ".nfs";

/// How a copy treats the symbolic links it encounters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    /// Record links; create nothing at their destination paths.
    RegisterOnly,
    /// Record links and recreate each one in the destination tree.
    RegisterAndReproduce,
}

/// One tree copy request.
#[derive(Debug, Clone)]
pub struct CopyPlan {
    /// Directory whose contents are walked. Must exist and be a directory.
    pub source_root: PathBuf,
    /// Directory the tree is materialized under. Created if missing.
    pub destination_root: PathBuf,
    /// Link handling mode for this copy.
    pub mode: CopyMode,
}

/// What one completed copy produced.
#[derive(Debug, Default)]
pub struct CopyOutcome {
    /// Destination paths of every regular file written, in walk order.
    pub copied: Vec<PathBuf>,
    /// Every symbolic link encountered, in walk order.
    pub links: Vec<LinkRecord>,
}

type ExcludePredicate = dyn Fn(&Path) -> bool;

/// Depth-first copier with pluggable exclusions and a dry-run mode.
///
/// The exclusion predicate receives each entry's path relative to the
/// destination root and wins over everything else: an excluded entry is
/// neither copied nor recorded, even when it is a symlink. In dry-run mode
/// the walk still produces the full [`CopyOutcome`] but writes nothing.
pub struct TreeCopier {
    exclude: Option<Box<ExcludePredicate>>,
    dry_run: bool,
}

impl std::fmt::Debug for TreeCopier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeCopier")
            .field("exclude", &self.exclude.as_ref().map(|_| "<predicate>"))
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl Default for TreeCopier {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeCopier {
    /// Create a copier with no exclusions that mutates the filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self {
            exclude: None,
            dry_run: false,
        }
    }

    /// Replace the exclusion predicate.
    ///
    /// `predicate` is called with each entry's destination-root-relative
    /// path before the entry is classified.
    #[must_use]
    pub fn with_exclusion(mut self, predicate: impl Fn(&Path) -> bool + 'static) -> Self {
        self.exclude = Some(Box::new(predicate));
        self
    }

    /// Set dry-run mode, in which the walk reports but never writes.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Walk `plan.source_root` and materialize it under
    /// `plan.destination_root`.
    ///
    /// Regular files keep their permission bits and modification times.
    /// Real directories are recreated (including empty ones) and descended
    /// into; symlinked directories are not. Entries named with the `.nfs`
    /// prefix are skipped. Under [`CopyMode::RegisterAndReproduce`] each
    /// recorded link is also recreated with its raw target text.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::MissingRoot`] when the source root does not
    /// exist, [`SourceError::NotADirectory`] when it is something else, and
    /// the corresponding [`SourceError`] variant for any read, copy, or
    /// link failure during the walk.
    pub fn copy(&self, plan: &CopyPlan) -> Result<CopyOutcome, SourceError> {
        let meta = std::fs::symlink_metadata(&plan.source_root)
            .map_err(|_| SourceError::MissingRoot(plan.source_root.clone()))?;
        if !meta.is_dir() {
            return Err(SourceError::NotADirectory(plan.source_root.clone()));
        }

        let mut outcome = CopyOutcome::default();
        self.copy_dir(plan, Path::new(""), &mut outcome)?;
        Ok(outcome)
    }

    /// Copy the directory at `rel` (relative to both roots of the plan).
    fn copy_dir(
        &self,
        plan: &CopyPlan,
        rel: &Path,
        outcome: &mut CopyOutcome,
    ) -> Result<(), SourceError> {
        let source_dir = plan.source_root.join(rel);
        let destination_dir = plan.destination_root.join(rel);

        if !self.dry_run {
            std::fs::create_dir_all(&destination_dir).map_err(|source| {
                SourceError::CreateDir {
                    path: destination_dir.clone(),
                    source,
                }
            })?;
        }

        // Sorted for a stable walk order regardless of readdir order.
        let mut names = Vec::new();
        let entries = std::fs::read_dir(&source_dir).map_err(|source| SourceError::ReadDir {
            path: source_dir.clone(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| SourceError::ReadDir {
                path: source_dir.clone(),
                source,
            })?;
            names.push(entry.file_name());
        }
        names.sort();

        for name in names {
            if name.to_string_lossy().starts_with(NFS_ARTIFACT_PREFIX) {
                continue;
            }
            let entry_rel = rel.join(&name);
            if let Some(exclude) = &self.exclude
                && exclude(&entry_rel)
            {
                continue;
            }

            let source = plan.source_root.join(&entry_rel);
            let destination = plan.destination_root.join(&entry_rel);
            match probe::probe(&source)? {
                Entry::Symlink(info) => {
                    if plan.mode == CopyMode::RegisterAndReproduce && !self.dry_run {
                        create_link(&destination, &info.target, info.target_is_dir)?;
                    }
                    outcome
                        .links
                        .push(LinkRecord::new(destination, info.target, info.target_is_dir));
                }
                Entry::Dir => self.copy_dir(plan, &entry_rel, outcome)?,
                Entry::File => {
                    if !self.dry_run {
                        copy_file(&source, &destination)?;
                    }
                    outcome.copied.push(destination);
                }
            }
        }
        Ok(())
    }
}

/// Copy one regular file, carrying over its modification time. Permission
/// bits are preserved by [`std::fs::copy`] itself.
fn copy_file(source: &Path, destination: &Path) -> Result<(), SourceError> {
    std::fs::copy(source, destination).map_err(|err| SourceError::Copy {
        from: source.to_path_buf(),
        to: destination.to_path_buf(),
        source: err,
    })?;

    let modified = std::fs::metadata(source)
        .and_then(|meta| meta.modified())
        .map_err(|source| SourceError::Preserve {
            path: destination.to_path_buf(),
            source,
        })?;
    let file = std::fs::File::options()
        .write(true)
        .open(destination)
        .map_err(|source| SourceError::Preserve {
            path: destination.to_path_buf(),
            source,
        })?;
    file.set_times(std::fs::FileTimes::new().set_modified(modified))
        .map_err(|source| SourceError::Preserve {
            path: destination.to_path_buf(),
            source,
        })
}

/// Recreate a symbolic link at `path` with the raw target text `target`.
#[cfg(unix)]
fn create_link(path: &Path, target: &Path, _target_is_dir: bool) -> Result<(), SourceError> {
    std::os::unix::fs::symlink(target, path).map_err(|source| SourceError::CreateLink {
        path: path.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })
}

/// Recreate a symbolic link at `path` with the raw target text `target`.
///
/// Windows distinguishes file and directory links at creation time, which
/// is what the probed directory hint exists for.
#[cfg(windows)]
fn create_link(path: &Path, target: &Path, target_is_dir: bool) -> Result<(), SourceError> {
    let result = if target_is_dir {
        std::os::windows::fs::symlink_dir(target, path)
    } else {
        std::os::windows::fs::symlink_file(target, path)
    };
    result.map_err(|source| SourceError::CreateLink {
        path: path.to_path_buf(),
        target: target.to_path_buf(),
        source,
    })
}

/// Remove a symbolic link from the filesystem.
///
/// On Windows a link to a directory must be removed with `remove_dir`;
/// everywhere else `remove_file` removes the link itself, never the target.
pub(crate) fn remove_link(path: &Path) -> Result<(), SourceError> {
    #[cfg(windows)]
    {
        let meta = std::fs::symlink_metadata(path).map_err(|source| SourceError::Remove {
            path: path.to_path_buf(),
            source,
        })?;
        if meta.is_dir() {
            return std::fs::remove_dir(path).map_err(|source| SourceError::Remove {
                path: path.to_path_buf(),
                source,
            });
        }
    }
    std::fs::remove_file(path).map_err(|source| SourceError::Remove {
        path: path.to_path_buf(),
        source,
    })
}
