//! Filesystem entry classification with `lstat` semantics.
//!
//! The probe never follows the inspected path itself: a symlink is reported
//! as a symlink even when its target is missing. Only the advisory
//! directory-ness of a link target is resolved through the filesystem, and
//! that resolution is allowed to fail soft (a dangling target is simply
//! "not a directory").

use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// Classification of one filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// A regular file (or any non-directory, non-link entry).
    File,
    /// A real directory, safe to descend into.
    Dir,
    /// A symbolic link, with its raw target and reconstruction hint.
    Symlink(LinkInfo),
}

/// Raw target information for a probed symlink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkInfo {
    /// The link target exactly as stored by the filesystem, unresolved.
    /// May be relative and may point outside any tree being walked.
    pub target: PathBuf,
    /// Whether the target, interpreted relative to the link's own directory,
    /// currently denotes a directory. `false` for dangling targets.
    pub target_is_dir: bool,
}

/// Classify `path` without following it.
///
/// For symlinks, reads the raw target text and resolves whether that target
/// currently denotes a directory. The directory determination follows link
/// chains (it answers "what would a reader find there"), but a target that
/// resolves to nothing yields `target_is_dir = false` rather than an error.
///
/// # Errors
///
/// Returns [`SourceError::Probe`] when the path cannot be `lstat`ed (it
/// neither exists nor is a dangling symlink) and [`SourceError::ReadLink`]
/// when a symlink's target text cannot be read.
pub fn probe(path: &Path) -> Result<Entry, SourceError> {
    let meta = std::fs::symlink_metadata(path).map_err(|source| SourceError::Probe {
        path: path.to_path_buf(),
        source,
    })?;

    if meta.is_symlink() {
        let target = std::fs::read_link(path).map_err(|source| SourceError::ReadLink {
            path: path.to_path_buf(),
            source,
        })?;
        let target_is_dir = resolve_target_is_dir(path, &target);
        return Ok(Entry::Symlink(LinkInfo {
            target,
            target_is_dir,
        }));
    }

    if meta.is_dir() {
        Ok(Entry::Dir)
    } else {
        Ok(Entry::File)
    }
}

/// Resolve whether `target`, interpreted relative to `link`'s parent
/// directory, currently denotes a directory.
fn resolve_target_is_dir(link: &Path, target: &Path) -> bool {
    let base = link.parent().unwrap_or_else(|| Path::new("."));
    std::fs::metadata(base.join(target)).is_ok_and(|m| m.is_dir())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn classifies_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.txt");
        std::fs::write(&file, b"hello").unwrap();
        assert_eq!(probe(&file).unwrap(), Entry::File);
    }

    #[test]
    fn classifies_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        assert_eq!(probe(&sub).unwrap(), Entry::Dir);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = probe(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, SourceError::Probe { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn classifies_file_symlink_with_raw_target() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("real.txt"), b"x").unwrap();
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink("real.txt", &link).unwrap();

        let Entry::Symlink(info) = probe(&link).unwrap() else {
            panic!("expected a symlink classification");
        };
        assert_eq!(info.target, PathBuf::from("real.txt"));
        assert!(!info.target_is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn directory_target_sets_is_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("real")).unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink("real", &link).unwrap();

        let Entry::Symlink(info) = probe(&link).unwrap() else {
            panic!("expected a symlink classification");
        };
        assert!(info.target_is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn dangling_target_is_not_a_directory_and_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let link = dir.path().join("dangling");
        std::os::unix::fs::symlink("missing-file", &link).unwrap();

        let Entry::Symlink(info) = probe(&link).unwrap() else {
            panic!("expected a symlink classification");
        };
        assert_eq!(info.target, PathBuf::from("missing-file"));
        assert!(!info.target_is_dir);
    }

    #[cfg(unix)]
    #[test]
    fn relative_target_escaping_the_tree_resolves_against_link_parent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("outside")).unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        let link = sub.join("esc");
        std::os::unix::fs::symlink("../outside", &link).unwrap();

        let Entry::Symlink(info) = probe(&link).unwrap() else {
            panic!("expected a symlink classification");
        };
        assert_eq!(info.target, PathBuf::from("../outside"));
        assert!(info.target_is_dir);
    }
}
