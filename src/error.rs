//! Domain-specific error types for the axle builder.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`ConfigError`],
//! [`SourceError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! AxleError
//! ├── Config(ConfigError)     — axle.toml parsing, tag resolution
//! ├── Source(SourceError)     — tree walking and copying
//! ├── Manifest(ManifestError) — symlink manifest and marker files
//! └── Archive(ArchiveError)   — final archive assembly
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the axle builder.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum AxleError {
    /// Configuration-related error (parsing, validation, tag resolution).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Source-tree error (missing root, unreadable entry, copy failure).
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Manifest or marker file error.
    #[error("manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// Archive assembly error.
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),
}

/// Errors that arise from configuration loading and tag resolution.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No `axle.toml` was found at the resolved project root.
    #[error("no axle.toml found in {0}")]
    NotFound(PathBuf),

    /// An I/O error occurred while reading the configuration file.
    #[error("reading {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file contains a TOML syntax or shape error.
    #[error("parsing {path}: {message}")]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },

    /// A required field is missing or empty.
    #[error("[package] {field} must not be empty")]
    EmptyField {
        /// Name of the offending field (`name` or `version`).
        field: &'static str,
    },

    /// A tag string did not have the `<python>-<abi>-<platform>` form.
    #[error("invalid tag '{0}': expected <python>-<abi>-<platform>")]
    InvalidTag(String),

    /// The resolved tag triple is not consumable in this environment.
    #[error("tag '{triple}' is not in the supported tag set")]
    UnsupportedTag {
        /// The rejected triple, rendered as `python-abi-platform`.
        triple: String,
    },
}

/// Errors that arise while walking or copying a source tree.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source root of a copy phase does not exist.
    #[error("source directory not found: {0}")]
    MissingRoot(PathBuf),

    /// A path that must be a directory is something else.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A directory could not be enumerated.
    #[error("reading directory {path}: {source}")]
    ReadDir {
        /// Directory that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An entry's metadata could not be inspected (`lstat` failed).
    #[error("inspecting {path}: {source}")]
    Probe {
        /// Path that could not be inspected.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A symlink's target text could not be read.
    #[error("reading link target of {path}: {source}")]
    ReadLink {
        /// The symlink whose target could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A destination directory could not be created.
    #[error("creating directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A regular file could not be copied.
    #[error("copying {from} to {to}: {source}")]
    Copy {
        /// Source file.
        from: PathBuf,
        /// Destination file.
        to: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Permission bits or timestamps could not be carried over.
    #[error("preserving attributes of {path}: {source}")]
    Preserve {
        /// Destination file whose attributes could not be set.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An equivalent symlink could not be created at the destination.
    #[error("creating symlink {path} -> {target}: {source}")]
    CreateLink {
        /// The link path that could not be created.
        path: PathBuf,
        /// The raw target text.
        target: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A staged entry could not be removed again.
    #[error("removing {path}: {source}")]
    Remove {
        /// Path that could not be removed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from manifest and marker file handling.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// The manifest or a marker file could not be written.
    #[error("writing {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest could not be read back.
    #[error("reading {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A manifest row violates the delimited-text format.
    #[error("manifest line {line}: {message}")]
    Parse {
        /// 1-based line number of the offending row.
        line: usize,
        /// Description of the violation.
        message: String,
    },
}

/// Errors that arise while assembling the final archive.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// No `zip` executable is available on `PATH`.
    #[error("no 'zip' executable found on PATH")]
    ZipNotFound,

    /// The `zip` process could not be started.
    #[error("running zip: {0}")]
    Spawn(std::io::Error),

    /// The `zip` process exited unsuccessfully.
    #[error("zip exited with {code}: {stderr}")]
    Failed {
        /// Exit code reported by the process (`-1` when terminated by signal).
        code: i32,
        /// Captured standard error output.
        stderr: String,
    },

    /// The output directory for the archive could not be prepared.
    #[error("preparing {path}: {source}")]
    Prepare {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
