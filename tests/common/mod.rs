// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed wheel project and a fluent builder
// so each integration test can set up an isolated source tree without
// repeating filesystem boilerplate, plus an archive writer that records
// assembly requests instead of shelling out to `zip`.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use axle_cli::archive::ArchiveWriter;
use axle_cli::config::{CONFIG_FILE, Config, Overrides};
use axle_cli::error::ArchiveError;
use axle_cli::logging::{Log, Logger};
use axle_cli::pipeline::{self, BuildContext};
use axle_cli::registry::LinkRegistry;

/// An isolated wheel project backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped (via the underlying
/// [`tempfile::TempDir`]).
pub struct TestProject {
    /// Temporary directory containing the project root.
    pub root: tempfile::TempDir,
}

impl TestProject {
    /// Path to the project root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Load the merged configuration for this project.
    pub fn load_config(&self, overrides: &Overrides) -> Config {
        Config::load(self.root.path(), overrides).expect("load config")
    }
}

/// Fluent builder for [`TestProject`].
///
/// Starts from a minimal but valid `axle.toml` and lets individual tests
/// lay out source files, data files, and symlinks before building.
pub struct TestProjectBuilder {
    project: TestProject,
}

impl TestProjectBuilder {
    /// Begin building a project named `demo` at version `1.0`.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            root.path().join(CONFIG_FILE),
            "[package]\nname = \"demo\"\nversion = \"1.0\"\n",
        )
        .expect("write axle.toml");
        Self {
            project: TestProject { root },
        }
    }

    /// Replace `axle.toml` wholesale with `content`.
    pub fn with_manifest(self, content: &str) -> Self {
        std::fs::write(self.project.root.path().join(CONFIG_FILE), content)
            .expect("write axle.toml");
        self
    }

    /// Create a file at `rel` (relative to the project root) with `content`,
    /// creating parent directories as needed.
    pub fn with_file(self, rel: &str, content: &str) -> Self {
        let path = self.project.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, content).expect("write file");
        self
    }

    /// Create an empty directory at `rel` (relative to the project root).
    pub fn with_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.project.root.path().join(rel)).expect("create dir");
        self
    }

    /// Create a symlink at `rel` (relative to the project root) pointing at
    /// `target`, creating parent directories as needed. The target is taken
    /// verbatim; it may be relative or dangling.
    #[cfg(unix)]
    pub fn with_link(self, rel: &str, target: &str) -> Self {
        let path = self.project.root.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::os::unix::fs::symlink(target, &path).expect("create symlink");
        self
    }

    /// Finish building and return the configured project.
    pub fn build(self) -> TestProject {
        self.project
    }
}

/// [`ArchiveWriter`] that records assembly requests instead of packing.
#[derive(Debug, Default)]
pub struct RecordingArchiveWriter {
    /// Stage root and archive path from each `assemble` call, in order.
    pub calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl RecordingArchiveWriter {
    /// Return a copy of the recorded calls.
    pub fn recorded(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().expect("lock calls").clone()
    }
}

impl ArchiveWriter for RecordingArchiveWriter {
    fn assemble(&self, stage_root: &Path, archive_path: &Path) -> Result<(), ArchiveError> {
        self.calls
            .lock()
            .expect("lock calls")
            .push((stage_root.to_path_buf(), archive_path.to_path_buf()));
        Ok(())
    }
}

/// Everything a test needs to inspect after a pipeline run.
pub struct BuildRun {
    /// Final result of the run.
    pub result: anyhow::Result<()>,
    /// The recording writer handed to the pipeline.
    pub writer: Arc<RecordingArchiveWriter>,
    /// The logger that collected phase results.
    pub log: Arc<Logger>,
}

/// Run the full build pipeline over `project` with a recording writer.
pub fn run_build(project: &TestProject, overrides: &Overrides, dry_run: bool) -> BuildRun {
    let writer = Arc::new(RecordingArchiveWriter::default());
    let log = Arc::new(Logger::new());

    let result = (|| {
        let config = Config::load(project.root_path(), overrides)?;
        let ctx = BuildContext::new(
            config,
            Arc::clone(&log) as Arc<dyn Log>,
            dry_run,
            Arc::clone(&writer) as Arc<dyn ArchiveWriter>,
        )?;
        let phases = pipeline::build_phases();
        let mut registry = LinkRegistry::new();
        pipeline::run_to_completion(&phases, &ctx, &mut registry, &log)
    })();

    BuildRun {
        result,
        writer,
        log,
    }
}
