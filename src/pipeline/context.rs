//! Shared state for a single archive build.
use std::path::PathBuf;
use std::sync::Arc;

use crate::archive::ArchiveWriter;
use crate::config::Config;
use crate::error::AxleError;
use crate::logging::Log;
use crate::tags::{self, HostEnvironment, TagRequest, TagTriple};

/// Shared context for build phase execution.
pub struct BuildContext {
    /// Resolved project configuration.
    pub config: Config,
    /// Validated tag triple named in the archive file.
    pub tags: TagTriple,
    /// Directory the payload is staged in.
    pub stage_root: PathBuf,
    /// Metadata directory inside the staged payload.
    pub dist_info_dir: PathBuf,
    /// Final archive path.
    pub archive_path: PathBuf,
    /// Logger for output and phase recording.
    pub log: Arc<dyn Log>,
    /// Whether to preview actions without applying them.
    pub dry_run: bool,
    /// Archive backend used by the assembly phase.
    pub archive_writer: Arc<dyn ArchiveWriter>,
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("config", &self.config)
            .field("tags", &self.tags)
            .field("stage_root", &self.stage_root)
            .field("dist_info_dir", &self.dist_info_dir)
            .field("archive_path", &self.archive_path)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("archive_writer", &"<dyn ArchiveWriter>")
            .finish()
    }
}

impl BuildContext {
    /// Resolve the tag triple and derive all output paths.
    ///
    /// Tag validation happens here, before any phase runs, so an unsupported
    /// triple aborts the build without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns [`AxleError::Config`] when the extra supported tags are
    /// malformed or the requested triple is not in the supported set.
    pub fn new(
        config: Config,
        log: Arc<dyn Log>,
        dry_run: bool,
        archive_writer: Arc<dyn ArchiveWriter>,
    ) -> Result<Self, AxleError> {
        let env = HostEnvironment::with_extra(&config.extra_supported_tags)?;
        let request = TagRequest {
            python_tag: config.python_tag.clone(),
            abi_tag: config.abi_tag.clone(),
            root_is_pure: config.root_is_pure,
            require_libpython: config.require_libpython,
        };
        let tags = tags::resolve(&request, &env)?;

        let stage_root = config.stage_root();
        let dist_info_dir = stage_root.join(config.dist_info_dir_name());
        let archive_path = config.dist_dir.join(config.archive_file_name(&tags));

        Ok(Self {
            config,
            tags,
            stage_root,
            dist_info_dir,
            archive_path,
            log,
            dry_run,
            archive_writer,
        })
    }
}
