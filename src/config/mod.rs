//! Project configuration.
//!
//! [`Config`] merges `axle.toml` with command line overrides into one
//! resolved view. All directories are absolute after loading, anchored at
//! the project root unless the file gave an absolute path.

pub mod file;

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::tags::TagTriple;

pub use file::CONFIG_FILE;

/// Environment variable consulted when no explicit root is given.
pub const ROOT_ENV_VAR: &str = "AXLE_ROOT";

/// Command line values that take precedence over `axle.toml`.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Purity override.
    pub root_is_pure: Option<bool>,
    /// Python tag override.
    pub python_tag: Option<String>,
    /// ABI tag override.
    pub abi_tag: Option<String>,
    /// Force the libpython marker even when the file does not set it.
    pub require_libpython: bool,
    /// Staging directory override.
    pub build_dir: Option<PathBuf>,
    /// Archive output directory override.
    pub dist_dir: Option<PathBuf>,
}

/// Resolved project configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root directory.
    pub root: PathBuf,
    /// Distribution name as written in `axle.toml`.
    pub name: String,
    /// Version string.
    pub version: String,
    /// Package sources directory.
    pub packages_dir: PathBuf,
    /// Data files directory.
    pub data_dir: PathBuf,
    /// Header files directory.
    pub headers_dir: PathBuf,
    /// Scripts directory.
    pub scripts_dir: PathBuf,
    /// Dotted names of namespace packages.
    pub namespace_packages: Vec<String>,
    /// Explicit purity declaration, if any.
    pub root_is_pure: Option<bool>,
    /// Python tag override, if any.
    pub python_tag: Option<String>,
    /// ABI tag override, if any.
    pub abi_tag: Option<String>,
    /// Whether the archive declares a libpython dependency.
    pub require_libpython: bool,
    /// Staging directory.
    pub build_dir: PathBuf,
    /// Archive output directory.
    pub dist_dir: PathBuf,
    /// Extra tag triples accepted during validation.
    pub extra_supported_tags: Vec<String>,
}

impl Config {
    /// Load `axle.toml` from `root` and merge `overrides` on top.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is missing, unreadable, or
    /// invalid.
    pub fn load(root: &Path, overrides: &Overrides) -> Result<Self, ConfigError> {
        let parsed = file::AxleFile::load(&root.join(CONFIG_FILE))?;

        let build_dir = match &overrides.build_dir {
            Some(dir) => anchor(root, dir),
            None => anchor(root, Path::new(&parsed.build.build_dir)),
        };
        let dist_dir = match &overrides.dist_dir {
            Some(dir) => anchor(root, dir),
            None => anchor(root, Path::new(&parsed.build.dist_dir)),
        };

        Ok(Self {
            root: root.to_path_buf(),
            name: parsed.package.name,
            version: parsed.package.version,
            packages_dir: anchor(root, Path::new(&parsed.layout.packages)),
            data_dir: anchor(root, Path::new(&parsed.layout.data)),
            headers_dir: anchor(root, Path::new(&parsed.layout.headers)),
            scripts_dir: anchor(root, Path::new(&parsed.layout.scripts)),
            namespace_packages: parsed.layout.namespace_packages,
            root_is_pure: overrides.root_is_pure.or(parsed.build.root_is_pure),
            python_tag: overrides.python_tag.clone().or(parsed.build.python_tag),
            abi_tag: overrides.abi_tag.clone().or(parsed.build.abi_tag),
            require_libpython: overrides.require_libpython || parsed.build.require_libpython,
            build_dir,
            dist_dir,
            extra_supported_tags: parsed.tags.extra_supported,
        })
    }

    /// Distribution name with dashes normalized to underscores.
    #[must_use]
    pub fn dist_name(&self) -> String {
        self.name.replace('-', "_")
    }

    /// Name of the metadata directory inside the staged payload.
    #[must_use]
    pub fn dist_info_dir_name(&self) -> String {
        format!("{}-{}.dist-info", self.dist_name(), self.version)
    }

    /// Archive file name for the resolved tag triple.
    #[must_use]
    pub fn archive_file_name(&self, tags: &TagTriple) -> String {
        format!("{}-{}-{tags}.whl", self.dist_name(), self.version)
    }

    /// Directory the payload is staged in before archiving.
    #[must_use]
    pub fn stage_root(&self) -> PathBuf {
        self.build_dir.join("stage")
    }

    /// Payload-relative paths of namespace package stubs, excluded from the
    /// copy and stripped during installation simulation.
    #[must_use]
    pub fn excluded_payload_paths(&self) -> Vec<PathBuf> {
        self.namespace_packages
            .iter()
            .map(|name| Path::new(&name.replace('.', "/")).join("__init__.py"))
            .collect()
    }
}

/// Resolve the project root directory.
///
/// Precedence: the explicit path, the `AXLE_ROOT` environment variable,
/// then the current directory when it contains `axle.toml`. The result is
/// canonicalized.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when a candidate cannot be canonicalized and
/// [`ConfigError::NotFound`] when no candidate yields a project.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(root) = explicit {
        return canonical(root);
    }
    if let Some(root) = std::env::var_os(ROOT_ENV_VAR)
        && !root.is_empty()
    {
        return canonical(Path::new(&root));
    }
    let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    if cwd.join(CONFIG_FILE).exists() {
        return canonical(&cwd);
    }
    Err(ConfigError::NotFound(cwd.join(CONFIG_FILE)))
}

fn canonical(path: &Path) -> Result<PathBuf, ConfigError> {
    dunce::canonicalize(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn anchor(root: &Path, value: &Path) -> PathBuf {
    if value.is_absolute() {
        value.to_path_buf()
    } else {
        root.join(value)
    }
}
