//! On-disk `axle.toml` model.
//!
//! Keys are kebab-case. Only `[package] name` and `version` are required;
//! every other table falls back to its defaults, so a two-line file is a
//! valid project.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration file name expected at the project root.
pub const CONFIG_FILE: &str = "axle.toml";

/// Top-level structure of `axle.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AxleFile {
    /// Required package identity.
    pub package: PackageSection,
    /// Source layout.
    #[serde(default)]
    pub layout: LayoutSection,
    /// Build behavior defaults.
    #[serde(default)]
    pub build: BuildSection,
    /// Tag acceptance policy.
    #[serde(default)]
    pub tags: TagsSection,
}

/// The `[package]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PackageSection {
    /// Distribution name. Dashes are normalized to underscores in artifact
    /// names.
    pub name: String,
    /// Version string, used verbatim in artifact names.
    pub version: String,
}

/// The `[layout]` table: where payload content comes from, relative to the
/// project root unless absolute.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct LayoutSection {
    /// Package sources, copied into the payload root with links reproduced.
    pub packages: String,
    /// Data files, copied into the payload root with links registered only.
    pub data: String,
    /// Header files, copied under `headers/`.
    pub headers: String,
    /// Scripts, copied under `scripts/`.
    pub scripts: String,
    /// Dotted names of namespace packages whose `__init__.py` stubs are
    /// stripped from the payload.
    pub namespace_packages: Vec<String>,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            packages: "src".to_string(),
            data: "data".to_string(),
            headers: "headers".to_string(),
            scripts: "scripts".to_string(),
            namespace_packages: Vec::new(),
        }
    }
}

/// The `[build]` table. Command line flags override these values.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BuildSection {
    /// Explicit purity declaration. Unset derives purity automatically.
    pub root_is_pure: Option<bool>,
    /// Default python tag override.
    pub python_tag: Option<String>,
    /// Default ABI tag override.
    pub abi_tag: Option<String>,
    /// Declare a hard libpython dependency.
    pub require_libpython: bool,
    /// Staging area, relative to the project root unless absolute.
    pub build_dir: String,
    /// Archive output directory, relative to the project root unless
    /// absolute.
    pub dist_dir: String,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            root_is_pure: None,
            python_tag: None,
            abi_tag: None,
            require_libpython: false,
            build_dir: "build".to_string(),
            dist_dir: "dist".to_string(),
        }
    }
}

/// The `[tags]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TagsSection {
    /// Additional `python-abi-platform` triples accepted by tag validation.
    pub extra_supported: Vec<String>,
}

impl AxleFile {
    /// Load and validate the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] when the file does not exist,
    /// [`ConfigError::Io`] for other read failures, [`ConfigError::Parse`]
    /// for TOML errors, and [`ConfigError::EmptyField`] when the package
    /// name or version is blank.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let file: Self = toml::from_str(&raw).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        if file.package.name.trim().is_empty() {
            return Err(ConfigError::EmptyField { field: "name" });
        }
        if file.package.version.trim().is_empty() {
            return Err(ConfigError::EmptyField { field: "version" });
        }
        Ok(file)
    }
}
