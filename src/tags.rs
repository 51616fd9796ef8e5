//! Compatibility tag resolution for archive naming.
//!
//! Archive file names carry a `python-abi-platform` triple. The starting
//! triple is derived from payload purity: a pure payload is `py3-none-any`,
//! a platform-dependent one substitutes the host platform tag. Explicit
//! overrides then replace individual components, and the final triple must
//! be a member of the supported set or resolution fails. Resolution happens
//! before any filesystem mutation, so a bad override aborts a build without
//! leaving anything behind.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A `python-abi-platform` compatibility triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagTriple {
    /// Python implementation tag, e.g. `py3`.
    pub python: String,
    /// ABI tag, e.g. `none`.
    pub abi: String,
    /// Platform tag, e.g. `linux_x86_64`, or `any` for pure payloads.
    pub platform: String,
}

impl TagTriple {
    /// Build a triple from its components.
    #[must_use]
    pub fn new(
        python: impl Into<String>,
        abi: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            python: python.into(),
            abi: abi.into(),
            platform: platform.into(),
        }
    }
}

impl fmt::Display for TagTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.python, self.abi, self.platform)
    }
}

impl FromStr for TagTriple {
    type Err = ConfigError;

    /// Parse a `python-abi-platform` string. Components must be non-empty
    /// and may not themselves contain `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('-');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(python), Some(abi), Some(platform), None)
                if !python.is_empty() && !abi.is_empty() && !platform.is_empty() =>
            {
                Ok(Self::new(python, abi, platform))
            }
            _ => Err(ConfigError::InvalidTag(s.to_string())),
        }
    }
}

/// Source of platform knowledge for tag resolution.
///
/// Production code uses [`HostEnvironment`]; tests substitute fixed
/// environments so assertions do not depend on the machine running them.
pub trait TagEnvironment {
    /// Platform tag for payloads built on this environment.
    fn platform_tag(&self) -> String;

    /// Every triple this environment accepts.
    fn supported_tags(&self) -> Vec<TagTriple>;
}

/// The build host, optionally extended with configured extra triples.
///
/// The base supported set is `py3-none-any` plus `py3-none-<platform>`;
/// entries from the `[tags]` table widen it for callers that target other
/// interpreters or ABIs.
#[derive(Debug, Default)]
pub struct HostEnvironment {
    extra: Vec<TagTriple>,
}

impl HostEnvironment {
    /// Environment with the base supported set only.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the supported set with triples parsed from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTag`] when an entry is not a
    /// `python-abi-platform` string.
    pub fn with_extra(entries: &[String]) -> Result<Self, ConfigError> {
        let extra = entries
            .iter()
            .map(|entry| entry.parse())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { extra })
    }
}

impl TagEnvironment for HostEnvironment {
    fn platform_tag(&self) -> String {
        host_platform_tag().to_string()
    }

    fn supported_tags(&self) -> Vec<TagTriple> {
        let mut tags = vec![
            TagTriple::new("py3", "none", "any"),
            TagTriple::new("py3", "none", host_platform_tag()),
        ];
        tags.extend(self.extra.iter().cloned());
        tags
    }
}

/// Platform tag for the compilation target.
fn host_platform_tag() -> &'static str {
    if cfg!(all(target_os = "linux", target_arch = "x86_64")) {
        "linux_x86_64"
    } else if cfg!(all(target_os = "linux", target_arch = "aarch64")) {
        "linux_aarch64"
    } else if cfg!(all(target_os = "macos", target_arch = "aarch64")) {
        "macosx_11_0_arm64"
    } else if cfg!(all(target_os = "macos", target_arch = "x86_64")) {
        "macosx_10_9_x86_64"
    } else if cfg!(all(target_os = "windows", target_arch = "x86_64")) {
        "win_amd64"
    } else if cfg!(target_os = "windows") {
        "win32"
    } else {
        "any"
    }
}

/// The inputs that determine a resolved triple.
#[derive(Debug, Clone, Default)]
pub struct TagRequest {
    /// Explicit python tag, replacing the `py3` default.
    pub python_tag: Option<String>,
    /// Explicit ABI tag, replacing the `none` default.
    pub abi_tag: Option<String>,
    /// Explicit purity declaration. `None` derives purity automatically.
    pub root_is_pure: Option<bool>,
    /// Whether the payload needs a libpython shared library at runtime.
    /// Implies an impure payload unless purity is explicitly declared.
    pub require_libpython: bool,
}

/// Resolve the final tag triple for an archive.
///
/// Purity defaults to "pure unless libpython is required". A pure payload
/// starts from `py3-none-any`, an impure one from `py3-none-<platform>`.
/// Overrides then replace the python and ABI components, and the result is
/// checked against the environment's supported set.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedTag`] when the resolved triple is not
/// supported by `env`.
pub fn resolve(request: &TagRequest, env: &dyn TagEnvironment) -> Result<TagTriple, ConfigError> {
    let pure = request.root_is_pure.unwrap_or(!request.require_libpython);
    let platform = if pure {
        "any".to_string()
    } else {
        env.platform_tag()
    };

    let mut triple = TagTriple::new("py3", "none", platform);
    if let Some(python) = &request.python_tag {
        triple.python.clone_from(python);
    }
    if let Some(abi) = &request.abi_tag {
        triple.abi.clone_from(abi);
    }

    if env.supported_tags().contains(&triple) {
        Ok(triple)
    } else {
        Err(ConfigError::UnsupportedTag {
            triple: triple.to_string(),
        })
    }
}
