//! Top-level subcommand orchestration.
pub mod build;
pub mod check;
pub mod version;

use anyhow::{Context as _, Result};

use crate::cli::{BuildOpts, CheckOpts, GlobalOpts};
use crate::config::{self, Config, Overrides};
use crate::logging::Logger;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution and configuration loading so that each
/// command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Canonical project root.
    pub root: std::path::PathBuf,
    /// Merged configuration.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the project root and load the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be determined or `axle.toml` is
    /// missing or invalid.
    pub fn init(global: &GlobalOpts, overrides: &Overrides, log: &Logger) -> Result<Self> {
        let root = config::resolve_root(global.root.as_deref())?;

        log.stage("Loading configuration");
        let config = Config::load(&root, overrides)
            .with_context(|| format!("loading {}", root.join(config::CONFIG_FILE).display()))?;

        log.info(&format!("{} {}", config.name, config.version));
        log.debug(&format!("root: {}", root.display()));
        log.debug(&format!("packages dir: {}", config.packages_dir.display()));
        log.debug(&format!(
            "{} namespace packages",
            config.namespace_packages.len()
        ));
        log.debug(&format!(
            "{} extra supported tags",
            config.extra_supported_tags.len()
        ));

        Ok(Self { root, config })
    }
}

/// Map build command flags onto configuration overrides.
#[must_use]
pub fn overrides_from_build(opts: &BuildOpts) -> Overrides {
    Overrides {
        root_is_pure: opts.root_is_pure,
        python_tag: opts.python_tag.clone(),
        abi_tag: opts.abi_tag.clone(),
        require_libpython: opts.require_libpython,
        build_dir: opts.build_dir.clone(),
        dist_dir: opts.dist_dir.clone(),
    }
}

/// Map check command flags onto configuration overrides.
#[must_use]
pub fn overrides_from_check(opts: &CheckOpts) -> Overrides {
    Overrides {
        root_is_pure: opts.root_is_pure,
        python_tag: opts.python_tag.clone(),
        abi_tag: opts.abi_tag.clone(),
        require_libpython: opts.require_libpython,
        build_dir: None,
        dist_dir: None,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn project() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            tmp.path().join(config::CONFIG_FILE),
            "[package]\nname = \"demo\"\nversion = \"1.0\"\n",
        )
        .expect("write axle.toml");
        tmp
    }

    #[test]
    fn init_loads_config_from_an_explicit_root() {
        let tmp = project();
        let global = GlobalOpts {
            root: Some(tmp.path().to_path_buf()),
        };
        let log = Logger::new();

        let setup = CommandSetup::init(&global, &Overrides::default(), &log).unwrap();

        assert_eq!(setup.config.name, "demo");
        assert_eq!(setup.root, dunce::canonicalize(tmp.path()).unwrap());
    }

    #[test]
    fn init_reports_the_config_path_on_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let global = GlobalOpts {
            root: Some(tmp.path().to_path_buf()),
        };
        let log = Logger::new();

        let err = CommandSetup::init(&global, &Overrides::default(), &log).unwrap_err();
        assert!(format!("{err:#}").contains("loading"));
    }

    #[test]
    fn build_flags_map_onto_overrides() {
        let opts = BuildOpts {
            root_is_pure: Some(false),
            python_tag: Some("cp311".to_string()),
            abi_tag: Some("abi3".to_string()),
            require_libpython: true,
            build_dir: Some(PathBuf::from("out")),
            dist_dir: Some(PathBuf::from("wheels")),
            dry_run: false,
        };

        let overrides = overrides_from_build(&opts);

        assert_eq!(overrides.root_is_pure, Some(false));
        assert_eq!(overrides.python_tag.as_deref(), Some("cp311"));
        assert_eq!(overrides.abi_tag.as_deref(), Some("abi3"));
        assert!(overrides.require_libpython);
        assert_eq!(overrides.build_dir, Some(PathBuf::from("out")));
        assert_eq!(overrides.dist_dir, Some(PathBuf::from("wheels")));
    }

    #[test]
    fn check_flags_never_touch_directories() {
        let opts = CheckOpts {
            root_is_pure: None,
            python_tag: Some("py3".to_string()),
            abi_tag: None,
            require_libpython: false,
        };

        let overrides = overrides_from_check(&opts);

        assert_eq!(overrides.python_tag.as_deref(), Some("py3"));
        assert_eq!(overrides.build_dir, None);
        assert_eq!(overrides.dist_dir, None);
    }
}
