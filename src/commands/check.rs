//! Command: validate configuration without building.
use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::archive::ZipCommandWriter;
use crate::cli::{CheckOpts, GlobalOpts};
use crate::logging::{Log, Logger};
use crate::pipeline::BuildContext;

/// Run the check command.
///
/// Resolves the root, loads the configuration, and resolves the tag triple
/// exactly as a build would, then reports the archive a build would
/// produce. Nothing is written.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the resolved tag
/// triple is unsupported.
pub fn run(global: &GlobalOpts, opts: &CheckOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, &super::overrides_from_check(opts), log)?;

    let ctx = BuildContext::new(
        setup.config,
        Arc::clone(log) as Arc<dyn Log>,
        true,
        Arc::new(ZipCommandWriter::new()),
    )?;

    log.info(&format!("tags: {}", ctx.tags));
    log.info(&format!("archive: {}", ctx.archive_path.display()));
    log.info("configuration ok");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn check_opts() -> CheckOpts {
        CheckOpts {
            root_is_pure: None,
            python_tag: None,
            abi_tag: None,
            require_libpython: false,
        }
    }

    #[test]
    fn valid_project_checks_clean() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            tmp.path().join(crate::config::CONFIG_FILE),
            "[package]\nname = \"demo\"\nversion = \"1.0\"\n",
        )
        .unwrap();
        let global = GlobalOpts {
            root: Some(tmp.path().to_path_buf()),
        };
        let log = Arc::new(Logger::new());

        run(&global, &check_opts(), &log).unwrap();
    }

    #[test]
    fn unsupported_triple_is_an_error() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        std::fs::write(
            tmp.path().join(crate::config::CONFIG_FILE),
            "[package]\nname = \"demo\"\nversion = \"1.0\"\n",
        )
        .unwrap();
        let global = GlobalOpts {
            root: Some(tmp.path().to_path_buf()),
        };
        let mut opts = check_opts();
        opts.python_tag = Some("jy27".to_string());
        let log = Arc::new(Logger::new());

        let err = run(&global, &opts, &log).unwrap_err();
        assert!(format!("{err:#}").contains("jy27-none-any"));
    }
}
