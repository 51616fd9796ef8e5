//! Command: build the wheel archive.
use std::sync::Arc;

use anyhow::Result;

use super::CommandSetup;
use crate::archive::ZipCommandWriter;
use crate::cli::{BuildOpts, GlobalOpts};
use crate::logging::{Log, Logger};
use crate::pipeline::{self, BuildContext};
use crate::registry::LinkRegistry;

/// Run the build command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the resolved tag
/// triple is unsupported, or any build phase fails.
pub fn run(global: &GlobalOpts, opts: &BuildOpts, log: &Arc<Logger>) -> Result<()> {
    let version = option_env!("AXLE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!("axle {version}"));

    let setup = CommandSetup::init(global, &super::overrides_from_build(opts), log)?;

    let ctx = BuildContext::new(
        setup.config,
        Arc::clone(log) as Arc<dyn Log>,
        opts.dry_run,
        Arc::new(ZipCommandWriter::new()),
    )?;
    log.info(&format!("building {}", ctx.archive_path.display()));

    let phases = pipeline::build_phases();
    let mut registry = LinkRegistry::new();
    pipeline::run_to_completion(&phases, &ctx, &mut registry, log)
}
