//! Ordered build phases that stage a payload and assemble its archive.

pub mod context;
pub mod phases;

pub use context::BuildContext;
pub use phases::build_phases;

use anyhow::{Context as _, Result};

use crate::logging::{Logger, PhaseStatus};
use crate::registry::LinkRegistry;

/// Result of a single phase execution.
#[derive(Debug, Clone)]
pub enum PhaseOutcome {
    /// Phase completed successfully.
    Ok,
    /// Phase was skipped (nothing to do).
    Skipped(String),
    /// Phase ran in dry-run mode.
    DryRun,
}

/// A named build phase.
///
/// Phases run strictly in the order returned by [`build_phases`]; each one
/// receives the shared [`BuildContext`] and the link registry accumulated by
/// the phases before it.
pub trait Phase: Send + Sync {
    /// Human-readable phase name.
    fn name(&self) -> &str;

    /// Whether this phase has work to do for the current project.
    fn should_run(&self, ctx: &BuildContext) -> bool;

    /// Execute the phase.
    ///
    /// # Errors
    ///
    /// Returns an error if the phase fails, such as when file operations are
    /// not permitted or the archive tool fails.
    fn run(&self, ctx: &BuildContext, registry: &mut LinkRegistry) -> Result<PhaseOutcome>;
}

/// Execute a phase, recording the result in the logger.
pub fn execute(phase: &dyn Phase, ctx: &BuildContext, registry: &mut LinkRegistry) -> PhaseStatus {
    if !phase.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping phase: {} (nothing to do)", phase.name()));
        ctx.log.record_phase(phase.name(), PhaseStatus::Skipped, None);
        return PhaseStatus::Skipped;
    }

    ctx.log.stage(phase.name());

    match phase.run(ctx, registry) {
        Ok(PhaseOutcome::Ok) => {
            ctx.log.record_phase(phase.name(), PhaseStatus::Ok, None);
            PhaseStatus::Ok
        }
        Ok(PhaseOutcome::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_phase(phase.name(), PhaseStatus::Skipped, Some(&reason));
            PhaseStatus::Skipped
        }
        Ok(PhaseOutcome::DryRun) => {
            ctx.log.record_phase(phase.name(), PhaseStatus::DryRun, None);
            PhaseStatus::DryRun
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", phase.name()));
            ctx.log
                .record_phase(phase.name(), PhaseStatus::Failed, Some(&format!("{e:#}")));
            PhaseStatus::Failed
        }
    }
}

/// Run all phases in order, stopping at the first failure.
///
/// The staging directory is reset before the first phase so every build
/// starts from a clean tree. A failed phase aborts the remainder of the
/// pipeline; the summary is printed either way.
///
/// # Errors
///
/// Returns an error when the staging directory cannot be reset or any phase
/// failed.
pub fn run_to_completion(
    phases: &[Box<dyn Phase>],
    ctx: &BuildContext,
    registry: &mut LinkRegistry,
    log: &Logger,
) -> Result<()> {
    reset_stage(ctx)?;

    for phase in phases {
        if execute(phase.as_ref(), ctx, registry) == PhaseStatus::Failed {
            break;
        }
    }

    log.print_summary();

    let failures = log.failure_count();
    if failures > 0 {
        anyhow::bail!("{failures} phase(s) failed");
    }
    Ok(())
}

/// Remove any previous staging tree and create a fresh one.
fn reset_stage(ctx: &BuildContext) -> Result<()> {
    ctx.log.stage("Preparing staging directory");
    if ctx.dry_run {
        ctx.log
            .dry_run(&format!("would reset {}", ctx.stage_root.display()));
        return Ok(());
    }
    if ctx.stage_root.exists() {
        std::fs::remove_dir_all(&ctx.stage_root)
            .with_context(|| format!("removing {}", ctx.stage_root.display()))?;
    }
    std::fs::create_dir_all(&ctx.stage_root)
        .with_context(|| format!("creating {}", ctx.stage_root.display()))?;
    ctx.log
        .debug(&format!("staging in {}", ctx.stage_root.display()));
    Ok(())
}
