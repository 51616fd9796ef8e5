//! The ordered phases of an archive build.
use std::fs;

use anyhow::{Context as _, Result};

use super::context::BuildContext;
use super::{Phase, PhaseOutcome};
use crate::copier::{self, CopyMode, CopyPlan, TreeCopier};
use crate::manifest;
use crate::probe::{self, Entry};
use crate::registry::{LinkRecord, LinkRegistry};

/// The complete ordered set of build phases.
///
/// Copy phases run first so every symlink in the payload is registered,
/// installation simulation strips links and namespace stubs from the staged
/// tree, and the manifest is finalized before the archive is assembled.
#[must_use]
pub fn build_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(CopySources),
        Box::new(CopyData),
        Box::new(CopyHeaders),
        Box::new(CopyScripts),
        Box::new(InstallSimulate),
        Box::new(FinalizeManifest),
        Box::new(AssembleArchive),
    ]
}

/// Run a prepared copier against one source tree and fold the outcome into
/// the registry.
fn copy_into(
    ctx: &BuildContext,
    registry: &mut LinkRegistry,
    copier: &TreeCopier,
    plan: &CopyPlan,
) -> Result<PhaseOutcome> {
    let outcome = copier
        .copy(plan)
        .with_context(|| format!("copying {}", plan.source_root.display()))?;

    let verb = if ctx.dry_run { "would copy" } else { "copied" };
    ctx.log.info(&format!(
        "{verb} {} files, registered {} links",
        outcome.copied.len(),
        outcome.links.len()
    ));
    registry.extend(outcome.links);

    if ctx.dry_run {
        Ok(PhaseOutcome::DryRun)
    } else {
        Ok(PhaseOutcome::Ok)
    }
}

/// Copies package sources into the payload root, reproducing symlinks so the
/// installation simulation sees a structurally complete tree.
#[derive(Debug, Clone, Copy)]
pub struct CopySources;

impl Phase for CopySources {
    fn name(&self) -> &str {
        "Copy package sources"
    }

    fn should_run(&self, ctx: &BuildContext) -> bool {
        ctx.config.packages_dir.exists()
    }

    fn run(&self, ctx: &BuildContext, registry: &mut LinkRegistry) -> Result<PhaseOutcome> {
        let excluded = ctx.config.excluded_payload_paths();
        let copier = TreeCopier::new()
            .with_dry_run(ctx.dry_run)
            .with_exclusion(move |path| excluded.iter().any(|stub| stub == path));
        let plan = CopyPlan {
            source_root: ctx.config.packages_dir.clone(),
            destination_root: ctx.stage_root.clone(),
            mode: CopyMode::RegisterAndReproduce,
        };
        copy_into(ctx, registry, &copier, &plan)
    }
}

/// Copies data files into the payload root. Symlinks are registered but not
/// reproduced.
#[derive(Debug, Clone, Copy)]
pub struct CopyData;

impl Phase for CopyData {
    fn name(&self) -> &str {
        "Copy data files"
    }

    fn should_run(&self, ctx: &BuildContext) -> bool {
        ctx.config.data_dir.exists()
    }

    fn run(&self, ctx: &BuildContext, registry: &mut LinkRegistry) -> Result<PhaseOutcome> {
        let copier = TreeCopier::new().with_dry_run(ctx.dry_run);
        let plan = CopyPlan {
            source_root: ctx.config.data_dir.clone(),
            destination_root: ctx.stage_root.clone(),
            mode: CopyMode::RegisterOnly,
        };
        copy_into(ctx, registry, &copier, &plan)
    }
}

/// Copies header files under `headers/` in the staged payload.
#[derive(Debug, Clone, Copy)]
pub struct CopyHeaders;

impl Phase for CopyHeaders {
    fn name(&self) -> &str {
        "Copy headers"
    }

    fn should_run(&self, ctx: &BuildContext) -> bool {
        ctx.config.headers_dir.exists()
    }

    fn run(&self, ctx: &BuildContext, registry: &mut LinkRegistry) -> Result<PhaseOutcome> {
        let copier = TreeCopier::new().with_dry_run(ctx.dry_run);
        let plan = CopyPlan {
            source_root: ctx.config.headers_dir.clone(),
            destination_root: ctx.stage_root.join("headers"),
            mode: CopyMode::RegisterOnly,
        };
        copy_into(ctx, registry, &copier, &plan)
    }
}

/// Copies scripts under `scripts/` in the staged payload.
#[derive(Debug, Clone, Copy)]
pub struct CopyScripts;

impl Phase for CopyScripts {
    fn name(&self) -> &str {
        "Copy scripts"
    }

    fn should_run(&self, ctx: &BuildContext) -> bool {
        ctx.config.scripts_dir.exists()
    }

    fn run(&self, ctx: &BuildContext, registry: &mut LinkRegistry) -> Result<PhaseOutcome> {
        let copier = TreeCopier::new().with_dry_run(ctx.dry_run);
        let plan = CopyPlan {
            source_root: ctx.config.scripts_dir.clone(),
            destination_root: ctx.stage_root.join("scripts"),
            mode: CopyMode::RegisterOnly,
        };
        copy_into(ctx, registry, &copier, &plan)
    }
}

/// Re-walks the staged payload the way an unpacking installer would:
/// deduplicates link registrations, strips link artifacts from the tree,
/// and prunes namespace package stubs from both tree and registry.
#[derive(Debug, Clone, Copy)]
pub struct InstallSimulate;

impl Phase for InstallSimulate {
    fn name(&self) -> &str {
        "Simulate installation"
    }

    fn should_run(&self, _ctx: &BuildContext) -> bool {
        true
    }

    fn run(&self, ctx: &BuildContext, registry: &mut LinkRegistry) -> Result<PhaseOutcome> {
        let stubs = ctx.config.excluded_payload_paths();
        if registry.is_empty() && stubs.is_empty() {
            return Ok(PhaseOutcome::Skipped(
                "no links registered and no namespace packages configured".to_string(),
            ));
        }

        // Exclusion wins over registration.
        for stub in &stubs {
            let staged = ctx.stage_root.join(stub);
            if registry.remove(&staged).is_some() {
                ctx.log.debug(&format!(
                    "unregistered namespace stub link {}",
                    staged.display()
                ));
            }
        }

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would strip {} links and any namespace stubs from the staged tree",
                registry.len()
            ));
            return Ok(PhaseOutcome::DryRun);
        }

        let mut pruned = 0u32;
        for stub in &stubs {
            let staged = ctx.stage_root.join(stub);
            let Ok(meta) = staged.symlink_metadata() else {
                continue;
            };
            if meta.is_symlink() {
                copier::remove_link(&staged)?;
            } else if meta.is_file() {
                fs::remove_file(&staged)
                    .with_context(|| format!("removing {}", staged.display()))?;
            } else {
                continue;
            }
            pruned += 1;
        }

        let mut stripped = 0u32;
        let mut stack = vec![ctx.stage_root.clone()];
        while let Some(dir) = stack.pop() {
            let entries = fs::read_dir(&dir)
                .with_context(|| format!("reading {}", dir.display()))?;
            for entry in entries {
                let path = entry
                    .with_context(|| format!("reading {}", dir.display()))?
                    .path();
                match probe::probe(&path)? {
                    Entry::Symlink(link) => {
                        // A record made at copy time probed the source tree,
                        // where relative targets actually resolve; keep it.
                        if !registry.contains(&path) {
                            registry.add(LinkRecord::new(&path, link.target, link.target_is_dir));
                        }
                        copier::remove_link(&path)?;
                        stripped += 1;
                    }
                    Entry::Dir => stack.push(path),
                    Entry::File => {}
                }
            }
        }

        ctx.log.info(&format!(
            "stripped {stripped} links, pruned {pruned} namespace stubs"
        ));
        Ok(PhaseOutcome::Ok)
    }
}

/// Relativizes the registry against the stage root and writes the symlink
/// manifest and marker files into the metadata directory.
#[derive(Debug, Clone, Copy)]
pub struct FinalizeManifest;

impl Phase for FinalizeManifest {
    fn name(&self) -> &str {
        "Write symlink manifest"
    }

    fn should_run(&self, _ctx: &BuildContext) -> bool {
        true
    }

    fn run(&self, ctx: &BuildContext, registry: &mut LinkRegistry) -> Result<PhaseOutcome> {
        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would write {} with {} rows to {}",
                manifest::SYMLINKS_FILE,
                registry.len(),
                ctx.dist_info_dir.display()
            ));
            return Ok(PhaseOutcome::DryRun);
        }

        registry.relativize(&ctx.stage_root);
        manifest::write_manifest(registry, &ctx.dist_info_dir, ctx.config.require_libpython)?;
        ctx.log.info(&format!(
            "{} rows in {}",
            registry.len(),
            manifest::SYMLINKS_FILE
        ));
        Ok(PhaseOutcome::Ok)
    }
}

/// Hands the staged tree to the archive backend.
#[derive(Debug, Clone, Copy)]
pub struct AssembleArchive;

impl Phase for AssembleArchive {
    fn name(&self) -> &str {
        "Assemble archive"
    }

    fn should_run(&self, _ctx: &BuildContext) -> bool {
        true
    }

    fn run(&self, ctx: &BuildContext, _registry: &mut LinkRegistry) -> Result<PhaseOutcome> {
        if ctx.dry_run {
            ctx.log
                .dry_run(&format!("would assemble {}", ctx.archive_path.display()));
            return Ok(PhaseOutcome::DryRun);
        }

        ctx.archive_writer
            .assemble(&ctx.stage_root, &ctx.archive_path)
            .with_context(|| format!("assembling {}", ctx.archive_path.display()))?;
        ctx.log.info(&format!("wrote {}", ctx.archive_path.display()));
        Ok(PhaseOutcome::Ok)
    }
}
