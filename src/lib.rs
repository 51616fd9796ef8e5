//! Symlink-preserving wheel builder engine.
//!
//! Builds wheel archives that carry symlinks as first-class payload. The
//! staging walk records every link it meets, the install simulation strips
//! the reproduced links back out of the staging tree, and the registry is
//! persisted as `symlinks.txt` inside the archive's `.dist-info` directory
//! so an installer can recreate the links on the target machine.
//!
//! The public API is organised into four layers:
//!
//! - **[`probe`]**, **[`registry`]**, **[`copier`]**: classify filesystem
//!   entries and run the partitioning walk over the source trees
//! - **[`manifest`]**, **[`tags`]**, **[`archive`]**: produce the wheel
//!   contents and the final archive
//! - **[`pipeline`]**: the ordered build phases and their shared context
//! - **[`commands`]**: top-level subcommand orchestration (`build`, `check`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod archive;
pub mod cli;
pub mod commands;
pub mod config;
pub mod copier;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod pipeline;
pub mod probe;
pub mod registry;
pub mod tags;
