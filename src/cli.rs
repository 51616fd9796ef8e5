//! Command line argument definitions.
use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the axle wheel builder.
#[derive(Parser, Debug)]
#[command(name = "axle", about = "Symlink-preserving wheel builder", version)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared across subcommands.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the project root directory
    #[arg(short, long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Stage the payload and assemble the archive
    Build(BuildOpts),
    /// Validate configuration and resolve tags without building
    Check(CheckOpts),
    /// Print version information
    Version,
}

/// Options for the `build` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct BuildOpts {
    /// Declare the payload pure or platform-specific
    #[arg(long, value_name = "BOOL")]
    pub root_is_pure: Option<bool>,

    /// Override the python tag
    #[arg(long, value_name = "TAG")]
    pub python_tag: Option<String>,

    /// Override the ABI tag
    #[arg(long, value_name = "TAG")]
    pub abi_tag: Option<String>,

    /// Declare a hard libpython dependency
    #[arg(long)]
    pub require_libpython: bool,

    /// Override the staging directory
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<std::path::PathBuf>,

    /// Override the archive output directory
    #[arg(long, value_name = "DIR")]
    pub dist_dir: Option<std::path::PathBuf>,

    /// Log the build plan without touching the filesystem
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

/// Options for the `check` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CheckOpts {
    /// Declare the payload pure or platform-specific
    #[arg(long, value_name = "BOOL")]
    pub root_is_pure: Option<bool>,

    /// Override the python tag
    #[arg(long, value_name = "TAG")]
    pub python_tag: Option<String>,

    /// Override the ABI tag
    #[arg(long, value_name = "TAG")]
    pub abi_tag: Option<String>,

    /// Declare a hard libpython dependency
    #[arg(long)]
    pub require_libpython: bool,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_build() {
        let cli = Cli::parse_from(["axle", "build"]);
        assert!(matches!(cli.command, Command::Build(_)));
    }

    #[test]
    fn parse_build_dry_run() {
        let cli = Cli::parse_from(["axle", "build", "--dry-run"]);
        let Command::Build(opts) = cli.command else {
            panic!("expected build command");
        };
        assert!(opts.dry_run);
    }

    #[test]
    fn parse_build_dry_run_short() {
        let cli = Cli::parse_from(["axle", "build", "-d"]);
        let Command::Build(opts) = cli.command else {
            panic!("expected build command");
        };
        assert!(opts.dry_run);
    }

    #[test]
    fn parse_build_tag_overrides() {
        let cli = Cli::parse_from([
            "axle",
            "build",
            "--python-tag",
            "cp311",
            "--abi-tag",
            "abi3",
        ]);
        let Command::Build(opts) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(opts.python_tag.as_deref(), Some("cp311"));
        assert_eq!(opts.abi_tag.as_deref(), Some("abi3"));
    }

    #[test]
    fn parse_build_root_is_pure_takes_a_value() {
        let cli = Cli::parse_from(["axle", "build", "--root-is-pure", "false"]);
        let Command::Build(opts) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(opts.root_is_pure, Some(false));
    }

    #[test]
    fn parse_build_directories() {
        let cli = Cli::parse_from(["axle", "build", "--build-dir", "out", "--dist-dir", "wheels"]);
        let Command::Build(opts) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(opts.build_dir, Some(std::path::PathBuf::from("out")));
        assert_eq!(opts.dist_dir, Some(std::path::PathBuf::from("wheels")));
    }

    #[test]
    fn parse_build_require_libpython() {
        let cli = Cli::parse_from(["axle", "build", "--require-libpython"]);
        let Command::Build(opts) = cli.command else {
            panic!("expected build command");
        };
        assert!(opts.require_libpython);
    }

    #[test]
    fn parse_root_override_before_subcommand() {
        let cli = Cli::parse_from(["axle", "--root", "/tmp/proj", "build"]);
        assert_eq!(cli.global.root, Some(std::path::PathBuf::from("/tmp/proj")));
    }

    #[test]
    fn parse_root_override_short_after_subcommand() {
        let cli = Cli::parse_from(["axle", "check", "-r", "/tmp/proj"]);
        assert_eq!(cli.global.root, Some(std::path::PathBuf::from("/tmp/proj")));
    }

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["axle", "check", "--python-tag", "py3"]);
        let Command::Check(opts) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(opts.python_tag.as_deref(), Some("py3"));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["axle", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["axle", "-v", "build"]);
        assert!(cli.verbose);
    }
}
