//! Command: print version information.

/// Print the version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("AXLE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("axle {version}");
}
