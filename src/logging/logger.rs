//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{Log, PhaseEntry, PhaseStatus};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// The `record_phase` method is **not** included because its signature differs
/// from the `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// All messages are always written to a persistent log file at
/// `$XDG_CACHE_HOME/axle/axle.log` (default `~/.cache/axle/axle.log`) with
/// timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    phases: Mutex<Vec<PhaseEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary.  The log file
    /// itself is created and initialised by [`init_subscriber`](super::subscriber::init_subscriber) via
    /// [`FileLayer`](super::subscriber::FileLayer); this constructor does not write to the file.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phases: Mutex::new(Vec::new()),
            log_file: log_file_path(),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded phase entries (test-only).
    #[cfg(test)]
    pub(crate) fn phase_entries(&self) -> Vec<PhaseEntry> {
        self.phases.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: "axle::stage", "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file via the [`FileLayer`](super::subscriber::FileLayer)).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: "axle::dry_run", "{msg}");
    }

    /// Record a phase result for the summary.
    pub fn record_phase(&self, name: &str, status: PhaseStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.phases.lock() {
            guard.push(PhaseEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed phases.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.phases.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|p| p.status == PhaseStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded phases.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let phases = match self.phases.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if phases.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");

        let mut ok = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for phase in &phases {
            let (icon, color) = match phase.status {
                PhaseStatus::Ok => {
                    ok += 1;
                    ("✓", "\x1b[32m")
                }
                PhaseStatus::Skipped => {
                    skipped += 1;
                    ("○", "\x1b[33m")
                }
                PhaseStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                PhaseStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = phase
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", phase.name));
        }

        println!();
        let total = ok + skipped + dry_run + failed;
        self.info(&format!(
            "{total} phases: \x1b[32m{ok} ok\x1b[0m, \x1b[33m{skipped} skipped\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record_phase(&self, name: &str, status: PhaseStatus, message: Option<&str>) {
        self.record_phase(name, status, message);
    }
}
