//! Core logging types: phase entries, status, and the [`Log`] trait.

/// Phase execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct PhaseEntry {
    /// Human-readable phase name.
    pub name: String,
    /// Final status of the phase.
    pub status: PhaseStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseStatus {
    /// Phase completed successfully.
    Ok,
    /// Phase was skipped (e.g., source directory absent, nothing to do).
    Skipped,
    /// Phase ran in dry-run mode; no changes were applied.
    DryRun,
    /// Phase encountered an error and could not complete.
    Failed,
}

/// Abstraction over logging backends.
///
/// [`Logger`](super::logger::Logger) implements this trait for production
/// output; tests substitute their own recorders so phase code can log
/// without knowing where output lands.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a phase result for the summary.
    fn record_phase(&self, name: &str, status: PhaseStatus, message: Option<&str>);
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn phase_status_equality() {
        assert_eq!(PhaseStatus::Ok, PhaseStatus::Ok);
        assert_eq!(PhaseStatus::Failed, PhaseStatus::Failed);
        assert_ne!(PhaseStatus::Ok, PhaseStatus::Failed);
        assert_ne!(PhaseStatus::Skipped, PhaseStatus::DryRun);
    }

    #[test]
    fn phase_entry_clone() {
        let entry = PhaseEntry {
            name: "Copy package sources".to_string(),
            status: PhaseStatus::Ok,
            message: Some("all good".to_string()),
        };
        let cloned = entry.clone();
        assert_eq!(cloned.name, entry.name);
        assert_eq!(cloned.status, entry.status);
        assert_eq!(cloned.message, entry.message);
    }
}
