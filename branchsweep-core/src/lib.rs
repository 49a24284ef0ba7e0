//! branchsweep core - branch classification and log-driven deletion
//!
//! This crate scans the remote-tracking refs of one repository, classifies
//! each against a configured list of long-lived environment branches, and
//! writes a CSV report with a `clean | review | critical` verdict per ref.
//! The report feeds a local deletion pass that records every deleted ref in an
//! append-only deletion log, and the log in turn drives the passes that mirror
//! deletions (or restorations) to the remote.

pub mod config;
pub mod csv;
pub mod error;
pub mod git;
pub mod ledger;
pub mod report;
pub mod scan;
pub mod sweep;

#[cfg(test)]
mod testing;

pub use config::{Config, OutputConfig, ScanConfig};
pub use error::{Error, Result};
pub use git::{CommitMeta, GitRepo, Vcs};
pub use ledger::{DeletionLog, DeletionLogEntry};
pub use report::{ReportRow, ReportWriter};
pub use scan::{
    EnvironmentBranch, MergeStatus, Recommendation, ScanOutcome, ScanSummary, Scanner,
};
pub use sweep::{LocalDeletionPass, MirrorOutcome, RemoteMirror};
