//! Local deletion pass driven by the report

use std::fmt;
use std::path::Path;

use chrono::{DateTime, FixedOffset};

use crate::csv::CsvTable;
use crate::git::{local_branch_ref, Vcs, REMOTE_TRACKING_PREFIX};
use crate::ledger::{DeletionLog, DeletionLogEntry};
use crate::report::{COL_COMMIT, COL_FULL_REF, COL_RECOMMENDATION, COL_SHORT_NAME};
use crate::scan::Recommendation;
use crate::Result;

/// One report row as far as the deletion pass cares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub full_ref: String,
    pub short_name: String,
    pub commit: String,
    pub recommendation: Option<Recommendation>,
}

impl Candidate {
    /// Only `clean` remote-tracking refs are deleted
    pub fn is_deletable(&self) -> bool {
        self.full_ref.starts_with(REMOTE_TRACKING_PREFIX)
            && !self.short_name.is_empty()
            && self.recommendation == Some(Recommendation::Clean)
    }
}

/// Which local ref a deletion touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `refs/heads/<name>`
    LocalBranch,
    /// `refs/remotes/<remote>/<name>`
    RemoteTracking,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefKind::LocalBranch => f.write_str("local branch"),
            RefKind::RemoteTracking => f.write_str("remote-tracking ref"),
        }
    }
}

/// What happened to one deletable candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionAttempt {
    pub candidate: Candidate,
    /// Refs removed (or, in a dry run, that would be removed)
    pub deleted: Vec<RefKind>,
    pub failures: Vec<(RefKind, String)>,
}

impl DeletionAttempt {
    /// Neither the local branch nor the tracking ref was present
    pub fn nothing_found(&self) -> bool {
        self.deleted.is_empty() && self.failures.is_empty()
    }
}

/// Result of a local deletion pass
#[derive(Debug, Clone, Default)]
pub struct LocalDeletionReport {
    /// Rows read from the report
    pub rows: usize,
    pub attempts: Vec<DeletionAttempt>,
    /// Entries appended to the deletion log
    pub logged: usize,
    pub dry_run: bool,
    /// Set when a deleted ref could not be logged; the pass stops there
    pub log_error: Option<String>,
}

/// Deletes `clean` refs from the local repository and logs each deletion
pub struct LocalDeletionPass<'a, V: Vcs> {
    vcs: &'a V,
    log: &'a DeletionLog,
    dry_run: bool,
}

impl<'a, V: Vcs> LocalDeletionPass<'a, V> {
    pub fn new(vcs: &'a V, log: &'a DeletionLog) -> Self {
        Self {
            vcs,
            log,
            dry_run: false,
        }
    }

    /// Report what would be deleted without touching refs or the log
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Read the rows of a report, locating columns by header name
    pub fn read_candidates(report: &Path) -> Result<Vec<Candidate>> {
        let table = CsvTable::read(report)?;
        let full_ref = table.header.require(COL_FULL_REF)?;
        let short_name = table.header.require(COL_SHORT_NAME)?;
        let commit = table.header.require(COL_COMMIT)?;
        let recommendation = table.header.require(COL_RECOMMENDATION)?;

        Ok(table
            .rows
            .into_iter()
            .map(|row| Candidate {
                full_ref: row[full_ref].trim().to_string(),
                short_name: row[short_name].trim().to_string(),
                commit: row[commit].trim().to_string(),
                recommendation: row[recommendation].parse().ok(),
            })
            .collect())
    }

    /// Run the pass over `report`, stamping log entries with `now`
    ///
    /// A ref that cannot be deleted is reported and the pass continues. A
    /// deletion that cannot be logged ends the pass and sets `log_error`.
    pub fn run(
        &self,
        report: &Path,
        now: DateTime<FixedOffset>,
    ) -> Result<LocalDeletionReport> {
        let candidates = Self::read_candidates(report)?;
        tracing::info!(
            report = %report.display(),
            rows = candidates.len(),
            dry_run = self.dry_run,
            "Starting local deletion pass"
        );

        let mut result = LocalDeletionReport {
            rows: candidates.len(),
            dry_run: self.dry_run,
            ..Default::default()
        };

        'candidates: for candidate in candidates.into_iter().filter(Candidate::is_deletable) {
            let mut attempt = DeletionAttempt {
                candidate,
                deleted: Vec::new(),
                failures: Vec::new(),
            };

            let local_ref = local_branch_ref(&attempt.candidate.short_name);
            let targets = [
                (RefKind::LocalBranch, local_ref),
                (RefKind::RemoteTracking, attempt.candidate.full_ref.clone()),
            ];

            for (kind, full_ref) in targets {
                if !self.vcs.ref_exists(&full_ref) {
                    continue;
                }
                if self.dry_run {
                    attempt.deleted.push(kind);
                    continue;
                }

                let deleted = match kind {
                    RefKind::LocalBranch => {
                        self.vcs.delete_local_branch(&attempt.candidate.short_name)
                    }
                    RefKind::RemoteTracking => self.vcs.delete_tracking_ref(&full_ref),
                };

                if let Err(e) = deleted {
                    tracing::warn!(reference = %full_ref, "Failed to delete {}: {}", kind, e);
                    attempt.failures.push((kind, e.to_string()));
                    continue;
                }

                let entry = DeletionLogEntry::new(
                    attempt.candidate.short_name.as_str(),
                    attempt.candidate.commit.as_str(),
                    now,
                );
                if let Err(e) = self.log.append(&entry) {
                    let message = format!(
                        "{} was deleted but could not be recorded in {}: {}",
                        full_ref,
                        self.log.path().display(),
                        e
                    );
                    tracing::error!(reference = %full_ref, "{}", message);
                    attempt.failures.push((kind, message.clone()));
                    result.log_error = Some(message);
                    result.attempts.push(attempt);
                    break 'candidates;
                }

                result.logged += 1;
                tracing::info!(reference = %full_ref, "Deleted {}", kind);
                attempt.deleted.push(kind);
            }

            if attempt.nothing_found() {
                tracing::info!(
                    branch = %attempt.candidate.short_name,
                    "No local ref left to delete"
                );
            }
            result.attempts.push(attempt);
        }

        Ok(result)
    }
}
