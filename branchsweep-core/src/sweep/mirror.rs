//! Remote-mirroring passes driven by the deletion log

use std::fmt;

use crate::git::{local_branch_ref, Vcs};
use crate::ledger::DeletionLog;
use crate::Result;

/// What a mirroring pass did for one branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorAction {
    /// Branch deleted on the remote
    Deleted,
    /// Local branch pushed to the remote
    Pushed,
    /// Dry run: would have deleted on the remote
    WouldDelete,
    /// Dry run: would have pushed
    WouldPush,
    /// Restore-push found no local branch to push
    NoLocalBranch,
    /// The git operation failed
    Failed(String),
}

impl fmt::Display for MirrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorAction::Deleted => f.write_str("deleted"),
            MirrorAction::Pushed => f.write_str("pushed"),
            MirrorAction::WouldDelete => f.write_str("would delete"),
            MirrorAction::WouldPush => f.write_str("would push"),
            MirrorAction::NoLocalBranch => f.write_str("no local branch, skipped"),
            MirrorAction::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Outcome for one unique logged branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorOutcome {
    pub branch: String,
    pub action: MirrorAction,
}

impl MirrorOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self.action, MirrorAction::Failed(_))
    }
}

/// Replays the deletion log against one remote
pub struct RemoteMirror<'a, V: Vcs> {
    vcs: &'a V,
    remote: String,
    dry_run: bool,
}

impl<'a, V: Vcs> RemoteMirror<'a, V> {
    pub fn new(vcs: &'a V, remote: impl Into<String>) -> Self {
        Self {
            vcs,
            remote: remote.into(),
            dry_run: false,
        }
    }

    /// Report what would happen without contacting the remote
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Delete every logged branch on the remote
    ///
    /// The log is trusted as-is; local absence is not re-checked.
    pub fn delete_remote(&self, log: &DeletionLog) -> Result<Vec<MirrorOutcome>> {
        let entries = log.read_unique()?;
        tracing::info!(
            remote = %self.remote,
            branches = entries.len(),
            "Deleting logged branches on remote"
        );

        Ok(entries
            .into_iter()
            .map(|entry| {
                let action = if self.dry_run {
                    MirrorAction::WouldDelete
                } else {
                    match self.vcs.delete_remote_branch(&self.remote, &entry.branch_name) {
                        Ok(()) => MirrorAction::Deleted,
                        Err(e) => {
                            tracing::warn!(
                                branch = %entry.branch_name,
                                "Remote delete failed: {}",
                                e
                            );
                            MirrorAction::Failed(e.to_string())
                        }
                    }
                };
                MirrorOutcome {
                    branch: entry.branch_name,
                    action,
                }
            })
            .collect())
    }

    /// Push back every logged branch that exists locally again
    ///
    /// Branches without a local ref are skipped with a warning; recreating
    /// them is up to the user.
    pub fn restore_push(&self, log: &DeletionLog) -> Result<Vec<MirrorOutcome>> {
        let entries = log.read_unique()?;
        tracing::info!(
            remote = %self.remote,
            branches = entries.len(),
            "Pushing restored branches"
        );

        Ok(entries
            .into_iter()
            .map(|entry| {
                let action = if !self.vcs.ref_exists(&local_branch_ref(&entry.branch_name)) {
                    tracing::warn!(
                        branch = %entry.branch_name,
                        commit = %entry.full_commit_id,
                        "No local branch to push; restore it first"
                    );
                    MirrorAction::NoLocalBranch
                } else if self.dry_run {
                    MirrorAction::WouldPush
                } else {
                    match self.vcs.push_branch(&self.remote, &entry.branch_name) {
                        Ok(()) => MirrorAction::Pushed,
                        Err(e) => {
                            tracing::warn!(branch = %entry.branch_name, "Push failed: {}", e);
                            MirrorAction::Failed(e.to_string())
                        }
                    }
                };
                MirrorOutcome {
                    branch: entry.branch_name,
                    action,
                }
            })
            .collect())
    }
}
