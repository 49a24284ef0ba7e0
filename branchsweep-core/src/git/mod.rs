//! Git access for branchsweep
//!
//! The scan and the deletion passes only talk to git through the [`Vcs`]
//! trait. [`GitRepo`] implements it on top of libgit2 for everything local and
//! the `git` executable for the two operations that touch a remote.

mod remote;
mod repo;

use chrono::{DateTime, FixedOffset};

use crate::Result;

pub use repo::GitRepo;

/// Prefix shared by every local branch ref
pub const LOCAL_BRANCH_PREFIX: &str = "refs/heads/";

/// Prefix shared by every remote-tracking ref
pub const REMOTE_TRACKING_PREFIX: &str = "refs/remotes/";

/// Full ref name of a local branch
pub fn local_branch_ref(branch: &str) -> String {
    format!("{}{}", LOCAL_BRANCH_PREFIX, branch)
}

/// Full ref name of a remote-tracking branch
pub fn remote_tracking_ref(remote: &str, branch: &str) -> String {
    format!("{}{}/{}", REMOTE_TRACKING_PREFIX, remote, branch)
}

/// Metadata of a single commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMeta {
    /// Author name
    pub author: String,
    /// Committer timestamp, in the committer's offset
    pub committed_at: DateTime<FixedOffset>,
}

/// The version-control capabilities the scan and the passes rely on
///
/// Lookups that fail for a single ref return `None`/`false` rather than an
/// error so that one broken ref never aborts a scan.
pub trait Vcs {
    /// Full names of all refs under `refs/remotes/<remote>/`, including `HEAD`
    fn remote_tracking_refs(&self, remote: &str) -> Result<Vec<String>>;

    /// Whether a ref with this full name exists, resolvable or not
    fn ref_exists(&self, full_ref: &str) -> bool;

    /// Commit id the ref points to, if it resolves to a commit
    fn resolve_ref(&self, full_ref: &str) -> Option<String>;

    /// Whether `ancestor` is reachable from `descendant` (a commit is its own ancestor)
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// Author and commit time of a commit
    fn commit_meta(&self, commit: &str) -> Option<CommitMeta>;

    /// Number of commits reachable from `commit`, itself included
    fn reachable_commits(&self, commit: &str) -> Result<u64>;

    /// Delete the local branch `refs/heads/<branch>`
    fn delete_local_branch(&self, branch: &str) -> Result<()>;

    /// Delete a local remote-tracking ref by full name
    fn delete_tracking_ref(&self, full_ref: &str) -> Result<()>;

    /// Delete `branch` on the remote server
    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()>;

    /// Push the local branch `branch` to the same name on `remote`
    fn push_branch(&self, remote: &str, branch: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ref_names() {
        assert_eq!(local_branch_ref("feature/x"), "refs/heads/feature/x");
        assert_eq!(
            remote_tracking_ref("origin", "feature/x"),
            "refs/remotes/origin/feature/x"
        );
    }
}
