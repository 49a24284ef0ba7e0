//! Git repository detection and local ref operations

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use git2::{BranchType, Oid, Repository};

use super::{CommitMeta, Vcs, LOCAL_BRANCH_PREFIX};
use crate::{Error, Result};

/// A git repository wrapper providing branchsweep-specific operations
pub struct GitRepo {
    /// The underlying git2 repository
    repo: Repository,
    /// Path to the repository root
    root: PathBuf,
}

impl std::fmt::Debug for GitRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepo")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// This will search upward from the given path to find the repository root.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let repo = Repository::discover(path).map_err(|e| {
            if e.code() == git2::ErrorCode::NotFound {
                Error::NotARepository(format!(
                    "{}. Run branchsweep from inside a git working copy.",
                    path.display()
                ))
            } else {
                Error::Git(e)
            }
        })?;

        let root = repo
            .workdir()
            .ok_or_else(|| Error::Config("Bare repositories are not supported".to_string()))?
            .to_path_buf();

        Ok(Self { repo, root })
    }

    /// Get the repository root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Names of all configured remotes
    pub fn remote_names(&self) -> Result<Vec<String>> {
        let remotes = self.repo.remotes()?;
        Ok(remotes.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn parse_oid(commit: &str) -> Result<Oid> {
        Oid::from_str(commit)
            .map_err(|e| Error::Other(format!("Invalid commit id '{}': {}", commit, e)))
    }
}

fn to_datetime(time: git2::Time) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60)?;
    DateTime::from_timestamp(time.seconds(), 0).map(|utc| utc.with_timezone(&offset))
}

impl Vcs for GitRepo {
    fn remote_tracking_refs(&self, remote: &str) -> Result<Vec<String>> {
        let prefix = super::remote_tracking_ref(remote, "");
        let mut refs = Vec::new();

        for reference in self.repo.references()? {
            let reference = match reference {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!("Skipping unreadable reference: {}", e);
                    continue;
                }
            };
            if let Some(name) = reference.name() {
                if name.starts_with(&prefix) {
                    refs.push(name.to_string());
                }
            }
        }

        Ok(refs)
    }

    fn ref_exists(&self, full_ref: &str) -> bool {
        self.repo.find_reference(full_ref).is_ok()
    }

    fn resolve_ref(&self, full_ref: &str) -> Option<String> {
        let reference = self.repo.find_reference(full_ref).ok()?;
        match reference.peel_to_commit() {
            Ok(commit) => Some(commit.id().to_string()),
            Err(e) => {
                tracing::debug!(reference = full_ref, "Reference does not resolve: {}", e);
                None
            }
        }
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let ancestor = Self::parse_oid(ancestor)?;
        let descendant = Self::parse_oid(descendant)?;

        if ancestor == descendant {
            return Ok(true);
        }

        match self.repo.merge_base(ancestor, descendant) {
            Ok(base) => Ok(base == ancestor),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(false),
            Err(e) => Err(Error::Git(e)),
        }
    }

    fn commit_meta(&self, commit: &str) -> Option<CommitMeta> {
        let oid = Oid::from_str(commit).ok()?;
        let commit = self.repo.find_commit(oid).ok()?;
        let author = commit.author().name().unwrap_or_default().to_string();
        let committed_at = to_datetime(commit.committer().when())?;

        Some(CommitMeta {
            author,
            committed_at,
        })
    }

    fn reachable_commits(&self, commit: &str) -> Result<u64> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(Self::parse_oid(commit)?)?;

        let mut count = 0;
        for oid in revwalk {
            oid?;
            count += 1;
        }

        Ok(count)
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        let mut local = self.repo.find_branch(branch, BranchType::Local)?;
        local.delete()?;
        Ok(())
    }

    fn delete_tracking_ref(&self, full_ref: &str) -> Result<()> {
        if full_ref.starts_with(LOCAL_BRANCH_PREFIX) {
            return Err(Error::Other(format!(
                "{} is a local branch, not a remote-tracking ref",
                full_ref
            )));
        }
        let mut reference = self.repo.find_reference(full_ref)?;
        reference.delete()?;
        Ok(())
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let target = super::local_branch_ref(branch);
        self.run_push(remote, &["--delete", &target])
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        self.run_push(remote, &[&refspec])
    }
}
