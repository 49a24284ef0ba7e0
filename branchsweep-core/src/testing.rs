//! Fixtures shared by the unit tests

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use crate::git::{remote_tracking_ref, CommitMeta, GitRepo, Vcs, REMOTE_TRACKING_PREFIX};
use crate::{Error, Result};

/// A throwaway repository built directly through libgit2
pub struct TestRepo {
    dir: TempDir,
    repo: Repository,
    _remotes: Vec<TempDir>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        Self {
            dir,
            repo,
            _remotes: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn open(&self) -> GitRepo {
        GitRepo::open(self.dir.path()).unwrap()
    }

    /// Create a commit with an empty tree at `time` (seconds since epoch, UTC)
    pub fn commit(&self, message: &str, parents: &[Oid], time: i64) -> Oid {
        self.commit_with_offset(message, parents, time, 0)
    }

    pub fn commit_with_offset(
        &self,
        message: &str,
        parents: &[Oid],
        time: i64,
        offset_minutes: i32,
    ) -> Oid {
        let when = git2::Time::new(time, offset_minutes);
        let sig = Signature::new("Test User", "test@example.com", &when).unwrap();
        let tree_id = self.repo.treebuilder(None).unwrap().write().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();
        let parents: Vec<_> = parents
            .iter()
            .map(|p| self.repo.find_commit(*p).unwrap())
            .collect();
        let parent_refs: Vec<_> = parents.iter().collect();
        self.repo
            .commit(None, &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    pub fn set_ref(&self, name: &str, oid: Oid) {
        self.repo.reference(name, oid, true, "test").unwrap();
    }

    pub fn set_symbolic_ref(&self, name: &str, target: &str) {
        self.repo
            .reference_symbolic(name, target, true, "test")
            .unwrap();
    }

    /// Write a loose ref pointing at an object that does not exist
    pub fn set_dangling_ref(&self, name: &str) {
        let path = self.repo.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "0123456789abcdef0123456789abcdef01234567\n").unwrap();
    }

    pub fn has_ref(&self, name: &str) -> bool {
        self.repo.find_reference(name).is_ok()
    }

    /// Register a fresh bare repository as `name` and return its path
    pub fn add_bare_remote(&mut self, name: &str) -> PathBuf {
        let remote_dir = TempDir::new().unwrap();
        Repository::init_bare(remote_dir.path()).unwrap();
        self.repo
            .remote(name, remote_dir.path().to_str().unwrap())
            .unwrap();
        let path = remote_dir.path().to_path_buf();
        self._remotes.push(remote_dir);
        path
    }
}

/// Fixed "now" used by tests that depend on commit age
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
struct FakeCommit {
    parents: Vec<String>,
    meta: CommitMeta,
}

/// In-memory [`Vcs`] used to exercise the scan and the passes without git
#[derive(Debug, Default)]
pub struct FakeVcs {
    refs: RefCell<BTreeMap<String, Option<String>>>,
    commits: HashMap<String, FakeCommit>,
    failing_remote: HashSet<String>,
    pub remote_calls: RefCell<Vec<String>>,
    next_id: u32,
}

impl FakeVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a commit `days_old` days before [`test_now`] and return its id
    pub fn commit(&mut self, parents: &[&str], days_old: i64) -> String {
        self.next_id += 1;
        let id = format!("{:040x}", self.next_id);
        let committed_at: DateTime<FixedOffset> =
            (test_now() - Duration::days(days_old)).fixed_offset();
        self.commits.insert(
            id.clone(),
            FakeCommit {
                parents: parents.iter().map(|p| p.to_string()).collect(),
                meta: CommitMeta {
                    author: "Dev Person".to_string(),
                    committed_at,
                },
            },
        );
        id
    }

    pub fn set_ref(&self, full_ref: &str, commit: &str) {
        self.refs
            .borrow_mut()
            .insert(full_ref.to_string(), Some(commit.to_string()));
    }

    pub fn set_remote(&self, remote: &str, branch: &str, commit: &str) {
        self.set_ref(&remote_tracking_ref(remote, branch), commit);
    }

    pub fn set_dangling(&self, full_ref: &str) {
        self.refs.borrow_mut().insert(full_ref.to_string(), None);
    }

    pub fn fail_remote_for(&mut self, branch: &str) {
        self.failing_remote.insert(branch.to_string());
    }

    pub fn has_ref(&self, full_ref: &str) -> bool {
        self.refs.borrow().contains_key(full_ref)
    }

    fn remote_op(&self, call: String, branch: &str) -> Result<()> {
        self.remote_calls.borrow_mut().push(call);
        if self.failing_remote.contains(branch) {
            return Err(Error::Command(format!("remote rejected {}", branch)));
        }
        Ok(())
    }
}

impl Vcs for FakeVcs {
    fn remote_tracking_refs(&self, remote: &str) -> Result<Vec<String>> {
        let prefix = format!("{}{}/", REMOTE_TRACKING_PREFIX, remote);
        Ok(self
            .refs
            .borrow()
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn ref_exists(&self, full_ref: &str) -> bool {
        self.has_ref(full_ref)
    }

    fn resolve_ref(&self, full_ref: &str) -> Option<String> {
        let target = self.refs.borrow().get(full_ref).cloned().flatten()?;
        self.commits.contains_key(&target).then_some(target)
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let mut stack = vec![descendant.to_string()];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == ancestor {
                return Ok(true);
            }
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(commit) = self.commits.get(&id) {
                stack.extend(commit.parents.iter().cloned());
            }
        }
        Ok(false)
    }

    fn commit_meta(&self, commit: &str) -> Option<CommitMeta> {
        self.commits.get(commit).map(|c| c.meta.clone())
    }

    fn reachable_commits(&self, commit: &str) -> Result<u64> {
        let mut stack = vec![commit.to_string()];
        let mut seen = HashSet::new();
        while let Some(id) = stack.pop() {
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(c) = self.commits.get(&id) {
                stack.extend(c.parents.iter().cloned());
            }
        }
        Ok(seen.len() as u64)
    }

    fn delete_local_branch(&self, branch: &str) -> Result<()> {
        let name = format!("refs/heads/{}", branch);
        self.refs
            .borrow_mut()
            .remove(&name)
            .map(|_| ())
            .ok_or_else(|| Error::Other(format!("no such branch {}", branch)))
    }

    fn delete_tracking_ref(&self, full_ref: &str) -> Result<()> {
        self.refs
            .borrow_mut()
            .remove(full_ref)
            .map(|_| ())
            .ok_or_else(|| Error::Other(format!("no such ref {}", full_ref)))
    }

    fn delete_remote_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.remote_op(format!("delete {} {}", remote, branch), branch)
    }

    fn push_branch(&self, remote: &str, branch: &str) -> Result<()> {
        self.remote_op(format!("push {} {}", remote, branch), branch)
    }
}
