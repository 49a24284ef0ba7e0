//! Remote-tracking ref collection and environment branch resolution

use super::{BranchRef, EnvironmentBranch, ResolvedRef};
use crate::git::{local_branch_ref, remote_tracking_ref, Vcs};
use crate::Result;

/// Names tried, in order, when looking for the primary branch
const PRIMARY_CANDIDATES: [&str; 2] = ["main", "master"];

/// Resolve one environment branch, preferring the local branch over the
/// remote-tracking branch of the same name
pub fn resolve_environment<V: Vcs + ?Sized>(
    vcs: &V,
    remote: &str,
    name: &str,
) -> EnvironmentBranch {
    let candidates = [local_branch_ref(name), remote_tracking_ref(remote, name)];

    let resolved = candidates.into_iter().find_map(|full_ref| {
        vcs.resolve_ref(&full_ref)
            .map(|commit| ResolvedRef { full_ref, commit })
    });

    EnvironmentBranch {
        name: name.to_string(),
        resolved,
    }
}

/// Resolve every configured environment branch, keeping configuration order
pub fn resolve_environments<V: Vcs + ?Sized>(
    vcs: &V,
    remote: &str,
    names: &[String],
) -> Vec<EnvironmentBranch> {
    names
        .iter()
        .map(|name| resolve_environment(vcs, remote, name))
        .collect()
}

/// Find the primary integration branch, trying `main` then `master`
pub fn resolve_primary<V: Vcs + ?Sized>(vcs: &V, remote: &str) -> Option<ResolvedRef> {
    PRIMARY_CANDIDATES
        .iter()
        .find_map(|name| resolve_environment(vcs, remote, name).resolved)
}

/// List the deletion candidates under `refs/remotes/<remote>/`
///
/// The symbolic `HEAD` and any ref named like an environment branch are
/// left out. Order is whatever the ref store yields.
pub fn collect_branch_refs<V: Vcs + ?Sized>(
    vcs: &V,
    remote: &str,
    environments: &[String],
) -> Result<Vec<BranchRef>> {
    let prefix = remote_tracking_ref(remote, "");
    let mut branches = Vec::new();

    for full_ref in vcs.remote_tracking_refs(remote)? {
        let Some(short_name) = full_ref.strip_prefix(&prefix) else {
            continue;
        };
        if short_name == "HEAD" || environments.iter().any(|env| env == short_name) {
            continue;
        }

        let commit_id = vcs.resolve_ref(&full_ref);
        let meta = commit_id.as_deref().and_then(|c| vcs.commit_meta(c));

        branches.push(BranchRef {
            short_name: short_name.to_string(),
            full_ref,
            commit_id,
            author: meta.as_ref().map(|m| m.author.clone()),
            committed_at: meta.map(|m| m.committed_at),
        });
    }

    Ok(branches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeVcs;

    #[test]
    fn test_environment_prefers_local_branch() {
        let mut vcs = FakeVcs::new();
        let local = vcs.commit(&[], 1);
        let remote = vcs.commit(&[], 2);
        vcs.set_ref("refs/heads/dev", &local);
        vcs.set_remote("origin", "dev", &remote);

        let env = resolve_environment(&vcs, "origin", "dev");
        let resolved = env.resolved.unwrap();
        assert_eq!(resolved.full_ref, "refs/heads/dev");
        assert_eq!(resolved.commit, local);
    }

    #[test]
    fn test_environment_falls_back_to_remote_then_none() {
        let mut vcs = FakeVcs::new();
        let remote = vcs.commit(&[], 2);
        vcs.set_remote("origin", "qa", &remote);
        vcs.set_remote("upstream", "prod", &remote);

        let qa = resolve_environment(&vcs, "origin", "qa");
        assert_eq!(qa.resolved.unwrap().full_ref, "refs/remotes/origin/qa");

        let prod = resolve_environment(&vcs, "origin", "prod");
        assert!(prod.resolved.is_none());
    }

    #[test]
    fn test_primary_tries_main_then_master() {
        let mut vcs = FakeVcs::new();
        let c = vcs.commit(&[], 1);
        vcs.set_remote("origin", "master", &c);
        assert_eq!(
            resolve_primary(&vcs, "origin").unwrap().full_ref,
            "refs/remotes/origin/master"
        );

        vcs.set_ref("refs/heads/main", &c);
        assert_eq!(
            resolve_primary(&vcs, "origin").unwrap().full_ref,
            "refs/heads/main"
        );
    }

    #[test]
    fn test_collect_excludes_head_and_environments() {
        let mut vcs = FakeVcs::new();
        let c = vcs.commit(&[], 10);
        for name in ["HEAD", "main", "dev", "feature/a", "mainline"] {
            vcs.set_remote("origin", name, &c);
        }
        vcs.set_remote("upstream", "feature/b", &c);

        let envs = vec!["dev".to_string(), "main".to_string()];
        let refs = collect_branch_refs(&vcs, "origin", &envs).unwrap();
        let names: Vec<_> = refs.iter().map(|r| r.short_name.as_str()).collect();
        assert_eq!(names, vec!["feature/a", "mainline"]);
        assert_eq!(refs[0].full_ref, "refs/remotes/origin/feature/a");
        assert_eq!(refs[0].author.as_deref(), Some("Dev Person"));
        assert!(refs[0].committed_at.is_some());
    }

    #[test]
    fn test_collect_keeps_unresolvable_refs() {
        let vcs = FakeVcs::new();
        vcs.set_dangling("refs/remotes/origin/ghost");

        let refs = collect_branch_refs(&vcs, "origin", &[]).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].commit_id, None);
        assert_eq!(refs[0].author, None);
        assert_eq!(refs[0].committed_at, None);
    }
}
