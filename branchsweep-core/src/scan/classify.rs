//! Merge classification of a candidate ref against environment branches

use super::{BranchRef, EnvironmentBranch, MergeStatus};
use crate::git::Vcs;

/// Status of `branch` relative to a single environment branch
pub fn classify<V: Vcs + ?Sized>(
    vcs: &V,
    branch: &BranchRef,
    env: &EnvironmentBranch,
) -> MergeStatus {
    let Some(target) = env.resolved.as_ref() else {
        return MergeStatus::UnknownNoRef;
    };
    let Some(commit) = branch.commit_id.as_deref() else {
        return MergeStatus::NoCommit;
    };

    match vcs.is_ancestor(commit, &target.commit) {
        Ok(true) => MergeStatus::Yes,
        Ok(false) => MergeStatus::No,
        Err(e) => {
            tracing::warn!(
                reference = %branch.full_ref,
                environment = %env.name,
                "Ancestry check failed, treating as not merged: {}",
                e
            );
            MergeStatus::No
        }
    }
}

/// Status against every environment branch, in the order given
///
/// Every environment is checked; the full vector ends up in the report.
pub fn classify_all<V: Vcs + ?Sized>(
    vcs: &V,
    branch: &BranchRef,
    environments: &[EnvironmentBranch],
) -> Vec<MergeStatus> {
    environments
        .iter()
        .map(|env| classify(vcs, branch, env))
        .collect()
}
