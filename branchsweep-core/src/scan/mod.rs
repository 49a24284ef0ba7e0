//! Branch scan: collect remote-tracking refs, classify them against the
//! environment branches and attach a recommendation to each

mod classify;
mod collector;
mod recommend;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use crate::config::ScanConfig;
use crate::git::Vcs;
use crate::report::ReportRow;
use crate::{Error, Result};

pub use classify::{classify, classify_all};
pub use collector::{
    collect_branch_refs, resolve_environment, resolve_environments, resolve_primary,
};
pub use recommend::{commit_age_days, recommend, RecommendationInput, Verdict};

/// Ancestry of a candidate ref relative to one environment branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStatus {
    /// The candidate's commit is contained in the environment branch
    Yes,
    /// It is not
    No,
    /// The environment branch does not resolve to any ref
    UnknownNoRef,
    /// The candidate's own commit does not resolve
    NoCommit,
}

impl MergeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStatus::Yes => "yes",
            MergeStatus::No => "no",
            MergeStatus::UnknownNoRef => "unknown-no-ref",
            MergeStatus::NoCommit => "no-commit",
        }
    }
}

impl fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict attached to a scanned ref
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    /// Safe to delete
    Clean,
    /// Needs a human decision
    Review,
    /// The ref could not be inspected at all
    Critical,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Clean => "clean",
            Recommendation::Review => "review",
            Recommendation::Critical => "critical",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "clean" => Ok(Recommendation::Clean),
            "review" => Ok(Recommendation::Review),
            "critical" => Ok(Recommendation::Critical),
            other => Err(Error::Other(format!("Unknown recommendation '{}'", other))),
        }
    }
}

/// A ref plus the commit it resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRef {
    pub full_ref: String,
    pub commit: String,
}

/// A configured long-lived branch used as a merge target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentBranch {
    pub name: String,
    /// Preferred ref for this name, `None` when neither a local nor a
    /// remote-tracking branch exists
    pub resolved: Option<ResolvedRef>,
}

/// A remote-tracking ref that is a deletion candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchRef {
    /// `refs/remotes/<remote>/<name>`
    pub full_ref: String,
    /// `<name>`
    pub short_name: String,
    /// `None` when the ref does not resolve to a commit
    pub commit_id: Option<String>,
    pub author: Option<String>,
    pub committed_at: Option<DateTime<FixedOffset>>,
}

/// Merged count for one environment branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentCount {
    pub environment: String,
    pub resolved_ref: Option<String>,
    pub merged: usize,
}

/// Refs per recommendation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecommendationCounts {
    pub clean: usize,
    pub review: usize,
    pub critical: usize,
}

impl RecommendationCounts {
    pub fn get(&self, recommendation: Recommendation) -> usize {
        match recommendation {
            Recommendation::Clean => self.clean,
            Recommendation::Review => self.review,
            Recommendation::Critical => self.critical,
        }
    }
}

/// Aggregate tallies accumulated while scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    pub remote: String,
    pub total: usize,
    pub merged: Vec<EnvironmentCount>,
    pub recommendations: RecommendationCounts,
    /// The `main`/`master` ref found during the scan, for information
    pub primary_ref: Option<String>,
}

impl ScanSummary {
    fn new(
        remote: &str,
        environments: &[EnvironmentBranch],
        primary: Option<&ResolvedRef>,
    ) -> Self {
        Self {
            remote: remote.to_string(),
            total: 0,
            merged: environments
                .iter()
                .map(|env| EnvironmentCount {
                    environment: env.name.clone(),
                    resolved_ref: env.resolved.as_ref().map(|r| r.full_ref.clone()),
                    merged: 0,
                })
                .collect(),
            recommendations: RecommendationCounts::default(),
            primary_ref: primary.map(|r| r.full_ref.clone()),
        }
    }

    fn record(&mut self, row: &ReportRow) {
        self.total += 1;
        for (count, status) in self.merged.iter_mut().zip(&row.merge_statuses) {
            if *status == MergeStatus::Yes {
                count.merged += 1;
            }
        }
        match row.recommendation {
            Recommendation::Clean => self.recommendations.clean += 1,
            Recommendation::Review => self.recommendations.review += 1,
            Recommendation::Critical => self.recommendations.critical += 1,
        }
    }
}

/// Everything one scan produces
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub environments: Vec<EnvironmentBranch>,
    pub primary: Option<ResolvedRef>,
    pub rows: Vec<ReportRow>,
    pub summary: ScanSummary,
}

impl ScanOutcome {
    /// Environment branch names in report column order
    pub fn environment_names(&self) -> Vec<String> {
        self.environments.iter().map(|e| e.name.clone()).collect()
    }
}

/// Runs the collect → classify → recommend pipeline over one remote
pub struct Scanner<'a, V: Vcs> {
    vcs: &'a V,
    remote: String,
    environments: Vec<String>,
    review_days: i64,
}

impl<'a, V: Vcs> Scanner<'a, V> {
    pub fn new(vcs: &'a V, config: &ScanConfig) -> Self {
        Self {
            vcs,
            remote: config.remote.clone(),
            environments: config.environment_branches.clone(),
            review_days: config.review_days,
        }
    }

    /// Scan the remote's tracking refs as of `now`
    pub fn scan(&self, now: DateTime<Utc>) -> Result<ScanOutcome> {
        let environments = resolve_environments(self.vcs, &self.remote, &self.environments);
        for env in &environments {
            match &env.resolved {
                Some(r) => tracing::debug!(
                    environment = %env.name,
                    reference = %r.full_ref,
                    "Resolved environment branch"
                ),
                None => tracing::warn!(
                    environment = %env.name,
                    "Environment branch not found locally or on {}",
                    self.remote
                ),
            }
        }

        let primary = resolve_primary(self.vcs, &self.remote);
        if let Some(ref p) = primary {
            tracing::info!(reference = %p.full_ref, "Primary branch");
        }

        let branches = collect_branch_refs(self.vcs, &self.remote, &self.environments)?;
        tracing::info!(
            remote = %self.remote,
            count = branches.len(),
            "Collected remote-tracking refs"
        );

        let mut summary = ScanSummary::new(&self.remote, &environments, primary.as_ref());
        let mut rows = Vec::with_capacity(branches.len());

        for branch in branches {
            let statuses = classify_all(self.vcs, &branch, &environments);
            let age = branch.committed_at.map(|at| commit_age_days(now, at));

            let named: Vec<(&str, MergeStatus)> = environments
                .iter()
                .map(|e| e.name.as_str())
                .zip(statuses.iter().copied())
                .collect();
            let verdict = recommend(&RecommendationInput {
                has_commit: branch.commit_id.is_some(),
                statuses: &named,
                age_days: age,
                review_days: self.review_days,
            });

            let reachable_commits = match branch.commit_id.as_deref() {
                Some(commit) => match self.vcs.reachable_commits(commit) {
                    Ok(n) => Some(n),
                    Err(e) => {
                        tracing::warn!(
                            reference = %branch.full_ref,
                            "Failed to count commits: {}",
                            e
                        );
                        None
                    }
                },
                None => None,
            };

            tracing::debug!(
                reference = %branch.full_ref,
                recommendation = %verdict.recommendation,
                "Classified ref"
            );

            let row = ReportRow {
                branch,
                merge_statuses: statuses,
                notes: verdict.notes.join("; "),
                recommendation: verdict.recommendation,
                commit_age_days: age,
                reachable_commits,
            };
            summary.record(&row);
            rows.push(row);
        }

        Ok(ScanOutcome {
            environments,
            primary,
            rows,
            summary,
        })
    }
}
