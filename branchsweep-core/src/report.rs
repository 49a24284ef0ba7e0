//! Report rows and the `branches.csv` writer

use std::fs;
use std::path::Path;

use chrono::SecondsFormat;

use crate::csv::{encode_record, escape_field};
use crate::scan::{BranchRef, MergeStatus, Recommendation, ScanOutcome, ScanSummary};
use crate::Result;

/// Column holding the remote-tracking ref name
pub const COL_FULL_REF: &str = "full_ref";
/// Column holding the branch name without the remote prefix
pub const COL_SHORT_NAME: &str = "short_name_without_remote";
/// Column holding the full commit id
pub const COL_COMMIT: &str = "commit_full";
/// Column holding the verdict
pub const COL_RECOMMENDATION: &str = "recommendation";

/// Name of the merge status column for one environment branch
pub fn merged_column(environment: &str) -> String {
    format!("merged_into_{}", environment)
}

/// One scanned ref as written to the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub branch: BranchRef,
    /// One status per environment branch, in configured order
    pub merge_statuses: Vec<MergeStatus>,
    pub notes: String,
    pub recommendation: Recommendation,
    pub commit_age_days: Option<i64>,
    pub reachable_commits: Option<u64>,
}

impl ReportRow {
    /// Field values in header order
    pub fn fields(&self) -> Vec<String> {
        let branch = &self.branch;
        let mut fields = vec![
            branch.full_ref.clone(),
            branch.short_name.clone(),
            branch.commit_id.clone().unwrap_or_default(),
            branch.author.clone().unwrap_or_default(),
            branch
                .committed_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, false))
                .unwrap_or_default(),
        ];
        fields.extend(self.merge_statuses.iter().map(|s| s.to_string()));
        fields.push(self.notes.clone());
        fields.push(self.recommendation.to_string());
        fields.push(
            self.commit_age_days
                .map(|d| d.to_string())
                .unwrap_or_default(),
        );
        fields.push(
            self.reachable_commits
                .map(|n| n.to_string())
                .unwrap_or_default(),
        );
        fields
    }
}

/// Serializes a scan into the report format
#[derive(Debug, Clone)]
pub struct ReportWriter {
    environments: Vec<String>,
}

impl ReportWriter {
    pub fn new(environments: Vec<String>) -> Self {
        Self { environments }
    }

    /// Header row, with one merge column per environment branch
    pub fn header(&self) -> Vec<String> {
        let mut header: Vec<String> = [
            COL_FULL_REF,
            COL_SHORT_NAME,
            COL_COMMIT,
            "author",
            "date_iso",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        header.extend(self.environments.iter().map(|e| merged_column(e)));
        header.extend(
            ["notes", COL_RECOMMENDATION, "commit_age_days", "last_activity_commits"]
                .iter()
                .map(|s| s.to_string()),
        );
        header
    }

    /// Full file content: header, rows, blank line, summary block
    pub fn render(&self, outcome: &ScanOutcome) -> String {
        let mut out = encode_record(&self.header());
        for row in &outcome.rows {
            out.push_str(&encode_record(&row.fields()));
        }
        out.push('\n');
        out.push_str(&self.render_summary(&outcome.summary));
        out
    }

    fn render_summary(&self, summary: &ScanSummary) -> String {
        let mut lines = vec![
            vec![escape_field("Summary")],
            vec![escape_field("Remote"), escape_field(&summary.remote)],
            vec![
                escape_field("Total refs scanned"),
                escape_field(&summary.total.to_string()),
            ],
        ];
        for count in &summary.merged {
            let target = count.resolved_ref.as_deref().unwrap_or("unresolved");
            lines.push(vec![
                escape_field(&format!("Merged into {} ({})", count.environment, target)),
                escape_field(&count.merged.to_string()),
            ]);
        }
        for recommendation in [
            Recommendation::Clean,
            Recommendation::Review,
            Recommendation::Critical,
        ] {
            lines.push(vec![
                escape_field(&format!("Recommendation {}", recommendation)),
                escape_field(&summary.recommendations.get(recommendation).to_string()),
            ]);
        }

        lines
            .into_iter()
            .map(|fields| fields.join(",") + "\n")
            .collect()
    }

    /// Write the report, creating the parent directory if needed
    pub fn write(&self, path: &Path, outcome: &ScanOutcome) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.render(outcome))?;
        tracing::info!(path = %path.display(), rows = outcome.rows.len(), "Wrote report");
        Ok(())
    }
}
