//! Report command - classify remote-tracking branches and write branches.csv

use std::path::Path;

use branchsweep_core::{Config, Recommendation, ReportWriter, Scanner};
use chrono::Utc;
use clap::Args;

use super::open_repo;

/// Classify remote-tracking branches and write the CSV report
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Base name of the report file (default from config, usually "branches")
    pub output_base: Option<String>,

    /// Remote whose tracking branches are scanned (default "origin")
    pub remote: Option<String>,

    /// Review window in days for branches recently merged into main/master
    pub review_days: Option<i64>,

    /// Print the summary as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    /// Execute the report command
    pub fn execute(&self, config: Config, repo_path: Option<&Path>) -> anyhow::Result<()> {
        let config = config.with_cli_overrides(self.remote.clone(), self.review_days);
        config.validate()?;

        let repo = open_repo(repo_path)?;
        let remote = &config.scan.remote;
        if !repo.remote_names()?.iter().any(|r| r == remote) {
            tracing::warn!("Remote '{}' is not configured; scanning cached refs only", remote);
        }

        let outcome = Scanner::new(&repo, &config.scan).scan(Utc::now())?;

        let path = config
            .output
            .report_path(repo.root(), self.output_base.as_deref());
        ReportWriter::new(outcome.environment_names()).write(&path, &outcome)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
            return Ok(());
        }

        let summary = &outcome.summary;
        println!("Report written to {}", path.display());
        println!();
        println!("Refs scanned on {}: {}", summary.remote, summary.total);
        if let Some(ref primary) = summary.primary_ref {
            println!("Primary branch: {}", primary);
        }
        println!();
        println!("Merged into:");
        for count in &summary.merged {
            match count.resolved_ref {
                Some(ref target) => {
                    println!("  {:<12} {:>5}   ({})", count.environment, count.merged, target)
                }
                None => println!("  {:<12}     -   (not found)", count.environment),
            }
        }
        println!();
        println!("Recommendations:");
        for recommendation in [
            Recommendation::Clean,
            Recommendation::Review,
            Recommendation::Critical,
        ] {
            println!(
                "  {:<12} {:>5}",
                recommendation.as_str(),
                summary.recommendations.get(recommendation)
            );
        }

        Ok(())
    }
}
