//! Delete-local command - remove clean branches listed in the report

use std::path::{Path, PathBuf};

use branchsweep_core::sweep::LocalDeletionReport;
use branchsweep_core::{Config, DeletionLog, LocalDeletionPass};
use chrono::Local;
use clap::Args;

use super::open_repo;

/// Delete branches marked clean in the report and log each deletion
#[derive(Args, Debug)]
pub struct DeleteLocalArgs {
    /// Report to read (default: the configured branches.csv)
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    pub dry_run: bool,
}

impl DeleteLocalArgs {
    /// Execute the delete-local command
    pub fn execute(&self, config: &Config, repo_path: Option<&Path>) -> anyhow::Result<()> {
        let repo = open_repo(repo_path)?;
        let report = self
            .report
            .clone()
            .unwrap_or_else(|| config.output.report_path(repo.root(), None));
        let log = DeletionLog::new(config.output.log_path(repo.root()));

        let result = LocalDeletionPass::new(&repo, &log)
            .dry_run(self.dry_run)
            .run(&report, Local::now().fixed_offset())?;

        print_result(&result, &log);
        if let Some(ref error) = result.log_error {
            anyhow::bail!("Deletion pass stopped: {}", error);
        }
        Ok(())
    }
}

fn print_result(result: &LocalDeletionReport, log: &DeletionLog) {
    if result.attempts.is_empty() {
        println!("No clean branches in report ({} rows read).", result.rows);
        return;
    }

    for attempt in &result.attempts {
        let name = &attempt.candidate.short_name;
        if attempt.nothing_found() {
            println!("  {} - nothing to delete", name);
            continue;
        }
        for kind in &attempt.deleted {
            let verb = if result.dry_run { "Would delete" } else { "Deleted" };
            println!("  {} {} {}", verb, kind, name);
        }
        for (kind, error) in &attempt.failures {
            println!("  FAILED {} {}: {}", kind, name, error);
        }
    }

    println!();
    if result.log_error.is_some() {
        println!(
            "Stopped after logging {} deletion(s) to {}",
            result.logged,
            log.path().display()
        );
    } else if result.dry_run {
        println!("Dry run: no refs deleted, log untouched.");
    } else {
        println!(
            "Logged {} deletion(s) to {}",
            result.logged,
            log.path().display()
        );
    }
}
