//! Delete-remote and restore-push commands - replay the deletion log

use std::path::Path;

use branchsweep_core::{Config, DeletionLog, MirrorOutcome, RemoteMirror};
use clap::Args;

use super::open_repo;

/// Arguments shared by the two log-driven remote passes
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Remote to act on (default "origin")
    pub remote: Option<String>,

    /// Show what would happen without contacting the remote
    #[arg(long)]
    pub dry_run: bool,
}

impl MirrorArgs {
    /// Delete every logged branch on the remote
    pub fn delete_remote(&self, config: Config, repo_path: Option<&Path>) -> anyhow::Result<()> {
        let config = config.with_cli_overrides(self.remote.clone(), None);
        let repo = open_repo(repo_path)?;
        let log = DeletionLog::new(config.output.log_path(repo.root()));

        let outcomes = RemoteMirror::new(&repo, config.scan.remote.as_str())
            .dry_run(self.dry_run)
            .delete_remote(&log)?;

        print_outcomes(&config.scan.remote, &outcomes);
        Ok(())
    }

    /// Push logged branches that exist locally again
    pub fn restore_push(&self, config: Config, repo_path: Option<&Path>) -> anyhow::Result<()> {
        let config = config.with_cli_overrides(self.remote.clone(), None);
        let repo = open_repo(repo_path)?;
        let log = DeletionLog::new(config.output.log_path(repo.root()));

        let outcomes = RemoteMirror::new(&repo, config.scan.remote.as_str())
            .dry_run(self.dry_run)
            .restore_push(&log)?;

        print_outcomes(&config.scan.remote, &outcomes);
        Ok(())
    }
}

fn print_outcomes(remote: &str, outcomes: &[MirrorOutcome]) {
    if outcomes.is_empty() {
        println!("Deletion log is empty; nothing to do.");
        return;
    }

    for outcome in outcomes {
        println!("  {} {}: {}", remote, outcome.branch, outcome.action);
    }

    let failed = outcomes.iter().filter(|o| o.is_failure()).count();
    println!();
    println!(
        "{} branch(es) processed, {} failed",
        outcomes.len(),
        failed
    );
}
