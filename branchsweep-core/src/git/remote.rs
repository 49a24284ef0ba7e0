//! Remote operations through the `git` executable
//!
//! Pushes go through the command line so that credential helpers, SSH
//! configuration and push hooks behave exactly as they do for the user.

use std::process::Command;

use super::repo::GitRepo;
use crate::{Error, Result};

impl GitRepo {
    /// Run `git push <remote> <args...>` in the repository root
    pub(crate) fn run_push(&self, remote: &str, args: &[&str]) -> Result<()> {
        let mut cmd = Command::new("git");
        cmd.arg("push")
            .arg(remote)
            .args(args)
            .current_dir(self.root());

        tracing::debug!(remote, args = ?args, "Running git push");

        let output = cmd
            .output()
            .map_err(|e| Error::Command(format!("Failed to run git push: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Command(format!(
                "git push {} {} failed: {}",
                remote,
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(())
    }
}
