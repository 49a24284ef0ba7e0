//! CLI command implementations

pub mod delete_local;
pub mod mirror;
pub mod report;

use std::path::Path;

use anyhow::Context;
use branchsweep_core::GitRepo;

pub use delete_local::DeleteLocalArgs;
pub use mirror::MirrorArgs;
pub use report::ReportArgs;

/// Open the repository containing `path`, or the current directory
fn open_repo(path: Option<&Path>) -> anyhow::Result<GitRepo> {
    let start = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    Ok(GitRepo::open(&start)?)
}
