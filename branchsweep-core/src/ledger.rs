//! Append-only deletion log
//!
//! Every ref removed by the local deletion pass gets one line here. The log
//! is the only input of the remote-mirroring passes, which de-duplicate it by
//! branch name since a branch deleted both as a local branch and as a
//! remote-tracking ref appears twice.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::csv::{encode_record, CsvTable};
use crate::Result;

/// Column holding the deleted branch name
pub const COL_BRANCH: &str = "branch_name";
/// Column holding the commit the branch pointed to
pub const COL_COMMIT: &str = "full_commit_id";
/// Column holding the deletion timestamp
pub const COL_TIME: &str = "deletion_time_iso";

/// One recorded deletion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionLogEntry {
    pub branch_name: String,
    pub full_commit_id: String,
    /// ISO-8601 timestamp with offset
    pub deletion_time: String,
}

impl DeletionLogEntry {
    pub fn new(
        branch_name: impl Into<String>,
        full_commit_id: impl Into<String>,
        deleted_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            branch_name: branch_name.into(),
            full_commit_id: full_commit_id.into(),
            deletion_time: deleted_at.to_rfc3339_opts(SecondsFormat::Secs, false),
        }
    }
}

/// The deletion log file
#[derive(Debug, Clone)]
pub struct DeletionLog {
    path: PathBuf,
}

impl DeletionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry, writing the header first if the file is new or empty
    ///
    /// A partial last line left by an interrupted run is terminated first so
    /// the new record starts on a line of its own.
    pub fn append(&self, entry: &DeletionLogEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        let mut text = String::new();
        if file.metadata()?.len() == 0 {
            text.push_str(&encode_record(&[COL_BRANCH, COL_COMMIT, COL_TIME]));
        } else {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                tracing::warn!(
                    path = %self.path.display(),
                    "Deletion log ends with a partial line; starting a new one"
                );
                text.push('\n');
            }
        }
        text.push_str(&encode_record(&[
            entry.branch_name.as_str(),
            entry.full_commit_id.as_str(),
            entry.deletion_time.as_str(),
        ]));

        file.write_all(text.as_bytes())?;
        Ok(())
    }

    /// Read every entry in file order; the log must exist
    pub fn read(&self) -> Result<Vec<DeletionLogEntry>> {
        let table = CsvTable::read(&self.path)?;
        let branch = table.header.require(COL_BRANCH)?;
        let commit = table.header.require(COL_COMMIT)?;
        let time = table.header.require(COL_TIME)?;

        Ok(table
            .rows
            .into_iter()
            .filter(|row| !row[branch].trim().is_empty())
            .map(|row| DeletionLogEntry {
                branch_name: row[branch].trim().to_string(),
                full_commit_id: row[commit].clone(),
                deletion_time: row[time].clone(),
            })
            .collect())
    }

    /// Entries de-duplicated by branch name, first occurrence wins
    pub fn read_unique(&self) -> Result<Vec<DeletionLogEntry>> {
        Ok(unique_by_branch(self.read()?))
    }
}

/// Keep the first entry for each branch name, preserving order
pub fn unique_by_branch(entries: Vec<DeletionLogEntry>) -> Vec<DeletionLogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.branch_name.clone()))
        .collect()
}
