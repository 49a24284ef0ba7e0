//! Error types for branchsweep

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for branchsweep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for branchsweep operations
///
/// Everything here is an environment error: the run cannot continue. Per-ref
/// problems (a ref that does not resolve, an environment branch that is
/// missing) are carried as data in the report instead.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by libgit2
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Not inside a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required input file does not exist
    #[error("Required file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// A required CSV column is absent from the header
    #[error("Required column '{column}' not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// Malformed CSV content that cannot be skipped
    #[error("CSV error: {0}")]
    Csv(String),

    /// An external git command failed
    #[error("Command failed: {0}")]
    Command(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
