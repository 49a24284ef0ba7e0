//! Configuration management for branchsweep
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (BRANCHSWEEP_*)
//! 3. Config file (`--config`, else ~/.config/branchsweep/config.toml)
//! 4. Default values

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings that drive the branch scan
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Remote whose tracking refs are scanned
    pub remote: String,

    /// Long-lived branches used as merge targets, in report column order
    pub environment_branches: Vec<String>,

    /// Branches merged into main/master more recently than this are kept for review
    pub review_days: i64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            environment_branches: ["dev", "qa", "prod", "main"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            review_days: 14,
        }
    }
}

/// Where reports and the deletion log live
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for reports and the log, relative to the repository root
    pub report_dir: PathBuf,

    /// Base file name of the report (without `.csv`)
    pub report_name: String,

    /// File name of the deletion log
    pub log_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("branch-reports"),
            report_name: "branches".to_string(),
            log_name: "deleted_branches_log.csv".to_string(),
        }
    }
}

impl OutputConfig {
    /// Path of a report with the given base name under `repo_root`
    pub fn report_path(&self, repo_root: &Path, base_name: Option<&str>) -> PathBuf {
        let base = base_name.unwrap_or(&self.report_name);
        let file = if base.ends_with(".csv") {
            base.to_string()
        } else {
            format!("{}.csv", base)
        };
        repo_root.join(&self.report_dir).join(file)
    }

    /// Path of the deletion log under `repo_root`
    pub fn log_path(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(&self.report_dir).join(&self.log_name)
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Scan configuration
    pub scan: ScanConfig,

    /// Output locations
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// Returns default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if let Some(path) = config_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Get the default config file path
    ///
    /// Returns `~/.config/branchsweep/config.toml` on Unix
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("branchsweep").join("config.toml"))
    }

    /// Apply environment variable overrides
    ///
    /// Supported variables:
    /// - BRANCHSWEEP_REMOTE: Remote to scan and mirror to
    /// - BRANCHSWEEP_REVIEW_DAYS: Review window in days
    /// - BRANCHSWEEP_ENVIRONMENTS: Comma-separated environment branches
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(remote) = std::env::var("BRANCHSWEEP_REMOTE") {
            self.scan.remote = remote;
        }

        if let Ok(days) = std::env::var("BRANCHSWEEP_REVIEW_DAYS") {
            self.scan.review_days = days.trim().parse().map_err(|_| {
                Error::Config(format!("BRANCHSWEEP_REVIEW_DAYS is not a number: {}", days))
            })?;
        }

        if let Ok(envs) = std::env::var("BRANCHSWEEP_ENVIRONMENTS") {
            self.scan.environment_branches = parse_branch_list(&envs);
        }

        Ok(self)
    }

    /// Apply CLI flag overrides
    pub fn with_cli_overrides(mut self, remote: Option<String>, review_days: Option<i64>) -> Self {
        if let Some(remote) = remote {
            self.scan.remote = remote;
        }

        if let Some(days) = review_days {
            self.scan.review_days = days;
        }

        self
    }

    /// Load configuration with file and environment overrides applied
    ///
    /// CLI overrides are applied separately by each command since the
    /// positional arguments differ between them.
    pub fn load_with_env(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load()?,
        };
        base.with_env_overrides()
    }

    /// Check the configuration for values the scan cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.scan.remote.trim().is_empty() {
            return Err(Error::Config("remote name must not be empty".to_string()));
        }

        if self.scan.review_days < 0 {
            return Err(Error::Config(format!(
                "review_days must not be negative (got {})",
                self.scan.review_days
            )));
        }

        let mut seen = HashSet::new();
        for name in &self.scan.environment_branches {
            if name.trim().is_empty() {
                return Err(Error::Config(
                    "environment branch names must not be empty".to_string(),
                ));
            }
            if name == "HEAD" {
                return Err(Error::Config(
                    "HEAD cannot be used as an environment branch".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(Error::Config(format!(
                    "environment branch '{}' is listed twice",
                    name
                )));
            }
        }

        if self.scan.environment_branches.is_empty() {
            tracing::warn!(
                "No environment branches configured; every resolvable ref will be clean"
            );
        }

        Ok(())
    }
}

fn parse_branch_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.scan.remote, "origin");
        assert_eq!(
            config.scan.environment_branches,
            vec!["dev", "qa", "prod", "main"]
        );
        assert_eq!(config.scan.review_days, 14);
        assert_eq!(config.output.log_name, "deleted_branches_log.csv");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_overrides() {
        let config =
            Config::default().with_cli_overrides(Some("upstream".to_string()), Some(30));

        assert_eq!(config.scan.remote, "upstream");
        assert_eq!(config.scan.review_days, 30);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[scan]
remote = "upstream"
environment_branches = ["develop", "master"]
review_days = 7

[output]
report_dir = "reports"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scan.remote, "upstream");
        assert_eq!(config.scan.environment_branches, vec!["develop", "master"]);
        assert_eq!(config.scan.review_days, 7);
        assert_eq!(config.output.report_dir, PathBuf::from("reports"));
        assert_eq!(config.output.report_name, "branches");
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
[scan]
review_days = 3
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.scan.remote, "origin");
        assert_eq!(config.scan.environment_branches.len(), 4);
        assert_eq!(config.scan.review_days, 3);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut config = Config::default();
        config.scan.environment_branches = vec!["main".to_string(), "main".to_string()];
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_head() {
        let mut config = Config::default();
        config.scan.environment_branches = vec!["HEAD".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_report_and_log_paths() {
        let output = OutputConfig::default();
        let root = Path::new("/repo");
        assert_eq!(
            output.report_path(root, None),
            PathBuf::from("/repo/branch-reports/branches.csv")
        );
        assert_eq!(
            output.report_path(root, Some("nightly")),
            PathBuf::from("/repo/branch-reports/nightly.csv")
        );
        assert_eq!(
            output.report_path(root, Some("nightly.csv")),
            PathBuf::from("/repo/branch-reports/nightly.csv")
        );
        assert_eq!(
            output.log_path(root),
            PathBuf::from("/repo/branch-reports/deleted_branches_log.csv")
        );
    }

    #[test]
    fn test_parse_branch_list() {
        assert_eq!(parse_branch_list(" dev, qa ,,main"), vec!["dev", "qa", "main"]);
    }

    #[test]
    fn test_missing_config_file() {
        let result = Config::load_from_file(Path::new("/nonexistent/branchsweep.toml"));
        assert!(matches!(result, Err(Error::MissingFile(_))));
    }
}
