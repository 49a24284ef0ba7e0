//! branchsweep CLI - branch reports and log-driven branch deletion
//!
//! `report` classifies every remote-tracking branch, `delete-local` removes
//! the clean ones locally and logs them, `delete-remote` and `restore-push`
//! replay the log against a remote.

mod commands;

use std::path::PathBuf;

use branchsweep_core::Config;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{DeleteLocalArgs, MirrorArgs, ReportArgs};

/// branchsweep: report on stale branches and delete them with an audit log
#[derive(Parser, Debug)]
#[command(name = "branchsweep")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (overrides the default location)
    #[arg(long, global = true, env = "BRANCHSWEEP_CONFIG")]
    config: Option<PathBuf>,

    /// Run as if started in this directory
    #[arg(short = 'C', long = "repo", global = true)]
    repo: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Classify remote-tracking branches and write the CSV report
    #[command(visible_alias = "r")]
    Report(ReportArgs),

    /// Delete branches marked clean in the report and log each deletion
    DeleteLocal(DeleteLocalArgs),

    /// Delete every logged branch on the remote
    DeleteRemote(MirrorArgs),

    /// Push logged branches that were restored locally back to the remote
    RestorePush(MirrorArgs),

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load configuration; CLI positionals are applied per command
    let config = Config::load_with_env(cli.config.as_deref())?;

    if cli.verbose {
        tracing::info!(
            remote = %config.scan.remote,
            environments = ?config.scan.environment_branches,
            review_days = config.scan.review_days,
            "Configuration loaded"
        );
    }

    let repo_path = cli.repo.as_deref();

    match cli.command {
        Some(Commands::Version) => {
            println!("branchsweep {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Report(args)) => {
            args.execute(config, repo_path)?;
        }
        Some(Commands::DeleteLocal(args)) => {
            args.execute(&config, repo_path)?;
        }
        Some(Commands::DeleteRemote(args)) => {
            args.delete_remote(config, repo_path)?;
        }
        Some(Commands::RestorePush(args)) => {
            args.restore_push(config, repo_path)?;
        }
        Some(Commands::Config) => {
            println!("branchsweep Configuration");
            println!("=========================");
            println!();
            println!("Scan Settings:");
            println!("  remote: {}", config.scan.remote);
            println!(
                "  environment_branches: {}",
                config.scan.environment_branches.join(", ")
            );
            println!("  review_days: {}", config.scan.review_days);
            println!();
            println!("Output Settings:");
            println!("  report_dir: {}", config.output.report_dir.display());
            println!("  report_name: {}", config.output.report_name);
            println!("  log_name: {}", config.output.log_name);
            println!();
            let path = cli.config.clone().or_else(Config::default_config_path);
            if let Some(path) = path {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("branchsweep - stale branch reports and log-driven deletion");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
