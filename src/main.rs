//! sheaf - CLI entry point.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use sheaf::provider::check_git_installed;
use sheaf::{
    BatchCommitter, BatchError, ChangeGroup, EngineConfig, GitCliProvider, GitProvider,
    InboundAnalyzer, InboundChanges, InboundError,
};

/// Group pending changes into conventional commits and check inbound history.
#[derive(Parser, Debug)]
#[command(name = "sheaf")]
#[command(about = "Group pending changes into conventional commits")]
#[command(version)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the proposed commit groups without committing
    Plan {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Commit every proposed group, rolling back on failure
    Commit {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Show the plan and stop
        #[arg(long)]
        dry_run: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Fetch and report inbound changes that overlap local staged work
    Inbound {
        /// Remote to compare against (defaults to SHEAF_REMOTE or origin)
        #[arg(long)]
        remote: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error[{}]: {:#}", error_code(&e), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    check_git_installed().context("git is required")?;

    let workdir = std::env::current_dir().context("Could not read current directory")?;

    match cli.command {
        Command::Plan { json } => {
            let provider = GitCliProvider::new(workdir, &EngineConfig::from_env());
            let status = provider.status().await?;
            let groups = BatchCommitter::new(&provider).plan().await?;

            if json {
                print_json(&groups)?;
            } else {
                println!(
                    "On branch {}: {} staged, {} unstaged, {} untracked",
                    status.branch, status.staged, status.unstaged, status.untracked
                );
                println!();
                print_groups(&groups);
            }
        }
        Command::Commit { yes, dry_run, json } => {
            let provider = GitCliProvider::new(workdir, &EngineConfig::from_env());
            let committer = BatchCommitter::new(&provider);
            let groups = committer.plan().await?;

            if !json {
                print_groups(&groups);
            }

            if dry_run {
                if json {
                    print_json(&groups)?;
                } else {
                    println!("Dry run complete. No changes made.");
                }
                return Ok(());
            }

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Create {} commit(s)?", groups.len()))
                    .default(true)
                    .interact()
                    .context("Confirmation prompt failed")?;
                if !confirmed {
                    println!("Cancelled. No changes made.");
                    return Ok(());
                }
            }

            let commits = committer.execute_batch(&groups).await?;
            if json {
                print_json(&commits)?;
            } else {
                for commit in &commits {
                    let short = commit.hash.get(..7).unwrap_or(&commit.hash);
                    println!("✓ {} {}", short, commit.message);
                }
            }
        }
        Command::Inbound { remote, json } => {
            let config = EngineConfig::from_env().with_remote(remote.as_deref());
            let provider = GitCliProvider::new(workdir, &config);
            let report = InboundAnalyzer::new(&provider, config.remote.clone())
                .analyze()
                .await?;

            if json {
                print_json(&report)?;
            } else {
                print_inbound(&report);
            }
        }
    }

    Ok(())
}

fn print_groups(groups: &[ChangeGroup]) {
    for (i, group) in groups.iter().enumerate() {
        println!(
            "{}. {} (similarity {:.2})",
            i + 1,
            group.suggested_message.full,
            group.similarity
        );
        for file in &group.files {
            println!("     {:<8} {}", file.status, file.path);
        }
    }
    println!();
}

fn print_inbound(report: &InboundChanges) {
    println!("{} ({}/{})", report.summary.description, report.remote, report.branch);

    if !report.conflicts.is_empty() {
        println!();
        println!("Conflicts:");
        for c in &report.conflicts {
            println!(
                "  [{}] {} (local {}, remote {})",
                c.severity,
                c.path,
                c.local_status.code(),
                c.remote_status.code()
            );
        }
    }

    if !report.summary.file_types.is_empty() {
        println!();
        println!("Inbound file types:");
        for (ext, count) in &report.summary.file_types {
            println!("  {ext}: {count}");
        }
    }

    println!();
    for rec in &report.summary.recommendations {
        println!("- {rec}");
    }
    println!();
    println!("Compare: {}", report.comparison.as_str());
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let out = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{out}");
    Ok(())
}

/// Best-effort error code for the top-level error.
fn error_code(err: &anyhow::Error) -> String {
    if let Some(e) = err.downcast_ref::<BatchError>() {
        return e.code().to_string();
    }
    if let Some(e) = err.downcast_ref::<InboundError>() {
        return e.code().to_string();
    }
    if let Some(e) = err.downcast_ref::<sheaf::ProviderError>() {
        return e.code().to_string();
    }
    "ERROR".to_string()
}
