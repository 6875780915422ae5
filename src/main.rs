use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::debug;

use pkgver::config::{Config, log_path};
use pkgver::{RevisionList, Version, VersionRange, logging};

#[derive(Parser)]
#[command(name = "pkgver")]
#[command(version, about = "Version-range resolution and revision ledgers")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Force (true) or forbid (false) pre-release resolution
    #[arg(long, global = true)]
    prerelease: Option<bool>,

    /// Log to the data directory instead of stderr
    #[arg(long, global = true)]
    log_to_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check whether VERSION is inside RANGE
    Satisfies { range: String, version: String },
    /// Print the greatest VERSION inside RANGE
    Resolve {
        range: String,
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// Compare two versions
    Compare { left: String, right: String },
    /// Edit a revision list read from stdin
    Revisions {
        #[command(subcommand)]
        action: RevisionAction,
    },
}

#[derive(Subcommand)]
enum RevisionAction {
    /// Add a revision and print the updated list
    Add { revision: String },
    /// Remove a revision and print the updated list
    Remove { revision: String },
    /// Print the latest revision
    Latest,
    /// Print revisions, latest first
    List,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if cli.prerelease.is_some() {
        config.resolve_prerelease = cli.prerelease;
    }
    if cli.log_to_file && config.log.file.is_none() {
        config.log.file = Some(log_path());
    }
    let _guard = logging::init(&config.log)?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Satisfies { range, version } => {
            let range = VersionRange::parse(&range)?;
            let version = Version::parse(&version)?;
            let contained = range.contains(&version, config.resolve_prerelease);
            println!("{contained}");
            Ok(exit_code(contained))
        }
        Command::Resolve { range, versions } => {
            let range = VersionRange::parse(&range)?;
            let candidates = versions
                .iter()
                .map(|v| Version::parse(v))
                .collect::<Result<Vec<_>, _>>()?;
            let best = range.max_satisfying(&candidates, config.resolve_prerelease);
            if let Some(version) = best {
                println!("{version}");
            }
            Ok(exit_code(best.is_some()))
        }
        Command::Compare { left, right } => {
            let ordering = Version::parse(&left)?.cmp(&Version::parse(&right)?);
            let symbol = match ordering {
                std::cmp::Ordering::Less => "<",
                std::cmp::Ordering::Equal => "=",
                std::cmp::Ordering::Greater => ">",
            };
            println!("{left} {symbol} {right}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Revisions { action } => run_revisions(action),
    }
}

fn run_revisions(action: RevisionAction) -> anyhow::Result<ExitCode> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read revision list from stdin")?;
    let mut list = if input.trim().is_empty() {
        RevisionList::new()
    } else {
        RevisionList::loads(&input)?
    };

    match action {
        RevisionAction::Add { revision } => {
            list.add_revision(&revision);
            println!("{}", list.dumps());
        }
        RevisionAction::Remove { revision } => {
            list.remove_revision(&revision);
            println!("{}", list.dumps());
        }
        RevisionAction::Latest => {
            let Some(latest) = list.latest_revision() else {
                return Ok(ExitCode::FAILURE);
            };
            println!("{}", format_entry(latest));
        }
        RevisionAction::List => {
            for entry in list.as_list() {
                println!("{}", format_entry(&entry));
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn format_entry(entry: &pkgver::RevisionEntry) -> String {
    let time = entry
        .to_iso8601()
        .unwrap_or_else(|| entry.time.to_string());
    format!("{}\t{}", entry.revision, time)
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
