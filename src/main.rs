//! Igloo CLI - command line SCP client
//!
//! Usage: igloo [FLAGS] [FILES...]
//!
//! Push local files to a saved remote target, pull or list remote files
//! filtered by regex, or stream stdin straight to a remote file. Remote
//! targets are named profiles (`igloo config add user@host:path [name]`)
//! and key authentication is assumed to be set up for each host.

use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};

use igloo::config::{parse_url, Profile, ProfileStore};
use igloo::executor::{any_failed, OperationStatus, TransferExecutor};
use igloo::fs::{FileSystem, LocalFs};
use igloo::planner::{build_plan, Direction, TransferRequest};
use igloo::selector::Selector;
use igloo::stream::{self, StreamSource};
use igloo::transport::{SshTransport, Transport};

/// Igloo - command line SCP client
#[derive(Parser, Debug)]
#[command(name = "igloo")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Local filepaths to transfer (the remote name with --stream --remote)
    files: Vec<String>,

    /// Remote mode: transfers become downloads
    #[arg(short, long)]
    remote: bool,

    /// Show matching remote filepaths and exit without transferring
    #[arg(short, long)]
    list: bool,

    /// Regular expression to filter filepaths with (e.g. '-e .' matches all)
    #[arg(short, long)]
    expr: Option<String>,

    /// Inverse match
    #[arg(short, long)]
    no_match: bool,

    /// Case insensitive regular expression matching
    #[arg(short = 'i', long)]
    case_insensitive: bool,

    /// Delete the remote copy after a successful download
    #[arg(short = 'm', long = "move")]
    move_source: bool,

    /// Allow transfers to overwrite existing files
    #[arg(short, long)]
    force: bool,

    /// Profile to resolve the remote target from
    #[arg(short, long)]
    profile: Option<String>,

    /// Ad-hoc remote url (user@host:path), overrides any profile
    #[arg(short, long)]
    url: Option<String>,

    /// Read stdin as the file named NAME (with --remote: write NAME to stdout)
    #[arg(short, long, value_name = "NAME")]
    stream: Option<String>,

    /// Ask before transferring each file
    #[arg(short, long)]
    ask: bool,

    /// No per-file output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage remote target profiles
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Add or update a profile (no name updates the default profile)
    Add {
        /// Remote url, user@host:path
        url: String,
        /// Profile name
        name: Option<String>,
    },
    /// Delete a profile
    Delete { name: String },
    /// Print all profiles
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Config { action }) => cmd_config(action.as_ref()),
        None => cmd_transfer(&cli),
    }
}

fn cmd_config(action: Option<&ConfigAction>) -> Result<()> {
    let mut store = ProfileStore::load()?;

    match action {
        None => println!("{}", store.path().display()),
        Some(ConfigAction::Add { url, name }) => {
            let (user, host, path) = parse_url(url)?;
            let profile = store.add(name.as_deref(), user, host, path)?;
            println!("{} [{}]", profile.name, profile.url());
        }
        Some(ConfigAction::Delete { name }) => {
            store.remove(name)?;
        }
        Some(ConfigAction::List) => {
            for profile in store.list() {
                if profile.default {
                    println!("{} [{}] (default)", profile.name, profile.url());
                } else {
                    println!("{} [{}]", profile.name, profile.url());
                }
            }
        }
    }
    Ok(())
}

fn cmd_transfer(cli: &Cli) -> Result<()> {
    let profile = resolve_profile(cli)?;

    let selector = if cli.expr.is_some() || cli.no_match {
        Some(Selector::new(
            cli.expr.as_deref().unwrap_or(""),
            cli.no_match,
            cli.case_insensitive,
        )?)
    } else {
        None
    };

    let request = TransferRequest {
        pull: cli.remote,
        list_only: cli.list,
        force: cli.force,
        move_source: cli.move_source,
        files: cli.files.clone(),
        selector,
        stream: cli.stream.clone(),
    };
    request.validate()?;

    let transport = SshTransport::new(&profile);
    let fs = LocalFs::new();

    // Streaming download short-circuits planning: one remote file, stdout.
    if cli.remote {
        if let Some(name) = &cli.stream {
            let bytes = transport.pull(name)?;
            std::io::stdout().write_all(&bytes)?;
            return Ok(());
        }
    }

    let listing = if request.needs_listing() {
        if cli.remote || cli.list {
            transport.list()?
        } else {
            fs.list_files()?
        }
    } else {
        Vec::new()
    };

    if cli.list {
        for name in request.select_names(&listing) {
            println!("{name}");
        }
        return Ok(());
    }

    let mut plan = build_plan(&request, &listing)?;
    if cli.ask {
        plan.retain(|op| {
            let file = match op.direction {
                Direction::Push => op.remote_name.clone(),
                Direction::Pull => op.local_path.display().to_string(),
            };
            dialoguer::Confirm::new()
                .with_prompt(format!("Transfer {file}?"))
                .default(false)
                .interact()
                .unwrap_or(false)
        });
    }
    if plan.is_empty() {
        return Ok(());
    }

    let source: Option<StreamSource> = match &cli.stream {
        Some(name) => Some(stream::capture_stdin(name)?),
        None => None,
    };

    let reports = TransferExecutor::new(&transport, &fs).execute(&plan, source.as_ref());

    let mut transferred = 0;
    let mut skipped = 0;
    let mut failed = 0;
    for report in &reports {
        match &report.status {
            OperationStatus::Transferred => {
                transferred += 1;
                if !cli.quiet {
                    println!("✓ {}", report.file);
                }
            }
            OperationStatus::Deleted => {
                transferred += 1;
                if !cli.quiet {
                    println!("✓ {} (moved)", report.file);
                }
            }
            OperationStatus::Skipped => {
                skipped += 1;
                if !cli.quiet {
                    println!("- {} (exists, use --force)", report.file);
                }
            }
            OperationStatus::Failed(reason) => {
                failed += 1;
                eprintln!("✗ {}: {}", report.file, reason);
            }
        }
        if let Some(reason) = &report.cleanup_error {
            eprintln!("⚠ {}: remote delete failed: {}", report.file, reason);
        }
    }

    if !cli.quiet {
        println!("{transferred} transferred, {skipped} skipped, {failed} failed");
    }

    if any_failed(&reports) {
        std::process::exit(1);
    }
    Ok(())
}

/// Active remote target for this invocation
///
/// An explicit --url wins over any profile; otherwise the named profile,
/// else the stored default.
fn resolve_profile(cli: &Cli) -> Result<Profile> {
    if let Some(url) = &cli.url {
        let (user, host, path) = parse_url(url)?;
        return Ok(Profile {
            name: "url".to_string(),
            user,
            host,
            path,
            default: false,
        });
    }
    let store = ProfileStore::load()?;
    Ok(store.resolve(cli.profile.as_deref())?.clone())
}
