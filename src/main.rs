//! Gryff-Archive main entry point
//!
//! This is the command-line interface for the Gryff-Archive catalog archiver.

use clap::Parser;
use gryff_archive::config::{load_config_with_hash, Config};
use gryff_archive::output::{print_report, write_markdown_report};
use gryff_archive::{Archiver, EntryRef, HttpSession, ReadySession};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Gryff-Archive: archive your gryffs from a logged-in session
///
/// Gryff-Archive reads each entry's detail page, downloads its images and
/// writes one self-contained directory with an `info.json` manifest per
/// entry.
#[derive(Parser, Debug)]
#[command(name = "gryff-archive")]
#[command(version)]
#[command(about = "Archive catalog entries from an authenticated session", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Archive only this entry id (repeatable); skips enumeration
    #[arg(long = "entry", value_name = "ID")]
    entries: Vec<String>,

    /// Archive the entries of this user instead of the configured or logged-in one
    #[arg(long, value_name = "ID", conflicts_with = "entries")]
    user: Option<String>,

    /// List the entries that would be archived without downloading anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let session = confirm_session(&config).await?;
    let archiver = Archiver::new(&config, session)?;

    let entries = match resolve_entries(&cli, &config, &archiver).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Failed to determine entries to archive: {}", e);
            return Err(e);
        }
    };

    if cli.dry_run {
        handle_dry_run(&archiver, &entries);
        return Ok(());
    }

    handle_archive(&config, &archiver, &entries).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gryff_archive=info,warn"),
            1 => EnvFilter::new("gryff_archive=debug,info"),
            2 => EnvFilter::new("gryff_archive=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Waits for the operator to log in and hands back a confirmed session
///
/// Without a configured cookie the operator pastes the `Cookie` header of
/// their logged-in browser; otherwise they only confirm the login.
async fn confirm_session(
    config: &Config,
) -> Result<ReadySession<HttpSession>, Box<dyn std::error::Error>> {
    let base_url = Url::parse(&config.catalog.base_url)?;

    let cookie = match &config.session.cookie {
        Some(cookie) => {
            println!(
                "Make sure you are logged in to {} with the configured session cookie.",
                base_url
            );
            println!("Press ENTER to continue...");
            read_line().await?;
            Some(cookie.clone())
        }
        None => {
            println!("Log in to {} in your browser.", base_url);
            println!("Then paste the request's Cookie header here and press ENTER:");
            let line = read_line().await?;
            let line = line.trim().to_string();
            if line.is_empty() {
                tracing::warn!("No cookie given, continuing without credentials");
                None
            } else {
                Some(line)
            }
        }
    };

    let session = HttpSession::new(&config.session, &base_url, cookie.as_deref())?;
    Ok(ReadySession::operator_confirmed(session))
}

async fn read_line() -> std::io::Result<String> {
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await?;
    Ok(line)
}

/// Picks the entries of this run: explicit ids, or the user's listing
async fn resolve_entries(
    cli: &Cli,
    config: &Config,
    archiver: &Archiver<HttpSession>,
) -> Result<Vec<EntryRef>, Box<dyn std::error::Error>> {
    if !cli.entries.is_empty() {
        tracing::info!("Archiving {} entries given on the command line", cli.entries.len());
        return Ok(cli
            .entries
            .iter()
            .map(|id| archiver.entry_for_id(id))
            .collect::<Result<Vec<_>, _>>()?);
    }

    let user_id = match cli.user.as_ref().or(config.catalog.user_id.as_ref()) {
        Some(user) => {
            let user = user.trim();
            if user.is_empty() || !user.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("user id must be numeric, got {:?}", user).into());
            }
            user.to_string()
        }
        None => {
            let user = archiver.discover_user_id().await?;
            tracing::info!("Logged in as user {}", user);
            user
        }
    };

    Ok(archiver.list_entries(&user_id).await?)
}

/// Handles the --dry-run mode: shows what would be archived
fn handle_dry_run(archiver: &Archiver<HttpSession>, entries: &[EntryRef]) {
    println!("=== Gryff-Archive Dry Run ===\n");

    println!("Catalog:");
    println!("  Entity kind: {}", archiver.catalog().entity_kind());
    println!("  Archive root: {}", archiver.layout().root().display());

    println!("\nEntries ({}):", entries.len());
    for entry in entries {
        println!("  - {} ({})", entry.id, entry.url);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would archive {} entries", entries.len());
}

/// Handles the main archive operation
async fn handle_archive(
    config: &Config,
    archiver: &Archiver<HttpSession>,
    entries: &[EntryRef],
) -> Result<(), Box<dyn std::error::Error>> {
    let report = archiver.archive_all(entries).await;

    println!();
    print_report(&report);

    if let Some(summary_path) = &config.output.summary_path {
        let path = Path::new(summary_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        write_markdown_report(&report, path)?;
        println!("\n✓ Summary written to: {}", summary_path);
    }

    Ok(())
}
