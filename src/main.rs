// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (tracing), controlled by RUST_LOG
// 2. Parse command-line arguments using clap
// 3. Load the bookmark file and run the requested scan through a Session
// 4. Print results, write the output file if one was asked for
// 5. Exit with proper code (0 = clean, 1 = something found, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use bookmark_guardian::bookmarks::format_path;
use bookmark_guardian::checker::InvalidLink;
use bookmark_guardian::{
    HttpProbe, LinkEntry, Monitor, Session, Settings, TracingStatus, UnparseableDates,
};
use clap::Parser;
use cli::{Cli, Commands, RemovalArgs};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so --json output on stdout stays clean
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            file,
            removal,
            json,
            workers,
            timeout,
        } => {
            let settings = Settings {
                workers,
                probe_timeout: Duration::from_secs(timeout),
                summary_limit: removal.summary_limit,
                ..Settings::default()
            };
            handle_check(&file, &removal, settings, json).await
        }
        Commands::Duplicates {
            file,
            removal,
            json,
        } => {
            let settings = Settings {
                summary_limit: removal.summary_limit,
                ..Settings::default()
            };
            handle_duplicates(&file, &removal, settings, json)
        }
        Commands::Prune {
            file,
            removal,
            days,
            expire_unparseable,
            json,
        } => {
            let settings = Settings {
                retention_days: days,
                summary_limit: removal.summary_limit,
                unparseable_dates: if expire_unparseable {
                    UnparseableDates::Expire
                } else {
                    UnparseableDates::Skip
                },
                ..Settings::default()
            };
            handle_prune(&file, &removal, settings, json)
        }
        Commands::Stats { file, json } => handle_stats(&file, json),
    }
}

fn open_session(file: &Path, removal: &RemovalArgs, settings: Settings) -> Result<Session> {
    let probe = HttpProbe::new(settings.probe_timeout).context("failed to create HTTP client")?;
    let mut session = Session::new(Arc::new(probe), removal.decision(), settings);
    tokio::spawn(watch_interrupts(Arc::clone(session.monitor())));
    session.load(file)?;
    Ok(session)
}

// The first Ctrl-C during a check stops dispatching new probes (the ones in
// flight still finish). Any other Ctrl-C, including one at a [y/N] prompt,
// quits right away with the usual 128 + SIGINT exit code.
async fn watch_interrupts(monitor: Arc<Monitor>) {
    while tokio::signal::ctrl_c().await.is_ok() {
        if monitor.cancel() {
            tracing::warn!("cancelling, waiting for running probes to finish (Ctrl-C again to quit)");
        } else {
            eprintln!();
            std::process::exit(130);
        }
    }
}

async fn handle_check(
    file: &Path,
    removal: &RemovalArgs,
    settings: Settings,
    json: bool,
) -> Result<i32> {
    let mut session = open_session(file, removal, settings)?;
    let outcome = session.check_validity(Arc::new(TracingStatus)).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_invalid_table(&outcome.report.invalid_links);
        let counters = outcome.report.counters;
        println!("📊 Summary:");
        println!("   ✅ Valid: {}", counters.valid);
        println!("   ❌ Invalid: {}", counters.invalid);
        println!("   📋 Total: {}", counters.total);
        if outcome.report.cancelled {
            println!("   ⏹️  Cancelled with {} unchecked", counters.pending());
        }
        if let Some(removed) = outcome.removal {
            println!("   🗑️  Deleted: {}", removed.removed);
        }
    }

    save_if_requested(&session, removal)?;

    Ok(if outcome.report.is_clean() { 0 } else { 1 })
}

fn handle_duplicates(
    file: &Path,
    removal: &RemovalArgs,
    settings: Settings,
    json: bool,
) -> Result<i32> {
    let mut session = open_session(file, removal, settings)?;
    let outcome = session.resolve_duplicates()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for group in &outcome.groups {
            println!("🔁 '{}' ({})", group.key.text, group.key.url);
            println!("   keep:   {}", location(group.keep()));
            for extra in group.discard() {
                println!("   delete: {}", location(extra));
            }
        }
        println!();
        println!("📊 Summary:");
        println!("   🔁 Duplicate groups: {}", outcome.groups.len());
        println!("   ✅ Groups cleaned: {}", outcome.accepted);
        println!("   🗑️  Deleted: {}", outcome.removal.removed);
    }

    save_if_requested(&session, removal)?;

    Ok(if outcome.groups.is_empty() { 0 } else { 1 })
}

fn handle_prune(
    file: &Path,
    removal: &RemovalArgs,
    settings: Settings,
    json: bool,
) -> Result<i32> {
    let days = settings.retention_days;
    let mut session = open_session(file, removal, settings)?;
    let outcome = session.remove_expired(chrono::Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        for entry in &outcome.expired {
            println!("🕰️  {:<60} {}", truncate(&entry.url, 57), location(entry));
        }
        println!();
        println!("📊 Summary:");
        println!("   🕰️  Older than {} days: {}", days, outcome.expired.len());
        if let Some(removed) = outcome.removal {
            println!("   🗑️  Deleted: {}", removed.removed);
        }
    }

    save_if_requested(&session, removal)?;

    Ok(if outcome.expired.is_empty() { 0 } else { 1 })
}

fn handle_stats(file: &Path, json: bool) -> Result<i32> {
    let doc = bookmark_guardian::bookmarks::load_file(file)?;
    let stats = doc.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("📁 Folders: {}", stats.headings);
        println!("🔖 Bookmarks: {}", stats.links);
        if let Some(warning) = doc.structure_warning() {
            println!("⚠️  {}", warning);
        }
    }

    Ok(0)
}

fn save_if_requested(session: &Session, removal: &RemovalArgs) -> Result<()> {
    let Some(output) = &removal.output else {
        return Ok(());
    };
    if session.source() == Some(output.as_path()) {
        tracing::warn!("overwriting the loaded export {}", output.display());
    }

    match session.save(output)? {
        bookmark_guardian::SaveOutcome::Saved(stats) => {
            println!(
                "💾 Saved {} folders, {} bookmarks to {}",
                stats.headings,
                stats.links,
                output.display()
            );
        }
        bookmark_guardian::SaveOutcome::Declined => {
            println!("💾 Not saved");
        }
    }
    Ok(())
}

// Prints invalid links as a human-readable table in the terminal
fn print_invalid_table(invalid: &[InvalidLink]) {
    if invalid.is_empty() {
        println!("✅ All bookmarks answered");
        println!();
        return;
    }

    println!("{:<60} {:<25} {:<30}", "URL", "REASON", "LOCATION");
    println!("{}", "=".repeat(115));

    for item in invalid {
        println!(
            "{:<60} {:<25} {:<30}",
            truncate(&item.link.url, 57),
            truncate(&item.reason, 22),
            format_path(&item.link.path)
        );
    }

    println!();
}

fn location(entry: &LinkEntry) -> String {
    let path = entry.location();
    if path.is_empty() {
        "(top level)".to_string()
    } else {
        path
    }
}

// Truncates on a char boundary so multi-byte titles don't panic
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
