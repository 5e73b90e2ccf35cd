//! bigfile - find the largest files under a directory and delete the ones you
//! no longer need.
//!
//! Usage:
//!   bigfile [PATH]                     List the largest files
//!   bigfile scan [PATH]                Same, with output options
//!   bigfile clean [PATH] --top 5       Pick files and delete them after confirmation
//!   bigfile --help                     Show help
//!
//! Press Ctrl-C during a scan to stop it and list what was found so far.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bigfile_core::FileRecord;
use bigfile_ops::{DeletionEvent, FAILURE_REPORT_LIMIT, Selection, start_deletion};
use bigfile_scan::{ScanConfig, ScanController, ScanEvent, ScanOutcome, ScanReport};

#[derive(Parser)]
#[command(
    name = "bigfile",
    version,
    about = "Find and remove the largest files under a directory",
    long_about = "bigfile walks a directory tree, lists every file largest first, and \
                  can permanently delete a selection of them.\n\n\
                  Deleted files are NOT moved to the trash."
)]
struct Cli {
    /// Path to scan (defaults to current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Number of files to list
    #[arg(short = 'n', long, default_value = "50")]
    top: usize,

    #[command(flatten)]
    scan: ScanArgs,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan and list files by size, largest first
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Number of files to list
        #[arg(short = 'n', long, default_value = "50")]
        top: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Scan, select files and delete them permanently
    Clean {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        #[command(flatten)]
        select: SelectArgs,

        /// Delete without asking for confirmation
        #[arg(short = 'y', long)]
        yes: bool,

        #[command(flatten)]
        scan: ScanArgs,
    },
}

#[derive(Args, Clone)]
struct ScanArgs {
    /// Files appended between two resorts of the live result list
    #[arg(long, default_value = "100")]
    threshold: usize,

    /// Skip hidden files and directories
    #[arg(long)]
    skip_hidden: bool,

    /// Maximum directory depth to descend
    #[arg(long)]
    max_depth: Option<u32>,

    /// Glob pattern of entry names to skip (repeatable)
    #[arg(long = "ignore", value_name = "PATTERN")]
    ignore: Vec<String>,

    /// Scanner threads (0 = automatic)
    #[arg(long, default_value = "0")]
    threads: usize,

    /// Descend into symlinked directories
    #[arg(long)]
    follow_symlinks: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SelectArgs {
    /// Select files at least this large (e.g., "100MB", "1G")
    #[arg(long)]
    min_size: Option<String>,

    /// Select the N largest files
    #[arg(long, value_name = "N")]
    top: Option<usize>,

    /// Select every file found
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl ScanArgs {
    fn to_config(&self) -> Result<ScanConfig> {
        ScanConfig::builder()
            .resort_threshold(self.threshold)
            .include_hidden(!self.skip_hidden)
            .max_depth(self.max_depth)
            .ignore_patterns(self.ignore.clone())
            .threads(self.threads)
            .follow_symlinks(self.follow_symlinks)
            .build()
            .context("Invalid scan options")
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Scan {
            path,
            top,
            format,
            scan,
        }) => run_scan(&path, &scan, top, format).await?,
        Some(Command::Clean {
            path,
            select,
            yes,
            scan,
        }) => run_clean(&path, &scan, &select, yes).await?,
        None => run_scan(&cli.path, &cli.scan, cli.top, OutputFormat::Text).await?,
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Scan `path`, showing live progress, until the scan finishes or Ctrl-C stops it.
async fn scan(path: &Path, args: &ScanArgs) -> Result<ScanReport> {
    let mut controller = ScanController::new(args.to_config()?);
    let mut events = controller.start(path)?;
    let mut listening = true;

    eprintln!("Scanning {}...", path.display());

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ScanEvent::Progress(progress)) => {
                    eprint!("\rScanning... {} files found", progress.records_found);
                }
                Some(ScanEvent::Partial(_)) => {}
                Some(ScanEvent::Finished(report)) => {
                    eprintln!();
                    return Ok(report);
                }
                None => bail!("Scan ended without a result"),
            },
            signal = tokio::signal::ctrl_c(), if listening => {
                listening = false;
                if interrupted(signal) {
                    eprint!("\rStopping scan...");
                    controller.stop();
                }
            }
        }
    }
}

/// Check a Ctrl-C result. A handler that could not be installed is not an interrupt.
fn interrupted(signal: io::Result<()>) -> bool {
    match signal {
        Ok(()) => true,
        Err(err) => {
            warn!(error = %err, "cannot listen for Ctrl-C");
            false
        }
    }
}

/// Turn a failed scan into an error, after its partial results were shown.
fn check_outcome(report: &ScanReport) -> Result<()> {
    if let ScanOutcome::Failed(err) = &report.outcome {
        warn!(root = %report.root.display(), error = %err, "scan failed");
        bail!("Scan of {} failed: {err}", report.root.display());
    }
    Ok(())
}

/// Print how the scan ended.
fn print_outcome(report: &ScanReport) {
    match &report.outcome {
        ScanOutcome::Completed => eprintln!(
            "Scan complete: {} files found, Total size: {}",
            report.records_found,
            format_size(report.total_size)
        ),
        ScanOutcome::Cancelled => eprintln!(
            "Scan cancelled: {} files found before stopping",
            report.records_found
        ),
        ScanOutcome::Failed(_) => eprintln!(
            "Scan failed: {} files found before the error",
            report.records_found
        ),
    }

    if !report.warnings.is_empty() {
        eprintln!("{} entries could not be read and were skipped", report.warnings.len());
    }
}

/// Run a scan and list the largest files.
async fn run_scan(path: &Path, args: &ScanArgs, top: usize, format: OutputFormat) -> Result<()> {
    let report = scan(path, args).await?;
    let snapshot = report.snapshot();

    match format {
        OutputFormat::Text => {
            print_outcome(&report);
            println!();
            print_records(snapshot.top(top));

            let remaining = snapshot.len().saturating_sub(top);
            if remaining > 0 {
                println!("  ... and {} more", remaining);
            }
        }
        OutputFormat::Json => {
            let outcome = match &report.outcome {
                ScanOutcome::Completed => "completed".to_string(),
                ScanOutcome::Cancelled => "cancelled".to_string(),
                ScanOutcome::Failed(err) => format!("failed: {err}"),
            };
            let json = serde_json::json!({
                "root": report.root,
                "outcome": outcome,
                "records_found": report.records_found,
                "total_size": report.total_size,
                "skipped": report.warnings.len(),
                "files": snapshot.top(top),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    check_outcome(&report)
}

/// Run a scan, select files, confirm and delete them.
async fn run_clean(path: &Path, args: &ScanArgs, select: &SelectArgs, yes: bool) -> Result<()> {
    let min_size = select.min_size.as_deref().map(parse_size).transpose()?;

    let report = scan(path, args).await?;
    print_outcome(&report);
    check_outcome(&report)?;

    let snapshot = report.snapshot();
    let mut selection = Selection::new();
    if select.all {
        selection.select_all(&snapshot);
    } else if let Some(n) = select.top {
        selection.select_top(&snapshot, n);
    } else if let Some(min_size) = min_size {
        selection.select_min_size(&snapshot, min_size);
    }

    if selection.is_empty() {
        println!("No files selected. Nothing to delete.");
        return Ok(());
    }

    println!();
    print_records(selection.records());
    println!();
    println!("{}", selection.summary());
    println!();
    println!("{}", selection.confirmation_message());

    if !yes && !confirm()? {
        println!("Deletion cancelled.");
        return Ok(());
    }

    let mut events = start_deletion(report.store, selection.into_records());
    let mut outcome = None;
    while let Some(event) = events.recv().await {
        match event {
            DeletionEvent::Progress(progress) => {
                eprint!("\rDeleting... {}/{}", progress.processed(), progress.total);
            }
            DeletionEvent::Complete { outcome: done, .. } => {
                eprintln!();
                outcome = Some(done);
            }
        }
    }

    let Some(outcome) = outcome else {
        bail!("Deletion ended without a result");
    };

    info!(
        deleted = outcome.deleted,
        failed = outcome.failed(),
        bytes_freed = outcome.bytes_freed,
        "clean finished"
    );

    println!("{}", outcome.summary());
    if !outcome.is_success() {
        println!();
        println!("{}", outcome.failure_report(FAILURE_REPORT_LIMIT));
    }

    Ok(())
}

/// Ask for a yes/no answer on stdin. Anything but yes means no.
fn confirm() -> Result<bool> {
    print!("Proceed? [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Print records as a size table.
fn print_records(records: &[FileRecord]) {
    println!("{:>16} {:>12}  {}", "Size (bytes)", "Size (MB)", "File Path");
    println!("{}", "─".repeat(70));
    for record in records {
        println!(
            "{:>16} {:>12.2}  {}",
            group_thousands(record.size),
            record.size_mib(),
            record.path.display()
        );
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Render a byte count with comma thousands separators.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Parse a size string (e.g., "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let number = s.trim_end_matches(|c: char| !c.is_ascii_digit() && c != '.');
    let unit = &s[number.len()..];

    let multiplier: u64 = match unit {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        "T" | "TB" => 1024 * 1024 * 1024 * 1024,
        other => bail!("Unknown size unit {other:?}"),
    };

    let num: f64 = number
        .parse()
        .with_context(|| format!("Invalid size {s:?}"))?;
    if !num.is_finite() || num < 0.0 {
        bail!("Invalid size {s:?}");
    }

    Ok((num * multiplier as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigfile_scan::ScanError;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("512").unwrap(), 512);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("1.5m").unwrap(), 1024 * 1024 + 512 * 1024);
        assert_eq!(parse_size(" 2G ").unwrap(), 2 * 1024 * 1024 * 1024);
        assert!(parse_size("10XB").is_err());
        assert!(parse_size("MB").is_err());
    }

    #[test]
    fn test_parse_size_rejects_negative_and_infinite() {
        assert!(parse_size("-5G").is_err());
        assert!(parse_size("-0.5").is_err());
        assert!(parse_size("1e400").is_err());
        assert!(parse_size("inf").is_err());
        assert!(parse_size("NaN").is_err());

        // Rejected before any scan starts.
        let cli = Cli::try_parse_from(["bigfile", "clean", "/tmp", "--min-size=-5G"]).unwrap();
        let Some(Command::Clean { select, .. }) = cli.command else {
            panic!("expected the clean command");
        };
        assert!(select.min_size.as_deref().map(parse_size).transpose().is_err());
    }

    fn report_with(outcome: ScanOutcome) -> ScanReport {
        ScanReport {
            root: PathBuf::from("/missing"),
            outcome,
            store: Default::default(),
            records_found: 0,
            total_size: 0,
            warnings: Vec::new(),
            elapsed: Default::default(),
        }
    }

    #[test]
    fn test_failed_scan_is_an_error() {
        let failed = report_with(ScanOutcome::Failed(ScanError::NotFound {
            path: PathBuf::from("/missing"),
        }));
        let err = check_outcome(&failed).unwrap_err();
        assert!(err.to_string().starts_with("Scan of /missing failed"));

        assert!(check_outcome(&report_with(ScanOutcome::Completed)).is_ok());
        assert!(check_outcome(&report_with(ScanOutcome::Cancelled)).is_ok());
    }

    #[test]
    fn test_signal_errors_do_not_stop_the_scan() {
        assert!(interrupted(Ok(())));
        assert!(!interrupted(Err(io::Error::other("no signal handler"))));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_cli_requires_a_selection() {
        assert!(Cli::try_parse_from(["bigfile", "clean", "/tmp"]).is_err());
        assert!(Cli::try_parse_from(["bigfile", "clean", "/tmp", "--top", "3", "--all"]).is_err());
        assert!(Cli::try_parse_from(["bigfile", "clean", "/tmp", "--top", "3"]).is_ok());
    }

    #[test]
    fn test_scan_args_map_to_config() {
        let cli = Cli::try_parse_from(["bigfile", "--skip-hidden", "--threshold", "250", "--ignore", "*.log"]).unwrap();
        let config = cli.scan.to_config().unwrap();
        assert!(!config.include_hidden);
        assert_eq!(config.resort_threshold, 250);
        assert_eq!(config.ignore_patterns, vec!["*.log".to_string()]);
    }
}
