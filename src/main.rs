//! # codeplag CLI
//!
//! ```bash
//! # every pair inside two directories
//! codeplag check --extension py --directories labs/alice labs/bob
//!
//! # each submission against its reference, reports written to disk
//! codeplag check --extension cpp --mode one-to-one \
//!     --files new/a.cpp new/b.cpp --reference-files ref/a.cpp ref/b.cpp \
//!     --reports-directory reports
//! ```
//!
//! Without `--reports-directory`, reports are printed to stdout as JSON lines.
//! Logs always go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use codeplag::{
    CodeplagConfig, CorpusOrchestrator, Language, Mode, ReportBuilder, ReportWriter,
    SkippedUnit, SourceUnit, WorkLoader,
};
use signal_hook::consts::SIGINT;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Structural plagiarism detection for Python and C/C++ sources.
#[derive(Parser)]
#[command(name = "codeplag", version, about)]
struct Cli {
    /// YAML configuration file; flags override its values.
    #[arg(long, global = true, env = "CODEPLAG_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `codeplag=debug`. `RUST_LOG` wins if set.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare works and report structurally similar pairs.
    Check(CheckArgs),
}

#[derive(Args)]
struct CheckArgs {
    /// Source language of the works.
    #[arg(long, short = 'e')]
    extension: Language,

    /// Explicit files to check.
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Directories searched recursively for works.
    #[arg(long, num_args = 1..)]
    directories: Vec<PathBuf>,

    /// Reference files; paired index-wise with the primary list in one-to-one mode.
    #[arg(long, num_args = 1..)]
    reference_files: Vec<PathBuf>,

    #[arg(long, num_args = 1..)]
    reference_directories: Vec<PathBuf>,

    /// Only load files whose name matches this regular expression.
    #[arg(long)]
    regexp: Option<String>,

    /// `many-to-many` or `one-to-one`.
    #[arg(long)]
    mode: Option<Mode>,

    /// Match threshold in percent (0-100).
    #[arg(long, short = 't')]
    threshold: Option<u8>,

    /// Write one JSON file per compared pair into this directory.
    #[arg(long)]
    reports_directory: Option<PathBuf>,

    /// Write the run summary (counts, skipped units and pairs) to this file.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Worker threads; defaults to the available parallelism.
    #[arg(long)]
    workers: Option<usize>,

    /// Log completion in 10% steps.
    #[arg(long)]
    show_progress: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => CodeplagConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CodeplagConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.log_json;
    init_tracing(&config.logging.level, config.logging.json);

    match cli.command {
        Command::Check(args) => check(config, args),
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn check(mut config: CodeplagConfig, args: CheckArgs) -> Result<ExitCode> {
    if let Some(threshold) = args.threshold {
        config.compare.threshold = threshold;
    }
    if let Some(mode) = args.mode {
        config.run.mode = mode;
    }
    if let Some(workers) = args.workers {
        config.run.workers = Some(workers);
    }
    config.run.show_progress |= args.show_progress;
    config.validate()?;

    if args.files.is_empty() && args.directories.is_empty() {
        bail!("nothing to check: pass --files or --directories");
    }

    let mut skipped = Vec::new();
    let primary = load(
        WorkLoader::new(args.extension)
            .files(args.files)
            .directories(args.directories),
        args.regexp.as_deref(),
        &mut skipped,
    )?;
    let reference = load(
        WorkLoader::new(args.extension)
            .files(args.reference_files)
            .directories(args.reference_directories),
        args.regexp.as_deref(),
        &mut skipped,
    )?;

    let cancel = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&cancel))
        .context("installing the SIGINT handler")?;

    let orchestrator = CorpusOrchestrator::new(
        config.extract_config(),
        config.compare.clone(),
        config.run.clone(),
    )?
    .with_cancel_flag(cancel);
    let outcome = orchestrator.run(primary, reference)?;

    let builder = ReportBuilder::new(&config.compare, outcome.mode);
    let reports = builder.build_all(&outcome);
    let mut summary = builder.summary(&outcome);
    summary.skipped_units.extend(skipped);
    summary.skipped_units.sort_by(|a, b| a.origin.cmp(&b.origin));

    match &args.reports_directory {
        Some(dir) => {
            let writer = ReportWriter::new(dir)?;
            let written = writer.write_all(&reports)?;
            info!(dir = %dir.display(), written, "reports_saved");
        }
        None => {
            let mut out = io::stdout().lock();
            for report in &reports {
                serde_json::to_writer(&mut out, report)?;
                out.write_all(b"\n")?;
            }
            out.flush()?;
        }
    }

    if let Some(path) = &args.summary {
        summary.save(path)?;
        info!(path = %path.display(), "summary_saved");
    }

    for unit in &summary.skipped_units {
        warn!(origin = %unit.origin, reason = %unit.reason, "unit_skipped");
    }
    info!(
        compared = summary.compared_pairs,
        matched = summary.matched_pairs,
        skipped_units = summary.skipped_units.len(),
        skipped_pairs = summary.skipped_pairs.len(),
        "check_finished"
    );

    Ok(if summary.interrupted {
        ExitCode::from(130)
    } else {
        ExitCode::SUCCESS
    })
}

/// Drain a loader. Per-file failures become skipped units; fatal ones abort.
fn load(
    loader: WorkLoader,
    pattern: Option<&str>,
    skipped: &mut Vec<SkippedUnit>,
) -> Result<Vec<SourceUnit>> {
    let loader = match pattern {
        Some(pattern) => loader.with_pattern(pattern)?,
        None => loader,
    };
    let mut units = Vec::new();
    for item in loader {
        match item {
            Ok(unit) => units.push(unit),
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => skipped.push(SkippedUnit {
                origin: err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
                reason: err.to_string(),
            }),
        }
    }
    Ok(units)
}
