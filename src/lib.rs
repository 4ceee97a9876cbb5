mod cli;

pub mod annotator;
pub mod decision;
pub mod errors;
pub mod frontmatter;
pub mod models;

pub use crate::annotator::{annotate_note, annotate_vault, ChangeBudget};
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{Action, AnnotatorSettings, NoteOutcome, RunSummary};

use crate::cli::Cli;
use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    if let Err(error) = init_tracing(cli.log_dir.as_deref()).map_err(AppError::from) {
        eprintln!("failed to initialize logging: {}", error);
        return ExitCode::FAILURE;
    }

    match cli.settings().and_then(|settings| annotate_vault(&settings)) {
        Ok(summary) => {
            log_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(error = %error, "annotator run aborted");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_dir: Option<&Path>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let console = tracing_subscriber::fmt::layer().with_target(false);

    let file = match log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir)
                .with_context(|| format!("creating log directory {}", log_dir.to_string_lossy()))?;
            let file_appender = tracing_appender::rolling::daily(log_dir, "annotator.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let _ = LOG_GUARD.set(guard);
            Some(tracing_subscriber::fmt::layer().json().with_writer(non_blocking))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .context("installing tracing subscriber")
}

fn log_summary(summary: &RunSummary) {
    let elapsed_ms = match (summary.started_at, summary.finished_at) {
        (Some(started), Some(finished)) => (finished - started).num_milliseconds(),
        _ => 0,
    };

    tracing::info!(
        scanned = summary.scanned,
        relevant = summary.relevant,
        added = summary.added,
        removed = summary.removed,
        orphaned = summary.orphaned,
        skipped = summary.skipped,
        no_header = summary.no_header,
        failed = summary.failed,
        dry_run = summary.dry_run,
        elapsed_ms,
        "annotation run complete"
    );
    tracing::info!("processed {} notes with a quality score or icon", summary.relevant);
    tracing::info!("added icon to {} notes", summary.added);
    tracing::info!("removed icon from {} notes", summary.removed);
    if summary.orphaned > 0 {
        tracing::warn!("{} notes carry the icon without a quality score", summary.orphaned);
    }
    if summary.failed > 0 {
        tracing::warn!("{} entries could not be processed", summary.failed);
    }
    if summary.skipped > 0 {
        tracing::warn!(
            "change budget exhausted: {} notes left untouched (showing {})",
            summary.skipped,
            summary.skipped_sample.len()
        );
        for path in &summary.skipped_sample {
            tracing::warn!(path = %path.to_string_lossy(), "skipped");
        }
    }
}
