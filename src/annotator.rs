use crate::decision::decide;
use crate::errors::{AppError, AppResult};
use crate::frontmatter::{parse_note, render_note, value_kind, Frontmatter, ParsedNote};
use crate::models::{Action, AnnotatorSettings, NoteOutcome, RunSummary};
use chrono::Utc;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Counts actual rewrites against an optional per-run limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeBudget {
    limit: Option<usize>,
    used: usize,
}

impl ChangeBudget {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    pub fn is_exhausted(&self) -> bool {
        self.limit.map_or(false, |limit| self.used >= limit)
    }

    pub fn used(&self) -> usize {
        self.used
    }

    fn consume(&mut self) {
        self.used = self.used.saturating_add(1);
    }
}

/// Walks the vault root and annotates every note file.
///
/// Per-note failures are logged and counted; only an unusable root is an error.
/// Once the budget runs out the walk keeps scanning so skipped notes are
/// still reported.
pub fn annotate_vault(settings: &AnnotatorSettings) -> AppResult<RunSummary> {
    let root = settings
        .root
        .as_deref()
        .ok_or_else(|| AppError::Cli("no vault root configured".to_string()))?;
    if !root.is_dir() {
        return Err(AppError::Cli(format!(
            "vault root is not a directory: {}",
            root.to_string_lossy()
        )));
    }

    let mut summary = RunSummary {
        dry_run: settings.dry_run,
        started_at: Some(Utc::now()),
        ..RunSummary::default()
    };
    let mut budget = ChangeBudget::new(settings.max_changes);

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                let error = AppError::from(error);
                tracing::error!(error = %error, "skipping unreadable vault entry");
                summary.record_failure();
                continue;
            }
        };
        let path = entry.path();
        if !settings.is_note_file(path) || !path.is_file() {
            continue;
        }

        match annotate_note(path, settings, &mut budget) {
            Ok(outcome) => summary.record(path, outcome, settings.skipped_sample_limit),
            Err(error @ AppError::MalformedHeader(_)) => {
                tracing::warn!(path = %path.to_string_lossy(), error = %error, "skipping note with invalid frontmatter");
                summary.record_failure();
            }
            Err(error) => {
                tracing::error!(path = %path.to_string_lossy(), error = %error, "failed to annotate note");
                summary.record_failure();
            }
        }
    }

    summary.finished_at = Some(Utc::now());
    Ok(summary)
}

/// Reads, decides and (when needed) rewrites a single note.
pub fn annotate_note(
    path: &Path,
    settings: &AnnotatorSettings,
    budget: &mut ChangeBudget,
) -> AppResult<NoteOutcome> {
    let content = fs::read_to_string(path).map_err(|error| io_error(path, error))?;
    annotate_content(path, &content, settings, budget)
}

/// Decides and applies the action for already-read note content.
///
/// Budget is only spent once the rewrite has succeeded.
fn annotate_content(
    path: &Path,
    content: &str,
    settings: &AnnotatorSettings,
    budget: &mut ChangeBudget,
) -> AppResult<NoteOutcome> {
    let mut frontmatter = match parse_note(content) {
        Ok(ParsedNote::Annotatable(frontmatter)) => frontmatter,
        Ok(ParsedNote::NoHeader) => {
            tracing::debug!(path = %path.to_string_lossy(), "no frontmatter; skipping");
            return Ok(NoteOutcome::NoHeader);
        }
        Err(AppError::MalformedHeader(message)) => {
            return Err(AppError::MalformedHeader(format!(
                "{}: {}",
                path.to_string_lossy(),
                message
            )));
        }
        Err(error) => return Err(error),
    };

    let score = frontmatter.get(&settings.score_field);
    let icon = frontmatter.get(&settings.icon_field);
    if score.is_none() && icon.is_none() {
        return Ok(NoteOutcome::Irrelevant);
    }

    let score_display = describe(score);
    tracing::debug!(
        path = %path.to_string_lossy(),
        score = %score_display,
        icon = %describe(icon),
        "inspecting note"
    );

    let action = decide(score, icon, &settings.marker);
    if action.is_mutation() && budget.is_exhausted() {
        tracing::info!(
            path = %path.to_string_lossy(),
            action = action.as_str(),
            "change budget exhausted; leaving note untouched"
        );
        return Ok(NoteOutcome::BudgetExceeded);
    }

    match action {
        Action::NoOp => Ok(NoteOutcome::Unchanged),
        Action::WarnOrphan => {
            tracing::warn!(
                path = %path.to_string_lossy(),
                icon = %settings.marker,
                "note carries the bookmark icon but has no quality score field"
            );
            Ok(NoteOutcome::Orphan)
        }
        Action::AddIcon => {
            frontmatter.set(&settings.icon_field, Value::String(settings.marker.clone()));
            write_note(path, &frontmatter, settings.dry_run)?;
            budget.consume();
            tracing::info!(
                path = %path.to_string_lossy(),
                score = %score_display,
                dry_run = settings.dry_run,
                "added bookmark icon"
            );
            Ok(NoteOutcome::Added)
        }
        Action::RemoveIcon => {
            frontmatter.remove(&settings.icon_field);
            write_note(path, &frontmatter, settings.dry_run)?;
            budget.consume();
            tracing::info!(
                path = %path.to_string_lossy(),
                score = %score_display,
                dry_run = settings.dry_run,
                "removed bookmark icon"
            );
            Ok(NoteOutcome::Removed)
        }
    }
}

fn write_note(path: &Path, frontmatter: &Frontmatter, dry_run: bool) -> AppResult<()> {
    let rendered = render_note(frontmatter)?;
    if dry_run {
        return Ok(());
    }
    fs::write(path, rendered).map_err(|error| io_error(path, error))
}

fn io_error(path: &Path, error: std::io::Error) -> AppError {
    AppError::Io(format!("{}: {}", path.to_string_lossy(), error))
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "absent".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::String(text)) => format!("'{}'", text),
        Some(other) => value_kind(other).to_string(),
    }
}
