use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MARKER: &str = "LiBookmark";
pub const DEFAULT_SCORE_FIELD: &str = "Quality Score";
pub const DEFAULT_ICON_FIELD: &str = "icon";
pub const DEFAULT_NOTE_EXTENSION: &str = "md";
pub const DEFAULT_SKIPPED_SAMPLE_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnnotatorSettings {
    pub root: Option<PathBuf>,
    pub extension: String,
    pub score_field: String,
    pub icon_field: String,
    pub marker: String,
    /// Upper bound on files actually rewritten in one run. `None` is unbounded.
    pub max_changes: Option<usize>,
    pub dry_run: bool,
    pub skipped_sample_limit: usize,
}

impl Default for AnnotatorSettings {
    fn default() -> Self {
        Self {
            root: None,
            extension: DEFAULT_NOTE_EXTENSION.to_string(),
            score_field: DEFAULT_SCORE_FIELD.to_string(),
            icon_field: DEFAULT_ICON_FIELD.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            max_changes: None,
            dry_run: false,
            skipped_sample_limit: DEFAULT_SKIPPED_SAMPLE_LIMIT,
        }
    }
}

impl AnnotatorSettings {
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    pub fn is_note_file(&self, path: &Path) -> bool {
        let suffix = format!(".{}", self.extension);
        path.file_name()
            .map(|name| name.to_string_lossy().ends_with(&suffix))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddIcon,
    RemoveIcon,
    WarnOrphan,
    NoOp,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddIcon => "add-icon",
            Self::RemoveIcon => "remove-icon",
            Self::WarnOrphan => "warn-orphan",
            Self::NoOp => "no-op",
        }
    }

    pub fn is_mutation(self) -> bool {
        matches!(self, Self::AddIcon | Self::RemoveIcon)
    }
}

/// What happened to a single note during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteOutcome {
    NoHeader,
    /// Header parsed but carries neither the score nor the icon field.
    Irrelevant,
    Added,
    Removed,
    Orphan,
    Unchanged,
    BudgetExceeded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub scanned: usize,
    pub relevant: usize,
    pub added: usize,
    pub removed: usize,
    pub orphaned: usize,
    pub skipped: usize,
    pub no_header: usize,
    pub failed: usize,
    pub skipped_sample: Vec<PathBuf>,
    pub dry_run: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    pub fn mutations(&self) -> usize {
        self.added + self.removed
    }

    pub fn record(&mut self, path: &Path, outcome: NoteOutcome, sample_limit: usize) {
        self.scanned += 1;
        match outcome {
            NoteOutcome::NoHeader => self.no_header += 1,
            NoteOutcome::Irrelevant => {}
            NoteOutcome::Added => {
                self.relevant += 1;
                self.added += 1;
            }
            NoteOutcome::Removed => {
                self.relevant += 1;
                self.removed += 1;
            }
            NoteOutcome::Orphan => {
                self.relevant += 1;
                self.orphaned += 1;
            }
            NoteOutcome::Unchanged => self.relevant += 1,
            NoteOutcome::BudgetExceeded => {
                self.relevant += 1;
                self.skipped += 1;
                if self.skipped_sample.len() < sample_limit {
                    self.skipped_sample.push(path.to_path_buf());
                }
            }
        }
    }

    pub fn record_failure(&mut self) {
        self.scanned += 1;
        self.failed += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_filter_matches_suffix_only() {
        let settings = AnnotatorSettings::default();
        assert!(settings.is_note_file(Path::new("vault/daily/2026-01-01.md")));
        assert!(!settings.is_note_file(Path::new("vault/.obsidian/app.json")));
        assert!(!settings.is_note_file(Path::new("vault/README.MD")));
        assert!(!settings.is_note_file(Path::new("vault/md")));
    }

    #[test]
    fn summary_caps_skipped_sample() {
        let mut summary = RunSummary::default();
        for index in 0..5 {
            let path = PathBuf::from(format!("note-{}.md", index));
            summary.record(&path, NoteOutcome::BudgetExceeded, 3);
        }
        assert_eq!(summary.skipped, 5);
        assert_eq!(summary.skipped_sample.len(), 3);
        assert_eq!(summary.relevant, 5);
    }

    #[test]
    fn summary_counts_only_relevant_notes() {
        let mut summary = RunSummary::default();
        summary.record(Path::new("a.md"), NoteOutcome::NoHeader, 10);
        summary.record(Path::new("b.md"), NoteOutcome::Irrelevant, 10);
        summary.record(Path::new("c.md"), NoteOutcome::Added, 10);
        summary.record(Path::new("d.md"), NoteOutcome::Removed, 10);
        summary.record_failure();

        assert_eq!(summary.scanned, 5);
        assert_eq!(summary.relevant, 2);
        assert_eq!(summary.mutations(), 2);
        assert_eq!(summary.no_header, 1);
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn settings_file_fields_are_optional() {
        let settings: AnnotatorSettings =
            serde_yaml::from_str("root: /tmp/vault\nmaxChanges: 3\n").expect("settings parse");
        assert_eq!(settings.root.as_deref(), Some(Path::new("/tmp/vault")));
        assert_eq!(settings.max_changes, Some(3));
        assert_eq!(settings.marker, DEFAULT_MARKER);
        assert_eq!(settings.score_field, DEFAULT_SCORE_FIELD);
    }
}
