//! CLI definitions for vault-bookmarker.

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use crate::errors::{AppError, AppResult};
use crate::models::AnnotatorSettings;

/// Adds or removes the bookmark icon on vault notes based on their quality score.
#[derive(Debug, Parser)]
#[command(name = "vault-bookmarker")]
#[command(version)]
pub(crate) struct Cli {
    /// Vault root to scan (overrides `root` from the settings file)
    pub root: Option<PathBuf>,

    /// YAML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Stop rewriting notes after this many changes
    #[arg(long)]
    pub max_changes: Option<usize>,

    /// Report decisions without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Note file extension
    #[arg(long)]
    pub extension: Option<String>,

    /// Frontmatter key holding the quality score (default "Quality Score"; camel-case vaults use --score-field QualityScore)
    #[arg(long)]
    pub score_field: Option<String>,

    /// Frontmatter key holding the icon
    #[arg(long)]
    pub icon_field: Option<String>,

    /// Icon value owned by this tool
    #[arg(long)]
    pub marker: Option<String>,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn settings(&self) -> AppResult<AnnotatorSettings> {
        let mut settings = match self.config.as_ref() {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|error| {
                    AppError::Cli(format!("cannot read settings file {}: {}", path.to_string_lossy(), error))
                })?;
                serde_yaml::from_str::<AnnotatorSettings>(&raw).map_err(|error| {
                    AppError::Cli(format!("invalid settings file {}: {}", path.to_string_lossy(), error))
                })?
            }
            None => AnnotatorSettings::default(),
        };

        if let Some(root) = self.root.clone() {
            settings.root = Some(root);
        }
        if let Some(max_changes) = self.max_changes {
            settings.max_changes = Some(max_changes);
        }
        settings.dry_run |= self.dry_run;
        if let Some(extension) = self.extension.as_ref() {
            settings.extension = extension.clone();
        }
        if let Some(score_field) = self.score_field.as_ref() {
            settings.score_field = score_field.clone();
        }
        if let Some(icon_field) = self.icon_field.as_ref() {
            settings.icon_field = icon_field.clone();
        }
        if let Some(marker) = self.marker.as_ref() {
            settings.marker = marker.clone();
        }

        settings.extension = settings.extension.trim_start_matches('.').to_string();
        validate(&settings)?;
        Ok(settings)
    }
}

fn validate(settings: &AnnotatorSettings) -> AppResult<()> {
    if settings.root.is_none() {
        return Err(AppError::Cli(
            "a vault root is required (positional argument or `root` in the settings file)".to_string(),
        ));
    }
    for (name, value) in [
        ("extension", &settings.extension),
        ("score field", &settings.score_field),
        ("icon field", &settings.icon_field),
        ("marker", &settings.marker),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Cli(format!("{} must not be empty", name)));
        }
    }
    if settings.score_field == settings.icon_field {
        return Err(AppError::Cli(
            "score field and icon field must be different keys".to_string(),
        ));
    }
    Ok(())
}
