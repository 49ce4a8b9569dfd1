//! Project use-cases: validate a user selection, scan tiers, load a table.
//!
//! # Responsibility
//! - Check user-entered source directories and tier selections before any
//!   scan runs.
//! - Build the aligned table and swap it into a [`TableStore`].
//!
//! # Invariants
//! - A rejected request leaves the store exactly as it was.
//! - Source directories must be absolute and exist as directories.

use crate::align::{align_dir, AlignOptions, KeyScope};
use crate::scan::{scan_tier_names, ScanError, TierScan};
use crate::table::{AnnotationSink, TableStore};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub type ProjectResult<T> = Result<T, ProjectError>;

/// User-facing selection errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    EmptyDirectory,
    DirectoryNotAbsolute(PathBuf),
    DirectoryNotFound(PathBuf),
    NotADirectory(PathBuf),
    MissingPrimaryTier,
}

impl Display for ProjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDirectory => write!(f, "no TextGrid directory selected"),
            Self::DirectoryNotAbsolute(path) => {
                write!(f, "TextGrid directory must be absolute: {}", path.display())
            }
            Self::DirectoryNotFound(path) => {
                write!(f, "TextGrid directory does not exist: {}", path.display())
            }
            Self::NotADirectory(path) => {
                write!(f, "TextGrid directory is not a directory: {}", path.display())
            }
            Self::MissingPrimaryTier => write!(f, "select a primary tier"),
        }
    }
}

impl Error for ProjectError {}

impl From<ScanError> for ProjectError {
    fn from(value: ScanError) -> Self {
        match value {
            ScanError::NotFound(path) => Self::DirectoryNotFound(path),
            ScanError::NotADirectory(path) => Self::NotADirectory(path),
        }
    }
}

/// New-project selection: source directory and tiers to align.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    pub source_dir: PathBuf,
    pub primary_tier: String,
    pub secondary_tiers: Vec<String>,
    pub key_scope: KeyScope,
}

impl ProjectRequest {
    pub fn new(source_dir: impl Into<PathBuf>, primary_tier: impl Into<String>) -> Self {
        Self {
            source_dir: source_dir.into(),
            primary_tier: primary_tier.into(),
            secondary_tiers: Vec::new(),
            key_scope: KeyScope::default(),
        }
    }

    pub fn with_secondary_tiers(mut self, tiers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.secondary_tiers = tiers.into_iter().map(Into::into).collect();
        self
    }

    /// Checks directory and primary tier without touching the file system
    /// beyond metadata.
    pub fn validate(&self) -> ProjectResult<()> {
        validate_source_dir(&self.source_dir)?;
        if self.primary_tier.trim().is_empty() {
            return Err(ProjectError::MissingPrimaryTier);
        }
        Ok(())
    }
}

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub rows: usize,
    pub columns: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
}

pub fn validate_source_dir(path: &Path) -> ProjectResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ProjectError::EmptyDirectory);
    }
    if !path.is_absolute() {
        return Err(ProjectError::DirectoryNotAbsolute(path.to_path_buf()));
    }
    if !path.exists() {
        return Err(ProjectError::DirectoryNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ProjectError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Validates `source_dir` and lists the tier names found below it.
pub fn scan_project_tiers(source_dir: &Path) -> ProjectResult<TierScan> {
    validate_source_dir(source_dir)?;
    Ok(scan_tier_names(source_dir)?)
}

/// Tiers offered as secondary choices once `primary` is picked.
pub fn secondary_choices(tier_names: &[String], primary: &str) -> Vec<String> {
    tier_names
        .iter()
        .filter(|name| name.as_str() != primary)
        .cloned()
        .collect()
}

/// Validates `request`, aligns its directory and swaps the result into
/// `store`. On error the store is unchanged.
pub fn open_project<S: AnnotationSink>(
    store: &mut TableStore<S>,
    request: &ProjectRequest,
) -> ProjectResult<ProjectSummary> {
    if let Err(err) = request.validate() {
        warn!("event=project_open module=project status=error error={err}");
        return Err(err);
    }

    let alignment = align_dir(
        &request.source_dir,
        &request.primary_tier,
        &request.secondary_tiers,
        AlignOptions {
            key_scope: request.key_scope,
        },
    )?;
    let summary = ProjectSummary {
        rows: alignment.table.rows.len(),
        columns: alignment.table.headers.len(),
        files_loaded: alignment.corpus.files.len(),
        files_skipped: alignment.corpus.skipped.len(),
    };
    store.load(alignment);

    info!(
        "event=project_open module=project status=ok source_dir={} primary_tier={} rows={} skipped={}",
        request.source_dir.display(),
        request.primary_tier,
        summary.rows,
        summary.files_skipped
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::{secondary_choices, validate_source_dir, ProjectError};
    use std::path::Path;

    #[test]
    fn secondary_choices_exclude_primary() {
        let tiers = vec!["word".to_string(), "phone".to_string(), "gloss".to_string()];
        assert_eq!(secondary_choices(&tiers, "phone"), vec!["word", "gloss"]);
    }

    #[test]
    fn relative_directory_is_rejected() {
        let err = validate_source_dir(Path::new("corpus/data")).unwrap_err();
        assert!(matches!(err, ProjectError::DirectoryNotAbsolute(_)));
    }

    #[test]
    fn empty_directory_is_rejected() {
        assert_eq!(
            validate_source_dir(Path::new("")).unwrap_err(),
            ProjectError::EmptyDirectory
        );
    }
}
