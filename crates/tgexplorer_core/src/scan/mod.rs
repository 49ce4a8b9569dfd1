//! Directory scanning for TextGrid corpora.
//!
//! # Responsibility
//! - Enumerate TextGrid files under a root directory (recursive).
//! - Parse every file into a [`Corpus`], skipping unreadable ones.
//! - Report the distinct tier names used across a corpus.
//!
//! # Invariants
//! - One corrupt file never aborts a scan; it is logged and recorded in
//!   `skipped`, and no partial grid is kept.
//! - File order is deterministic: sorted by file name at every level.
//! - Tier names are reported in first-seen order without duplicates.

use crate::textgrid::{has_textgrid_extension, read_textgrid, TextGrid};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

pub type ScanResult<T> = Result<T, ScanError>;

/// Error for scan preconditions. Per-file failures are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    NotFound(PathBuf),
    NotADirectory(PathBuf),
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "directory not found: {}", path.display()),
            Self::NotADirectory(path) => write!(f, "not a directory: {}", path.display()),
        }
    }
}

impl Error for ScanError {}

/// One file left out of a scan, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Successfully parsed TextGrids of one directory plus skipped files.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub files: Vec<TextGrid>,
    pub skipped: Vec<SkippedFile>,
}

impl Corpus {
    /// Builds a corpus from already parsed grids.
    pub fn from_files(files: Vec<TextGrid>) -> Self {
        Self {
            files,
            skipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Distinct tier names in first-seen order.
    pub fn tier_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for name in self.files.iter().flat_map(|grid| grid.tier_names()) {
            if seen.insert(name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

/// Result of a tier-name scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierScan {
    pub tier_names: Vec<String>,
    pub files_parsed: usize,
    pub skipped: Vec<SkippedFile>,
}

/// Lists TextGrid files below `root`, recursively, in sorted walk order.
///
/// Unreadable directory entries are logged and skipped.
pub fn find_textgrid_files(root: impl AsRef<Path>) -> ScanResult<Vec<PathBuf>> {
    let root = root.as_ref();
    ensure_directory(root)?;

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && has_textgrid_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
            Err(err) => {
                warn!("event=scan_entry module=scan status=skip error={err}");
            }
        }
    }
    Ok(files)
}

/// Parses every TextGrid below `root` into a [`Corpus`].
pub fn load_corpus(root: impl AsRef<Path>) -> ScanResult<Corpus> {
    let root = root.as_ref();
    let started_at = Instant::now();
    info!(
        "event=corpus_load module=scan status=start root={}",
        root.display()
    );

    let mut corpus = Corpus::default();
    for path in find_textgrid_files(root)? {
        match read_textgrid(&path) {
            Ok(grid) => {
                debug!(
                    "event=file_parse module=scan status=ok path={} tiers={}",
                    path.display(),
                    grid.tiers.len()
                );
                corpus.files.push(grid);
            }
            Err(err) => {
                warn!(
                    "event=file_parse module=scan status=skip path={} error={}",
                    path.display(),
                    err
                );
                corpus.skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    if corpus.is_empty() {
        warn!(
            "event=corpus_load module=scan status=skip reason=no_textgrids root={} skipped={}",
            root.display(),
            corpus.skipped.len()
        );
    }
    info!(
        "event=corpus_load module=scan status=ok files={} skipped={} duration_ms={}",
        corpus.files.len(),
        corpus.skipped.len(),
        started_at.elapsed().as_millis()
    );
    Ok(corpus)
}

/// Scans `root` and returns the distinct tier names found across all files.
pub fn scan_tier_names(root: impl AsRef<Path>) -> ScanResult<TierScan> {
    let corpus = load_corpus(root)?;
    Ok(TierScan {
        tier_names: corpus.tier_names(),
        files_parsed: corpus.files.len(),
        skipped: corpus.skipped,
    })
}

fn ensure_directory(root: &Path) -> ScanResult<()> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}
