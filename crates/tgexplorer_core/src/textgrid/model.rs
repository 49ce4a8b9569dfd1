//! In-memory TextGrid model.
//!
//! # Responsibility
//! - Hold one parsed annotation file: its path, time domain and tiers.
//! - Track per-interval text mutation so callers know what changed.
//!
//! # Invariants
//! - The identity of an interval inside one file is its `(xmin, xmax)` pair.
//! - Point tiers store each point as an interval with `xmin == xmax`.
//! - Tier order is the order found in the source file and is preserved on write.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Tier flavour as declared by the TextGrid `class` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    /// `IntervalTier`: contiguous labelled spans.
    Interval,
    /// `TextTier`: labelled time points.
    Point,
}

impl TierKind {
    /// Returns the class name used in the file format.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Interval => "IntervalTier",
            Self::Point => "TextTier",
        }
    }

    pub(crate) fn from_class_name(value: &str) -> Option<Self> {
        match value {
            "IntervalTier" => Some(Self::Interval),
            "TextTier" => Some(Self::Point),
            _ => None,
        }
    }
}

/// One annotation unit: a labelled span (or point) on a tier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interval {
    pub xmin: f64,
    pub xmax: f64,
    pub text: String,
    /// Set once the text has been edited since load.
    #[serde(skip)]
    pub modified: bool,
}

impl Interval {
    pub fn new(xmin: f64, xmax: f64, text: impl Into<String>) -> Self {
        Self {
            xmin,
            xmax,
            text: text.into(),
            modified: false,
        }
    }

    /// Creates a zero-length interval representing a point annotation.
    pub fn point(time: f64, mark: impl Into<String>) -> Self {
        Self::new(time, time, mark)
    }

    /// Returns whether the label carries non-whitespace text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Replaces the label text and marks the interval as modified.
    ///
    /// Returns the previous text.
    pub fn replace_text(&mut self, text: impl Into<String>) -> String {
        self.modified = true;
        std::mem::replace(&mut self.text, text.into())
    }
}

/// Named, ordered sequence of intervals belonging to one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub name: String,
    pub kind: TierKind,
    pub xmin: f64,
    pub xmax: f64,
    pub intervals: Vec<Interval>,
}

impl Tier {
    pub fn new(name: impl Into<String>, kind: TierKind, xmin: f64, xmax: f64) -> Self {
        Self {
            name: name.into(),
            kind,
            xmin,
            xmax,
            intervals: Vec::new(),
        }
    }

    /// Appends one interval and returns `self` for chained fixture building.
    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.intervals.push(interval);
        self
    }
}

/// One parsed TextGrid file.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGrid {
    /// File-system location the grid was read from and is written back to.
    pub path: PathBuf,
    pub xmin: f64,
    pub xmax: f64,
    pub tiers: Vec<Tier>,
}

impl TextGrid {
    pub fn new(path: impl Into<PathBuf>, xmin: f64, xmax: f64) -> Self {
        Self {
            path: path.into(),
            xmin,
            xmax,
            tiers: Vec::new(),
        }
    }

    /// Appends one tier and returns `self` for chained fixture building.
    pub fn with_tier(mut self, tier: Tier) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name shown to users in place of the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Returns the index of the first tier named `name`.
    pub fn tier_position(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|tier| tier.name == name)
    }

    pub fn tier(&self, name: &str) -> Option<&Tier> {
        self.tier_position(name).map(|index| &self.tiers[index])
    }

    pub fn tier_names(&self) -> impl Iterator<Item = &str> {
        self.tiers.iter().map(|tier| tier.name.as_str())
    }

    /// Returns whether any interval has been edited since load.
    pub fn is_modified(&self) -> bool {
        self.tiers
            .iter()
            .flat_map(|tier| tier.intervals.iter())
            .any(|interval| interval.modified)
    }
}
