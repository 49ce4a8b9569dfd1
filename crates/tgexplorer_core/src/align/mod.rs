//! Tier alignment: primary-tier intervals joined with time-identical
//! intervals of secondary tiers.
//!
//! # Responsibility
//! - Build table headers (`filename`, primary, secondaries...).
//! - Produce one [`AlignedRow`] per labelled primary interval and attach
//!   secondary intervals sharing its exact `(xmin, xmax)` span.
//!
//! # Invariants
//! - A row exists iff its primary interval has non-blank text.
//! - A secondary cell is `Some` iff an interval of that tier shares the
//!   exact time span; unmatched secondary intervals are dropped.
//! - Row order is insertion order (file, tier, interval scan order).
//! - Files without the primary tier contribute no rows.

use crate::scan::{load_corpus, Corpus, ScanResult};
use crate::textgrid::TextGrid;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// Header of column 0.
pub const FILENAME_HEADER: &str = "filename";

/// Index path from a table cell to the interval it shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IntervalRef {
    pub file: usize,
    pub tier: usize,
    pub interval: usize,
}

/// How alignment keys are scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyScope {
    /// Keys are `(file, xmin, xmax)`: equal spans in different files stay
    /// separate rows.
    #[default]
    PerFile,
    /// Keys are `(xmin, xmax)` across the whole corpus: a later file
    /// overwrites an earlier row with the same span, which keeps its
    /// original position.
    Global,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlignOptions {
    pub key_scope: KeyScope,
}

/// Content of one table cell, resolved from an [`AlignedRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Column 0: the owning file.
    File(usize),
    Interval(IntervalRef),
    /// No secondary interval shares the primary span.
    Absent,
}

/// One table row: owning file, primary interval and secondary slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedRow {
    pub file: usize,
    pub primary: IntervalRef,
    /// One slot per secondary header, in header order.
    pub secondary: Vec<Option<IntervalRef>>,
}

impl AlignedRow {
    /// Resolves `column` (0 = filename, 1 = primary, 2.. = secondaries).
    pub fn cell(&self, column: usize) -> Option<Cell> {
        match column {
            0 => Some(Cell::File(self.file)),
            1 => Some(Cell::Interval(self.primary)),
            n => self
                .secondary
                .get(n - 2)
                .map(|slot| slot.map(Cell::Interval).unwrap_or(Cell::Absent)),
        }
    }
}

/// Headers and rows produced by one alignment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AlignedTable {
    pub headers: Vec<String>,
    pub rows: Vec<AlignedRow>,
}

/// An aligned table together with the corpus its cells point into.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub table: AlignedTable,
    pub corpus: Corpus,
}

/// Builds `['filename', primary] + secondary`.
pub fn table_headers(primary_tier: &str, secondary_tiers: &[String]) -> Vec<String> {
    let mut headers = Vec::with_capacity(secondary_tiers.len() + 2);
    headers.push(FILENAME_HEADER.to_string());
    headers.push(primary_tier.to_string());
    headers.extend(secondary_tiers.iter().cloned());
    headers
}

/// Loads every TextGrid under `source_dir` and aligns it.
pub fn align_dir(
    source_dir: impl AsRef<Path>,
    primary_tier: &str,
    secondary_tiers: &[String],
    options: AlignOptions,
) -> ScanResult<Alignment> {
    let corpus = load_corpus(source_dir)?;
    let table = align_corpus(&corpus.files, primary_tier, secondary_tiers, options);
    Ok(Alignment { table, corpus })
}

/// Aligns already parsed grids. Cell references index into `files`.
pub fn align_corpus(
    files: &[TextGrid],
    primary_tier: &str,
    secondary_tiers: &[String],
    options: AlignOptions,
) -> AlignedTable {
    let headers = table_headers(primary_tier, secondary_tiers);
    let mut rows: Vec<AlignedRow> = Vec::new();
    let mut index: HashMap<RowKey, usize> = HashMap::new();

    for (file_index, grid) in files.iter().enumerate() {
        let Some(primary_index) = grid.tier_position(primary_tier) else {
            debug!(
                "event=align_file module=align status=skip reason=missing_primary_tier path={} tier={}",
                grid.path.display(),
                primary_tier
            );
            continue;
        };
        let scope = match options.key_scope {
            KeyScope::PerFile => Some(file_index),
            KeyScope::Global => None,
        };

        for (interval_index, interval) in grid.tiers[primary_index].intervals.iter().enumerate() {
            if !interval.has_text() {
                continue;
            }
            let row = AlignedRow {
                file: file_index,
                primary: IntervalRef {
                    file: file_index,
                    tier: primary_index,
                    interval: interval_index,
                },
                secondary: vec![None; secondary_tiers.len()],
            };
            let key = RowKey::new(scope, interval.xmin, interval.xmax);
            match index.get(&key) {
                Some(&existing) => rows[existing] = row,
                None => {
                    index.insert(key, rows.len());
                    rows.push(row);
                }
            }
        }

        for (tier_index, tier) in grid.tiers.iter().enumerate() {
            if tier_index == primary_index {
                continue;
            }
            let Some(slot) = secondary_tiers.iter().position(|name| *name == tier.name) else {
                continue;
            };
            for (interval_index, interval) in tier.intervals.iter().enumerate() {
                let key = RowKey::new(scope, interval.xmin, interval.xmax);
                if let Some(&row_index) = index.get(&key) {
                    rows[row_index].secondary[slot] = Some(IntervalRef {
                        file: file_index,
                        tier: tier_index,
                        interval: interval_index,
                    });
                }
            }
        }
    }

    info!(
        "event=align module=align status=ok files={} rows={} columns={}",
        files.len(),
        rows.len(),
        headers.len()
    );
    AlignedTable { headers, rows }
}

/// Exact time-span key. Times are compared bit-for-bit, with `-0.0`
/// folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RowKey {
    file: Option<usize>,
    xmin: u64,
    xmax: u64,
}

impl RowKey {
    fn new(file: Option<usize>, xmin: f64, xmax: f64) -> Self {
        Self {
            file,
            xmin: (xmin + 0.0).to_bits(),
            xmax: (xmax + 0.0).to_bits(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{align_corpus, AlignOptions, Cell, KeyScope};
    use crate::textgrid::{Interval, TextGrid, Tier, TierKind};

    fn tier(name: &str, intervals: &[(f64, f64, &str)]) -> Tier {
        intervals.iter().fold(
            Tier::new(name, TierKind::Interval, 0.0, 3.0),
            |tier, (xmin, xmax, text)| tier.with_interval(Interval::new(*xmin, *xmax, *text)),
        )
    }

    #[test]
    fn secondary_cells_follow_exact_span() {
        let grid = TextGrid::new("a.TextGrid", 0.0, 3.0)
            .with_tier(tier("word", &[(0.0, 1.0, "cat"), (1.0, 2.0, "dog")]))
            .with_tier(tier("gloss", &[(0.0, 1.0, "feline"), (1.0, 2.5, "canine")]));
        let table = align_corpus(
            &[grid],
            "word",
            &["gloss".to_string()],
            AlignOptions::default(),
        );
        assert_eq!(table.rows.len(), 2);
        assert!(matches!(table.rows[0].cell(2), Some(Cell::Interval(_))));
        assert_eq!(table.rows[1].cell(2), Some(Cell::Absent));
        assert_eq!(table.rows[1].cell(3), None);
    }

    #[test]
    fn global_scope_lets_later_file_win() {
        let first = TextGrid::new("a.TextGrid", 0.0, 1.0).with_tier(tier("word", &[(0.0, 1.0, "a")]));
        let second = TextGrid::new("b.TextGrid", 0.0, 1.0).with_tier(tier("word", &[(0.0, 1.0, "b")]));
        let files = [first, second];

        let per_file = align_corpus(&files, "word", &[], AlignOptions::default());
        assert_eq!(per_file.rows.len(), 2);

        let global = align_corpus(
            &files,
            "word",
            &[],
            AlignOptions {
                key_scope: KeyScope::Global,
            },
        );
        assert_eq!(global.rows.len(), 1);
        assert_eq!(global.rows[0].file, 1);
    }

    #[test]
    fn negative_zero_matches_zero() {
        let grid = TextGrid::new("a.TextGrid", 0.0, 1.0)
            .with_tier(tier("word", &[(0.0, 1.0, "cat")]))
            .with_tier(tier("gloss", &[(-0.0, 1.0, "feline")]));
        let table = align_corpus(&[grid], "word", &["gloss".to_string()], AlignOptions::default());
        assert!(matches!(table.rows[0].cell(2), Some(Cell::Interval(_))));
    }
}
