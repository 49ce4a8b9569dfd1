//! Read-only projections of a loaded table: filtering, sorting, snapshots.
//!
//! These return row orderings instead of reordering the store, so row
//! indexes used for edits stay stable while a view is shown.

use super::sink::AnnotationSink;
use super::store::{CellKind, TableStore};
use super::TableResult;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// A to Z.
    #[default]
    Ascending,
    /// Z to A.
    Descending,
}

/// Serializable copy of the displayed table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<SnapshotCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotCell {
    pub text: String,
    pub kind: CellKind,
}

impl<S: AnnotationSink> TableStore<S> {
    /// Rows whose `column` text matches `pattern`; a blank pattern keeps
    /// every row.
    pub fn filter_rows(&self, column: usize, pattern: &str) -> TableResult<Vec<usize>> {
        if pattern.trim().is_empty() {
            return Ok((0..self.row_count()).collect());
        }
        self.find_all(column, pattern)
    }

    /// Row indexes ordered by the display text of `column`, compared
    /// case-insensitively (Unicode lowercase, then code point order). Ties
    /// keep table order.
    pub fn sorted_rows(&self, column: usize, order: SortOrder) -> TableResult<Vec<usize>> {
        self.check_column(column)?;

        let mut keyed = (0..self.row_count())
            .map(|row| {
                let text = self.get(row, column).map(|cell| cell.text).unwrap_or_default();
                (text.to_lowercase(), row)
            })
            .collect::<Vec<_>>();
        match order {
            SortOrder::Ascending => keyed.sort_by(|a, b| a.0.cmp(&b.0)),
            SortOrder::Descending => keyed.sort_by(|a, b| b.0.cmp(&a.0)),
        }
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }

    /// Copies headers and display text of `rows` (all rows when `None`).
    pub fn snapshot(&self, rows: Option<&[usize]>) -> TableSnapshot {
        let all_rows = (0..self.row_count()).collect::<Vec<_>>();
        let selected = rows.unwrap_or(&all_rows);
        let columns = self.column_count();

        let rows = selected
            .iter()
            .map(|&row| {
                (0..columns)
                    .filter_map(|column| self.get(row, column))
                    .map(|cell| SnapshotCell {
                        text: cell.text,
                        kind: cell.kind,
                    })
                    .collect()
            })
            .collect();

        TableSnapshot {
            headers: self.headers().to_vec(),
            rows,
        }
    }
}
