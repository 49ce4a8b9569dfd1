//! Table store: the single owner of the loaded corpus and its aligned rows.
//!
//! # Invariants
//! - The store is either empty (no headers, no rows) or loaded.
//! - Every successful edit writes exactly one file and emits exactly one
//!   `cell_changed` for the edited cell.
//! - Rejected edits (column 0, absent cells) change nothing and emit nothing.

use super::observer::TableObserver;
use super::sink::{AnnotationSink, FileSink};
use super::{compile_pattern, TableError, TableResult};
use crate::align::{AlignedRow, Alignment, Cell, IntervalRef};
use crate::textgrid::{Interval, TextGrid};
use log::{debug, error, info};
use serde::Serialize;
use std::path::Path;

/// How a cell is presented and whether it accepts edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    /// Column 0: file display name, read-only.
    FileName,
    /// Interval text, editable.
    Editable,
    /// No aligned interval; shown blank and shaded, read-only.
    Absent,
}

/// Display state of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    pub text: String,
    pub kind: CellKind,
}

/// Data needed to open one row in an external annotation tool.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
    pub path: &'a Path,
    pub primary: &'a Interval,
}

enum TableState {
    Empty,
    Loaded(LoadedTable),
}

struct LoadedTable {
    headers: Vec<String>,
    rows: Vec<AlignedRow>,
    files: Vec<TextGrid>,
}

impl LoadedTable {
    fn cell(&self, row: usize, column: usize) -> TableResult<Cell> {
        let aligned = self.rows.get(row).ok_or(TableError::RowOutOfRange {
            row,
            rows: self.rows.len(),
        })?;
        if column >= self.headers.len() {
            return Err(TableError::ColumnOutOfRange {
                column,
                columns: self.headers.len(),
            });
        }
        Ok(aligned.cell(column).unwrap_or(Cell::Absent))
    }

    fn interval(&self, target: IntervalRef) -> Option<&Interval> {
        self.files
            .get(target.file)?
            .tiers
            .get(target.tier)?
            .intervals
            .get(target.interval)
    }

    fn view(&self, cell: Cell) -> CellView {
        match cell {
            Cell::File(file) => CellView {
                text: self
                    .files
                    .get(file)
                    .map(TextGrid::display_name)
                    .unwrap_or_default(),
                kind: CellKind::FileName,
            },
            Cell::Interval(target) => match self.interval(target) {
                Some(interval) => CellView {
                    text: interval.text.clone(),
                    kind: CellKind::Editable,
                },
                None => absent_view(),
            },
            Cell::Absent => absent_view(),
        }
    }
}

fn absent_view() -> CellView {
    CellView {
        text: String::new(),
        kind: CellKind::Absent,
    }
}

/// Editable `(row, column)` grid over an aligned corpus.
pub struct TableStore<S: AnnotationSink = FileSink> {
    state: TableState,
    sink: S,
    observers: Vec<Box<dyn TableObserver>>,
}

impl TableStore<FileSink> {
    /// Creates an empty store that writes edits back to the source files.
    pub fn new() -> Self {
        Self::with_sink(FileSink)
    }
}

impl Default for TableStore<FileSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AnnotationSink> TableStore<S> {
    /// Creates an empty store with a custom persistence target.
    pub fn with_sink(sink: S) -> Self {
        Self {
            state: TableState::Empty,
            sink,
            observers: Vec::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Registers an observer for cell and reset notifications.
    pub fn subscribe(&mut self, observer: Box<dyn TableObserver>) {
        self.observers.push(observer);
    }

    /// Replaces the whole table with a fresh alignment (Empty/Loaded -> Loaded).
    pub fn load(&mut self, alignment: Alignment) {
        let Alignment { table, corpus } = alignment;
        info!(
            "event=table_load module=table status=ok rows={} columns={} files={}",
            table.rows.len(),
            table.headers.len(),
            corpus.files.len()
        );
        self.state = TableState::Loaded(LoadedTable {
            headers: table.headers,
            rows: table.rows,
            files: corpus.files,
        });
        self.notify_reset();
    }

    /// Discards the loaded table (Loaded -> Empty).
    pub fn close(&mut self) {
        if matches!(self.state, TableState::Empty) {
            return;
        }
        self.state = TableState::Empty;
        info!("event=table_close module=table status=ok");
        self.notify_reset();
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, TableState::Loaded(_))
    }

    pub fn headers(&self) -> &[String] {
        match &self.state {
            TableState::Loaded(loaded) => &loaded.headers,
            TableState::Empty => &[],
        }
    }

    pub fn header(&self, column: usize) -> Option<&str> {
        self.headers().get(column).map(String::as_str)
    }

    /// Returns the index of the first column with header `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers().iter().position(|header| header == name)
    }

    pub fn row_count(&self) -> usize {
        match &self.state {
            TableState::Loaded(loaded) => loaded.rows.len(),
            TableState::Empty => 0,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers().len()
    }

    /// Parsed grids backing the table, in scan order.
    pub fn files(&self) -> &[TextGrid] {
        match &self.state {
            TableState::Loaded(loaded) => &loaded.files,
            TableState::Empty => &[],
        }
    }

    /// Returns the display state of one cell, or `None` out of range.
    pub fn get(&self, row: usize, column: usize) -> Option<CellView> {
        let loaded = self.loaded().ok()?;
        let cell = loaded.cell(row, column).ok()?;
        Some(loaded.view(cell))
    }

    /// Returns the interval shown at `(row, column)`, if any.
    pub fn interval(&self, row: usize, column: usize) -> Option<&Interval> {
        let loaded = self.loaded().ok()?;
        match loaded.cell(row, column).ok()? {
            Cell::Interval(target) => loaded.interval(target),
            Cell::File(_) | Cell::Absent => None,
        }
    }

    pub fn is_editable(&self, row: usize, column: usize) -> bool {
        self.interval(row, column).is_some()
    }

    /// File path and primary interval of `row`.
    pub fn row_context(&self, row: usize) -> Option<RowContext<'_>> {
        let loaded = self.loaded().ok()?;
        let aligned = loaded.rows.get(row)?;
        let grid = loaded.files.get(aligned.file)?;
        let primary = loaded.interval(aligned.primary)?;
        Some(RowContext {
            path: grid.path.as_path(),
            primary,
        })
    }

    /// Sets the text of one cell and writes its file back.
    ///
    /// Returns `Ok(false)` without side effects for column 0 and absent
    /// cells. On a failed write the previous text is restored.
    pub fn set(&mut self, row: usize, column: usize, text: impl Into<String>) -> TableResult<bool> {
        let Self {
            state,
            sink,
            observers,
        } = self;
        let loaded = match state {
            TableState::Loaded(loaded) => loaded,
            TableState::Empty => return Err(TableError::NotLoaded),
        };

        let target = match loaded.cell(row, column)? {
            Cell::Interval(target) => target,
            Cell::File(_) | Cell::Absent => {
                debug!("event=cell_edit module=table status=rejected row={row} column={column}");
                return Ok(false);
            }
        };
        let Some(grid) = loaded.files.get_mut(target.file) else {
            return Ok(false);
        };
        let Some(interval) = grid
            .tiers
            .get_mut(target.tier)
            .and_then(|tier| tier.intervals.get_mut(target.interval))
        else {
            return Ok(false);
        };

        let was_modified = interval.modified;
        let previous = interval.replace_text(text);

        if let Err(source) = sink.persist(grid) {
            let interval = &mut grid.tiers[target.tier].intervals[target.interval];
            interval.text = previous;
            interval.modified = was_modified;
            error!(
                "event=cell_edit module=table status=error row={} column={} path={} error={}",
                row,
                column,
                grid.path.display(),
                source
            );
            return Err(TableError::Persist {
                path: grid.path.clone(),
                source,
            });
        }

        debug!("event=cell_edit module=table status=ok row={row} column={column}");
        for observer in observers.iter_mut() {
            observer.cell_changed(row, column);
        }
        Ok(true)
    }

    /// Substitutes every match of `pattern` in one cell, if it matches.
    ///
    /// `replacement` uses `regex` syntax (`$1`, `${name}`).
    pub fn replace_one(
        &mut self,
        row: usize,
        column: usize,
        pattern: &str,
        replacement: &str,
    ) -> TableResult<bool> {
        let regex = compile_pattern(pattern)?;
        let current = self.cell_view(row, column)?;
        if current.kind == CellKind::Absent || !regex.is_match(&current.text) {
            return Ok(false);
        }
        let updated = regex.replace_all(&current.text, replacement).into_owned();
        self.set(row, column, updated)
    }

    /// For every row whose `source_column` matches `pattern`, writes the
    /// substituted source text into `target_column` of the same row.
    ///
    /// Rows with an absent or non-matching source are untouched, as are
    /// targets that already hold the new text. Returns the number of cells
    /// written.
    pub fn replace_all(
        &mut self,
        pattern: &str,
        replacement: &str,
        source_column: usize,
        target_column: usize,
    ) -> TableResult<usize> {
        let regex = compile_pattern(pattern)?;
        self.check_column(source_column)?;
        self.check_column(target_column)?;

        let mut written = 0;
        for row in 0..self.row_count() {
            let source = self.cell_view(row, source_column)?;
            if source.kind == CellKind::Absent || !regex.is_match(&source.text) {
                continue;
            }
            let updated = regex.replace_all(&source.text, replacement);
            let target = self.cell_view(row, target_column)?;
            if target.kind == CellKind::Editable && target.text == updated {
                continue;
            }
            if self.set(row, target_column, updated.into_owned())? {
                written += 1;
            }
        }

        info!(
            "event=replace_all module=table status=ok source_column={} target_column={} written={}",
            source_column, target_column, written
        );
        Ok(written)
    }

    /// Returns the first row at or after `start_row` whose `column` text
    /// matches `pattern`. The scan stops at the last row without wrapping.
    pub fn find_next(
        &self,
        start_row: usize,
        column: usize,
        pattern: &str,
    ) -> TableResult<Option<usize>> {
        let regex = compile_pattern(pattern)?;
        self.check_column(column)?;
        for row in start_row..self.row_count() {
            if regex.is_match(&self.cell_view(row, column)?.text) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    /// Returns every row whose `column` text matches `pattern`.
    pub fn find_all(&self, column: usize, pattern: &str) -> TableResult<Vec<usize>> {
        let regex = compile_pattern(pattern)?;
        self.check_column(column)?;
        let mut rows = Vec::new();
        for row in 0..self.row_count() {
            if regex.is_match(&self.cell_view(row, column)?.text) {
                rows.push(row);
            }
        }
        Ok(rows)
    }

    /// Finds the next match from `start_row` and replaces inside that cell.
    ///
    /// Returns the row that was examined, or `None` when nothing matches.
    pub fn replace_next(
        &mut self,
        start_row: usize,
        column: usize,
        pattern: &str,
        replacement: &str,
    ) -> TableResult<Option<usize>> {
        let Some(row) = self.find_next(start_row, column, pattern)? else {
            return Ok(None);
        };
        self.replace_one(row, column, pattern, replacement)?;
        Ok(Some(row))
    }

    fn loaded(&self) -> TableResult<&LoadedTable> {
        match &self.state {
            TableState::Loaded(loaded) => Ok(loaded),
            TableState::Empty => Err(TableError::NotLoaded),
        }
    }

    fn cell_view(&self, row: usize, column: usize) -> TableResult<CellView> {
        let loaded = self.loaded()?;
        let cell = loaded.cell(row, column)?;
        Ok(loaded.view(cell))
    }

    pub(super) fn check_column(&self, column: usize) -> TableResult<()> {
        let columns = self.loaded()?.headers.len();
        if column >= columns {
            return Err(TableError::ColumnOutOfRange { column, columns });
        }
        Ok(())
    }

    fn notify_reset(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.table_reset();
        }
    }
}
