//! Editable table over an aligned TextGrid corpus.
//!
//! # Responsibility
//! - Expose aligned rows as a `(row, column)` grid of display text.
//! - Apply single-cell edits and regex replacements to interval text.
//! - Persist the owning file after each edit and notify observers.
//!
//! # Invariants
//! - Column 0 (file name) and absent cells are never editable.
//! - Headers and rows are replaced atomically on load, reload and close.
//! - A failed write-back restores the previous cell text.

use crate::textgrid::TextGridError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod observer;
pub mod request;
pub mod sink;
pub mod store;
pub mod view;

pub use observer::{TableEvent, TableObserver};
pub use request::{FilterRequest, FindReplaceRequest, MapAnnotationRequest};
pub use sink::{AnnotationSink, FileSink};
pub use store::{CellKind, CellView, RowContext, TableStore};
pub use view::{SnapshotCell, SortOrder, TableSnapshot};

pub type TableResult<T> = Result<T, TableError>;

#[derive(Debug)]
pub enum TableError {
    /// No project is loaded.
    NotLoaded,
    RowOutOfRange {
        row: usize,
        rows: usize,
    },
    ColumnOutOfRange {
        column: usize,
        columns: usize,
    },
    /// No header with this name.
    UnknownColumn(String),
    InvalidPattern {
        pattern: String,
        message: String,
    },
    /// Writing the edited file back failed; the edit was rolled back.
    Persist {
        path: PathBuf,
        source: TextGridError,
    },
}

impl Display for TableError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "no project is loaded"),
            Self::RowOutOfRange { row, rows } => {
                write!(f, "row {row} out of range (table has {rows} rows)")
            }
            Self::ColumnOutOfRange { column, columns } => {
                write!(f, "column {column} out of range (table has {columns} columns)")
            }
            Self::UnknownColumn(name) => write!(f, "unknown column `{name}`"),
            Self::InvalidPattern { pattern, message } => {
                write!(f, "invalid pattern `{pattern}`: {message}")
            }
            Self::Persist { path, source } => {
                write!(f, "failed to save `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for TableError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub(crate) fn compile_pattern(pattern: &str) -> TableResult<regex::Regex> {
    regex::Regex::new(pattern).map_err(|err| TableError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })
}
