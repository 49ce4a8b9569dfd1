//! Column-by-name requests issued by the presentation layer.
//!
//! Each request names columns by header, is resolved against the loaded
//! table, and delegates to one [`TableStore`] operation.

use super::sink::AnnotationSink;
use super::store::TableStore;
use super::{TableError, TableResult};

fn resolve_column<S: AnnotationSink>(store: &TableStore<S>, name: &str) -> TableResult<usize> {
    if !store.is_loaded() {
        return Err(TableError::NotLoaded);
    }
    store
        .column_index(name)
        .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
}

/// Find / find-and-replace within one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindReplaceRequest {
    pub column: String,
    pub pattern: String,
    pub replacement: String,
}

impl FindReplaceRequest {
    pub fn find_next<S: AnnotationSink>(
        &self,
        store: &TableStore<S>,
        start_row: usize,
    ) -> TableResult<Option<usize>> {
        let column = resolve_column(store, &self.column)?;
        store.find_next(start_row, column, &self.pattern)
    }

    pub fn find_all<S: AnnotationSink>(&self, store: &TableStore<S>) -> TableResult<Vec<usize>> {
        let column = resolve_column(store, &self.column)?;
        store.find_all(column, &self.pattern)
    }

    /// Replaces inside the next matching cell at or after `start_row`.
    pub fn replace_next<S: AnnotationSink>(
        &self,
        store: &mut TableStore<S>,
        start_row: usize,
    ) -> TableResult<Option<usize>> {
        let column = resolve_column(store, &self.column)?;
        store.replace_next(start_row, column, &self.pattern, &self.replacement)
    }

    pub fn replace_all<S: AnnotationSink>(&self, store: &mut TableStore<S>) -> TableResult<usize> {
        let column = resolve_column(store, &self.column)?;
        store.replace_all(&self.pattern, &self.replacement, column, column)
    }
}

/// Copy-and-transform from one tier column into another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapAnnotationRequest {
    pub source_column: String,
    pub target_column: String,
    pub pattern: String,
    pub replacement: String,
}

impl MapAnnotationRequest {
    pub fn apply<S: AnnotationSink>(&self, store: &mut TableStore<S>) -> TableResult<usize> {
        let source = resolve_column(store, &self.source_column)?;
        let target = resolve_column(store, &self.target_column)?;
        store.replace_all(&self.pattern, &self.replacement, source, target)
    }
}

/// Row filter on one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRequest {
    pub column: String,
    pub pattern: String,
}

impl FilterRequest {
    pub fn apply<S: AnnotationSink>(&self, store: &TableStore<S>) -> TableResult<Vec<usize>> {
        let column = resolve_column(store, &self.column)?;
        store.filter_rows(column, &self.pattern)
    }
}
