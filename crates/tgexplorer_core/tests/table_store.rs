mod common;

use common::{interval_tier, word_corpus, write_grid};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tgexplorer_core::textgrid::TextGridResult;
use tgexplorer_core::{
    align_dir, read_textgrid, AlignOptions, AnnotationSink, CellKind, FindReplaceRequest,
    MapAnnotationRequest, SortOrder, TableError, TableEvent, TableStore, TextGrid, TextGridError,
};

fn load(dir: &Path, secondaries: &[&str]) -> TableStore {
    let mut store = TableStore::new();
    load_into(&mut store, dir, secondaries);
    store
}

fn load_into<S: AnnotationSink>(store: &mut TableStore<S>, dir: &Path, secondaries: &[&str]) {
    let secondaries = secondaries.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    store.load(align_dir(dir, "word", &secondaries, AlignOptions::default()).unwrap());
}

fn column_texts<S: AnnotationSink>(store: &TableStore<S>, column: usize) -> Vec<String> {
    (0..store.row_count())
        .map(|row| store.get(row, column).unwrap().text)
        .collect()
}

fn glossed_corpus() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_grid(
        dir.path(),
        "a.TextGrid",
        vec![
            interval_tier("word", &[(0.0, 1.0, "cat"), (1.0, 2.0, "category"), (2.0, 3.0, "dog")]),
            interval_tier("gloss", &[(0.0, 1.0, "feline"), (1.0, 2.0, "")]),
        ],
    );
    dir
}

#[test]
fn get_reports_file_name_text_and_absent_cells() {
    let dir = glossed_corpus();
    let store = load(dir.path(), &["gloss"]);

    assert_eq!(store.headers(), ["filename", "word", "gloss"]);
    let file = store.get(0, 0).unwrap();
    assert_eq!(file.text, "a.TextGrid");
    assert_eq!(file.kind, CellKind::FileName);

    let empty_gloss = store.get(1, 2).unwrap();
    assert_eq!(empty_gloss.text, "");
    assert_eq!(empty_gloss.kind, CellKind::Editable);

    let absent = store.get(2, 2).unwrap();
    assert_eq!(absent.text, "");
    assert_eq!(absent.kind, CellKind::Absent);

    assert!(store.get(3, 0).is_none());
    assert!(store.get(0, 3).is_none());
}

#[test]
fn set_rejects_filename_column_and_absent_cells() {
    let dir = glossed_corpus();
    let mut store = load(dir.path(), &["gloss"]);
    let (tx, rx) = mpsc::channel();
    store.subscribe(Box::new(tx));
    let before = std::fs::read_to_string(dir.path().join("a.TextGrid")).unwrap();

    assert!(!store.set(0, 0, "renamed.TextGrid").unwrap());
    assert!(!store.set(2, 2, "canine").unwrap());

    assert_eq!(store.get(0, 0).unwrap().text, "a.TextGrid");
    assert_eq!(store.get(2, 2).unwrap().kind, CellKind::Absent);
    assert_eq!(std::fs::read_to_string(dir.path().join("a.TextGrid")).unwrap(), before);
    assert!(rx.try_recv().is_err());
}

#[test]
fn set_writes_back_and_notifies_exactly_that_cell() {
    let dir = glossed_corpus();
    let mut store = load(dir.path(), &["gloss"]);
    let (tx, rx) = mpsc::channel();
    store.subscribe(Box::new(tx));

    assert!(store.set(1, 2, "kind").unwrap());

    assert_eq!(store.get(1, 2).unwrap().text, "kind");
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![TableEvent::CellChanged { row: 1, column: 2 }]
    );
    assert!(store.files()[0].is_modified());

    let reread = read_textgrid(dir.path().join("a.TextGrid")).unwrap();
    assert_eq!(reread.tier("gloss").unwrap().intervals[1].text, "kind");
    assert_eq!(reread.tier("word").unwrap().intervals[1].text, "category");
}

#[test]
fn replace_all_substitutes_substrings_and_is_idempotent() {
    let dir = glossed_corpus();
    let mut store = load(dir.path(), &["gloss"]);

    let written = store.replace_all("cat", "dog", 1, 1).unwrap();
    assert_eq!(written, 2);
    assert_eq!(column_texts(&store, 1), vec!["dog", "dogegory", "dog"]);

    let (tx, rx) = mpsc::channel();
    store.subscribe(Box::new(tx));
    assert_eq!(store.replace_all("cat", "dog", 1, 1).unwrap(), 0);
    assert_eq!(column_texts(&store, 1), vec!["dog", "dogegory", "dog"]);
    assert!(rx.try_recv().is_err());

    let reread = read_textgrid(dir.path().join("a.TextGrid")).unwrap();
    let words = reread
        .tier("word")
        .unwrap()
        .intervals
        .iter()
        .map(|interval| interval.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(words, vec!["dog", "dogegory", "dog"]);
}

#[test]
fn replace_one_uses_capture_groups_and_skips_non_matches() {
    let dir = glossed_corpus();
    let mut store = load(dir.path(), &["gloss"]);

    assert!(store.replace_one(1, 1, "^(cat)(.*)$", "$2-$1").unwrap());
    assert_eq!(store.get(1, 1).unwrap().text, "egory-cat");

    assert!(!store.replace_one(2, 1, "cat", "x").unwrap());
    assert!(!store.replace_one(2, 2, "", "x").unwrap());
    assert_eq!(store.get(2, 1).unwrap().text, "dog");
}

#[test]
fn find_next_scans_forward_without_wrapping() {
    let dir = word_corpus(&["dog", "cat", "cats"]);
    let store = load(dir.path(), &[]);

    assert_eq!(store.find_next(0, 1, "cat").unwrap(), Some(1));
    assert_eq!(store.find_next(2, 1, "cat").unwrap(), Some(2));
    assert_eq!(store.find_next(1, 1, "dog").unwrap(), None);
    assert_eq!(store.find_next(7, 1, "cat").unwrap(), None);
    assert_eq!(store.find_all(1, "^cat").unwrap(), vec![1, 2]);
}

#[test]
fn invalid_pattern_and_bad_column_are_errors() {
    let dir = word_corpus(&["dog"]);
    let mut store = load(dir.path(), &[]);

    assert!(matches!(
        store.find_next(0, 1, "("),
        Err(TableError::InvalidPattern { .. })
    ));
    assert!(matches!(
        store.replace_all("a", "b", 1, 5),
        Err(TableError::ColumnOutOfRange { column: 5, columns: 2 })
    ));
    assert!(matches!(
        store.set(4, 1, "x"),
        Err(TableError::RowOutOfRange { row: 4, rows: 1 })
    ));
}

#[test]
fn map_annotation_copies_into_present_target_cells() {
    let dir = glossed_corpus();
    let mut store = load(dir.path(), &["gloss"]);

    let written = MapAnnotationRequest {
        source_column: "word".to_string(),
        target_column: "gloss".to_string(),
        pattern: "^(.*)$".to_string(),
        replacement: "<$1>".to_string(),
    }
    .apply(&mut store)
    .unwrap();

    assert_eq!(written, 2);
    assert_eq!(column_texts(&store, 2), vec!["<cat>", "<category>", ""]);
    assert_eq!(store.get(2, 2).unwrap().kind, CellKind::Absent);
    assert_eq!(column_texts(&store, 1), vec!["cat", "category", "dog"]);
}

#[test]
fn requests_resolve_columns_by_name() {
    let dir = word_corpus(&["dog", "cat", "cats"]);
    let mut store = load(dir.path(), &[]);
    let request = FindReplaceRequest {
        column: "word".to_string(),
        pattern: "cat".to_string(),
        replacement: "bird".to_string(),
    };

    assert_eq!(request.find_next(&store, 0).unwrap(), Some(1));
    assert_eq!(request.replace_next(&mut store, 2).unwrap(), Some(2));
    assert_eq!(column_texts(&store, 1), vec!["dog", "cat", "birds"]);

    let unknown = FindReplaceRequest {
        column: "phone".to_string(),
        ..request
    };
    assert_eq!(
        unknown.find_all(&store).unwrap_err().to_string(),
        TableError::UnknownColumn("phone".to_string()).to_string()
    );
}

#[test]
fn filter_sort_and_snapshot_are_row_views() {
    let dir = word_corpus(&["pear", "apple", "fig"]);
    let store = load(dir.path(), &[]);

    assert_eq!(store.filter_rows(1, "").unwrap(), vec![0, 1, 2]);
    assert_eq!(store.filter_rows(1, "p").unwrap(), vec![0, 1]);
    assert_eq!(store.sorted_rows(1, SortOrder::Ascending).unwrap(), vec![1, 2, 0]);
    assert_eq!(store.sorted_rows(1, SortOrder::Descending).unwrap(), vec![0, 2, 1]);

    let snapshot = store.snapshot(Some(&[1][..]));
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "headers": ["filename", "word"],
            "rows": [[
                {"text": "a.TextGrid", "kind": "file_name"},
                {"text": "apple", "kind": "editable"}
            ]]
        })
    );
}

#[test]
fn sort_ignores_letter_case_and_keeps_ties_in_table_order() {
    let dir = word_corpus(&["banana", "Apple", "apple", "Cherry"]);
    let store = load(dir.path(), &[]);

    assert_eq!(
        store.sorted_rows(1, SortOrder::Ascending).unwrap(),
        vec![1, 2, 0, 3]
    );
    assert_eq!(
        store.sorted_rows(1, SortOrder::Descending).unwrap(),
        vec![3, 0, 1, 2]
    );
    assert!(matches!(
        store.sorted_rows(2, SortOrder::Ascending),
        Err(TableError::ColumnOutOfRange { column: 2, columns: 2 })
    ));
}

#[test]
fn row_context_exposes_path_and_primary_interval() {
    let dir = word_corpus(&["dog", "cat"]);
    let store = load(dir.path(), &[]);

    let context = store.row_context(1).unwrap();
    assert_eq!(context.path, dir.path().join("a.TextGrid"));
    assert_eq!(context.primary.xmin, 1.0);
    assert_eq!(context.primary.xmax, 2.0);
    assert!(store.row_context(2).is_none());
}

#[test]
fn reload_and_close_reset_the_table() {
    let dir = glossed_corpus();
    let mut store = load(dir.path(), &["gloss"]);
    let (tx, rx) = mpsc::channel();
    store.subscribe(Box::new(tx));

    load_into(&mut store, dir.path(), &[]);
    assert_eq!(store.column_count(), 2);

    store.close();
    store.close();
    assert!(!store.is_loaded());
    assert_eq!(store.row_count(), 0);
    assert!(store.get(0, 1).is_none());
    assert!(matches!(store.set(0, 1, "x"), Err(TableError::NotLoaded)));
    assert_eq!(
        rx.try_iter().collect::<Vec<_>>(),
        vec![TableEvent::Reset, TableEvent::Reset]
    );
}

#[derive(Default)]
struct FailingSink {
    attempts: Vec<PathBuf>,
}

impl AnnotationSink for FailingSink {
    fn persist(&mut self, grid: &TextGrid) -> TextGridResult<()> {
        self.attempts.push(grid.path().to_path_buf());
        Err(TextGridError::Encoding("disk full".to_string()))
    }
}

#[test]
fn failed_write_restores_previous_text() {
    let dir = glossed_corpus();
    let mut store = TableStore::with_sink(FailingSink::default());
    load_into(&mut store, dir.path(), &["gloss"]);
    let (tx, rx) = mpsc::channel();
    store.subscribe(Box::new(tx));

    let err = store.set(0, 1, "lion").unwrap_err();
    assert!(matches!(err, TableError::Persist { .. }));
    assert_eq!(store.get(0, 1).unwrap().text, "cat");
    assert!(!store.files()[0].is_modified());
    assert!(rx.try_recv().is_err());
    assert_eq!(store.sink().attempts, vec![dir.path().join("a.TextGrid")]);

    assert!(!store.set(0, 0, "x").unwrap());
    assert_eq!(store.sink().attempts.len(), 1);
}
