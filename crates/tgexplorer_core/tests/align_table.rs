mod common;

use common::{interval_tier, write_grid};
use tgexplorer_core::{align_dir, AlignOptions, Cell, KeyScope};

fn secondaries(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

#[test]
fn directory_without_grids_yields_headers_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.TextGrid"), "not praat").unwrap();

    let alignment = align_dir(
        dir.path(),
        "word",
        &secondaries(&["gloss", "phone"]),
        AlignOptions::default(),
    )
    .unwrap();
    assert_eq!(
        alignment.table.headers,
        vec!["filename", "word", "gloss", "phone"]
    );
    assert!(alignment.table.rows.is_empty());
    assert_eq!(alignment.corpus.skipped.len(), 1);
}

#[test]
fn matching_span_fills_secondary_cell() {
    let dir = tempfile::tempdir().unwrap();
    write_grid(
        dir.path(),
        "a.TextGrid",
        vec![
            interval_tier("word", &[(0.0, 1.0, "cat")]),
            interval_tier("gloss", &[(0.0, 1.0, "feline")]),
        ],
    );

    let alignment = align_dir(dir.path(), "word", &secondaries(&["gloss"]), AlignOptions::default()).unwrap();
    let rows = &alignment.table.rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].cell(0), Some(Cell::File(0)));

    let Some(Cell::Interval(primary)) = rows[0].cell(1) else {
        panic!("primary cell must reference an interval");
    };
    let Some(Cell::Interval(gloss)) = rows[0].cell(2) else {
        panic!("gloss cell must reference an interval");
    };
    let grid = &alignment.corpus.files[0];
    assert_eq!(grid.tiers[primary.tier].intervals[primary.interval].text, "cat");
    assert_eq!(grid.tiers[gloss.tier].intervals[gloss.interval].text, "feline");
}

#[test]
fn non_matching_end_leaves_cell_absent() {
    let dir = tempfile::tempdir().unwrap();
    write_grid(
        dir.path(),
        "a.TextGrid",
        vec![
            interval_tier("word", &[(0.0, 1.0, "cat")]),
            interval_tier("gloss", &[(0.0, 1.2, "feline")]),
        ],
    );

    let alignment = align_dir(dir.path(), "word", &secondaries(&["gloss"]), AlignOptions::default()).unwrap();
    assert_eq!(alignment.table.rows.len(), 1);
    assert_eq!(alignment.table.rows[0].cell(2), Some(Cell::Absent));
}

#[test]
fn blank_primary_text_and_missing_primary_tier_produce_no_rows() {
    let dir = tempfile::tempdir().unwrap();
    write_grid(
        dir.path(),
        "a.TextGrid",
        vec![interval_tier(
            "word",
            &[(0.0, 1.0, ""), (1.0, 2.0, "  \t"), (2.0, 3.0, "dog")],
        )],
    );
    write_grid(
        dir.path(),
        "b.TextGrid",
        vec![interval_tier("gloss", &[(0.0, 1.0, "orphan")])],
    );

    let alignment = align_dir(dir.path(), "word", &secondaries(&["gloss"]), AlignOptions::default()).unwrap();
    assert_eq!(alignment.table.rows.len(), 1);
    assert_eq!(alignment.table.rows[0].file, 0);
    assert_eq!(alignment.table.rows[0].cell(2), Some(Cell::Absent));
}

#[test]
fn rows_follow_file_then_interval_order() {
    let dir = tempfile::tempdir().unwrap();
    write_grid(
        dir.path(),
        "a.TextGrid",
        vec![interval_tier("word", &[(1.0, 2.0, "second"), (0.0, 1.0, "first")])],
    );
    write_grid(
        dir.path(),
        "b.TextGrid",
        vec![interval_tier("word", &[(0.0, 1.0, "third")])],
    );

    let alignment = align_dir(dir.path(), "word", &[], AlignOptions::default()).unwrap();
    let texts = alignment
        .table
        .rows
        .iter()
        .map(|row| {
            let grid = &alignment.corpus.files[row.primary.file];
            grid.tiers[row.primary.tier].intervals[row.primary.interval]
                .text
                .clone()
        })
        .collect::<Vec<_>>();
    assert_eq!(texts, vec!["second", "first", "third"]);
}

#[test]
fn global_keys_let_the_last_file_win() {
    let dir = tempfile::tempdir().unwrap();
    for (name, word) in [("a.TextGrid", "first"), ("b.TextGrid", "second")] {
        write_grid(
            dir.path(),
            name,
            vec![
                interval_tier("word", &[(0.0, 1.0, word), (1.0, 2.0, "x")]),
                interval_tier("gloss", &[(0.0, 1.0, "g")]),
            ],
        );
    }

    let per_file = align_dir(dir.path(), "word", &secondaries(&["gloss"]), AlignOptions::default()).unwrap();
    assert_eq!(per_file.table.rows.len(), 4);

    let global = align_dir(
        dir.path(),
        "word",
        &secondaries(&["gloss"]),
        AlignOptions {
            key_scope: KeyScope::Global,
        },
    )
    .unwrap();
    let rows = &global.table.rows;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].file, 1);
    assert!(matches!(rows[0].cell(2), Some(Cell::Interval(reference)) if reference.file == 1));
}
