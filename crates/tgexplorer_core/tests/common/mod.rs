#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tgexplorer_core::{write_textgrid, Interval, TextGrid, Tier, TierKind};

pub fn interval_tier(name: &str, intervals: &[(f64, f64, &str)]) -> Tier {
    let xmax = intervals.iter().map(|(_, end, _)| *end).fold(0.0, f64::max);
    intervals.iter().fold(
        Tier::new(name, TierKind::Interval, 0.0, xmax),
        |tier, (xmin, xmax, text)| tier.with_interval(Interval::new(*xmin, *xmax, *text)),
    )
}

/// Writes a grid made of `tiers` to `dir/name` and returns its path.
pub fn write_grid(dir: &Path, name: &str, tiers: Vec<Tier>) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let xmax = tiers.iter().map(|tier| tier.xmax).fold(0.0, f64::max);
    let grid = tiers
        .into_iter()
        .fold(TextGrid::new(&path, 0.0, xmax), TextGrid::with_tier);
    write_textgrid(&grid, &path).unwrap();
    path
}

/// One file with a `word` tier holding `words` at one-second spans.
pub fn word_corpus(words: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let spans = words
        .iter()
        .enumerate()
        .map(|(i, word)| (i as f64, i as f64 + 1.0, *word))
        .collect::<Vec<_>>();
    write_grid(dir.path(), "a.TextGrid", vec![interval_tier("word", &spans)]);
    dir
}
