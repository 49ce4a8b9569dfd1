//! TextGrid serialization (long text layout, UTF-8).

use super::model::{TextGrid, TierKind};
use super::{TextGridError, TextGridResult};
use std::fmt::Write as _;
use std::path::Path;

/// Renders `grid` in Praat's long text layout.
pub fn to_long_text(grid: &TextGrid) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = render(grid, &mut out);
    out
}

/// Writes `grid` to `path` in the long text layout.
pub fn write_textgrid(grid: &TextGrid, path: impl AsRef<Path>) -> TextGridResult<()> {
    let path = path.as_ref();
    std::fs::write(path, to_long_text(grid)).map_err(|source| TextGridError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn render(grid: &TextGrid, out: &mut String) -> std::fmt::Result {
    writeln!(out, "File type = \"ooTextFile\"")?;
    writeln!(out, "Object class = \"TextGrid\"")?;
    writeln!(out)?;
    writeln!(out, "xmin = {} ", grid.xmin)?;
    writeln!(out, "xmax = {} ", grid.xmax)?;
    if grid.tiers.is_empty() {
        writeln!(out, "tiers? <absent> ")?;
        return Ok(());
    }
    writeln!(out, "tiers? <exists> ")?;
    writeln!(out, "size = {} ", grid.tiers.len())?;
    writeln!(out, "item []: ")?;

    for (tier_index, tier) in grid.tiers.iter().enumerate() {
        writeln!(out, "    item [{}]:", tier_index + 1)?;
        writeln!(out, "        class = \"{}\" ", tier.kind.class_name())?;
        writeln!(out, "        name = \"{}\" ", escape(&tier.name))?;
        writeln!(out, "        xmin = {} ", tier.xmin)?;
        writeln!(out, "        xmax = {} ", tier.xmax)?;
        match tier.kind {
            TierKind::Interval => {
                writeln!(out, "        intervals: size = {} ", tier.intervals.len())?;
                for (index, interval) in tier.intervals.iter().enumerate() {
                    writeln!(out, "        intervals [{}]:", index + 1)?;
                    writeln!(out, "            xmin = {} ", interval.xmin)?;
                    writeln!(out, "            xmax = {} ", interval.xmax)?;
                    writeln!(out, "            text = \"{}\" ", escape(&interval.text))?;
                }
            }
            TierKind::Point => {
                writeln!(out, "        points: size = {} ", tier.intervals.len())?;
                for (index, point) in tier.intervals.iter().enumerate() {
                    writeln!(out, "        points [{}]:", index + 1)?;
                    writeln!(out, "            number = {} ", point.xmin)?;
                    writeln!(out, "            mark = \"{}\" ", escape(&point.text))?;
                }
            }
        }
    }
    Ok(())
}

fn escape(value: &str) -> String {
    value.replace('"', "\"\"")
}
