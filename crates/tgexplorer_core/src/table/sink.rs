//! Write-back of edited TextGrids.

use crate::textgrid::{write_textgrid, TextGrid, TextGridResult};
use log::info;

/// Persistence target invoked once per successful cell edit.
pub trait AnnotationSink {
    fn persist(&mut self, grid: &TextGrid) -> TextGridResult<()>;
}

/// Writes each grid back to the path it was read from.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl AnnotationSink for FileSink {
    fn persist(&mut self, grid: &TextGrid) -> TextGridResult<()> {
        write_textgrid(grid, grid.path())?;
        info!(
            "event=file_write module=table status=ok path={}",
            grid.path().display()
        );
        Ok(())
    }
}
