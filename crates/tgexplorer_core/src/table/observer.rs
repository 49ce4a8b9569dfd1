//! Change notification contract between the table and its presenters.

use std::sync::mpsc::Sender;

/// Notification emitted by [`crate::table::TableStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    /// Display text of exactly one cell changed.
    CellChanged { row: usize, column: usize },
    /// Headers and rows were replaced (load, reload or close).
    Reset,
}

/// Presentation-side subscriber.
pub trait TableObserver {
    fn cell_changed(&mut self, row: usize, column: usize);
    fn table_reset(&mut self);
}

/// Forwards events over a channel. A dropped receiver is ignored.
impl TableObserver for Sender<TableEvent> {
    fn cell_changed(&mut self, row: usize, column: usize) {
        let _ = self.send(TableEvent::CellChanged { row, column });
    }

    fn table_reset(&mut self) {
        let _ = self.send(TableEvent::Reset);
    }
}
