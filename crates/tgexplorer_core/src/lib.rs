//! Core logic for tgexplorer.
//!
//! Reads Praat TextGrid files, aligns tiers across a directory into one
//! table keyed on the primary tier, and edits that table with write-back
//! to the originating files.

pub mod align;
pub mod config;
pub mod logging;
pub mod praat;
pub mod project;
pub mod scan;
pub mod table;
pub mod textgrid;

pub use align::{
    align_corpus, align_dir, AlignOptions, AlignedRow, AlignedTable, Alignment, Cell,
    IntervalRef, KeyScope, FILENAME_HEADER,
};
pub use config::{ConfigError, Preferences};
pub use logging::{default_log_dir, default_log_level, init_logging, logging_status, LoggingError};
pub use praat::{LaunchError, PraatLaunch, PraatLauncher};
pub use project::{
    open_project, scan_project_tiers, secondary_choices, ProjectError, ProjectRequest,
    ProjectSummary,
};
pub use scan::{load_corpus, scan_tier_names, Corpus, ScanError, TierScan};
pub use table::{
    AnnotationSink, CellKind, CellView, FileSink, FilterRequest, FindReplaceRequest,
    MapAnnotationRequest, SortOrder, TableError, TableEvent, TableObserver, TableSnapshot,
    TableStore,
};
pub use textgrid::{read_textgrid, write_textgrid, Interval, TextGrid, TextGridError, Tier, TierKind};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
