//! `tgexplorer` command line front end.
//!
//! # Responsibility
//! - Map subcommands onto `tgexplorer_core` use-cases.
//! - Print tables as TSV or JSON snapshots.
//!
//! Every invocation loads the table afresh; edits are written back to the
//! TextGrid files immediately.

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tgexplorer_core::config::default_preferences_path;
use tgexplorer_core::project::ProjectRequest;
use tgexplorer_core::{
    default_log_level, init_logging, open_project, scan_project_tiers, secondary_choices,
    FilterRequest, FindReplaceRequest, KeyScope, MapAnnotationRequest, PraatLauncher,
    Preferences, SortOrder, TableSnapshot, TableStore,
};

#[derive(Parser, Debug)]
#[command(name = "tgexplorer", version)]
#[command(about = "Align TextGrid tiers across a directory and edit them as one table")]
struct Cli {
    /// Write rotating logs into this absolute directory
    #[arg(long, global = true, env = "TGEXPLORER_LOG_DIR", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, global = true, env = "TGEXPLORER_LOG_LEVEL")]
    log_level: Option<String>,

    /// Preferences file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tier names found under a directory
    Tiers {
        dir: PathBuf,
        /// Also list the secondary choices left after picking this primary
        #[arg(long)]
        primary: Option<String>,
    },
    /// Print the aligned table
    Table {
        #[command(flatten)]
        project: ProjectArgs,
        /// Column to filter on
        #[arg(long, requires = "filter")]
        filter_column: Option<String>,
        /// Regular expression rows must match in the filter column
        #[arg(long, requires = "filter_column")]
        filter: Option<String>,
        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,
        /// Sort Z to A
        #[arg(long, requires = "sort")]
        descending: bool,
        /// Print a JSON snapshot instead of TSV
        #[arg(long)]
        json: bool,
    },
    /// Find rows whose column matches a pattern
    Find {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long)]
        column: String,
        #[arg(long)]
        pattern: String,
        /// Report only the first match at or after this row
        #[arg(long, value_name = "ROW")]
        from: Option<usize>,
    },
    /// Replace matches within one column and write the files back
    Replace {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long)]
        column: String,
        #[arg(long)]
        pattern: String,
        /// Replacement text; `$1` refers to capture groups
        #[arg(long)]
        replacement: String,
        /// Replace only in the next match at or after this row
        #[arg(long, value_name = "ROW")]
        from: Option<usize>,
    },
    /// Write transformed text of one column into another
    Map {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        #[arg(long)]
        pattern: String,
        #[arg(long)]
        replacement: String,
    },
    /// Open one row's file in Praat, zoomed to its primary interval
    Praat {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long)]
        row: usize,
        /// Print the invocation without starting Praat
        #[arg(long)]
        dry_run: bool,
    },
    /// Show or update preferences
    Config {
        #[arg(long)]
        praat_path: Option<String>,
        /// Comma separated list, e.g. "wav,flac"
        #[arg(long)]
        sound_extensions: Option<String>,
        #[arg(long)]
        maximize_audibility: Option<bool>,
        #[arg(long)]
        activate_plugins: Option<bool>,
    },
}

#[derive(Args, Debug)]
struct ProjectArgs {
    /// Directory searched recursively for TextGrid files
    dir: PathBuf,
    /// Tier whose intervals define the rows
    #[arg(long)]
    primary: String,
    /// Additional tiers aligned on the primary intervals
    #[arg(long = "secondary", value_name = "TIER")]
    secondary: Vec<String>,
    /// Align across files on time alone; the last file wins
    #[arg(long)]
    global_keys: bool,
}

impl ProjectArgs {
    fn request(&self) -> Result<ProjectRequest> {
        let mut request = ProjectRequest::new(absolute(&self.dir)?, self.primary.clone())
            .with_secondary_tiers(self.secondary.iter().cloned());
        if self.global_keys {
            request.key_scope = KeyScope::Global;
        }
        Ok(request)
    }

    fn open(&self) -> Result<TableStore> {
        let request = self.request()?;
        let mut store = TableStore::new();
        let summary = open_project(&mut store, &request)
            .with_context(|| format!("failed to open `{}`", request.source_dir.display()))?;
        if summary.files_skipped > 0 {
            eprintln!("skipped {} unreadable file(s)", summary.files_skipped);
        }
        Ok(store)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, absolute(log_dir)?).context("failed to initialize logging")?;
    }

    match cli.command {
        Command::Tiers { dir, primary } => run_tiers(&dir, primary.as_deref()),
        Command::Table {
            project,
            filter_column,
            filter,
            sort,
            descending,
            json,
        } => {
            let store = project.open()?;
            let mut rows = match (filter_column, filter) {
                (Some(column), Some(pattern)) => FilterRequest { column, pattern }.apply(&store)?,
                _ => (0..store.row_count()).collect(),
            };
            if let Some(sort) = sort {
                let column = store
                    .column_index(&sort)
                    .ok_or_else(|| anyhow!("unknown column `{sort}`"))?;
                let order = if descending {
                    SortOrder::Descending
                } else {
                    SortOrder::Ascending
                };
                rows = keep_sorted(store.sorted_rows(column, order)?, &rows);
            }
            print_snapshot(&store.snapshot(Some(rows.as_slice())), json)
        }
        Command::Find {
            project,
            column,
            pattern,
            from,
        } => {
            let store = project.open()?;
            let request = FindReplaceRequest {
                column,
                pattern,
                replacement: String::new(),
            };
            let rows: Vec<usize> = match from {
                Some(start) => request.find_next(&store, start)?.into_iter().collect(),
                None => request.find_all(&store)?,
            };
            let column = store
                .column_index(&request.column)
                .ok_or_else(|| anyhow!("unknown column `{}`", request.column))?;
            for row in rows {
                let text = store.get(row, column).map(|cell| cell.text).unwrap_or_default();
                println!("{row}\t{text}");
            }
            Ok(())
        }
        Command::Replace {
            project,
            column,
            pattern,
            replacement,
            from,
        } => {
            let mut store = project.open()?;
            let request = FindReplaceRequest {
                column,
                pattern,
                replacement,
            };
            match from {
                Some(start) => match request.replace_next(&mut store, start)? {
                    Some(row) => println!("row {row}"),
                    None => println!("no match"),
                },
                None => println!("{} cell(s) written", request.replace_all(&mut store)?),
            }
            Ok(())
        }
        Command::Map {
            project,
            source,
            target,
            pattern,
            replacement,
        } => {
            let mut store = project.open()?;
            let written = MapAnnotationRequest {
                source_column: source,
                target_column: target,
                pattern,
                replacement,
            }
            .apply(&mut store)?;
            println!("{written} cell(s) written");
            Ok(())
        }
        Command::Praat {
            project,
            row,
            dry_run,
        } => {
            let store = project.open()?;
            let preferences = Preferences::load_from(preferences_path(cli.config)?)?;
            let context = store
                .row_context(row)
                .ok_or_else(|| anyhow!("row {row} is out of range"))?;
            let launcher = PraatLauncher::new(&preferences, std::env::temp_dir());
            let launch = if dry_run {
                launcher.build(context.path, context.primary)?
            } else {
                launcher.launch(context.path, context.primary)?
            };
            let args = launch
                .args
                .iter()
                .map(|arg| arg.to_string_lossy())
                .collect::<Vec<_>>();
            println!("{} {}", launch.program.display(), args.join(" "));
            Ok(())
        }
        Command::Config {
            praat_path,
            sound_extensions,
            maximize_audibility,
            activate_plugins,
        } => {
            let config_path = preferences_path(cli.config)?;
            let mut preferences = Preferences::load_from(&config_path)?;
            let mut changed = false;
            if let Some(praat_path) = praat_path {
                preferences.praat_path = praat_path;
                changed = true;
            }
            if let Some(raw) = sound_extensions {
                preferences.set_sound_extensions(&raw);
                changed = true;
            }
            if let Some(value) = maximize_audibility {
                preferences.maximize_audibility = value;
                changed = true;
            }
            if let Some(value) = activate_plugins {
                preferences.activate_plugins = value;
                changed = true;
            }
            if changed {
                preferences.save_to(&config_path)?;
                info!(
                    "event=preferences_save module=cli status=ok path={}",
                    config_path.display()
                );
            }
            println!("# {}", config_path.display());
            print!("{}", preferences.to_toml_string()?);
            Ok(())
        }
    }
}

fn run_tiers(dir: &Path, primary: Option<&str>) -> Result<()> {
    let scan = scan_project_tiers(&absolute(dir)?)?;
    let names = match primary {
        Some(primary) => secondary_choices(&scan.tier_names, primary),
        None => scan.tier_names,
    };
    for name in names {
        println!("{name}");
    }
    if !scan.skipped.is_empty() {
        eprintln!(
            "parsed {} file(s), skipped {}",
            scan.files_parsed,
            scan.skipped.len()
        );
    }
    Ok(())
}

/// Rows of `sorted` that are also in `visible`, in sorted order.
fn keep_sorted(sorted: Vec<usize>, visible: &[usize]) -> Vec<usize> {
    let visible = visible.iter().copied().collect::<HashSet<_>>();
    sorted
        .into_iter()
        .filter(|row| visible.contains(row))
        .collect()
}

fn print_snapshot(snapshot: &TableSnapshot, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snapshot)?);
        return Ok(());
    }
    println!("{}", snapshot.headers.join("\t"));
    for row in &snapshot.rows {
        let cells = row
            .iter()
            .map(|cell| cell.text.replace(['\t', '\n'], " "))
            .collect::<Vec<_>>();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}

fn preferences_path(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path),
        None => Ok(default_preferences_path()?),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read the current directory")?;
    Ok(cwd.join(path))
}
