//! Praat launcher.
//!
//! # Responsibility
//! - Locate the Praat executable and the sound file paired with a TextGrid.
//! - Build and spawn `praat --hide-picture --new-send` with the bundled
//!   script that opens both files zoomed to one interval.
//!
//! # Invariants
//! - Launching never blocks on the child process.
//! - Invocation arguments are built without touching the process table,
//!   so they can be inspected before [`PraatLaunch::spawn`].

use crate::config::Preferences;
use crate::textgrid::Interval;
use log::{error, info};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Script that opens a TextGrid and its sound zoomed to `[start, end]`.
pub const OPEN_SCRIPT: &str = include_str!("../../resources/open_file.praat");
const OPEN_SCRIPT_NAME: &str = "tgexplorer_open_file.praat";

#[derive(Debug)]
pub enum LaunchError {
    /// The configured executable is neither a file nor found on `PATH`.
    ToolNotFound(String),
    ScriptInstall {
        path: PathBuf,
        source: std::io::Error,
    },
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },
}

impl Display for LaunchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolNotFound(tool) => write!(f, "praat executable `{tool}` not found"),
            Self::ScriptInstall { path, source } => write!(
                f,
                "failed to install praat script at `{}`: {source}",
                path.display()
            ),
            Self::Spawn { program, source } => {
                write!(f, "failed to start `{}`: {source}", program.display())
            }
        }
    }
}

impl Error for LaunchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ToolNotFound(_) => None,
            Self::ScriptInstall { source, .. } | Self::Spawn { source, .. } => Some(source),
        }
    }
}

/// A fully resolved Praat invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PraatLaunch {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl PraatLaunch {
    /// Spawns the process detached from our stdio and returns immediately.
    pub fn spawn(&self) -> Result<(), LaunchError> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match child {
            Ok(child) => {
                info!(
                    "event=praat_launch module=praat status=ok pid={} program={}",
                    child.id(),
                    self.program.display()
                );
                Ok(())
            }
            Err(source) => {
                error!(
                    "event=praat_launch module=praat status=error program={} error={}",
                    self.program.display(),
                    source
                );
                Err(LaunchError::Spawn {
                    program: self.program.clone(),
                    source,
                })
            }
        }
    }
}

/// Builds Praat invocations from [`Preferences`].
#[derive(Debug, Clone)]
pub struct PraatLauncher {
    praat_path: String,
    sound_extensions: Vec<String>,
    maximize_audibility: bool,
    script_dir: PathBuf,
}

impl PraatLauncher {
    /// `script_dir` receives the bundled script on first use.
    pub fn new(preferences: &Preferences, script_dir: impl Into<PathBuf>) -> Self {
        Self {
            praat_path: preferences.praat_path.clone(),
            sound_extensions: preferences.sound_extensions.clone(),
            maximize_audibility: preferences.maximize_audibility,
            script_dir: script_dir.into(),
        }
    }

    /// Resolves the configured executable to an existing file.
    ///
    /// Values containing a path separator are taken literally; bare names
    /// are searched on `PATH`.
    pub fn resolve_tool(&self) -> Result<PathBuf, LaunchError> {
        let configured = self.praat_path.trim();
        if configured.is_empty() {
            return Err(LaunchError::ToolNotFound(String::new()));
        }
        let candidate = Path::new(configured);
        if candidate.components().count() > 1 || candidate.is_absolute() {
            return if candidate.is_file() {
                Ok(candidate.to_path_buf())
            } else {
                Err(LaunchError::ToolNotFound(configured.to_string()))
            };
        }
        find_on_path(configured).ok_or_else(|| LaunchError::ToolNotFound(configured.to_string()))
    }

    /// Returns the sound file paired with `textgrid`.
    ///
    /// The first configured extension that exists on disk wins; when none
    /// exists the first extension is returned so Praat reports the error.
    pub fn sound_path_for(&self, textgrid: &Path) -> PathBuf {
        let mut first = None;
        for ext in &self.sound_extensions {
            let candidate = textgrid.with_extension(ext);
            if candidate.is_file() {
                return candidate;
            }
            first.get_or_insert(candidate);
        }
        first.unwrap_or_else(|| textgrid.with_extension("wav"))
    }

    /// Writes the bundled script into the script directory.
    pub fn install_script(&self) -> Result<PathBuf, LaunchError> {
        let path = self.script_dir.join(OPEN_SCRIPT_NAME);
        std::fs::create_dir_all(&self.script_dir)
            .and_then(|_| std::fs::write(&path, OPEN_SCRIPT))
            .map_err(|source| LaunchError::ScriptInstall {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }

    /// Builds the invocation for one interval of `textgrid`.
    pub fn build(&self, textgrid: &Path, interval: &Interval) -> Result<PraatLaunch, LaunchError> {
        let program = self.resolve_tool()?;
        let script = self.install_script()?;
        let sound = self.sound_path_for(textgrid);
        Ok(PraatLaunch {
            program,
            args: vec![
                OsString::from("--hide-picture"),
                OsString::from("--new-send"),
                script.into_os_string(),
                textgrid.as_os_str().to_os_string(),
                sound.into_os_string(),
                OsString::from(if self.maximize_audibility { "1" } else { "0" }),
                OsString::from(interval.xmin.to_string()),
                OsString::from(interval.xmax.to_string()),
            ],
        })
    }

    /// Builds and spawns in one step.
    pub fn launch(&self, textgrid: &Path, interval: &Interval) -> Result<PraatLaunch, LaunchError> {
        let launch = self.build(textgrid, interval)?;
        launch.spawn()?;
        Ok(launch)
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths).find_map(|dir| {
        let direct = dir.join(name);
        if direct.is_file() {
            return Some(direct);
        }
        if cfg!(target_os = "windows") && Path::new(name).extension().is_none() {
            let exe = dir.join(format!("{name}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}
