//! Praat TextGrid file model, reader and writer.
//!
//! # Responsibility
//! - Decode TextGrid text files (long and short layouts) into [`TextGrid`].
//! - Re-serialize an edited grid back to its file.
//!
//! # Invariants
//! - Reading never panics on malformed input; every failure is a
//!   [`TextGridError`].
//! - Writing always produces the long text layout in UTF-8.
//!
//! # See also
//! - `reader` for accepted encodings and layouts.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod model;
pub mod reader;
pub mod writer;

pub use model::{Interval, TextGrid, Tier, TierKind};
pub use reader::{parse_textgrid, read_textgrid};
pub use writer::{to_long_text, write_textgrid};

/// File extension used by TextGrid files, matched case-insensitively.
pub const TEXTGRID_EXTENSION: &str = "TextGrid";

pub type TextGridResult<T> = Result<T, TextGridError>;

/// Error raised while reading or writing one TextGrid file.
#[derive(Debug)]
pub enum TextGridError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Bytes are not valid UTF-8 / UTF-16 text.
    Encoding(String),
    /// File type header is not a text TextGrid.
    InvalidHeader(String),
    UnexpectedEnd {
        expected: &'static str,
    },
    UnexpectedToken {
        expected: &'static str,
        found: String,
    },
    UnsupportedTierClass(String),
}

impl Display for TextGridError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "i/o error on `{}`: {source}", path.display()),
            Self::Encoding(message) => write!(f, "invalid text encoding: {message}"),
            Self::InvalidHeader(found) => {
                write!(f, "not a text TextGrid file (header `{found}`)")
            }
            Self::UnexpectedEnd { expected } => {
                write!(f, "unexpected end of file, expected {expected}")
            }
            Self::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected}, found `{found}`")
            }
            Self::UnsupportedTierClass(class) => write!(f, "unsupported tier class `{class}`"),
        }
    }
}

impl Error for TextGridError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Returns whether `path` carries the TextGrid extension.
pub fn has_textgrid_extension(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(TEXTGRID_EXTENSION))
        .unwrap_or(false)
}
