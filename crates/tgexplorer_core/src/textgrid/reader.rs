//! TextGrid text-format decoding.
//!
//! Both Praat text layouts carry the same value sequence; the long layout
//! only adds `label =` decorations and `[n]` indices around the values. The
//! lexer therefore keeps quoted strings, numbers and `<exists>`/`<absent>`
//! flags, and discards everything else, so one parser handles both layouts.
//!
//! # Invariants
//! - Accepted encodings: UTF-8 (optional BOM), UTF-16 LE/BE (BOM or
//!   zero-byte sniffing).
//! - A doubled quote (`""`) inside a string is one literal quote.
//! - Declared tier and interval counts never drive allocation; malformed
//!   input is reported as an error, never a panic.
//! - Binary TextGrids are rejected with [`TextGridError::InvalidHeader`].

use super::model::{Interval, TextGrid, Tier, TierKind};
use super::{TextGridError, TextGridResult};
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

/// Reads and parses one TextGrid file from disk.
pub fn read_textgrid(path: impl AsRef<Path>) -> TextGridResult<TextGrid> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TextGridError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = decode_bytes(&bytes)?;
    parse_textgrid(&content, path)
}

/// Parses TextGrid text content; `path` is recorded as the grid location.
pub fn parse_textgrid(input: &str, path: impl AsRef<Path>) -> TextGridResult<TextGrid> {
    let mut parser = Parser::new(input.trim_start_matches('\u{feff}'));

    let file_type = parser.text("file type")?;
    if !file_type.starts_with("ooTextFile") {
        return Err(TextGridError::InvalidHeader(file_type));
    }
    let object_class = parser.text("object class")?;
    if object_class != "TextGrid" {
        return Err(TextGridError::InvalidHeader(object_class));
    }

    let xmin = parser.number("grid xmin")?;
    let xmax = parser.number("grid xmax")?;
    let mut grid = TextGrid::new(path.as_ref(), xmin, xmax);

    let tier_count = match parser.token("tiers flag")? {
        Token::Flag(true) => parser.count("tier count")?,
        Token::Flag(false) => 0,
        other => {
            return Err(TextGridError::UnexpectedToken {
                expected: "tiers flag",
                found: other.describe(),
            })
        }
    };

    for _ in 0..tier_count {
        grid.tiers.push(parser.tier()?);
    }

    Ok(grid)
}

pub(crate) fn decode_bytes(bytes: &[u8]) -> TextGridResult<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => decode_utf8(rest),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, u16::from_le_bytes),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, u16::from_be_bytes),
        [first, 0, ..] if *first != 0 => decode_utf16(bytes, u16::from_le_bytes),
        [0, second, ..] if *second != 0 => decode_utf16(bytes, u16::from_be_bytes),
        _ => decode_utf8(bytes),
    }
}

fn decode_utf8(bytes: &[u8]) -> TextGridResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|err| TextGridError::Encoding(err.to_string()))
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> TextGridResult<String> {
    if bytes.len() % 2 != 0 {
        return Err(TextGridError::Encoding(
            "odd byte count in UTF-16 content".to_string(),
        ));
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect::<Vec<_>>();
    String::from_utf16(&units).map_err(|err| TextGridError::Encoding(err.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Text(String),
    Number(f64),
    Flag(bool),
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Text(value) => format!("\"{value}\""),
            Self::Number(value) => value.to_string(),
            Self::Flag(true) => "<exists>".to_string(),
            Self::Flag(false) => "<absent>".to_string(),
        }
    }
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn quoted(&mut self) -> TextGridResult<Token> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                None => {
                    return Err(TextGridError::UnexpectedEnd {
                        expected: "closing quote",
                    })
                }
                Some('"') => {
                    if self.chars.peek() == Some(&'"') {
                        self.chars.next();
                        value.push('"');
                    } else {
                        return Ok(Token::Text(value));
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn flag(&mut self) -> TextGridResult<Token> {
        let mut value = String::new();
        for c in self.chars.by_ref() {
            if c == '>' {
                return match value.as_str() {
                    "exists" => Ok(Token::Flag(true)),
                    "absent" => Ok(Token::Flag(false)),
                    _ => Err(TextGridError::UnexpectedToken {
                        expected: "<exists> or <absent>",
                        found: format!("<{value}>"),
                    }),
                };
            }
            value.push(c);
        }
        Err(TextGridError::UnexpectedEnd {
            expected: "closing `>`",
        })
    }

    fn number(&mut self) -> TextGridResult<Token> {
        let mut raw = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                break;
            }
            raw.push(c);
            self.chars.next();
        }
        raw.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| TextGridError::UnexpectedToken {
                expected: "number",
                found: raw,
            })
    }

    fn skip_while(&mut self, keep_going: impl Fn(char) -> bool) {
        while let Some(&c) = self.chars.peek() {
            if !keep_going(c) {
                break;
            }
            self.chars.next();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = TextGridResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let c = *self.chars.peek()?;
            match c {
                '"' => {
                    self.chars.next();
                    return Some(self.quoted());
                }
                '<' => {
                    self.chars.next();
                    return Some(self.flag());
                }
                '!' => self.skip_while(|c| c != '\n'),
                '[' => {
                    self.skip_while(|c| c != ']');
                    self.chars.next();
                }
                c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                    return Some(self.number());
                }
                c if c.is_alphabetic() || c == '_' => {
                    self.skip_while(|c| c.is_alphanumeric() || c == '_' || c == '?')
                }
                _ => {
                    self.chars.next();
                }
            }
        }
    }
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    fn token(&mut self, expected: &'static str) -> TextGridResult<Token> {
        self.lexer
            .next()
            .unwrap_or(Err(TextGridError::UnexpectedEnd { expected }))
    }

    fn text(&mut self, expected: &'static str) -> TextGridResult<String> {
        match self.token(expected)? {
            Token::Text(value) => Ok(value),
            other => Err(TextGridError::UnexpectedToken {
                expected,
                found: other.describe(),
            }),
        }
    }

    fn number(&mut self, expected: &'static str) -> TextGridResult<f64> {
        match self.token(expected)? {
            Token::Number(value) => Ok(value),
            other => Err(TextGridError::UnexpectedToken {
                expected,
                found: other.describe(),
            }),
        }
    }

    fn count(&mut self, expected: &'static str) -> TextGridResult<usize> {
        let value = self.number(expected)?;
        if value < 0.0 || value.fract() != 0.0 || !value.is_finite() {
            return Err(TextGridError::UnexpectedToken {
                expected,
                found: value.to_string(),
            });
        }
        Ok(value as usize)
    }

    fn tier(&mut self) -> TextGridResult<Tier> {
        let class = self.text("tier class")?;
        let kind = TierKind::from_class_name(&class)
            .ok_or(TextGridError::UnsupportedTierClass(class))?;
        let name = self.text("tier name")?;
        let xmin = self.number("tier xmin")?;
        let xmax = self.number("tier xmax")?;
        let size = self.count("tier size")?;

        // `size` is untrusted; intervals grow as they are actually read.
        let mut tier = Tier::new(name, kind, xmin, xmax);
        for _ in 0..size {
            let interval = match kind {
                TierKind::Interval => {
                    let start = self.number("interval xmin")?;
                    let end = self.number("interval xmax")?;
                    Interval::new(start, end, self.text("interval text")?)
                }
                TierKind::Point => {
                    let time = self.number("point number")?;
                    Interval::point(time, self.text("point mark")?)
                }
            };
            tier.intervals.push(interval);
        }
        Ok(tier)
    }
}
