//! Delimiter-level settings handed to the `csv` crate.
//!
//! A [`Dialect`] can be built in code or loaded from YAML:
//!
//! ```yaml
//! delimiter: ";"
//! quote: "'"
//! terminator: crlf
//! quote_style: always
//! ```
//!
//! Missing keys take their defaults.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Error)]
pub enum DialectError {
    #[error("opening dialect file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parsing dialect YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Line ending written after each row. Readers accept `\n`, `\r` and
/// `\r\n` regardless.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineTerminator {
    #[default]
    Lf,
    Crlf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    Always,
    #[default]
    Necessary,
    NonNumeric,
    Never,
}

impl From<QuoteStyle> for csv::QuoteStyle {
    fn from(style: QuoteStyle) -> Self {
        match style {
            QuoteStyle::Always => csv::QuoteStyle::Always,
            QuoteStyle::Necessary => csv::QuoteStyle::Necessary,
            QuoteStyle::NonNumeric => csv::QuoteStyle::NonNumeric,
            QuoteStyle::Never => csv::QuoteStyle::Never,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dialect {
    #[serde(with = "ascii_char")]
    pub delimiter: u8,
    #[serde(with = "ascii_char")]
    pub quote: u8,
    pub terminator: LineTerminator,
    /// Allow rows whose length differs from the first row.
    pub flexible: bool,
    /// Trim surrounding whitespace from every cell when reading.
    pub trim: bool,
    pub quote_style: QuoteStyle,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: DEFAULT_CSV_DELIMITER,
            quote: b'"',
            terminator: LineTerminator::default(),
            flexible: false,
            trim: false,
            quote_style: QuoteStyle::default(),
        }
    }
}

impl Dialect {
    pub fn tsv() -> Self {
        Dialect {
            delimiter: DEFAULT_TSV_DELIMITER,
            ..Dialect::default()
        }
    }

    /// Tab for `.tsv` files, comma for everything else.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Dialect::tsv(),
            _ => Dialect::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, DialectError> {
        let file = File::open(path).map_err(|source| DialectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_reader(BufReader::new(file))?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DialectError> {
        let file = File::create(path).map_err(|source| DialectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// A reader builder for this dialect. Header handling is left to
    /// [`TypedReader::read_header`](crate::TypedReader::read_header), so the
    /// first row is not consumed implicitly.
    pub fn reader_builder(&self) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .has_headers(false)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(true)
            .flexible(self.flexible)
            .trim(if self.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            });
        builder
    }

    pub fn writer_builder(&self) -> csv::WriterBuilder {
        let mut builder = csv::WriterBuilder::new();
        builder
            .has_headers(false)
            .delimiter(self.delimiter)
            .quote(self.quote)
            .double_quote(true)
            .flexible(self.flexible)
            .quote_style(self.quote_style.into())
            .terminator(match self.terminator {
                LineTerminator::Lf => csv::Terminator::Any(b'\n'),
                LineTerminator::Crlf => csv::Terminator::CRLF,
            });
        builder
    }
}

/// Single ASCII characters stored as `u8` but written as one-character
/// strings.
mod ascii_char {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_char(char::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        let c = char::deserialize(deserializer)?;
        u8::try_from(c)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| de::Error::custom(format!("'{c}' is not a single ASCII character")))
    }
}
