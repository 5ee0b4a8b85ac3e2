//! Error taxonomy for typed record conversion.
//!
//! Every field-level failure surfaces through one of two wrappers,
//! [`FieldParseError`] on the read side and [`FieldFormatError`] on the write
//! side. Both carry the column name the failure is attributed to and the
//! underlying [`ConversionError`] as their `source()`.

use std::{error::Error as StdError, num::ParseFloatError, num::ParseIntError};

use thiserror::Error;

use crate::format::FormatError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error raised by a [`TextCodec`](crate::TextCodec) hook.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// A record was requested before [`read_header`](crate::TypedReader::read_header).
    #[error("typed_csv: header not read")]
    HeaderNotRead,
    /// The input ended where a header row was expected.
    #[error("typed_csv: end of input")]
    EndOfInput,
    #[error(transparent)]
    Parse(#[from] FieldParseError),
    #[error(transparent)]
    Format(#[from] FieldFormatError),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Error::EndOfInput)
    }

    pub fn as_parse_error(&self) -> Option<&FieldParseError> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_format_error(&self) -> Option<&FieldFormatError> {
        match self {
            Error::Format(err) => Some(err),
            _ => None,
        }
    }
}

/// A cell could not be converted into its field.
#[derive(Debug, Error)]
#[error("typed_csv: error parsing field '{field}': {source}")]
pub struct FieldParseError {
    /// Column name, or `column[index]` for a list element.
    pub field: String,
    pub source: ConversionError,
}

/// A field could not be rendered into its cell.
#[derive(Debug, Error)]
#[error("typed_csv: error formatting field '{field}': {source}")]
pub struct FieldFormatError {
    /// Column name, or `column[index]` for a list element.
    pub field: String,
    pub source: ConversionError,
}

impl FieldParseError {
    /// Attributes `source` to `column`, unfolding list element errors into
    /// `column[index]`.
    pub(crate) fn attribute(column: &str, source: ConversionError) -> Self {
        let (field, source) = source.attribute(column);
        FieldParseError { field, source }
    }

    /// Returns the hook error when the failure came from a
    /// [`TextCodec`](crate::TextCodec) implementation.
    pub fn custom_cause<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.custom_cause()
    }
}

impl FieldFormatError {
    pub(crate) fn attribute(column: &str, source: ConversionError) -> Self {
        let (field, source) = source.attribute(column);
        FieldFormatError { field, source }
    }

    pub fn custom_cause<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.custom_cause()
    }
}

/// The underlying reason a single value failed to convert.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error(transparent)]
    Int(#[from] ParseIntError),
    #[error(transparent)]
    Float(#[from] ParseFloatError),
    #[error("invalid boolean '{0}'")]
    Bool(String),
    #[error("expected a single character, got '{0}'")]
    Char(String),
    #[error("parsing time '{value}' as '{layout}': {source}")]
    Time {
        value: String,
        layout: String,
        source: chrono::ParseError,
    },
    #[error("unknown time zone {0}")]
    UnknownTimeZone(String),
    /// Wall-clock text falls in a gap skipped by a zone transition.
    #[error("local time '{0}' does not exist in {1}")]
    NonexistentTime(String, String),
    #[error("invalid time layout '{0}'")]
    InvalidLayout(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("unsupported field type {0}")]
    Unsupported(&'static str),
    #[error("text is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
    #[error("{0}")]
    Custom(#[source] BoxError),
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    pub fn custom<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ConversionError::Custom(Box::new(err))
    }

    pub(crate) fn element(index: usize, source: ConversionError) -> Self {
        ConversionError::Element {
            index,
            source: Box::new(source),
        }
    }

    /// Splits off list element positions so they end up in the field name
    /// rather than the cause.
    fn attribute(self, column: &str) -> (String, ConversionError) {
        match self {
            ConversionError::Element { index, source } => {
                (*source).attribute(&format!("{column}[{index}]"))
            }
            other => (column.to_string(), other),
        }
    }

    fn custom_cause<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            ConversionError::Custom(err) => err.downcast_ref::<E>(),
            _ => None,
        }
    }
}
