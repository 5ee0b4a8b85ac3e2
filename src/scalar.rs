//! Parser table for scalar field types.
//!
//! Scalars are the leaves of field conversion: integers of every width,
//! floats, booleans, characters and strings. They are also the only element
//! types a list field accepts.
//!
//! Scanning mirrors a whitespace-delimited scanner: leading whitespace is
//! skipped, the first token is parsed and anything after it is ignored. A
//! cell holding no token at all resolves to the type's zero value. Strings
//! are the exception and take the cell verbatim.

use std::{any::type_name, collections::HashMap};

use crate::{
    error::ConversionError,
    format::{FormatArg, FormatSpec, render_natural},
};

pub trait Scalar: Sized + Default {
    /// Parses a single whitespace-free token.
    fn parse_token(token: &str) -> Result<Self, ConversionError>;

    /// Hands the value to the formatter.
    fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError>;

    /// Scans a raw cell.
    fn scan(text: &str) -> Result<Self, ConversionError> {
        match text.split_whitespace().next() {
            Some(token) => Self::parse_token(token),
            None => Ok(Self::default()),
        }
    }

    /// Renders the value through `format`, or in its natural form.
    fn render(&self, format: Option<&FormatSpec>) -> Result<String, ConversionError> {
        let arg = self.format_arg()?;
        let text = match format {
            Some(spec) => spec.render(arg)?,
            None => render_natural(arg)?,
        };
        Ok(text)
    }
}

/// Splits an optional sign and radix prefix off an integer token, returning
/// the digits (with an explicit sign in front) and the radix. A bare leading
/// `0` before more digits selects octal.
///
/// The sign is always written out so that a second sign after the prefix
/// (`+-5`, `0x-5`) reaches the parser as a doubled sign and is rejected.
fn integer_digits(token: &str) -> (String, u32) {
    let (sign, rest) = match token.as_bytes().first() {
        Some(b'-') => ('-', &token[1..]),
        Some(b'+') => ('+', &token[1..]),
        _ => ('+', token),
    };
    let (radix, digits) = match rest.get(..2) {
        Some("0x" | "0X") => (16, &rest[2..]),
        Some("0o" | "0O") => (8, &rest[2..]),
        Some("0b" | "0B") => (2, &rest[2..]),
        Some(_) if rest.starts_with('0') => (8, &rest[1..]),
        _ => (10, rest),
    };
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    (format!("{sign}{digits}"), radix)
}

macro_rules! signed_scalars {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            fn parse_token(token: &str) -> Result<Self, ConversionError> {
                let (digits, radix) = integer_digits(token);
                Ok(<$ty>::from_str_radix(&digits, radix)?)
            }

            fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
                Ok(FormatArg::Signed(*self as i128))
            }
        }
    )*};
}

macro_rules! unsigned_scalars {
    ($($ty:ty),* $(,)?) => {$(
        impl Scalar for $ty {
            fn parse_token(token: &str) -> Result<Self, ConversionError> {
                let (digits, radix) = integer_digits(token);
                Ok(<$ty>::from_str_radix(&digits, radix)?)
            }

            fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
                Ok(FormatArg::Unsigned(*self as u128))
            }
        }
    )*};
}

signed_scalars!(i8, i16, i32, i64, i128, isize);
unsigned_scalars!(u8, u16, u32, u64, u128, usize);

impl Scalar for f32 {
    fn parse_token(token: &str) -> Result<Self, ConversionError> {
        Ok(token.parse()?)
    }

    fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
        Ok(FormatArg::Float32(*self))
    }
}

impl Scalar for f64 {
    fn parse_token(token: &str) -> Result<Self, ConversionError> {
        Ok(token.parse()?)
    }

    fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
        Ok(FormatArg::Float64(*self))
    }
}

impl Scalar for bool {
    fn parse_token(token: &str) -> Result<Self, ConversionError> {
        match token.to_ascii_lowercase().as_str() {
            "1" | "t" | "true" => Ok(true),
            "0" | "f" | "false" => Ok(false),
            _ => Err(ConversionError::Bool(token.to_string())),
        }
    }

    fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
        Ok(FormatArg::Bool(*self))
    }
}

impl Scalar for char {
    fn parse_token(token: &str) -> Result<Self, ConversionError> {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(ConversionError::Char(token.to_string())),
        }
    }

    fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
        Ok(FormatArg::Char(*self))
    }

    /// A lone character is taken as-is, whitespace included.
    fn scan(text: &str) -> Result<Self, ConversionError> {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(char::default()),
            (Some(c), None) => Ok(c),
            _ => match text.split_whitespace().next() {
                Some(token) => Self::parse_token(token),
                None => Ok(char::default()),
            },
        }
    }
}

impl Scalar for String {
    fn parse_token(token: &str) -> Result<Self, ConversionError> {
        Ok(token.to_string())
    }

    fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
        Ok(FormatArg::Str(self))
    }

    fn scan(text: &str) -> Result<Self, ConversionError> {
        Ok(text.to_string())
    }
}

/// Maps have no cell representation; they are registered as scalars only so
/// that a mistaken map field fails with an error naming its type.
impl<K, V, S: Default> Scalar for HashMap<K, V, S> {
    fn parse_token(_token: &str) -> Result<Self, ConversionError> {
        Err(ConversionError::Unsupported(type_name::<Self>()))
    }

    fn format_arg(&self) -> Result<FormatArg<'_>, ConversionError> {
        Err(ConversionError::Unsupported(type_name::<Self>()))
    }

    fn scan(_text: &str) -> Result<Self, ConversionError> {
        Err(ConversionError::Unsupported(type_name::<Self>()))
    }
}
