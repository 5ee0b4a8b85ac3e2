//! Type-supplied text conversion.
//!
//! A type that knows how to turn itself into text and back implements
//! [`TextCodec`] and opts into field conversion with [`text_field!`]:
//!
//! ```
//! use typed_csv::{TextCodec, text_field};
//!
//! #[derive(Debug, Default, PartialEq)]
//! enum Status {
//!     #[default]
//!     Active,
//!     Retired,
//! }
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("unknown status")]
//! struct UnknownStatus;
//!
//! impl TextCodec for Status {
//!     type Error = UnknownStatus;
//!
//!     fn from_text(text: &[u8]) -> Result<Self, Self::Error> {
//!         match text {
//!             b"active" => Ok(Status::Active),
//!             b"retired" => Ok(Status::Retired),
//!             _ => Err(UnknownStatus),
//!         }
//!     }
//!
//!     fn to_text(&self) -> Result<Vec<u8>, Self::Error> {
//!         Ok(match self {
//!             Status::Active => b"active".to_vec(),
//!             Status::Retired => b"retired".to_vec(),
//!         })
//!     }
//! }
//!
//! text_field!(Status);
//! ```
//!
//! [`text_field!`]: crate::text_field

use crate::error::ConversionError;

pub trait TextCodec: Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    fn from_text(text: &[u8]) -> Result<Self, Self::Error>;

    fn to_text(&self) -> Result<Vec<u8>, Self::Error>;
}

/// Runs the decode hook on the raw cell bytes.
pub fn decode_text<T: TextCodec>(text: &str) -> Result<T, ConversionError> {
    T::from_text(text.as_bytes()).map_err(ConversionError::custom)
}

/// Runs the encode hook. The produced bytes must be UTF-8.
pub fn encode_text<T: TextCodec>(value: &T) -> Result<String, ConversionError> {
    let bytes = value.to_text().map_err(ConversionError::custom)?;
    Ok(String::from_utf8(bytes)?)
}

/// Implements [`Field`](crate::Field) for one or more [`TextCodec`] types.
#[macro_export]
macro_rules! text_field {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Field for $ty {
            fn decode(
                text: &str,
                _options: &$crate::FieldOptions,
            ) -> ::std::result::Result<Self, $crate::ConversionError> {
                $crate::text::decode_text(text)
            }

            fn encode(
                &self,
                _options: &$crate::FieldOptions,
            ) -> ::std::result::Result<::std::string::String, $crate::ConversionError> {
                $crate::text::encode_text(self)
            }
        }
    )+};
}
