//! The `Field` trait: how one record field turns into a cell and back.
//!
//! The conversion rule for a field is picked statically from its Rust type:
//!
//! | field type                        | read / write                                  |
//! |-----------------------------------|-----------------------------------------------|
//! | `Option<T>`                       | null token ⇄ `None`, otherwise `T`            |
//! | chrono timestamps and dates       | time layout and zone, see [`temporal`]        |
//! | types opted in with `text_field!` | [`TextCodec`] hooks                           |
//! | `Vec<T: Scalar>`                  | split / join on the separator, per element    |
//! | scalars                           | [`Scalar`] scan, format spec or natural form  |
//!
//! [`temporal`]: crate::temporal
//! [`TextCodec`]: crate::TextCodec

use std::collections::HashMap;

use crate::{error::ConversionError, options::FieldOptions, scalar::Scalar};

pub trait Field: Sized {
    /// Whether the field may be absent, i.e. is an `Option`.
    const OPTIONAL: bool = false;

    fn decode(text: &str, options: &FieldOptions) -> Result<Self, ConversionError>;

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError>;
}

macro_rules! scalar_fields {
    ($($ty:ty),* $(,)?) => {$(
        impl Field for $ty {
            fn decode(text: &str, _options: &FieldOptions) -> Result<Self, ConversionError> {
                <$ty as Scalar>::scan(text)
            }

            fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
                self.render(options.format_spec())
            }
        }
    )*};
}

scalar_fields!(
    bool, char, String, f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
);

impl<K, V, S: Default> Field for HashMap<K, V, S> {
    fn decode(text: &str, _options: &FieldOptions) -> Result<Self, ConversionError> {
        <Self as Scalar>::scan(text)
    }

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
        self.render(options.format_spec())
    }
}

impl<T: Field> Field for Option<T> {
    const OPTIONAL: bool = true;

    fn decode(text: &str, options: &FieldOptions) -> Result<Self, ConversionError> {
        if let Some(null) = options.null_token()
            && text == null
        {
            return Ok(None);
        }
        T::decode(text, options).map(Some)
    }

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
        match self {
            Some(value) => value.encode(options),
            None => Ok(options.null_token().unwrap_or_default().to_string()),
        }
    }
}

impl<T: Scalar> Field for Vec<T> {
    /// An empty cell is an empty list.
    fn decode(text: &str, options: &FieldOptions) -> Result<Self, ConversionError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        split_list(text, options.list_separator())
            .enumerate()
            .map(|(index, piece)| T::scan(piece).map_err(|err| ConversionError::element(index, err)))
            .collect()
    }

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
        let rendered = self
            .iter()
            .enumerate()
            .map(|(index, item)| {
                item.render(options.format_spec())
                    .map_err(|err| ConversionError::element(index, err))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rendered.join(options.list_separator()))
    }
}

/// Splits on `separator`, or into single characters when it is empty.
fn split_list<'a>(text: &'a str, separator: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
    if separator.is_empty() {
        Box::new(
            text.char_indices()
                .map(move |(start, c)| &text[start..start + c.len_utf8()]),
        )
    } else {
        Box::new(text.split(separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(configure: impl FnOnce(&mut FieldOptions)) -> FieldOptions {
        let mut options = FieldOptions::new();
        configure(&mut options);
        options
    }

    #[test]
    fn option_honours_null_token() {
        let with_null = options(|o| {
            o.null("NULL");
        });
        assert_eq!(Option::<i32>::decode("NULL", &with_null).unwrap(), None);
        assert_eq!(Option::<i32>::decode("7", &with_null).unwrap(), Some(7));
        assert_eq!(None::<i32>.encode(&with_null).unwrap(), "NULL");
        assert_eq!(Some(7).encode(&with_null).unwrap(), "7");

        let plain = FieldOptions::new();
        assert_eq!(
            Option::<String>::decode("", &plain).unwrap(),
            Some(String::new())
        );
        assert_eq!(None::<String>.encode(&plain).unwrap(), "");
        assert!(Option::<u8>::OPTIONAL);
        assert!(!u8::OPTIONAL);
    }

    #[test]
    fn list_split_and_join() {
        let semicolon = options(|o| {
            o.separator(";");
        });
        let items = Vec::<String>::decode("a;b;c", &semicolon).unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
        assert_eq!(items.encode(&semicolon).unwrap(), "a;b;c");

        let newline = options(|o| {
            o.separator("\n");
        });
        assert_eq!(
            Vec::<String>::decode("d\ne\nf", &newline).unwrap(),
            vec!["d", "e", "f"]
        );

        let unseparated = FieldOptions::new();
        assert_eq!(
            Vec::<String>::decode("ghi", &unseparated).unwrap(),
            vec!["g", "h", "i"]
        );
        assert_eq!(
            vec!["a".to_string(), "b".to_string()].encode(&unseparated).unwrap(),
            "ab"
        );
        assert!(Vec::<i32>::decode("", &semicolon).unwrap().is_empty());
    }

    #[test]
    fn list_elements_use_format_spec() {
        let hex = options(|o| {
            o.format("%02x").separator("");
        });
        assert_eq!(vec![1u8, 2, 3].encode(&hex).unwrap(), "010203");
    }

    #[test]
    fn list_failures_report_element_index() {
        let comma = options(|o| {
            o.separator(",");
        });
        let err = Vec::<i32>::decode("1,2,x", &comma).unwrap_err();
        assert!(matches!(err, ConversionError::Element { index: 2, .. }));
    }
}
