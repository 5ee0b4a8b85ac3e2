//! Strongly-typed CSV records.
//!
//! A record type registers its fields once, either through [`Record`] or the
//! [`csv_record!`] macro. [`TypedReader`] and [`TypedWriter`] then convert
//! between CSV rows and records, matching cells to fields by column name.
//!
//! ```
//! use typed_csv::{TypedReader, TypedWriter, csv_record};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u8,
//!     pets: Vec<String>,
//!     email: Option<String>,
//! }
//!
//! csv_record!(Person {
//!     name => "name",
//!     age => "age",
//!     pets => "pets" { separator: ";" },
//!     email => "email" { null: "NULL" },
//! });
//!
//! let input = "age,name,pets,email\n42,Ada,cat;dog,NULL\n";
//! let mut reader = TypedReader::<Person, _>::from_reader(input.as_bytes());
//! reader.read_header()?;
//! let people = reader.read_all()?;
//! assert_eq!(people[0].pets, ["cat", "dog"]);
//! assert_eq!(people[0].email, None);
//!
//! let mut writer = TypedWriter::<Person, _>::from_writer(Vec::new());
//! writer.write_header()?;
//! writer.write_all(&people)?;
//! writer.flush();
//! let bytes = writer.into_inner().into_inner().map_err(|err| err.into_error())?;
//! assert_eq!(String::from_utf8(bytes)?, "name,age,pets,email\nAda,42,cat;dog,NULL\n");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod dialect;
pub mod error;
pub mod field;
pub mod format;
pub mod header;
pub mod options;
pub mod reader;
pub mod scalar;
pub mod schema;
pub mod temporal;
pub mod text;
pub mod writer;

pub use dialect::{Dialect, DialectError, LineTerminator, QuoteStyle};
pub use error::{ConversionError, Error, FieldFormatError, FieldParseError, Result};
pub use field::Field;
pub use format::{FormatArg, FormatError, FormatSpec};
pub use header::HeaderIndex;
pub use options::FieldOptions;
pub use reader::{Records, TypedReader};
pub use scalar::Scalar;
pub use schema::{Column, Record, Schema, SchemaBuilder};
pub use text::TextCodec;
pub use writer::TypedWriter;
