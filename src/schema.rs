//! Column descriptors for record types.
//!
//! A record type lists its columns once, in [`Record::describe`]. The
//! resulting [`Schema`] is cached per type for the life of the process, so
//! readers and writers never repeat the work per row or per instance.

use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    fmt,
    marker::PhantomData,
    sync::{Arc, OnceLock, PoisonError, RwLock},
};

use log::{debug, warn};

use crate::{
    error::{ConversionError, FieldFormatError, FieldParseError},
    field::Field,
    options::FieldOptions,
};

/// A type that can be read from and written to CSV rows.
///
/// Implemented by hand or through [`csv_record!`](crate::csv_record):
///
/// ```
/// use typed_csv::{Record, SchemaBuilder};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: u8,
///     nickname: Option<String>,
/// }
///
/// impl Record for Person {
///     fn describe(schema: &mut SchemaBuilder<Self>) {
///         schema.column("name", |p| &p.name, |p| &mut p.name);
///         schema.column("age", |p| &p.age, |p| &mut p.age);
///         schema
///             .column("nickname", |p| &p.nickname, |p| &mut p.nickname)
///             .null("NULL");
///     }
/// }
/// ```
pub trait Record: Default + 'static {
    fn describe(schema: &mut SchemaBuilder<Self>);
}

trait Accessor<R>: Send + Sync {
    fn decode_into(&self, record: &mut R, text: &str, options: &FieldOptions)
    -> Result<(), ConversionError>;

    fn encode_from(&self, record: &R, options: &FieldOptions) -> Result<String, ConversionError>;
}

struct FieldAccessor<G, M, T> {
    get: G,
    get_mut: M,
    _field: PhantomData<fn() -> T>,
}

impl<R, G, M, T> Accessor<R> for FieldAccessor<G, M, T>
where
    G: Fn(&R) -> &T + Send + Sync,
    M: Fn(&mut R) -> &mut T + Send + Sync,
    T: Field,
{
    fn decode_into(
        &self,
        record: &mut R,
        text: &str,
        options: &FieldOptions,
    ) -> Result<(), ConversionError> {
        *(self.get_mut)(record) = T::decode(text, options)?;
        Ok(())
    }

    fn encode_from(&self, record: &R, options: &FieldOptions) -> Result<String, ConversionError> {
        (self.get)(record).encode(options)
    }
}

/// One registered field: its column name, options and access path.
pub struct Column<R> {
    name: String,
    options: FieldOptions,
    optional: bool,
    type_name: &'static str,
    accessor: Box<dyn Accessor<R>>,
}

impl<R> Column<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Whether the field is an `Option`.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Parses `text` into this column's field of `record`.
    pub fn decode_into(&self, record: &mut R, text: &str) -> Result<(), FieldParseError> {
        self.accessor
            .decode_into(record, text, &self.options)
            .map_err(|err| FieldParseError::attribute(&self.name, err))
    }

    /// Renders this column's field of `record`.
    pub fn encode(&self, record: &R) -> Result<String, FieldFormatError> {
        self.accessor
            .encode_from(record, &self.options)
            .map_err(|err| FieldFormatError::attribute(&self.name, err))
    }
}

impl<R> fmt::Debug for Column<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .field("optional", &self.optional)
            .field("options", &self.options)
            .finish()
    }
}

/// Collects column registrations for one record type.
pub struct SchemaBuilder<R> {
    columns: Vec<Column<R>>,
    discarded: FieldOptions,
}

impl<R: 'static> SchemaBuilder<R> {
    fn new() -> Self {
        SchemaBuilder {
            columns: Vec::new(),
            discarded: FieldOptions::default(),
        }
    }

    /// Registers a field under `name` and returns its options for further
    /// configuration.
    ///
    /// An empty name leaves the field out of the schema, as does a name that
    /// is already taken. Options set on a skipped field have no effect.
    pub fn column<T, G, M>(&mut self, name: &str, get: G, get_mut: M) -> &mut FieldOptions
    where
        T: Field + 'static,
        G: Fn(&R) -> &T + Send + Sync + 'static,
        M: Fn(&mut R) -> &mut T + Send + Sync + 'static,
    {
        if name.is_empty() {
            debug!(
                "Skipping unnamed {} field on {}",
                type_name::<T>(),
                type_name::<R>()
            );
            return self.discard();
        }
        if self.columns.iter().any(|column| column.name == name) {
            warn!(
                "Column '{}' registered twice on {}; keeping the first",
                name,
                type_name::<R>()
            );
            return self.discard();
        }

        self.columns.push(Column {
            name: name.to_string(),
            options: FieldOptions::default(),
            optional: T::OPTIONAL,
            type_name: type_name::<T>(),
            accessor: Box::new(FieldAccessor {
                get,
                get_mut,
                _field: PhantomData,
            }),
        });
        let index = self.columns.len() - 1;
        &mut self.columns[index].options
    }

    fn discard(&mut self) -> &mut FieldOptions {
        self.discarded = FieldOptions::default();
        &mut self.discarded
    }
}

/// The ordered columns of a record type.
pub struct Schema<R> {
    columns: Vec<Column<R>>,
}

type Registry = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

impl<R: Record> Schema<R> {
    /// Builds the schema without touching the cache.
    pub fn build() -> Self {
        let mut builder = SchemaBuilder::new();
        R::describe(&mut builder);
        debug!(
            "Built schema for {} with {} column(s)",
            type_name::<R>(),
            builder.columns.len()
        );
        Schema {
            columns: builder.columns,
        }
    }

    /// Returns the cached schema for `R`, building it on first use.
    pub fn of() -> Arc<Self> {
        let key = TypeId::of::<R>();
        let cached = registry()
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .cloned();
        let entry = match cached {
            Some(entry) => entry,
            None => {
                let mut map = registry().write().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(
                    map.entry(key)
                        .or_insert_with(|| Arc::new(Self::build()) as Arc<dyn Any + Send + Sync>),
                )
            }
        };
        match entry.downcast::<Self>() {
            Ok(schema) => schema,
            // The registry is keyed by `TypeId`, so the entry always has type `Self`.
            Err(_) => Arc::new(Self::build()),
        }
    }
}

impl<R> Schema<R> {
    pub fn columns(&self) -> &[Column<R>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column<R>> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Column names in declaration order.
    pub fn header(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|column| column.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<R> fmt::Debug for Schema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.columns).finish()
    }
}

/// Implements [`Record`] from a list of `field => "column"` entries, each
/// optionally followed by `{ option: value, ... }` using the
/// [`FieldOptions`](crate::FieldOptions) setter names.
///
/// ```
/// use typed_csv::csv_record;
///
/// #[derive(Debug, Default)]
/// struct Reading {
///     sensor: String,
///     values: Vec<f64>,
///     note: Option<String>,
///     scratch: u32,
/// }
///
/// csv_record!(Reading {
///     sensor => "sensor",
///     values => "values" { separator: ";", format: "%.1f" },
///     note => "note" { null: "NULL" },
/// });
/// ```
#[macro_export]
macro_rules! csv_record {
    ($record:ty {
        $($field:ident => $column:literal $({ $($option:ident : $value:expr),* $(,)? })?),* $(,)?
    }) => {
        impl $crate::Record for $record {
            fn describe(schema: &mut $crate::SchemaBuilder<Self>) {
                $(
                    let _options = schema.column(
                        $column,
                        |record: &$record| &record.$field,
                        |record: &mut $record| &mut record.$field,
                    );
                    $($( _options.$option($value); )*)?
                )*
            }
        }
    };
}
