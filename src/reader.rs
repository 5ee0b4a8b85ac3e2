use std::{any::type_name, io, sync::Arc};

use csv::StringRecord;
use log::{debug, trace};

use crate::{
    dialect::Dialect,
    error::{Error, Result},
    header::HeaderIndex,
    schema::{Record, Schema},
};

/// Reads typed records from a CSV source.
///
/// The first row must be consumed with [`read_header`](Self::read_header)
/// before any record is read. Cells are matched to fields by column name, so
/// the source may order its columns freely and leave some out.
pub struct TypedReader<R: Record, I> {
    reader: csv::Reader<I>,
    schema: Arc<Schema<R>>,
    header: Option<HeaderIndex>,
    row: StringRecord,
}

impl<R: Record, I: io::Read> TypedReader<R, I> {
    /// Wraps an already configured `csv` reader. If it was built with
    /// `has_headers(true)` its header record is used by `read_header`.
    pub fn new(reader: csv::Reader<I>) -> Self {
        TypedReader {
            reader,
            schema: Schema::of(),
            header: None,
            row: StringRecord::new(),
        }
    }

    pub fn from_reader(input: I) -> Self {
        Self::with_dialect(input, &Dialect::default())
    }

    pub fn with_dialect(input: I, dialect: &Dialect) -> Self {
        Self::new(dialect.reader_builder().from_reader(input))
    }

    /// Consumes the header row and maps column names to positions.
    ///
    /// Fails with [`Error::EndOfInput`] when the source holds no rows.
    pub fn read_header(&mut self) -> Result<()> {
        let row = if self.reader.has_headers() {
            let headers = self.reader.headers()?.clone();
            if headers.is_empty() && self.reader.is_done() {
                return Err(Error::EndOfInput);
            }
            headers
        } else {
            let mut row = StringRecord::new();
            if !self.reader.read_record(&mut row)? {
                return Err(Error::EndOfInput);
            }
            row
        };

        let header = HeaderIndex::from_row(&row);
        let unmatched = self
            .schema
            .header()
            .filter(|name| !header.contains(name))
            .count();
        debug!(
            "Mapped header for {}: {} column(s), {} field(s) absent",
            type_name::<R>(),
            header.width(),
            unmatched
        );
        self.header = Some(header);
        Ok(())
    }

    /// Reads the next record. `Ok(None)` marks the end of input.
    ///
    /// Fields whose column is missing from the header keep their default
    /// value. The first field that fails to parse aborts the record.
    pub fn read_record(&mut self) -> Result<Option<R>> {
        let header = self.header.as_ref().ok_or(Error::HeaderNotRead)?;
        if !self.reader.read_record(&mut self.row)? {
            return Ok(None);
        }

        let mut record = R::default();
        for column in self.schema.columns() {
            let Some(position) = header.position(column.name()) else {
                continue;
            };
            column.decode_into(&mut record, self.row.get(position).unwrap_or_default())?;
        }
        trace!(
            "Read {} from line {}",
            type_name::<R>(),
            self.row.position().map_or(0, |pos| pos.line())
        );
        Ok(Some(record))
    }

    /// Reads every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<R>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    pub fn records(&mut self) -> Records<'_, R, I> {
        Records { reader: self }
    }

    pub fn header(&self) -> Option<&HeaderIndex> {
        self.header.as_ref()
    }

    pub fn schema(&self) -> &Schema<R> {
        &self.schema
    }

    pub fn into_inner(self) -> csv::Reader<I> {
        self.reader
    }
}

/// Iterator over the remaining records of a [`TypedReader`].
pub struct Records<'r, R: Record, I> {
    reader: &'r mut TypedReader<R, I>,
}

impl<R: Record, I: io::Read> Iterator for Records<'_, R, I> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}
