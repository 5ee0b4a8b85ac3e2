use std::{any::type_name, io, sync::Arc};

use log::{debug, trace};

use crate::{
    dialect::Dialect,
    error::Result,
    schema::{Record, Schema},
};

/// Writes typed records to a CSV sink.
///
/// Output is buffered by the underlying `csv` writer; call
/// [`flush`](Self::flush) and check [`error`](Self::error) once done.
pub struct TypedWriter<R: Record, W: io::Write> {
    writer: csv::Writer<W>,
    schema: Arc<Schema<R>>,
    error: Option<io::Error>,
}

impl<R: Record, W: io::Write> TypedWriter<R, W> {
    pub fn new(writer: csv::Writer<W>) -> Self {
        TypedWriter {
            writer,
            schema: Schema::of(),
            error: None,
        }
    }

    pub fn from_writer(output: W) -> Self {
        Self::with_dialect(output, &Dialect::default())
    }

    pub fn with_dialect(output: W, dialect: &Dialect) -> Self {
        Self::new(dialect.writer_builder().from_writer(output))
    }

    /// Writes the column names in declaration order.
    pub fn write_header(&mut self) -> Result<()> {
        let schema = Arc::clone(&self.schema);
        debug!(
            "Writing header for {} with {} column(s)",
            type_name::<R>(),
            schema.len()
        );
        let written = self.writer.write_record(schema.header());
        self.remember(written)
    }

    /// Writes one record. Every field is rendered before anything reaches
    /// the sink, so a field error leaves the output untouched.
    pub fn write_record(&mut self, record: &R) -> Result<()> {
        let cells = self
            .schema
            .columns()
            .iter()
            .map(|column| column.encode(record))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let written = self.writer.write_record(&cells);
        self.remember(written)?;
        trace!("Wrote {} with {} cell(s)", type_name::<R>(), cells.len());
        Ok(())
    }

    pub fn write_all<'a, T>(&mut self, records: T) -> Result<()>
    where
        T: IntoIterator<Item = &'a R>,
    {
        for record in records {
            self.write_record(record)?;
        }
        Ok(())
    }

    /// Flushes buffered rows to the sink. A failure is kept for
    /// [`error`](Self::error) rather than returned.
    pub fn flush(&mut self) {
        if let Err(err) = self.writer.flush() {
            debug!("Flush failed for {}: {}", type_name::<R>(), err);
            self.error = Some(err);
        }
    }

    /// The most recent error raised by the sink during a write or flush.
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }

    pub fn schema(&self) -> &Schema<R> {
        &self.schema
    }

    /// Returns the `csv` writer without flushing it.
    pub fn into_inner(self) -> csv::Writer<W> {
        self.writer
    }

    fn remember(&mut self, written: csv::Result<()>) -> Result<()> {
        if let Err(err) = &written {
            let kind = match err.kind() {
                csv::ErrorKind::Io(io_err) => io_err.kind(),
                _ => io::ErrorKind::Other,
            };
            self.error = Some(io::Error::new(kind, err.to_string()));
        }
        Ok(written?)
    }
}
