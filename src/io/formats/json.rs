//! JSON export.

use crate::io::traits::ExportSink;
use crate::models::Record;
use crate::{Error, Result};
use std::io::Write;

/// JSON export sink.
///
/// Buffers records and writes them as one pretty-printed array on
/// [`ExportSink::finalize`]. An empty export produces `[]`.
pub struct JsonExportSink<W: Write> {
    writer: W,
    records: Vec<Record>,
}

impl<W: Write> JsonExportSink<W> {
    /// Creates a new JSON export sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            records: Vec::new(),
        }
    }
}

impl<W: Write> ExportSink for JsonExportSink<W> {
    fn write(&mut self, record: &Record) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, &self.records).map_err(|e| {
            Error::OperationFailed {
                operation: "write_json".to_string(),
                cause: e.to_string(),
            }
        })?;
        writeln!(self.writer)
            .and_then(|()| self.writer.flush())
            .map_err(|e| Error::OperationFailed {
                operation: "flush_json".to_string(),
                cause: e.to_string(),
            })
    }
}
