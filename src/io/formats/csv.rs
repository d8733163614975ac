//! CSV export.

use crate::io::traits::ExportSink;
use crate::models::Record;
use crate::{Error, Result};
use chrono::SecondsFormat;
use std::io::Write;

/// Column headers, matching the document field names.
pub const HEADERS: [&str; 4] = ["id", "name", "value", "createdAt"];

fn csv_error(op: &str, e: impl std::fmt::Display) -> Error {
    Error::OperationFailed {
        operation: op.to_string(),
        cause: e.to_string(),
    }
}

/// CSV export sink.
///
/// Writes a header row followed by one row per record. The header is
/// written even when no records are exported.
pub struct CsvExportSink<W: Write> {
    writer: csv::Writer<W>,
    headers_written: bool,
}

impl<W: Write> CsvExportSink<W> {
    /// Creates a new CSV export sink.
    pub fn new(writer: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        Self {
            writer,
            headers_written: false,
        }
    }

    fn ensure_headers(&mut self) -> Result<()> {
        if !self.headers_written {
            self.writer
                .write_record(HEADERS)
                .map_err(|e| csv_error("write_csv_headers", e))?;
            self.headers_written = true;
        }
        Ok(())
    }
}

impl<W: Write> ExportSink for CsvExportSink<W> {
    fn write(&mut self, record: &Record) -> Result<()> {
        self.ensure_headers()?;

        let id = record.id.to_string();
        let created_at = record.created_at.to_rfc3339_opts(SecondsFormat::Millis, true);
        self.writer
            .write_record([
                id.as_str(),
                record.name.as_str(),
                record.value.as_str(),
                created_at.as_str(),
            ])
            .map_err(|e| csv_error("write_csv", e))
    }

    fn finalize(mut self: Box<Self>) -> Result<()> {
        self.ensure_headers()?;
        self.writer.flush().map_err(|e| csv_error("flush_csv", e))
    }
}
