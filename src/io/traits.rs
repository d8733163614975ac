//! Export sink trait.

use crate::Result;
use crate::models::Record;

/// Destination for exported records.
///
/// Implementations write one format (JSON, CSV). Records arrive one at a
/// time in the order they should appear in the output.
pub trait ExportSink {
    /// Writes a single record to the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or I/O fails.
    fn write(&mut self, record: &Record) -> Result<()>;

    /// Finalizes the export, writing any footers and flushing buffers.
    ///
    /// This method consumes the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if I/O fails.
    fn finalize(self: Box<Self>) -> Result<()>;
}
