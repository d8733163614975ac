//! Record export to files and writers.

use crate::io::formats::{Format, create_export_sink};
use crate::io::traits::ExportSink;
use crate::models::Record;
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Result of an export operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResult {
    /// Number of records exported.
    pub exported: usize,
    /// Format used for export.
    pub format: Format,
    /// Output path (if file export).
    pub output_path: Option<PathBuf>,
}

impl ExportResult {
    /// Creates an empty export result.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            exported: 0,
            format,
            output_path: None,
        }
    }

    /// Returns whether any records were exported.
    #[must_use]
    pub const fn has_exports(&self) -> bool {
        self.exported > 0
    }
}

/// Writes records to a file.
///
/// The format is `format` when given, otherwise detected from the file
/// extension. Missing parent directories are created.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if no format can be determined, or
/// [`Error::OperationFailed`] if the file cannot be written.
pub fn export_to_file(
    records: &[Record],
    path: &Path,
    format: Option<Format>,
) -> Result<ExportResult> {
    let format = match format {
        Some(format) => format,
        None => Format::from_path(path)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::OperationFailed {
            operation: "create_export_dir".to_string(),
            cause: e.to_string(),
        })?;
    }

    let file = std::fs::File::create(path).map_err(|e| Error::OperationFailed {
        operation: "create_export_file".to_string(),
        cause: format!("{}: {e}", path.display()),
    })?;
    let writer = std::io::BufWriter::new(file);

    let mut result = export_to_writer(records, writer, format)?;
    result.output_path = Some(path.to_path_buf());
    tracing::info!(
        path = %path.display(),
        format = %format,
        exported = result.exported,
        "Records exported"
    );
    Ok(result)
}

/// Writes records to any writer in the given format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn export_to_writer<W: Write>(
    records: &[Record],
    writer: W,
    format: Format,
) -> Result<ExportResult> {
    let mut sink = create_export_sink(writer, format)?;
    let result = export_to_sink(records, sink.as_mut(), format)?;
    sink.finalize()?;
    Ok(result)
}

/// Feeds records into an existing sink without finalizing it.
///
/// # Errors
///
/// Returns an error if the sink rejects a record.
pub fn export_to_sink(
    records: &[Record],
    sink: &mut dyn ExportSink,
    format: Format,
) -> Result<ExportResult> {
    let mut result = ExportResult::new(format);
    for record in records {
        sink.write(record)?;
        result.exported += 1;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use chrono::Utc;

    fn records() -> Vec<Record> {
        vec![
            Record::new(RecordId::new(1), "a", "1", Utc::now()),
            Record::new(RecordId::new(2), "b", "2", Utc::now()),
        ]
    }

    #[test]
    fn test_export_to_file_detects_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("vault.csv");

        let result = export_to_file(&records(), &path, None).unwrap();

        assert_eq!(result.format, Format::Csv);
        assert_eq!(result.exported, 2);
        assert_eq!(result.output_path.as_deref(), Some(path.as_path()));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_explicit_format_overrides_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vault.txt");

        let result = export_to_file(&records(), &path, Some(Format::Json)).unwrap();

        assert_eq!(result.format, Format::Json);
        let parsed: Vec<Record> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let names: Vec<&str> = parsed.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_unknown_extension_without_format_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = export_to_file(&records(), &dir.path().join("vault.bin"), None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_empty_export() {
        let mut output = Vec::new();
        let result = export_to_writer(&[], &mut output, Format::Json).unwrap();
        assert!(!result.has_exports());
        assert_eq!(String::from_utf8(output).unwrap().trim(), "[]");
    }
}
