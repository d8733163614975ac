//! Timestamped JSON backups of the whole collection.

use crate::io::export::export_to_file;
use crate::io::formats::Format;
use crate::models::Record;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Default backup directory, relative to the working directory.
pub const DEFAULT_BACKUP_DIR: &str = "backups";

/// Returns the backup file name for the given instant.
///
/// Format: `backup_YYYYMMDD_HHMMSS.json` (UTC).
#[must_use]
pub fn backup_file_name(at: DateTime<Utc>) -> String {
    format!("backup_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// Writes every record to a new backup file inside `dir`.
///
/// The directory is created if missing. Returns the path written.
///
/// # Errors
///
/// Returns [`Error::OperationFailed`] if the directory or file cannot be
/// written, or if a backup with the same timestamp already exists.
pub fn write_backup(records: &[Record], dir: &Path) -> Result<PathBuf> {
    write_backup_at(records, dir, Utc::now())
}

/// Like [`write_backup`] with an explicit timestamp.
///
/// # Errors
///
/// See [`write_backup`].
pub fn write_backup_at(records: &[Record], dir: &Path, at: DateTime<Utc>) -> Result<PathBuf> {
    let path = dir.join(backup_file_name(at));
    if path.exists() {
        return Err(Error::OperationFailed {
            operation: "write_backup".to_string(),
            cause: format!("{} already exists", path.display()),
        });
    }

    let result = export_to_file(records, &path, Some(Format::Json))?;
    tracing::info!(path = %path.display(), records = result.exported, "Backup written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordId;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).single().unwrap()
    }

    #[test]
    fn test_backup_file_name() {
        assert_eq!(backup_file_name(at()), "backup_20240309_070501.json");
    }

    #[test]
    fn test_write_backup_creates_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("vault-backups");
        let records = vec![Record::new(RecordId::new(5), "k", "v", at())];

        let path = write_backup_at(&records, &dir, at()).unwrap();

        assert_eq!(path, dir.join("backup_20240309_070501.json"));
        let restored: Vec<Record> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(restored, records);
    }

    #[test]
    fn test_write_backup_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        write_backup_at(&[], dir.path(), at()).unwrap();
        let err = write_backup_at(&[], dir.path(), at()).unwrap_err();
        assert!(matches!(err, Error::OperationFailed { .. }));
    }
}
