//! Export and backup I/O.
//!
//! Records listed from the store can be written out in two formats:
//!
//! | Format | Layout |
//! |--------|--------|
//! | JSON | Pretty-printed array of `{ id, name, value, createdAt }` documents |
//! | CSV | Header `id,name,value,createdAt`, one row per record |
//!
//! Backups are JSON exports named after the time they were taken.
//!
//! ```rust,ignore
//! use recvault::io::{Format, export_to_file, write_backup};
//!
//! let records = store.list_records().await?;
//! export_to_file(&records, Path::new("vault.csv"), None)?;
//! write_backup(&records, Path::new("backups"))?;
//! ```

pub mod backup;
pub mod export;
pub mod formats;
pub mod traits;

pub use backup::{DEFAULT_BACKUP_DIR, backup_file_name, write_backup};
pub use export::{ExportResult, export_to_file, export_to_writer};
pub use formats::Format;
pub use traits::ExportSink;
