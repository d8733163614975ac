//! One-shot command handlers.

use super::render::{format_record, format_search_hit, stats_lines};
use crate::config::VaultConfig;
use crate::io::{Format, export_to_file, write_backup};
use crate::models::RecordId;
use crate::services::{RecordStore, SortKey, SortOrder, VaultStats, search, sort_records};
use crate::storage::Connector;
use crate::{Error, Result};
use std::io::Write;
use std::path::Path;

/// Creates a record and prints its id.
///
/// # Errors
///
/// Returns an error if the store operation or output fails.
pub async fn cmd_add<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    name: &str,
    value: &str,
) -> Result<()> {
    let record = store.add_record(name, value).await?;
    say!(out, "Record added successfully! ID: {}", record.id)
}

/// Lists records, sorted when a key is given.
///
/// # Errors
///
/// Returns an error if the store operation or output fails.
pub async fn cmd_list<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    sort: Option<SortKey>,
    order: SortOrder,
) -> Result<()> {
    let mut records = store.list_records().await?;
    if records.is_empty() {
        return say!(out, "No records found.");
    }

    if let Some(key) = sort {
        sort_records(&mut records, key, order);
    }
    for record in &records {
        say!(out, "{}", format_record(record))?;
    }
    Ok(())
}

/// Overwrites a record's name and value.
///
/// # Errors
///
/// Returns an error if the store operation or output fails.
pub async fn cmd_update<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    id: RecordId,
    name: &str,
    value: &str,
) -> Result<()> {
    if store.update_record(id, name, value).await? {
        say!(out, "Record updated!")
    } else {
        say!(out, "Record not found or unchanged.")
    }
}

/// Deletes a record.
///
/// # Errors
///
/// Returns an error if the store operation or output fails.
pub async fn cmd_delete<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    id: RecordId,
) -> Result<()> {
    if store.delete_record(id).await? {
        say!(out, "Record deleted!")
    } else {
        say!(out, "Record not found.")
    }
}

/// Prints records matching a keyword.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for a blank keyword, or an error if the
/// store operation or output fails.
pub async fn cmd_search<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    keyword: &str,
) -> Result<()> {
    if keyword.trim().is_empty() {
        return Err(Error::InvalidInput(
            "please enter a valid search term".to_string(),
        ));
    }

    let records = store.list_records().await?;
    let hits = search(&records, keyword)?;
    if hits.is_empty() {
        return say!(out, "No records found.");
    }

    say!(out, "Found {} matching record(s):", hits.len())?;
    for (index, record) in hits.iter().enumerate() {
        say!(out, "{}", format_search_hit(index + 1, record))?;
    }
    Ok(())
}

/// Exports all records to a file.
///
/// # Errors
///
/// Returns an error if the format is unknown, or the store operation or
/// file write fails.
pub async fn cmd_export<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    path: &Path,
    format: Option<Format>,
) -> Result<()> {
    let records = store.list_records().await?;
    let result = export_to_file(&records, path, format)?;
    say!(
        out,
        "Exported {} record(s) as {} to {}",
        result.exported,
        result.format,
        path.display()
    )
}

/// Writes a timestamped backup into `dir`.
///
/// # Errors
///
/// Returns an error if the store operation or file write fails.
pub async fn cmd_backup<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    dir: &Path,
) -> Result<()> {
    let records = store.list_records().await?;
    let path = write_backup(&records, dir)?;
    say!(
        out,
        "Backed up {} record(s) to {}",
        records.len(),
        path.display()
    )
}

/// Prints vault statistics.
///
/// # Errors
///
/// Returns an error if the store operation or output fails.
pub async fn cmd_stats<C: Connector, W: Write>(store: &RecordStore<C>, out: &mut W) -> Result<()> {
    let records = store.list_records().await?;
    for line in stats_lines(&VaultStats::from_records(&records)) {
        say!(out, "{line}")?;
    }
    Ok(())
}

/// Prints configuration and connection state, then probes the store.
///
/// # Errors
///
/// Returns the probe error after reporting it, so an unreachable database
/// yields a non-zero exit.
pub async fn cmd_status<C: Connector, W: Write>(
    store: &RecordStore<C>,
    out: &mut W,
    config: &VaultConfig,
) -> Result<()> {
    let manager = store.manager();
    let policy = manager.policy();

    say!(out, "Backend: {}", config.backend)?;
    say!(out, "Target: {}", manager.connector().describe())?;
    say!(out, "Collection: {}", config.collection)?;
    say!(
        out,
        "Retry policy: {} attempt(s), {}ms backoff (x{}), {}ms timeout",
        policy.attempts(),
        policy.backoff_ms,
        policy.backoff_multiplier,
        policy.attempt_timeout_ms
    )?;
    say!(out, "Backup dir: {}", config.backup_dir.display())?;

    let probe = store.list_records().await;
    say!(out, "Connection: {}", manager.state())?;
    say!(out, "Connect attempts: {}", manager.attempts())?;
    match probe {
        Ok(records) => say!(out, "Records: {}", records.len()),
        Err(e) => {
            say!(out, "Records: unavailable ({e})")?;
            Err(e)
        },
    }
}
