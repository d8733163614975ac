//! Interactive menu.
//!
//! Reads one answer per line. A failed operation is logged and reported,
//! and the menu is shown again; end of input exits like choosing `0`.

use super::commands::{
    cmd_add, cmd_backup, cmd_delete, cmd_export, cmd_list, cmd_search, cmd_stats, cmd_update,
};
use crate::io::Format;
use crate::models::RecordId;
use crate::services::{RecordStore, SortKey, SortOrder};
use crate::storage::Connector;
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

const MENU: &str = "
===== recvault =====
1. Add Record
2. List Records
3. Update Record
4. Delete Record
5. Search Records
6. Sort Records
7. Export Records
8. Backup Records
9. Statistics
0. Exit
====================";

/// Operation tag of the error raised when input ends mid-prompt.
const END_OF_INPUT: &str = "end_of_input";

/// Runs the interactive menu until the user exits or input ends.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails;
/// operation failures are reported and the loop continues.
pub async fn run_menu<C, R, W>(
    store: &RecordStore<C>,
    input: R,
    out: &mut W,
    backup_dir: &Path,
) -> Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        say!(out, "{MENU}")?;
        let Some(choice) = prompt(&mut lines, out, "Choose option: ").await? else {
            break;
        };

        let outcome = match choice.trim() {
            "1" => add(store, &mut lines, out).await,
            "2" => cmd_list(store, out, None, SortOrder::Ascending).await,
            "3" => update(store, &mut lines, out).await,
            "4" => delete(store, &mut lines, out).await,
            "5" => search(store, &mut lines, out).await,
            "6" => sort(store, &mut lines, out).await,
            "7" => export(store, &mut lines, out).await,
            "8" => cmd_backup(store, out, backup_dir).await,
            "9" => cmd_stats(store, out).await,
            "0" => break,
            _ => say!(out, "Invalid option."),
        };

        match outcome {
            Ok(()) => {},
            Err(Error::OperationFailed { ref operation, .. }) if operation == END_OF_INPUT => {
                break;
            },
            Err(e) => {
                tracing::error!(error = %e, choice = %choice.trim(), "Menu operation failed");
                say!(out, "Error: {e}")?;
            },
        }
    }

    say!(out, "Exiting recvault...")
}

/// Prints `label` and reads one line. `None` at end of input.
async fn prompt<R, W>(lines: &mut Lines<R>, out: &mut W, label: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{label}")
        .and_then(|()| out.flush())
        .map_err(super::output_error)?;

    lines.next_line().await.map_err(|e| Error::OperationFailed {
        operation: "read_input".to_string(),
        cause: e.to_string(),
    })
}

/// Like [`prompt`], but end of input aborts the current operation.
async fn require<R, W>(lines: &mut Lines<R>, out: &mut W, label: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    prompt(lines, out, label)
        .await?
        .ok_or_else(|| Error::OperationFailed {
            operation: END_OF_INPUT.to_string(),
            cause: "input closed".to_string(),
        })
}

async fn add<C, R, W>(store: &RecordStore<C>, lines: &mut Lines<R>, out: &mut W) -> Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let name = require(lines, out, "Enter name: ").await?;
    let value = require(lines, out, "Enter value: ").await?;
    cmd_add(store, out, &name, &value).await
}

async fn update<C, R, W>(store: &RecordStore<C>, lines: &mut Lines<R>, out: &mut W) -> Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let id: RecordId = require(lines, out, "Enter record ID to update: ")
        .await?
        .parse()?;
    let name = require(lines, out, "New name: ").await?;
    let value = require(lines, out, "New value: ").await?;
    cmd_update(store, out, id, &name, &value).await
}

async fn delete<C, R, W>(store: &RecordStore<C>, lines: &mut Lines<R>, out: &mut W) -> Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let id: RecordId = require(lines, out, "Enter record ID to delete: ")
        .await?
        .parse()?;
    cmd_delete(store, out, id).await
}

async fn search<C, R, W>(store: &RecordStore<C>, lines: &mut Lines<R>, out: &mut W) -> Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let keyword = require(lines, out, "Enter search keyword: ").await?;
    cmd_search(store, out, &keyword).await
}

async fn sort<C, R, W>(store: &RecordStore<C>, lines: &mut Lines<R>, out: &mut W) -> Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let key: SortKey = require(lines, out, "Sort by (id/name/created): ")
        .await?
        .parse()?;
    let order = require(lines, out, "Order (asc/desc) [asc]: ").await?;
    let order = if order.trim().is_empty() {
        SortOrder::Ascending
    } else {
        order.parse()?
    };
    cmd_list(store, out, Some(key), order).await
}

async fn export<C, R, W>(store: &RecordStore<C>, lines: &mut Lines<R>, out: &mut W) -> Result<()>
where
    C: Connector,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let path = require(lines, out, "Export file path (.json or .csv): ").await?;
    let path = PathBuf::from(path.trim());
    let format = match Format::from_path(&path) {
        Ok(format) => Some(format),
        Err(_) => Some(
            require(lines, out, "Format (json/csv): ")
                .await?
                .parse()?,
        ),
    };
    cmd_export(store, out, &path, format).await
}
