//! CLI command implementations.
//!
//! Command handlers write human-readable output to any [`std::io::Write`]
//! so they can be driven by the binary (stdout) and by tests (a buffer).
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `add` | Create a record |
//! | `list` | List records, optionally sorted |
//! | `update` | Overwrite a record's name and value |
//! | `delete` | Remove a record |
//! | `search` | Find records by name or id fragment |
//! | `export` | Write records to JSON or CSV |
//! | `backup` | Write a timestamped JSON backup |
//! | `stats` | Summarize the vault |
//! | `status` | Show configuration and connection state |
//! | `menu` | Interactive prompt loop (default) |
//!
//! # Example Usage
//!
//! ```bash
//! recvault add github-token ghp_xxx
//! recvault list --sort name --desc
//! recvault export vault.csv
//! recvault --backend memory menu
//! ```

/// Writes one line of command output, mapping I/O failures to
/// [`crate::Error::OperationFailed`].
macro_rules! say {
    ($out:expr) => {
        writeln!($out).map_err($crate::cli::output_error)
    };
    ($out:expr, $($arg:tt)*) => {
        writeln!($out, $($arg)*).map_err($crate::cli::output_error)
    };
}

mod commands;
mod menu;
mod render;

pub use commands::{
    cmd_add, cmd_backup, cmd_delete, cmd_export, cmd_list, cmd_search, cmd_stats, cmd_status,
    cmd_update,
};
pub use menu::run_menu;
pub use render::{format_record, format_search_hit};

use crate::Error;

/// Maps an output write failure.
#[allow(clippy::needless_pass_by_value)]
fn output_error(e: std::io::Error) -> Error {
    Error::OperationFailed {
        operation: "write_output".to_string(),
        cause: e.to_string(),
    }
}
