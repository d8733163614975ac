//! Text rendering for records and statistics.

use crate::models::Record;
use crate::services::VaultStats;
use chrono::SecondsFormat;

/// Formats a record as one listing line.
#[must_use]
pub fn format_record(record: &Record) -> String {
    format!(
        "ID: {} | Name: {} | Value: {} | Created: {}",
        record.id,
        record.name,
        record.value,
        record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// Formats a numbered search hit. The value is omitted.
#[must_use]
pub fn format_search_hit(position: usize, record: &Record) -> String {
    format!(
        "{position}. ID: {} | Name: {} | Created: {}",
        record.id,
        record.name,
        record.created_at.format("%Y-%m-%d")
    )
}

pub(super) fn stats_lines(stats: &VaultStats) -> Vec<String> {
    let mut lines = vec![format!("Records: {}", stats.count)];
    if stats.count == 0 {
        return lines;
    }

    if let (Some(earliest), Some(latest)) = (stats.earliest, stats.latest) {
        lines.push(format!(
            "Earliest: {}",
            earliest.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
        lines.push(format!(
            "Latest: {}",
            latest.to_rfc3339_opts(SecondsFormat::Secs, true)
        ));
    }
    lines.push(format!("Average value length: {:.1}", stats.average_value_len));
    lines.push(format!("Longest value length: {}", stats.longest_value_len));
    if let Some(name) = &stats.longest_name {
        lines.push(format!("Longest name: {name}"));
    }
    lines
}
