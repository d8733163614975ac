//! Log subscriber configuration.

use crate::config::LoggingSettings;
use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::InvalidInput(format!(
                "unknown log format '{other}' (expected pretty or json)"
            ))),
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Event format.
    pub format: LogFormat,
    /// Optional log file; stderr when `None`.
    pub file: Option<PathBuf>,
    /// Event filter.
    pub filter: EnvFilter,
}

impl LoggingConfig {
    /// Resolves settings against `RUST_LOG`.
    ///
    /// Filter precedence: `RUST_LOG`, then `settings.filter`, then `debug`
    /// when verbose or `info` otherwise. An unparseable directive falls back
    /// to the default level.
    #[must_use]
    pub fn from_settings(settings: Option<&LoggingSettings>, verbose: bool) -> Self {
        Self::from_settings_with(settings, verbose, |key| std::env::var(key).ok())
    }

    /// Like [`Self::from_settings`] with an explicit environment lookup.
    #[must_use]
    pub fn from_settings_with<F>(
        settings: Option<&LoggingSettings>,
        verbose: bool,
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_level = if verbose { "debug" } else { "info" };
        let directive = lookup("RUST_LOG")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| settings.and_then(|s| s.filter.clone()))
            .unwrap_or_else(|| default_level.to_string());
        let filter =
            EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(default_level));

        let format = settings
            .and_then(|s| s.format.as_deref())
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();

        Self {
            format,
            file: settings.and_then(|s| s.file.clone()),
            filter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_settings_with(None, false, no_env);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert_eq!(config.filter.to_string(), "info");
    }

    #[test]
    fn test_verbose_raises_default_level() {
        let config = LoggingConfig::from_settings_with(None, true, no_env);
        assert_eq!(config.filter.to_string(), "debug");
    }

    #[test]
    fn test_rust_log_wins_over_settings() {
        let settings = LoggingSettings {
            format: Some("json".to_string()),
            file: Some(PathBuf::from("/tmp/recvault.log")),
            filter: Some("warn".to_string()),
        };
        let config = LoggingConfig::from_settings_with(Some(&settings), false, |key| {
            (key == "RUST_LOG").then(|| "error".to_string())
        });

        assert_eq!(config.filter.to_string(), "error");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/recvault.log")));
    }

    #[test]
    fn test_settings_filter_used_without_rust_log() {
        let settings = LoggingSettings {
            filter: Some("warn".to_string()),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::from_settings_with(Some(&settings), true, no_env);
        assert_eq!(config.filter.to_string(), "warn");
    }

    #[test]
    fn test_unknown_format_falls_back_to_pretty() {
        let settings = LoggingSettings {
            format: Some("xml".to_string()),
            ..LoggingSettings::default()
        };
        let config = LoggingConfig::from_settings_with(Some(&settings), false, no_env);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
