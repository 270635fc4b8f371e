//! Log output settings for the gateway binary.

use strum::{Display, EnumString};

use crate::defaults::DEFAULT_LOG_FILTER;

/// How log records are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per record, event fields flattened into it.
    #[default]
    Json,
    /// Single-line human readable records.
    Compact,
}

/// Filter and format the telemetry subscriber is installed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `tracing` filter directive, for example `hostgate::http=debug`.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Builds settings from a filter directive and an output format.
    #[must_use]
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        Self {
            filter: filter.into(),
            format,
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILTER, LogFormat::default())
    }
}
