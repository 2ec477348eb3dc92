//! Telemetry data model: properties, log levels, attachments and error reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

use crate::fault::Fault;

/// Property mapping forwarded to the sink
pub type PropertyMap = BTreeMap<String, String>;

/// A single key/value pair as entered by the user. Either side may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Property {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: Some(value.into()),
        }
    }

    /// Parse a `KEY=VALUE` pair. A missing `=` yields a property without a value.
    pub fn parse(pair: &str) -> Self {
        match pair.split_once('=') {
            Some((key, value)) => Self::new(key, value),
            None => Self {
                key: Some(pair.to_string()),
                value: None,
            },
        }
    }

    fn complete(&self) -> Option<(&str, &str)> {
        match (self.key.as_deref(), self.value.as_deref()) {
            (Some(key), Some(value)) => Some((key, value)),
            _ => None,
        }
    }
}

/// Keep only complete properties and collapse them into a mapping.
///
/// Later entries overwrite earlier ones with the same key.
pub fn filter_properties(properties: &[Property]) -> PropertyMap {
    properties
        .iter()
        .filter_map(Property::complete)
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Severity of a log record, ordered from most to least verbose.
///
/// `None` sits above every real severity and never selects a sink operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    None,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Verbose,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::None => "none",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "verbose" | "trace" => Ok(LogLevel::Verbose),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "none" | "off" => Ok(LogLevel::None),
            other => Err(format!(
                "unknown log level '{}' (expected one of verbose, debug, info, warn, error, none)",
                other
            )),
        }
    }
}

/// Supplementary data associated with an error report
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Attachment {
    /// Path reference; the file is read by the transport, not here.
    File { path: PathBuf },
    Text { text: String },
}

/// A captured fault plus its enrichment, as delivered to the sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub fault: Fault,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<PropertyMap>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl ErrorReport {
    pub fn new(
        fault: Fault,
        properties: Option<PropertyMap>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            fault,
            properties,
            attachments,
        }
    }
}
