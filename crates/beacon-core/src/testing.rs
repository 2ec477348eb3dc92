//! In-memory sink that records every call, for tests and dry runs

use std::sync::Mutex;

use crate::model::{ErrorReport, LogLevel, PropertyMap};
use crate::sink::{SinkError, TelemetrySink};

/// One call received by a [`RecordingSink`]
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Log {
        level: LogLevel,
        tag: String,
        message: String,
    },
    Event {
        name: String,
        properties: Option<PropertyMap>,
    },
    Error(Box<ReportRecord>),
}

/// Comparable view of a delivered [`ErrorReport`]
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub fault: crate::fault::Fault,
    pub properties: Option<PropertyMap>,
    pub attachments: Vec<crate::model::Attachment>,
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Record>>,
    fail: bool,
}

impl RecordingSink {
    /// A sink whose every operation fails with [`SinkError::Unavailable`].
    pub fn failing() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<Record> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn error_reports(&self) -> Vec<ReportRecord> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                Record::Error(report) => Some(*report),
                _ => None,
            })
            .collect()
    }

    fn push(&self, record: Record) -> Result<(), SinkError> {
        if self.fail {
            return Err(SinkError::Unavailable("recording sink set to fail".to_string()));
        }
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
        Ok(())
    }

    fn log(&self, level: LogLevel, tag: &str, message: &str) -> Result<(), SinkError> {
        self.push(Record::Log {
            level,
            tag: tag.to_string(),
            message: message.to_string(),
        })
    }
}

impl TelemetrySink for RecordingSink {
    fn log_verbose(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Verbose, tag, message)
    }

    fn log_debug(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Debug, tag, message)
    }

    fn log_info(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Info, tag, message)
    }

    fn log_warn(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Warn, tag, message)
    }

    fn log_error(&self, tag: &str, message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Error, tag, message)
    }

    fn track_event(&self, name: &str, properties: Option<&PropertyMap>) -> Result<(), SinkError> {
        self.push(Record::Event {
            name: name.to_string(),
            properties: properties.cloned(),
        })
    }

    fn track_error(&self, report: &ErrorReport) -> Result<(), SinkError> {
        self.push(Record::Error(Box::new(ReportRecord {
            fault: report.fault.clone(),
            properties: report.properties.clone(),
            attachments: report.attachments.clone(),
        })))
    }
}
