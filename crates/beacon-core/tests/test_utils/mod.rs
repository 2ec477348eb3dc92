// Recording sink for the integration tests
//
// The library's own `testing` module is only compiled for unit tests and
// under the `testing` feature, so the tests in this directory keep a copy.

use std::sync::Mutex;

use beacon_core::{ErrorReport, LogLevel, PropertyMap, SinkError, TelemetrySink};

#[derive(Debug, Clone)]
pub enum Record {
    Log { level: LogLevel },
    Event { name: String, properties: Option<PropertyMap> },
    Error(Box<ErrorReport>),
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    records: Mutex<Vec<Record>>,
}

impl RecordingSink {
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    pub fn error_reports(&self) -> Vec<ErrorReport> {
        self.records()
            .into_iter()
            .filter_map(|record| match record {
                Record::Error(report) => Some(*report),
                _ => None,
            })
            .collect()
    }

    fn push(&self, record: Record) -> Result<(), SinkError> {
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    fn log(&self, level: LogLevel) -> Result<(), SinkError> {
        self.push(Record::Log { level })
    }
}

impl TelemetrySink for RecordingSink {
    fn log_verbose(&self, _tag: &str, _message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Verbose)
    }

    fn log_debug(&self, _tag: &str, _message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Debug)
    }

    fn log_info(&self, _tag: &str, _message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Info)
    }

    fn log_warn(&self, _tag: &str, _message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Warn)
    }

    fn log_error(&self, _tag: &str, _message: &str) -> Result<(), SinkError> {
        self.log(LogLevel::Error)
    }

    fn track_event(&self, name: &str, properties: Option<&PropertyMap>) -> Result<(), SinkError> {
        self.push(Record::Event {
            name: name.to_string(),
            properties: properties.cloned(),
        })
    }

    fn track_error(&self, report: &ErrorReport) -> Result<(), SinkError> {
        self.push(Record::Error(Box::new(report.clone())))
    }
}
