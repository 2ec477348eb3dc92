//! Interface of the external telemetry backend

use thiserror::Error;

use crate::model::{ErrorReport, LogLevel, PropertyMap};

/// Failure raised by the sink itself. Never suppressed by the dispatch core.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid event name '{0}'")]
    InvalidEventName(String),

    #[error("telemetry sink unavailable: {0}")]
    Unavailable(String),

    #[error("failed to write telemetry record")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize telemetry record")]
    Serialize(#[from] serde_json::Error),
}

/// Receives logs, events and error reports
pub trait TelemetrySink {
    fn log_verbose(&self, tag: &str, message: &str) -> Result<(), SinkError>;
    fn log_debug(&self, tag: &str, message: &str) -> Result<(), SinkError>;
    fn log_info(&self, tag: &str, message: &str) -> Result<(), SinkError>;
    fn log_warn(&self, tag: &str, message: &str) -> Result<(), SinkError>;
    fn log_error(&self, tag: &str, message: &str) -> Result<(), SinkError>;

    /// `None` means no properties section at all, `Some` of an empty map is an
    /// explicit empty set.
    fn track_event(&self, name: &str, properties: Option<&PropertyMap>) -> Result<(), SinkError>;

    fn track_error(&self, report: &ErrorReport) -> Result<(), SinkError>;
}

/// Services of the sink that can be switched on and off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Master switch; disabling it silences every other service.
    Core,
    Analytics,
    Crashes,
}

impl Service {
    pub const ALL: [Service; 3] = [Service::Core, Service::Analytics, Service::Crashes];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Core => "core",
            Service::Analytics => "analytics",
            Service::Crashes => "crashes",
        }
    }
}

/// Runtime configuration accessors of the sink
pub trait SinkControl {
    fn is_enabled(&self, service: Service) -> bool;
    fn set_enabled(&self, service: Service, enabled: bool) -> Result<(), SinkError>;
    fn log_level(&self) -> LogLevel;
    fn set_log_level(&self, level: LogLevel);
}
