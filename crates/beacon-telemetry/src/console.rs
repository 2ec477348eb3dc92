//! Console sink: writes every telemetry record as one JSON line
//!
//! Stands in for the hosted backend in the demo CLI. Records are written
//! synchronously; there is no batching or retry.

use beacon_core::{
    AppSecretHolder, ErrorReport, LogLevel, PropertyMap, Service, SinkControl, SinkError,
    TelemetrySink,
};
use chrono::Utc;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};
use tracing::debug;

/// Longest event name the sink accepts
pub const MAX_EVENT_NAME_LENGTH: usize = 256;

/// Stamps outgoing records with the application secret
#[derive(Debug, Clone, Default)]
struct Channel {
    secret_hint: Option<String>,
}

impl Channel {
    fn new(holder: Option<&dyn AppSecretHolder>) -> Self {
        let secret_hint = holder
            .map(|h| h.app_secret())
            .filter(|secret| !secret.is_empty())
            .map(mask_secret);
        Self { secret_hint }
    }

    fn envelope(&self, kind: &str, mut body: Value) -> Value {
        if let Value::Object(ref mut map) = body {
            map.insert("type".to_string(), json!(kind));
            map.insert("timestamp".to_string(), json!(Utc::now().to_rfc3339()));
            if let Some(hint) = &self.secret_hint {
                map.insert("app_secret".to_string(), json!(hint));
            }
        }
        body
    }
}

/// Keep only the last four characters of a secret
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    channel: Channel,
    core: AtomicBool,
    analytics: AtomicBool,
    crashes: AtomicBool,
    level: RwLock<LogLevel>,
}

impl ConsoleSink {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            channel: Channel::default(),
            core: AtomicBool::new(true),
            analytics: AtomicBool::new(true),
            crashes: AtomicBool::new(true),
            level: RwLock::new(LogLevel::Warn),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Authenticate outgoing records with the holder's secret.
    pub fn with_secret(mut self, holder: &dyn AppSecretHolder) -> Self {
        self.channel = Channel::new(Some(holder));
        self
    }

    fn write_record(&self, kind: &str, body: Value) -> Result<(), SinkError> {
        let record = self.channel.envelope(kind, body);
        let line = serde_json::to_string(&record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| SinkError::Unavailable("console writer poisoned".to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }

    fn log(&self, level: LogLevel, tag: &str, message: &str) -> Result<(), SinkError> {
        if level < self.log_level() || level == LogLevel::None {
            debug!(%level, tag, "log below sink level, dropped");
            return Ok(());
        }
        self.write_record(
            "log",
            json!({
                "level": level,
                "tag": tag,
                "message": message,
            }),
        )
    }

    fn flag(&self, service: Service) -> &AtomicBool {
        match service {
            Service::Core => &self.core,
            Service::Analytics => &self.analytics,
            Service::Crashes => &self.crashes,
        }
    }
}

impl TelemetrySink for ConsoleSink {
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
        if name.is_empty() || name.chars().count() > MAX_EVENT_NAME_LENGTH {
            return Err(SinkError::InvalidEventName(name.to_string()));
        }
        if !self.is_enabled(Service::Analytics) {
            debug!(event = name, "analytics disabled, event dropped");
            return Ok(());
        }

        let mut body = json!({ "name": name });
        if let Some(properties) = properties {
            body["properties"] = json!(properties);
        }
        self.write_record("event", body)
    }

    fn track_error(&self, report: &ErrorReport) -> Result<(), SinkError> {
        if !self.is_enabled(Service::Crashes) {
            debug!(report_id = %report.id, "crashes disabled, report dropped");
            return Ok(());
        }
        self.write_record("error", json!({ "report": report }))
    }
}

impl SinkControl for ConsoleSink {
    fn is_enabled(&self, service: Service) -> bool {
        let core = self.core.load(Ordering::SeqCst);
        match service {
            Service::Core => core,
            other => core && self.flag(other).load(Ordering::SeqCst),
        }
    }

    fn set_enabled(&self, service: Service, enabled: bool) -> Result<(), SinkError> {
        if service != Service::Core && enabled && !self.core.load(Ordering::SeqCst) {
            return Err(SinkError::Unavailable(format!(
                "cannot enable {} while telemetry is disabled",
                service.name()
            )));
        }
        self.flag(service).store(enabled, Ordering::SeqCst);
        Ok(())
    }

    fn log_level(&self) -> LogLevel {
        self.level.read().map(|level| *level).unwrap_or(LogLevel::Warn)
    }

    fn set_log_level(&self, level: LogLevel) {
        if let Ok(mut current) = self.level.write() {
            *current = level;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::Fault;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        fn lines(&self) -> Vec<Value> {
            let bytes = self.0.lock().unwrap().clone();
            String::from_utf8(bytes)
                .unwrap()
                .lines()
                .map(|line| serde_json::from_str(line).unwrap())
                .collect()
        }
    }

    fn sink() -> (ConsoleSink, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (ConsoleSink::new(buffer.clone()), buffer)
    }

    #[test]
    fn test_log_respects_level() {
        let (sink, buffer) = sink();
        sink.set_log_level(LogLevel::Info);

        sink.log_debug("Tag", "hidden").unwrap();
        sink.log_info("Tag", "shown").unwrap();
        sink.log_error("Tag", "also shown").unwrap();

        let lines = buffer.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "log");
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["message"], "shown");
    }

    #[test]
    fn test_level_none_silences_logs() {
        let (sink, buffer) = sink();
        sink.set_log_level(LogLevel::None);
        sink.log_error("Tag", "quiet").unwrap();
        assert!(buffer.lines().is_empty());
    }

    #[test]
    fn test_event_properties_absent_vs_empty() {
        let (sink, buffer) = sink();
        sink.track_event("WithEmpty", Some(&PropertyMap::new())).unwrap();
        sink.track_event("WithNone", None).unwrap();

        let lines = buffer.lines();
        assert_eq!(lines[0]["properties"], json!({}));
        assert!(lines[1].get("properties").is_none());
    }

    #[test]
    fn test_invalid_event_name() {
        let (sink, _) = sink();
        assert!(matches!(
            sink.track_event("", None),
            Err(SinkError::InvalidEventName(_))
        ));
        let long = "x".repeat(MAX_EVENT_NAME_LENGTH + 1);
        assert!(sink.track_event(&long, None).is_err());
    }

    #[test]
    fn test_disabled_services_drop_records() {
        let (sink, buffer) = sink();
        sink.set_enabled(Service::Analytics, false).unwrap();
        sink.track_event("Dropped", None).unwrap();

        sink.set_enabled(Service::Core, false).unwrap();
        let report = ErrorReport::new(Fault::new("K", "m"), None, Vec::new());
        sink.track_error(&report).unwrap();

        assert!(buffer.lines().is_empty());
        assert!(!sink.is_enabled(Service::Crashes));
    }

    #[test]
    fn test_cannot_enable_service_when_core_disabled() {
        let (sink, _) = sink();
        sink.set_enabled(Service::Core, false).unwrap();
        assert!(sink.set_enabled(Service::Analytics, true).is_err());
        assert!(sink.set_enabled(Service::Analytics, false).is_ok());
    }

    #[test]
    fn test_error_record_contains_report() {
        let (sink, buffer) = sink();
        let report = ErrorReport::new(
            Fault::aggregate(vec![Fault::new("A", "one"), Fault::new("B", "two")]),
            None,
            Vec::new(),
        );
        sink.track_error(&report).unwrap();

        let lines = buffer.lines();
        assert_eq!(lines[0]["type"], "error");
        assert_eq!(lines[0]["report"]["fault"]["causes"][1]["message"], "two");
        assert!(lines[0]["report"].get("properties").is_none());
    }

    #[test]
    fn test_secret_is_masked() {
        let buffer = SharedBuffer::default();
        let secret = "0123-4567-abcd".to_string();
        let sink = ConsoleSink::new(buffer.clone()).with_secret(&secret);
        sink.track_event("E", None).unwrap();

        let lines = buffer.lines();
        assert_eq!(lines[0]["app_secret"], "****abcd");
        assert_eq!(mask_secret("abc"), "****");
    }
}
