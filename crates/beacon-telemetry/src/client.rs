//! Main telemetry client

use anyhow::Result;
use beacon_core::{
    attachments, demo, guard, guard_async, route, track_error, track_event, DemoCrash,
    ErrorContext, ErrorReport, Fault, GuardError, Guarded, HandlingPolicy, LogLevel, Property,
    Service, SharedPolicy, SinkControl, SinkError, TelemetrySink,
};
use serde::Serialize;

use crate::config::{load_telemetry_config, TelemetryConfig};
use crate::console::ConsoleSink;

/// Snapshot of the client's switches, for status display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryStatus {
    pub enabled: bool,
    pub analytics_enabled: bool,
    pub crashes_enabled: bool,
    pub log_level: LogLevel,
    pub handle_errors: bool,
}

/// Main telemetry client
pub struct TelemetryClient<S> {
    config: TelemetryConfig,
    sink: S,
    policy: SharedPolicy,
}

impl TelemetryClient<ConsoleSink> {
    /// Create a client writing to stdout, configured from files and environment.
    pub fn new() -> Result<Self> {
        let config = load_telemetry_config()?;
        let sink = match config.app_secret.clone() {
            Some(secret) => ConsoleSink::stdout().with_secret(&secret),
            None => ConsoleSink::stdout(),
        };
        Self::with_sink(config, sink)
    }
}

impl<S: TelemetrySink + SinkControl> TelemetryClient<S> {
    /// Wrap `sink` and push the config's switches and level into it.
    pub fn with_sink(config: TelemetryConfig, sink: S) -> Result<Self> {
        // Per-service switches first: the sink refuses to enable one while
        // the master switch is off.
        sink.set_enabled(Service::Core, true)?;
        sink.set_enabled(Service::Analytics, config.analytics_enabled)?;
        sink.set_enabled(Service::Crashes, config.crashes_enabled)?;
        sink.set_enabled(Service::Core, config.enabled)?;
        sink.set_log_level(config.log_level);

        let policy = SharedPolicy::new(HandlingPolicy::from_flag(config.handle_errors));

        Ok(Self {
            config,
            sink,
            policy,
        })
    }

    /// Write a log record at `level`. No level selected means nothing is written.
    pub fn write_log(&self, level: Option<LogLevel>, tag: &str, message: &str) -> Result<(), SinkError> {
        match level {
            Some(level) => route(&self.sink, level, tag, message),
            None => Ok(()),
        }
    }

    /// Track an analytics event
    pub fn track_event(&self, name: &str, properties: &[Property]) -> Result<(), SinkError> {
        track_event(&self.sink, name, properties)
    }

    /// Track a fault directly, outside the handling gate
    pub fn track_error(&self, fault: Fault, context: &ErrorContext) -> Result<ErrorReport, SinkError> {
        track_error(
            &self.sink,
            fault,
            &context.properties,
            context.attachments.clone(),
        )
    }

    /// Trigger a demo fault through the handling gate
    pub fn crash(&self, crash: DemoCrash, context: &ErrorContext) -> Result<Guarded<()>, GuardError> {
        tracing::info!(%crash, policy = ?self.policy.current(), "triggering demo fault");
        guard(&self.sink, self.policy.current(), context, || crash.run())
    }

    /// Fail inside a background task and gate the fault where it is awaited
    pub async fn crash_in_background(&self, context: &ErrorContext) -> Result<Guarded<()>, GuardError> {
        guard_async(
            &self.sink,
            &self.policy,
            context,
            demo::do_stuff_in_background(),
        )
        .await
    }

    /// Build the error context, falling back to configured attachment defaults
    pub fn error_context(
        &self,
        properties: Vec<Property>,
        file: Option<&str>,
        text: Option<&str>,
    ) -> ErrorContext {
        let file = file.or(self.config.attachments.file.as_deref());
        let text = text.or(self.config.attachments.text.as_deref());
        ErrorContext::new(properties, attachments::build(file, text))
    }

    pub fn set_handle_errors(&self, handle: bool) {
        self.policy.set(HandlingPolicy::from_flag(handle));
    }

    /// Shared handle to the handling policy, for toggling from other tasks
    pub fn policy(&self) -> SharedPolicy {
        self.policy.clone()
    }

    pub fn set_enabled(&self, service: Service, enabled: bool) -> Result<(), SinkError> {
        self.sink.set_enabled(service, enabled)
    }

    pub fn set_log_level(&self, level: LogLevel) {
        self.sink.set_log_level(level);
    }

    pub fn status(&self) -> TelemetryStatus {
        TelemetryStatus {
            enabled: self.sink.is_enabled(Service::Core),
            analytics_enabled: self.sink.is_enabled(Service::Analytics),
            crashes_enabled: self.sink.is_enabled(Service::Crashes),
            log_level: self.sink.log_level(),
            handle_errors: self.policy.current().handles(),
        }
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
