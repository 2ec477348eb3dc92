//! Event and error tracking

use tracing::debug;

use crate::fault::Fault;
use crate::model::{filter_properties, Attachment, ErrorReport, Property};
use crate::sink::{SinkError, TelemetrySink};

/// Track a named analytics event.
///
/// The filtered mapping is always forwarded, even when empty.
pub fn track_event<S: TelemetrySink + ?Sized>(
    sink: &S,
    name: &str,
    properties: &[Property],
) -> Result<(), SinkError> {
    let map = filter_properties(properties);
    debug!(event = name, properties = map.len(), "tracking event");
    sink.track_event(name, Some(&map))
}

/// Report a fault to the crash service and return the delivered report.
///
/// Unlike [`track_event`], an empty filtered mapping is omitted entirely so
/// the report carries no properties section. The fault is forwarded as is;
/// aggregates are not flattened.
pub fn track_error<S: TelemetrySink + ?Sized>(
    sink: &S,
    fault: Fault,
    properties: &[Property],
    attachments: Vec<Attachment>,
) -> Result<ErrorReport, SinkError> {
    let map = filter_properties(properties);
    let properties = if map.is_empty() { None } else { Some(map) };
    let report = ErrorReport::new(fault, properties, attachments);

    debug!(
        report_id = %report.id,
        kind = %report.fault.kind,
        attachments = report.attachments.len(),
        "tracking error"
    );
    sink.track_error(&report)?;
    Ok(report)
}
