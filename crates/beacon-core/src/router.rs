//! Log routing by severity

use crate::model::LogLevel;
use crate::sink::{SinkError, TelemetrySink};

/// Forward a log record to the sink operation bound to `level`.
///
/// `LogLevel::None` selects no operation and is a no-op.
pub fn route<S: TelemetrySink + ?Sized>(
    sink: &S,
    level: LogLevel,
    tag: &str,
    message: &str,
) -> Result<(), SinkError> {
    match level {
        LogLevel::Verbose => sink.log_verbose(tag, message),
        LogLevel::Debug => sink.log_debug(tag, message),
        LogLevel::Info => sink.log_info(tag, message),
        LogLevel::Warn => sink.log_warn(tag, message),
        LogLevel::Error => sink.log_error(tag, message),
        LogLevel::None => Ok(()),
    }
}
