//! Handle-or-propagate gate around fault-generating actions
//!
//! The policy is passed in at call time. [`SharedPolicy`] exists for callers
//! that toggle it while work is in flight; its value is read once, at the
//! moment a fault is handled.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::fault::Fault;
use crate::model::{Attachment, ErrorReport, Property};
use crate::sink::{SinkError, TelemetrySink};
use crate::tracker::track_error;

/// Whether a fault is caught and reported or left to propagate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlingPolicy {
    Handle,
    Propagate,
}

impl HandlingPolicy {
    pub fn from_flag(handle: bool) -> Self {
        if handle {
            HandlingPolicy::Handle
        } else {
            HandlingPolicy::Propagate
        }
    }

    pub fn handles(&self) -> bool {
        matches!(self, HandlingPolicy::Handle)
    }
}

/// A policy that can be flipped from another thread.
///
/// Reads are not synchronised with writes; a guarded action sees whichever
/// value is current when its fault is handled.
#[derive(Debug, Clone)]
pub struct SharedPolicy(Arc<AtomicBool>);

impl SharedPolicy {
    pub fn new(policy: HandlingPolicy) -> Self {
        Self(Arc::new(AtomicBool::new(policy.handles())))
    }

    pub fn set(&self, policy: HandlingPolicy) {
        self.0.store(policy.handles(), Ordering::Relaxed);
    }

    pub fn current(&self) -> HandlingPolicy {
        HandlingPolicy::from_flag(self.0.load(Ordering::Relaxed))
    }
}

impl Default for SharedPolicy {
    fn default() -> Self {
        Self::new(HandlingPolicy::Handle)
    }
}

/// Enrichment attached to any fault reported through the gate
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub properties: Vec<Property>,
    pub attachments: Vec<Attachment>,
}

impl ErrorContext {
    pub fn new(properties: Vec<Property>, attachments: Vec<Attachment>) -> Self {
        Self {
            properties,
            attachments,
        }
    }
}

/// Outcome of a guarded action that did not propagate
#[derive(Debug)]
pub enum Guarded<T> {
    Completed(T),
    /// The action failed and its fault was reported and suppressed.
    Reported(ErrorReport),
}

impl<T> Guarded<T> {
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            Guarded::Reported(report) => Some(report),
            Guarded::Completed(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum GuardError {
    /// The action failed while the policy was `Propagate`.
    #[error("unhandled {0}")]
    Unhandled(Fault),

    /// Reporting the fault failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl GuardError {
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            GuardError::Unhandled(fault) => Some(fault),
            GuardError::Sink(_) => None,
        }
    }
}

/// Run `action`; on failure either report the fault or hand it back.
pub fn guard<S, T, F>(
    sink: &S,
    policy: HandlingPolicy,
    context: &ErrorContext,
    action: F,
) -> Result<Guarded<T>, GuardError>
where
    S: TelemetrySink + ?Sized,
    F: FnOnce() -> Result<T, Fault>,
{
    match action() {
        Ok(value) => Ok(Guarded::Completed(value)),
        Err(fault) => handle(sink, policy, context, fault),
    }
}

/// Await `work` and gate its failure with the policy current at the await point.
pub async fn guard_async<S, T, Fut>(
    sink: &S,
    policy: &SharedPolicy,
    context: &ErrorContext,
    work: Fut,
) -> Result<Guarded<T>, GuardError>
where
    S: TelemetrySink + ?Sized,
    Fut: Future<Output = Result<T, Fault>>,
{
    match work.await {
        Ok(value) => Ok(Guarded::Completed(value)),
        Err(fault) => handle(sink, policy.current(), context, fault),
    }
}

fn handle<S, T>(
    sink: &S,
    policy: HandlingPolicy,
    context: &ErrorContext,
    fault: Fault,
) -> Result<Guarded<T>, GuardError>
where
    S: TelemetrySink + ?Sized,
{
    if !policy.handles() {
        warn!(kind = %fault.kind, "fault left unhandled");
        return Err(GuardError::Unhandled(fault));
    }

    let report = track_error(
        sink,
        fault,
        &context.properties,
        context.attachments.clone(),
    )?;
    info!(report_id = %report.id, kind = %report.fault.kind, "fault handled and reported");
    Ok(Guarded::Reported(report))
}
