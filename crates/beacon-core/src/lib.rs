//! # beacon core
//!
//! Dispatch core between an application and its telemetry backend.
//!
//! ## Components
//!
//! - **Log router**: picks the sink operation for a severity
//! - **Event tracker**: filters a property bag and forwards a named event
//! - **Error tracker**: forwards a captured fault with properties and attachments
//! - **Handling gate**: reports a failing action's fault or lets it propagate
//! - **Attachment builder**: turns a file path and free text into attachments
//!
//! The backend itself is behind [`TelemetrySink`]; transport, batching and
//! storage are its business.

pub mod attachments;
pub mod demo;
pub mod fault;
pub mod guard;
pub mod model;
pub mod router;
pub mod secret;
pub mod sink;
#[cfg(any(test, feature = "testing"))]
#[doc(hidden)]
pub mod testing;
pub mod tracker;

pub use demo::DemoCrash;
pub use fault::Fault;
pub use guard::{guard, guard_async, ErrorContext, GuardError, Guarded, HandlingPolicy, SharedPolicy};
pub use model::{filter_properties, Attachment, ErrorReport, LogLevel, Property, PropertyMap};
pub use router::route;
pub use secret::AppSecretHolder;
pub use sink::{Service, SinkControl, SinkError, TelemetrySink};
pub use tracker::{track_error, track_event};
