//! Structured faults with nested cause chains

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Kind used for faults built with [`Fault::aggregate`]
pub const AGGREGATE_KIND: &str = "AggregateError";

/// A captured error condition.
///
/// `causes` holds the nested chain. A plain fault has at most one cause; an
/// aggregate holds every inner fault in the order it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Fault>,
}

impl Fault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            causes: Vec::new(),
        }
    }

    pub fn with_cause(mut self, cause: Fault) -> Self {
        self.causes.push(cause);
        self
    }

    /// Combine several faults into one without flattening them.
    pub fn aggregate(faults: Vec<Fault>) -> Self {
        let mut message = String::from("One or more errors occurred.");
        for fault in &faults {
            message.push_str(&format!(" ({})", fault.message));
        }
        Self {
            kind: AGGREGATE_KIND.to_string(),
            message,
            causes: faults,
        }
    }

    /// Capture any std error, keeping its `source()` chain as nested causes.
    pub fn capture<E: Error + 'static>(error: &E) -> Self {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }

        let nested = chain
            .into_iter()
            .rev()
            .fold(None, |cause: Option<Fault>, message| {
                let fault = Fault::new("Error", message);
                Some(match cause {
                    Some(cause) => fault.with_cause(cause),
                    None => fault,
                })
            });

        let fault = Fault::new(short_type_name::<E>(), error.to_string());
        match nested {
            Some(cause) => fault.with_cause(cause),
            None => fault,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        self.kind == AGGREGATE_KIND
    }

    /// Messages of this fault and every nested cause, depth first.
    pub fn messages(&self) -> Vec<&str> {
        let mut out = vec![self.message.as_str()];
        for cause in &self.causes {
            out.extend(cause.messages());
        }
        out
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.causes.first().map(|cause| cause as &(dyn Error + 'static))
    }
}

fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
