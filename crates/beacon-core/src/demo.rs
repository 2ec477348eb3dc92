//! Deliberately failing actions for exercising crash reporting

use std::fmt;
use std::str::FromStr;

use crate::fault::Fault;

/// Kinds of demo faults that can be triggered on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoCrash {
    TestCrash,
    NonSerializable,
    DivisionByZero,
    NullReference,
    Aggregate,
}

impl DemoCrash {
    pub const ALL: [DemoCrash; 5] = [
        DemoCrash::TestCrash,
        DemoCrash::NonSerializable,
        DemoCrash::DivisionByZero,
        DemoCrash::NullReference,
        DemoCrash::Aggregate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DemoCrash::TestCrash => "test",
            DemoCrash::NonSerializable => "non-serializable",
            DemoCrash::DivisionByZero => "divide-by-zero",
            DemoCrash::NullReference => "null-reference",
            DemoCrash::Aggregate => "aggregate",
        }
    }

    /// Run the failing action. Always returns `Err`.
    pub fn run(&self) -> Result<(), Fault> {
        match self {
            DemoCrash::TestCrash => Err(Fault::new(
                "TestCrashException",
                "Test crash exception generated by SDK",
            )),
            DemoCrash::NonSerializable => Err(Fault::new(
                "NonSerializableException",
                "Exception of type 'NonSerializableException' was thrown.",
            )),
            DemoCrash::DivisionByZero => divide_by_parsed("0").map(|_| ()),
            DemoCrash::NullReference => {
                let values = [Some("a"), None, Some("c")];
                let trimmed = values[1].map(str::trim).ok_or_else(|| {
                    Fault::new(
                        "NullReferenceException",
                        "Object reference not set to an instance of an object.",
                    )
                })?;
                tracing::debug!(value = trimmed, "trimmed value");
                Ok(())
            }
            DemoCrash::Aggregate => Err(aggregate_fault()),
        }
    }
}

impl fmt::Display for DemoCrash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DemoCrash {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DemoCrash::ALL
            .into_iter()
            .find(|crash| crash.name() == s)
            .ok_or_else(|| format!("unknown crash kind '{}'", s))
    }
}

fn divide_by_parsed(divisor: &str) -> Result<i32, Fault> {
    let divisor: i32 = divisor.parse().map_err(|e| Fault::capture(&e))?;
    42_i32
        .checked_div(divisor)
        .ok_or_else(|| Fault::new("DivideByZeroException", "Attempted to divide by zero."))
}

/// Two independent failures combined: a network error and an argument error
/// that itself wraps a range error.
pub fn aggregate_fault() -> Fault {
    let send_http = Fault::new("IOException", "Network down");
    let validate_length = Fault::new("ArgumentOutOfRangeException", "It's over 9000!");
    let argument = Fault::new("ArgumentException", "Invalid parameter").with_cause(validate_length);
    Fault::aggregate(vec![send_http, argument])
}

/// Background unit of work that fails.
///
/// A panic or cancellation of the spawned task surfaces as a fault at the
/// await point too.
pub async fn do_stuff_in_background() -> Result<(), Fault> {
    let handle = tokio::spawn(async {
        Err::<(), _>(Fault::new("IOException", "Server did not respond"))
    });

    match handle.await {
        Ok(result) => result,
        Err(join_error) => Err(Fault::capture(&join_error)),
    }
}
