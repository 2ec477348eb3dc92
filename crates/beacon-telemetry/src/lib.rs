//! # beacon telemetry
//!
//! Client facade over the beacon dispatch core.
//!
//! ## What it does
//!
//! - **Logs**: routes a tagged message to the sink by severity
//! - **Events**: named analytics events with string properties
//! - **Errors**: fault reports with properties and file/text attachments
//! - **Handling toggle**: demo faults are either reported or left to propagate
//!
//! ## Configuration
//!
//! ```toml
//! # ~/.beacon/config.toml, .beacon/config.toml or .beacon/config.local.toml
//! [telemetry]
//! enabled = true
//! analytics_enabled = true
//! crashes_enabled = true
//! log_level = "warn"
//! handle_errors = true
//! app_secret = "00000000-0000-0000-0000-000000000000"
//!
//! [telemetry.attachments]
//! file = "logs/last-run.log"
//! text = "reported from the demo"
//! ```
//!
//! ## Opt-Out
//!
//! ```bash
//! export BEACON_TELEMETRY_DISABLED=1
//! # or the universal
//! export DO_NOT_TRACK=1
//! ```

pub mod client;
pub mod config;
pub mod console;

pub use client::{TelemetryClient, TelemetryStatus};
pub use config::{load_telemetry_config, load_telemetry_config_from, TelemetryConfig};
pub use console::ConsoleSink;

/// Re-export common types
pub type Result<T> = anyhow::Result<T>;
