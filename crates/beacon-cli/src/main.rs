use anyhow::{Context, Result};
use beacon_core::{DemoCrash, Guarded, LogLevel, Property, Service};
use beacon_telemetry::TelemetryClient;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beacon", version, about = "beacon telemetry demo CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Minimum severity the sink writes (overrides config)
    #[arg(long, global = true, value_name = "LEVEL")]
    sdk_log_level: Option<LogLevel>,

    /// Disable analytics events for this run
    #[arg(long, global = true)]
    no_analytics: bool,

    /// Disable error reports for this run
    #[arg(long, global = true)]
    no_crashes: bool,

    /// Increase diagnostic output on stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Write a log record through the sink
    Log {
        /// Severity; without one nothing is written
        #[arg(long)]
        level: Option<LogLevel>,
        #[arg(long, default_value = "")]
        tag: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Track an analytics event
    Event {
        name: String,
        /// Properties in key=value format (can be specified multiple times)
        #[arg(long = "prop", value_name = "KEY=VALUE")]
        props: Vec<String>,
    },
    /// Trigger a fault and report it, or let it propagate
    Crash {
        kind: CrashKind,
        /// Error properties in key=value format (can be specified multiple times)
        #[arg(long = "prop", value_name = "KEY=VALUE")]
        props: Vec<String>,
        /// File to attach to the report
        #[arg(long, value_name = "PATH")]
        attach_file: Option<String>,
        /// Text to attach to the report
        #[arg(long, value_name = "TEXT")]
        attach_text: Option<String>,
        /// Report the fault and carry on
        #[arg(long, conflicts_with = "propagate")]
        handle: bool,
        /// Let the fault terminate the command
        #[arg(long)]
        propagate: bool,
    },
    /// Show which services are enabled
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum CrashKind {
    Test,
    NonSerializable,
    DivideByZero,
    NullReference,
    Aggregate,
    /// Fail inside a background task
    Async,
}

impl CrashKind {
    fn demo(self) -> Option<DemoCrash> {
        match self {
            CrashKind::Test => Some(DemoCrash::TestCrash),
            CrashKind::NonSerializable => Some(DemoCrash::NonSerializable),
            CrashKind::DivideByZero => Some(DemoCrash::DivisionByZero),
            CrashKind::NullReference => Some(DemoCrash::NullReference),
            CrashKind::Aggregate => Some(DemoCrash::Aggregate),
            CrashKind::Async => None,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let client = TelemetryClient::new().context("Failed to initialize telemetry")?;
    if let Some(level) = cli.sdk_log_level {
        client.set_log_level(level);
    }
    if cli.no_analytics {
        client.set_enabled(Service::Analytics, false)?;
    }
    if cli.no_crashes {
        client.set_enabled(Service::Crashes, false)?;
    }
    tracing::debug!(status = ?client.status(), "telemetry client ready");

    match cli.cmd {
        Command::Log { level, tag, message } => client.write_log(level, &tag, &message)?,
        Command::Event { name, props } => client.track_event(&name, &parse_props(&props))?,
        Command::Crash {
            kind,
            props,
            attach_file,
            attach_text,
            handle,
            propagate,
        } => {
            if handle {
                client.set_handle_errors(true);
            }
            if propagate {
                client.set_handle_errors(false);
            }

            let context = client.error_context(
                parse_props(&props),
                attach_file.as_deref(),
                attach_text.as_deref(),
            );
            let outcome = match kind.demo() {
                Some(crash) => client.crash(crash, &context)?,
                None => client.crash_in_background(&context).await?,
            };
            if let Guarded::Reported(report) = outcome {
                tracing::debug!(report_id = %report.id, kind = %report.fault.kind, "demo fault reported");
                eprintln!("▸ {} reported as {}", report.fault, report.id);
            }
        }
        Command::Status { json } => {
            let status = client.status();
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                println!("Telemetry: {}", on_off(status.enabled));
                println!("Analytics: {}", on_off(status.analytics_enabled));
                println!("Crashes:   {}", on_off(status.crashes_enabled));
                println!("Log level: {}", status.log_level);
                println!(
                    "Faults:    {}",
                    if status.handle_errors { "handled" } else { "propagated" }
                );
            }
        }
    }
    Ok(())
}

fn parse_props(pairs: &[String]) -> Vec<Property> {
    pairs.iter().map(|pair| Property::parse(pair)).collect()
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "enabled"
    } else {
        "disabled"
    }
}
