//! Telemetry configuration loading and validation

use anyhow::{Context, Result};
use beacon_core::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory holding beacon config files, relative to home or project root
pub const CONFIG_DIR: &str = ".beacon";

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Master switch (default: true, opt-out model)
    pub enabled: bool,

    /// Whether analytics events are delivered
    pub analytics_enabled: bool,

    /// Whether error reports are delivered
    pub crashes_enabled: bool,

    /// Minimum severity the sink emits (default: warn)
    pub log_level: LogLevel,

    /// Catch and report demo faults instead of letting them propagate
    pub handle_errors: bool,

    /// Secret stamped on outgoing records
    pub app_secret: Option<String>,

    /// Default error attachments
    pub attachments: AttachmentDefaults,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AttachmentDefaults {
    pub file: Option<String>,
    pub text: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            analytics_enabled: true,
            crashes_enabled: true,
            log_level: LogLevel::Warn,
            handle_errors: true,
            app_secret: None,
            attachments: AttachmentDefaults::default(),
        }
    }
}

/// `[telemetry]` table as written in a file; absent keys leave the
/// lower-precedence value alone.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TelemetryFile {
    enabled: Option<bool>,
    analytics_enabled: Option<bool>,
    crashes_enabled: Option<bool>,
    log_level: Option<LogLevel>,
    handle_errors: Option<bool>,
    app_secret: Option<String>,
    attachments: Option<AttachmentDefaults>,
}

/// Invalid value in an environment override
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Load telemetry configuration with precedence:
/// 1. Environment variables (highest priority)
/// 2. Local config (.beacon/config.local.toml)
/// 3. Project config (.beacon/config.toml)
/// 4. User config (~/.beacon/config.toml)
/// 5. Default
pub fn load_telemetry_config() -> Result<TelemetryConfig> {
    let home = dirs::home_dir();
    load_telemetry_config_from(home.as_deref(), Path::new("."))
}

/// Same as [`load_telemetry_config`] with explicit home and project roots.
pub fn load_telemetry_config_from(
    home_dir: Option<&Path>,
    project_root: &Path,
) -> Result<TelemetryConfig> {
    let mut config = TelemetryConfig::default();

    let mut sources: Vec<PathBuf> = Vec::new();
    if let Some(home) = home_dir {
        sources.push(home.join(CONFIG_DIR).join("config.toml"));
    }
    sources.push(project_root.join(CONFIG_DIR).join("config.toml"));
    sources.push(project_root.join(CONFIG_DIR).join("config.local.toml"));

    for path in sources {
        if path.exists() {
            let file = load_config_from_file(&path)?;
            merge_config(&mut config, file);
            tracing::debug!(path = %path.display(), "loaded telemetry config");
        }
    }

    apply_env_overrides(&mut config)?;

    Ok(config)
}

/// Load the `[telemetry]` table from a TOML file
fn load_config_from_file(path: &Path) -> Result<TelemetryFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    #[derive(Deserialize)]
    struct FullConfig {
        #[serde(default)]
        telemetry: Option<TelemetryFile>,
    }

    let full_config: FullConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

    Ok(full_config.telemetry.unwrap_or_default())
}

/// Overwrite every key the file sets
fn merge_config(base: &mut TelemetryConfig, file: TelemetryFile) {
    if let Some(enabled) = file.enabled {
        base.enabled = enabled;
    }
    if let Some(enabled) = file.analytics_enabled {
        base.analytics_enabled = enabled;
    }
    if let Some(enabled) = file.crashes_enabled {
        base.crashes_enabled = enabled;
    }
    if let Some(level) = file.log_level {
        base.log_level = level;
    }
    if let Some(handle) = file.handle_errors {
        base.handle_errors = handle;
    }
    if file.app_secret.is_some() {
        base.app_secret = file.app_secret;
    }
    if let Some(attachments) = file.attachments {
        if attachments.file.is_some() {
            base.attachments.file = attachments.file;
        }
        if attachments.text.is_some() {
            base.attachments.text = attachments.text;
        }
    }
}

/// Apply environment variable overrides
fn apply_env_overrides(config: &mut TelemetryConfig) -> Result<()> {
    // BEACON_TELEMETRY_DISABLED=1 or DO_NOT_TRACK=1 switches everything off
    if env::var("BEACON_TELEMETRY_DISABLED").is_ok() || env::var("DO_NOT_TRACK").is_ok() {
        config.enabled = false;
    }

    if let Ok(value) = env::var("BEACON_LOG_LEVEL") {
        config.log_level = value.parse().map_err(|reason| ConfigError::InvalidEnv {
            var: "BEACON_LOG_LEVEL",
            value: value.clone(),
            reason,
        })?;
    }

    if let Ok(value) = env::var("BEACON_HANDLE_ERRORS") {
        config.handle_errors = parse_flag(&value).ok_or_else(|| ConfigError::InvalidEnv {
            var: "BEACON_HANDLE_ERRORS",
            value: value.clone(),
            reason: "expected 1/0, true/false, yes/no or on/off".to_string(),
        })?;
    }

    if let Ok(secret) = env::var("BEACON_APP_SECRET") {
        if !secret.is_empty() {
            config.app_secret = Some(secret);
        }
    }

    Ok(())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 5] = [
        "BEACON_TELEMETRY_DISABLED",
        "DO_NOT_TRACK",
        "BEACON_LOG_LEVEL",
        "BEACON_HANDLE_ERRORS",
        "BEACON_APP_SECRET",
    ];

    /// Clears the override variables for the duration of a test
    struct EnvGuard(Vec<(&'static str, Option<String>)>);

    impl EnvGuard {
        fn clean() -> Self {
            let saved = ENV_VARS.iter().map(|var| (*var, env::var(var).ok())).collect();
            for var in ENV_VARS {
                env::remove_var(var);
            }
            Self(saved)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (var, value) in &self.0 {
                match value {
                    Some(value) => env::set_var(var, value),
                    None => env::remove_var(var),
                }
            }
        }
    }

    fn write_config(root: &Path, name: &str, body: &str) {
        let dir = root.join(CONFIG_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert!(config.enabled);
        assert!(config.analytics_enabled);
        assert!(config.crashes_enabled);
        assert!(config.handle_errors);
        assert_eq!(config.log_level, LogLevel::Warn);
        assert!(config.app_secret.is_none());
    }

    #[test]
    #[serial]
    fn test_precedence_user_project_local() {
        let _env = EnvGuard::clean();
        let home = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();

        write_config(
            home.path(),
            "config.toml",
            r#"
[telemetry]
log_level = "verbose"
app_secret = "user-secret"
handle_errors = false
"#,
        );
        write_config(
            project.path(),
            "config.toml",
            r#"
[telemetry]
log_level = "info"
analytics_enabled = false
"#,
        );
        write_config(
            project.path(),
            "config.local.toml",
            r#"
[telemetry]
handle_errors = true

[telemetry.attachments]
text = "local note"
"#,
        );

        let config = load_telemetry_config_from(Some(home.path()), project.path()).unwrap();
        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.app_secret.as_deref(), Some("user-secret"));
        assert!(!config.analytics_enabled);
        assert!(config.handle_errors);
        assert_eq!(config.attachments.text.as_deref(), Some("local note"));
        assert!(config.attachments.file.is_none());
    }

    #[test]
    #[serial]
    fn test_missing_files_use_defaults() {
        let _env = EnvGuard::clean();
        let project = TempDir::new().unwrap();
        let config = load_telemetry_config_from(None, project.path()).unwrap();
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    #[serial]
    fn test_file_without_telemetry_section() {
        let _env = EnvGuard::clean();
        let project = TempDir::new().unwrap();
        write_config(project.path(), "config.toml", "[other]\nkey = 1\n");

        let config = load_telemetry_config_from(None, project.path()).unwrap();
        assert_eq!(config, TelemetryConfig::default());
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_an_error() {
        let _env = EnvGuard::clean();
        let project = TempDir::new().unwrap();
        write_config(project.path(), "config.toml", "[telemetry]\nlog_level = \"loud\"\n");

        let err = load_telemetry_config_from(None, project.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_env_var_disables_telemetry() {
        let _env = EnvGuard::clean();
        env::set_var("BEACON_TELEMETRY_DISABLED", "1");

        let mut config = TelemetryConfig::default();
        apply_env_overrides(&mut config).unwrap();
        assert!(!config.enabled);
    }

    #[test]
    #[serial]
    fn test_do_not_track_disables_telemetry() {
        let _env = EnvGuard::clean();
        env::set_var("DO_NOT_TRACK", "1");

        let mut config = TelemetryConfig::default();
        apply_env_overrides(&mut config).unwrap();
        assert!(!config.enabled);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let _env = EnvGuard::clean();
        let project = TempDir::new().unwrap();
        write_config(
            project.path(),
            "config.toml",
            "[telemetry]\nlog_level = \"error\"\nhandle_errors = true\n",
        );
        env::set_var("BEACON_LOG_LEVEL", "debug");
        env::set_var("BEACON_HANDLE_ERRORS", "off");
        env::set_var("BEACON_APP_SECRET", "env-secret");

        let config = load_telemetry_config_from(None, project.path()).unwrap();
        assert_eq!(config.log_level, LogLevel::Debug);
        assert!(!config.handle_errors);
        assert_eq!(config.app_secret.as_deref(), Some("env-secret"));
    }

    #[test]
    #[serial]
    fn test_invalid_env_value() {
        let _env = EnvGuard::clean();
        env::set_var("BEACON_HANDLE_ERRORS", "maybe");

        let mut config = TelemetryConfig::default();
        let err = apply_env_overrides(&mut config).unwrap_err();
        assert!(err.to_string().contains("BEACON_HANDLE_ERRORS"));
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag(" 0 "), Some(false));
        assert_eq!(parse_flag("nah"), None);
    }
}
