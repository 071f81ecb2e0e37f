//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{LogFormat, ReceiverConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable naming an optional TOML config file.
pub const CONFIG_PATH_VAR: &str = "WEBHOOK_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value `{value}` for {var}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ReceiverConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Resolve the full configuration: defaults, then the optional file named by
/// `WEBHOOK_CONFIG`, then environment overrides. Validated once at the end.
pub fn load_from_env() -> Result<ReceiverConfig, ConfigError> {
    resolve(|key| std::env::var(key).ok())
}

/// Same as [`load_from_env`] with an injectable variable lookup.
pub fn resolve<F>(lookup: F) -> Result<ReceiverConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match non_empty(&lookup, CONFIG_PATH_VAR) {
        Some(path) => read_file(Path::new(&path))?,
        None => ReceiverConfig::default(),
    };
    apply_env(&mut config, &lookup)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto `config`. Empty values count as unset.
pub fn apply_env<F>(config: &mut ReceiverConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = non_empty(&lookup, "HOST") {
        config.listener.host = host;
    }
    if let Some(port) = parse_var(&lookup, "PORT")? {
        config.listener.port = port;
    }
    if let Some(max) = parse_var(&lookup, "RATE_LIMIT")? {
        config.rate_limit.max_requests = max;
    }
    if let Some(token) = non_empty(&lookup, "API_TOKEN") {
        config.auth.api_token = Some(token);
    }
    if let Some(sound) = non_empty(&lookup, "ALERT_SOUND") {
        config.alert.sound = sound;
    }
    if let Some(volume) = non_empty(&lookup, "ALERT_VOLUME") {
        config.alert.volume = volume;
    }
    if let Some(dir) = non_empty(&lookup, "ALERT_SOUNDS_DIR") {
        config.alert.sounds_dir = dir;
    }
    if let Some(level) = non_empty(&lookup, "LOG_LEVEL") {
        config.observability.log_level = level;
    }
    if let Some(format) = non_empty(&lookup, "LOG_FORMAT") {
        config.observability.log_format = match format.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => {
                return Err(ConfigError::InvalidValue {
                    var: "LOG_FORMAT",
                    value: format,
                })
            }
        };
    }
    if let Some(addr) = non_empty(&lookup, "METRICS_ADDRESS") {
        config.observability.metrics_address = Some(addr);
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<ReceiverConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var).filter(|v| !v.trim().is_empty())
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup, var) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
        None => Ok(None),
    }
}
