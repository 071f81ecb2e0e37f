//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (volume is a non-negative number)
//! - Reject sound names that could escape the sounds directory
//! - Check that addresses are well formed
//!
//! Returns all validation errors, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ReceiverConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid listen address `{0}`")]
    ListenAddress(String),

    #[error("alert sound must not be empty")]
    EmptySound,

    #[error("alert sound `{0}` must be a bare name")]
    SoundPath(String),

    #[error("alert volume `{0}` must be a non-negative number")]
    Volume(String),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &ReceiverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let host = config.listener.host.as_str();
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        errors.push(ValidationError::ListenAddress(config.bind_address()));
    }

    let sound = config.alert.sound.as_str();
    if sound.trim().is_empty() {
        errors.push(ValidationError::EmptySound);
    } else if sound.contains('/') || sound.contains('\\') || sound.contains("..") {
        errors.push(ValidationError::SoundPath(sound.to_string()));
    }

    match config.alert.volume.trim().parse::<f32>() {
        Ok(v) if v.is_finite() && v >= 0.0 => {}
        _ => errors.push(ValidationError::Volume(config.alert.volume.clone())),
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::MetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
