//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (upstream timeout > 0, port valid)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AddonConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AddonConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.port must not be 0")]
    ZeroPort,

    #[error("{field} must be greater than 0")]
    ZeroTimeout { field: &'static str },

    #[error("observability.metrics_address is not a socket address: {0}")]
    MetricsAddress(String),

    #[error("manifest.id must not be empty")]
    EmptyManifestId,
}

/// Check a loaded configuration, collecting every problem.
pub fn validate_config(config: &AddonConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.engine.upstream_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "engine.upstream_timeout_secs",
        });
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.manifest.id.trim().is_empty() {
        errors.push(ValidationError::EmptyManifestId);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
