//! Aggregation engine and configuration validation contracts.
//!
//! # Data Flow
//! ```text
//! UserConfig (opaque)
//!     → ConfigValidator::validate  → ValidationOutcome
//!     → ValidatedConfig (only built by the dispatcher on success)
//!     → EngineFactory::engine      → Box<dyn StreamEngine> (one per request)
//!     → StreamEngine::streams      → Vec<stream descriptor> | EngineError
//! ```
//!
//! # Design Decisions
//! - The request boundary depends only on these traits; tests inject fakes
//! - Engines are built per request and never shared, so they hold no locks
//! - Stream descriptors stay opaque JSON; ranking and filtering live elsewhere

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::addon::codec::UserConfig;
use crate::addon::request::StreamRequest;

pub mod services;
pub mod upstream;

pub use services::ServiceValidator;
pub use upstream::UpstreamEngineFactory;

/// Result of semantic configuration validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ValidationOutcome {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error_code: None,
            error_message: None,
        }
    }

    pub fn invalid(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            error_code: Some(code.into()),
            error_message: Some(message.into()),
        }
    }
}

/// Semantic validation of a decoded configuration.
pub trait ConfigValidator: Send + Sync + fmt::Debug {
    fn validate(&self, config: &UserConfig) -> ValidationOutcome;
}

/// A configuration that passed semantic validation.
///
/// Only the dispatcher creates these, after `ConfigValidator` accepted the
/// underlying `UserConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig(UserConfig);

impl ValidatedConfig {
    pub(crate) fn new(config: UserConfig) -> Self {
        Self(config)
    }

    pub fn as_value(&self) -> &Value {
        self.0.as_value()
    }
}

/// Errors raised by an aggregation engine.
///
/// The `Display` output is sent to the client verbatim as a 500 body.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Fault(String),

    #[error("all {attempted} upstream services failed")]
    AllUpstreamsFailed { attempted: usize },
}

/// Produces candidate streams for one request.
#[async_trait]
pub trait StreamEngine: Send + Sync {
    async fn streams(&self, request: &StreamRequest) -> Result<Vec<Value>, EngineError>;
}

/// Builds an engine scoped to one validated configuration.
pub trait EngineFactory: Send + Sync + fmt::Debug {
    fn engine(&self, config: &ValidatedConfig) -> Box<dyn StreamEngine>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serialization_omits_empty_fields() {
        assert_eq!(
            serde_json::to_value(ValidationOutcome::valid()).unwrap(),
            json!({"valid": true})
        );
        assert_eq!(
            serde_json::to_value(ValidationOutcome::invalid("noServices", "no services enabled"))
                .unwrap(),
            json!({"valid": false, "errorCode": "noServices", "errorMessage": "no services enabled"})
        );
    }

    #[test]
    fn test_engine_error_display_is_the_message() {
        assert_eq!(EngineError::Fault("timeout".into()).to_string(), "timeout");
    }
}
