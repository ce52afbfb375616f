//! Stream request dispatch.
//!
//! # State Machine
//! ```text
//! NoConfig ─▶ DecodeConfig ─▶ MatchPath ─▶ BuildRequest ─▶ ValidateConfig ─▶ Dispatch ─▶ Respond
//!    │             │              │             │                │               │
//!    ▼             ▼              ▼             ▼                ▼               ▼
//! 200 missing   400 config    400 request   400 request    200 invalid      500 fault
//! ```
//!
//! # Design Decisions
//! - Every state either yields a value or a terminal `Rejection`; `?` stops the
//!   run at the first terminal state, so a rejected configuration never reaches
//!   the engine
//! - Configuration problems stay 200 with a structured body, because addon
//!   clients render those bodies and ignore error statuses
//! - Engine faults are the only 500s and are reported once, never retried

use std::sync::Arc;
use std::time::Instant;

use axum::http::StatusCode;
use thiserror::Error;

use crate::addon::codec::{self, DecodeError};
use crate::addon::path::{self, PathError};
use crate::addon::request::{self, RequestError};
use crate::addon::response::{self, StreamsResponse};
use crate::engine::{ConfigValidator, EngineError, EngineFactory, ValidatedConfig};
use crate::observability::metrics;

/// Plain-text body for undecodable configurations.
pub const INVALID_CONFIG_TEXT: &str = "Invalid config";
/// Plain-text body for paths and requests that break the grammar.
pub const INVALID_REQUEST_TEXT: &str = "Invalid request";

/// Inputs of one stream request.
#[derive(Debug, Clone, Copy)]
pub struct StreamCall<'a> {
    /// Decoded configuration segment, `None` on the config-less route.
    pub config_segment: Option<&'a str>,
    /// Raw request path, still percent-encoded.
    pub path: &'a str,
    /// Root URL the request arrived on.
    pub root_url: &'a str,
}

/// Terminal outcome of a stream request.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Streams(StreamsResponse),
    MissingConfig(StreamsResponse),
    InvalidConfig(StreamsResponse),
    BadRequest(&'static str),
    EngineFault(String),
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        match self {
            Reply::Streams(_) | Reply::MissingConfig(_) | Reply::InvalidConfig(_) => StatusCode::OK,
            Reply::BadRequest(_) => StatusCode::BAD_REQUEST,
            Reply::EngineFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Metric label.
    pub fn outcome(&self) -> &'static str {
        match self {
            Reply::Streams(_) => "streams",
            Reply::MissingConfig(_) => "missing_config",
            Reply::InvalidConfig(_) => "invalid_config",
            Reply::BadRequest(_) => "bad_request",
            Reply::EngineFault(_) => "engine_fault",
        }
    }
}

/// Why a request stopped before producing streams.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("no configuration supplied")]
    MissingConfig,

    #[error("undecodable configuration: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("configuration rejected: {code} - {message}")]
    InvalidConfig { code: String, message: String },

    #[error("engine fault: {0}")]
    Engine(#[from] EngineError),
}

impl Rejection {
    fn into_reply(self, root_url: &str) -> Reply {
        match self {
            Rejection::MissingConfig => Reply::MissingConfig(response::missing_config(root_url)),
            Rejection::Decode(_) => Reply::BadRequest(INVALID_CONFIG_TEXT),
            Rejection::Path(_) | Rejection::Request(_) => Reply::BadRequest(INVALID_REQUEST_TEXT),
            Rejection::InvalidConfig { message, .. } => {
                Reply::InvalidConfig(response::invalid_config(root_url, &message))
            }
            Rejection::Engine(e) => Reply::EngineFault(e.to_string()),
        }
    }

    fn log(&self) {
        match self {
            Rejection::MissingConfig => tracing::info!("Stream request without configuration"),
            Rejection::Decode(e) => tracing::warn!(error = %e, "Invalid config"),
            Rejection::Path(PathError::Malformed { path }) => {
                tracing::warn!(path = %path, "Invalid request")
            }
            Rejection::Request(e) => tracing::warn!(error = %e, "Invalid request"),
            Rejection::InvalidConfig { code, message } => {
                tracing::warn!(code = %code, message = %message, "Invalid config")
            }
            Rejection::Engine(e) => tracing::error!(error = ?e, "Aggregation engine failed"),
        }
    }
}

/// Runs stream requests through decoding, validation and the engine.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    validator: Arc<dyn ConfigValidator>,
    engines: Arc<dyn EngineFactory>,
}

impl Dispatcher {
    pub fn new(validator: Arc<dyn ConfigValidator>, engines: Arc<dyn EngineFactory>) -> Self {
        Self { validator, engines }
    }

    /// Handle one stream request, always producing a reply.
    pub async fn dispatch(&self, call: StreamCall<'_>) -> Reply {
        let start = Instant::now();
        let reply = match self.run(call).await {
            Ok(streams) => Reply::Streams(streams),
            Err(rejection) => {
                rejection.log();
                rejection.into_reply(call.root_url)
            }
        };
        metrics::record_stream_request(reply.outcome(), start);
        reply
    }

    async fn run(&self, call: StreamCall<'_>) -> Result<StreamsResponse, Rejection> {
        let segment = call.config_segment.ok_or(Rejection::MissingConfig)?;
        let config = codec::decode(segment)?;
        let matched = path::match_stream_path(call.path, segment)?;

        tracing::info!(
            kind = %matched.kind,
            id = %matched.id,
            season = ?matched.season,
            episode = ?matched.episode,
            "Received stream request"
        );

        let request = request::build(
            &matched.kind,
            &matched.id,
            matched.season.as_deref(),
            matched.episode.as_deref(),
        )?;

        let outcome = self.validator.validate(&config);
        if !outcome.valid {
            return Err(Rejection::InvalidConfig {
                code: outcome.error_code.unwrap_or_else(|| "unknown".to_string()),
                message: outcome.error_message.unwrap_or_else(|| "Unknown".to_string()),
            });
        }

        let config = ValidatedConfig::new(config);
        let engine = self.engines.engine(&config);
        let streams = engine.streams(&request).await?;
        Ok(StreamsResponse::new(streams))
    }
}
