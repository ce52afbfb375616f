//! Default aggregation engine: fan out to upstream addons.
//!
//! # Responsibilities
//! - Query every enabled service concurrently for the requested content
//! - Concatenate their `streams` arrays in service order
//!
//! # Design Decisions
//! - One shared HTTP client (connection pool) in the factory, one engine per request
//! - A failing service is logged and skipped; only a total failure is an error
//! - No ranking, filtering or caching here

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::Value;

use crate::addon::request::StreamRequest;
use crate::config::EngineConfig;
use crate::engine::services::{enabled_services, Service};
use crate::engine::{EngineError, EngineFactory, StreamEngine, ValidatedConfig};

#[derive(Debug, Deserialize)]
struct UpstreamStreams {
    #[serde(default)]
    streams: Vec<Value>,
}

/// Builds `UpstreamEngine`s sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct UpstreamEngineFactory {
    client: reqwest::Client,
}

impl UpstreamEngineFactory {
    pub fn new(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }
}

impl EngineFactory for UpstreamEngineFactory {
    fn engine(&self, config: &ValidatedConfig) -> Box<dyn StreamEngine> {
        Box::new(UpstreamEngine {
            client: self.client.clone(),
            services: enabled_services(config),
        })
    }
}

/// Engine scoped to the services of one configuration.
pub struct UpstreamEngine {
    client: reqwest::Client,
    services: Vec<Service>,
}

impl UpstreamEngine {
    async fn fetch(&self, service: &Service, request: &StreamRequest) -> Result<Vec<Value>, String> {
        let url = stream_url(service, request);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| e.to_string())?;
        let body: UpstreamStreams = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.streams)
    }
}

fn stream_url(service: &Service, request: &StreamRequest) -> String {
    format!(
        "{}/stream/{}/{}.json",
        service.url.as_str().trim_end_matches('/'),
        request.kind(),
        request.content_id()
    )
}

#[async_trait]
impl StreamEngine for UpstreamEngine {
    async fn streams(&self, request: &StreamRequest) -> Result<Vec<Value>, EngineError> {
        if self.services.is_empty() {
            return Ok(Vec::new());
        }

        let results = join_all(
            self.services
                .iter()
                .map(|service| self.fetch(service, request)),
        )
        .await;

        let mut streams = Vec::new();
        let mut failures = 0;
        for (service, result) in self.services.iter().zip(results) {
            match result {
                Ok(found) => {
                    tracing::debug!(service = %service.id, count = found.len(), "Upstream answered");
                    streams.extend(found);
                }
                Err(error) => {
                    failures += 1;
                    tracing::warn!(service = %service.id, error = %error, "Upstream request failed");
                }
            }
        }

        if failures == self.services.len() {
            return Err(EngineError::AllUpstreamsFailed {
                attempted: failures,
            });
        }

        tracing::info!(
            content_id = %request.content_id(),
            services = self.services.len(),
            failures,
            streams = streams.len(),
            "Aggregated upstream streams"
        );
        Ok(streams)
    }
}
