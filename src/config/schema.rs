//! Configuration schema definitions.
//!
//! Process-wide settings only; the per-request user configuration travels in
//! the URL and is never part of this schema. All types derive Serde traits
//! for deserialization from TOML files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the addon server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AddonConfig {
    /// Listener configuration (bind host, port).
    pub listener: ListenerConfig,

    /// Static frontend served next to the API.
    pub static_files: StaticFilesConfig,

    /// Default aggregation engine settings.
    pub engine: EngineConfig,

    /// Manifest identity.
    pub manifest: ManifestConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind.
    pub host: String,

    /// TCP port. Also appended to root URLs served on `localhost`.
    pub port: u16,

    /// Honour `X-Forwarded-Proto` and `X-Forwarded-Host` when building root URLs.
    pub trust_proxy: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            trust_proxy: false,
        }
    }
}

impl ListenerConfig {
    /// `host:port` string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Static frontend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory holding the built frontend.
    pub root: PathBuf,

    /// Configuration UI page, relative to `root`.
    pub configure_page: String,

    /// Page served with every 404, relative to `root`.
    pub not_found_page: String,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("frontend/out"),
            configure_page: "configure.html".to_string(),
            not_found_page: "404.html".to_string(),
        }
    }
}

impl StaticFilesConfig {
    pub fn configure_path(&self) -> PathBuf {
        self.root.join(&self.configure_page)
    }

    pub fn not_found_path(&self) -> PathBuf {
        self.root.join(&self.not_found_page)
    }
}

/// Upstream aggregation settings.
///
/// The server itself puts no deadline on a stream request; the engine's
/// per-upstream timeout is the only one applied.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Per-upstream request timeout in seconds.
    pub upstream_timeout_secs: u64,

    /// User agent sent to upstream addons.
    pub user_agent: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            upstream_timeout_secs: 10,
            user_agent: concat!("stream-addon/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Manifest identity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManifestConfig {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            id: "org.streamaddon.aggregator".to_string(),
            name: "Stream Addon".to_string(),
            description: "Aggregates streams from multiple addons into one list.".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
