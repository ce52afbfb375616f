//! Stream aggregation addon: HTTP request boundary.
//!
//! Decodes the configuration carried in the URL, parses the stream path into a
//! typed request, validates both and hands the request to an aggregation
//! engine, shaping every outcome into a well-defined response.

// Core protocol
pub mod addon;
pub mod engine;
pub mod manifest;

// Serving
pub mod config;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use addon::{Dispatcher, Reply, StreamCall, StreamRequest, UserConfig};
pub use config::AddonConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
