//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, routes)
//!     → request.rs (request ID, redacted span)
//!     → root_url.rs (scheme + host for follow-up links)
//!     → addon::Dispatcher (stream routes) | manifest | static files
//!     → Send to client
//! ```

pub mod request;
pub mod root_url;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use root_url::RootUrlResolver;
pub use server::{AppState, HttpServer};
