//! Stream request protocol.
//!
//! # Data Flow
//! ```text
//! GET /<config>/stream/<kind>/<id>.json
//!     → codec.rs    (base64 → UTF-8 → JSON, opaque UserConfig)
//!     → path.rs     (percent-decode, grammar match, redaction)
//!     → request.rs  (typed StreamRequest, per-kind checks)
//!     → [engine::ConfigValidator]
//!     → [engine::EngineFactory → StreamEngine]
//!     → response.rs (streams / missing config / invalid config envelopes)
//! ```
//!
//! `dispatch.rs` drives the sequence and turns every outcome into a `Reply`.

pub mod codec;
pub mod dispatch;
pub mod path;
pub mod request;
pub mod response;

pub use codec::UserConfig;
pub use dispatch::{Dispatcher, Reply, StreamCall};
pub use request::StreamRequest;
pub use response::StreamsResponse;
