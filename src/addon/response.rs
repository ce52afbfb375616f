//! Response envelopes.
//!
//! Every JSON body this addon returns on the stream route is a `{ "streams": [...] }`
//! object. Configuration problems are reported as a single informational
//! stream pointing back at the configure page, so addon clients can render
//! them instead of showing a bare HTTP error.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Display name used for informational streams.
const ADDON_LABEL: &str = "[!] Stream Addon";

/// A `{ "streams": [...] }` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamsResponse {
    pub streams: Vec<Value>,
}

impl StreamsResponse {
    pub fn new(streams: Vec<Value>) -> Self {
        Self { streams }
    }
}

/// Body returned when the request carries no configuration at all.
pub fn missing_config(root_url: &str) -> StreamsResponse {
    notice(
        root_url,
        "No configuration was provided. Open the configure page to set this addon up.",
    )
}

/// Body returned when the configuration validator rejects the configuration.
pub fn invalid_config(root_url: &str, message: &str) -> StreamsResponse {
    notice(
        root_url,
        &format!("Invalid configuration: {message}. Open the configure page to fix it."),
    )
}

fn notice(root_url: &str, description: &str) -> StreamsResponse {
    StreamsResponse::new(vec![json!({
        "name": ADDON_LABEL,
        "description": description,
        "externalUrl": format!("{}/configure", root_url.trim_end_matches('/')),
    })])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_links_to_configure() {
        let body = serde_json::to_value(missing_config("http://localhost:3000")).unwrap();
        let stream = &body["streams"][0];
        assert_eq!(stream["externalUrl"], "http://localhost:3000/configure");
        assert_eq!(body["streams"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_config_carries_message() {
        let body = invalid_config("https://addon.example/", "no services enabled");
        let stream = &body.streams[0];
        assert_eq!(stream["externalUrl"], "https://addon.example/configure");
        assert!(stream["description"]
            .as_str()
            .unwrap()
            .contains("no services enabled"));
    }

    #[test]
    fn test_streams_shape() {
        let body = StreamsResponse::new(vec![json!({"id": "x"})]);
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"streams":[{"id":"x"}]}"#
        );
    }
}
