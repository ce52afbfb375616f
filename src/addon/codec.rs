//! Configuration segment codec.
//!
//! # Responsibilities
//! - Encode a user configuration as a URL-safe path segment
//! - Decode a path segment back into an opaque JSON configuration
//!
//! # Design Decisions
//! - Decoding accepts both base64 alphabets, padded or not, because clients
//!   built against the standard alphabet still exist
//! - Encoding always emits URL-safe base64 without padding (no `/` in segments)
//! - No semantic checks here: `{}` or `[]` decode fine and are rejected later

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde_json::Value;
use thiserror::Error;

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Opaque caller-supplied configuration.
///
/// Nothing in the request path looks inside it until the configuration
/// validator has accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct UserConfig(Value);

impl UserConfig {
    /// Borrow the raw JSON value.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Take the raw JSON value.
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for UserConfig {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Failure to turn a path segment back into a configuration.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("segment is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("decoded bytes are not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("decoded text is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a configuration into a path segment.
pub fn encode(config: &UserConfig) -> String {
    // Serializing a `Value` cannot fail.
    let json = config.0.to_string();
    URL_SAFE_NO_PAD.encode(json.as_bytes())
}

/// Decode a path segment into a configuration.
pub fn decode(segment: &str) -> Result<UserConfig, DecodeError> {
    let bytes = match URL_SAFE_LENIENT.decode(segment) {
        Ok(bytes) => bytes,
        Err(_) => STANDARD_LENIENT.decode(segment)?,
    };
    let text = String::from_utf8(bytes)?;
    let value: Value = serde_json::from_str(&text)?;
    Ok(UserConfig(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use serde_json::json;

    #[test]
    fn test_round_trip() {
        let configs = [
            json!({}),
            json!({"services": [{"id": "a", "enabled": true, "url": "https://x.example"}]}),
            json!({"nested": {"unicode": "héllo ✓", "n": 1.5, "list": [null, false]}}),
            json!("just a string"),
        ];
        for value in configs {
            let config = UserConfig::from(value);
            let segment = encode(&config);
            assert!(!segment.contains('/'));
            assert!(!segment.contains('='));
            assert_eq!(decode(&segment).unwrap(), config);
        }
    }

    #[test]
    fn test_accepts_standard_alphabet() {
        // standard encoding of this payload contains '+'
        let json = r#"{"k":"??>>"}"#;
        let segment = STANDARD.encode(json);
        assert!(segment.contains('+'));
        let config = decode(&segment).unwrap();
        assert_eq!(config.as_value(), &json!({"k": "??>>"}));
    }

    #[test]
    fn test_rejects_non_base64() {
        assert!(matches!(decode("notbase64!!"), Err(DecodeError::Base64(_))));
    }

    #[test]
    fn test_rejects_invalid_utf8() {
        let segment = URL_SAFE_NO_PAD.encode([0xff, 0xfe, 0xfd]);
        assert!(matches!(decode(&segment), Err(DecodeError::Utf8(_))));
    }

    #[test]
    fn test_rejects_invalid_json() {
        let segment = URL_SAFE_NO_PAD.encode("{not json");
        assert!(matches!(decode(&segment), Err(DecodeError::Json(_))));
    }

    #[test]
    fn test_empty_object_is_not_rejected() {
        let segment = URL_SAFE_NO_PAD.encode("{}");
        assert_eq!(decode(&segment).unwrap().as_value(), &json!({}));
    }
}
