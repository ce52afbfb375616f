//! Upstream service list carried inside the user configuration.
//!
//! The only part of the configuration the default validator and engine read:
//!
//! ```json
//! { "services": [ { "id": "main", "enabled": true, "url": "https://addon.example" } ] }
//! ```
//!
//! Any other keys are ignored.

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::addon::codec::UserConfig;
use crate::engine::{ConfigValidator, ValidatedConfig, ValidationOutcome};

pub const INVALID_FORMAT: &str = "invalidFormat";
pub const NO_SERVICES: &str = "noServices";
pub const INVALID_SERVICE_URL: &str = "invalidServiceUrl";

#[derive(Debug, Clone, Deserialize)]
struct ServiceEntry {
    id: String,
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServicesSection {
    #[serde(default)]
    services: Vec<ServiceEntry>,
}

/// An enabled upstream addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub id: String,
    pub url: Url,
}

fn parse_section(value: &Value) -> Result<ServicesSection, String> {
    if !value.is_object() {
        return Err("configuration must be a JSON object".to_string());
    }
    ServicesSection::deserialize(value).map_err(|e| format!("malformed services list: {e}"))
}

fn parse_service_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Enabled services of a configuration that already passed validation.
pub fn enabled_services(config: &ValidatedConfig) -> Vec<Service> {
    let Ok(section) = parse_section(config.as_value()) else {
        return Vec::new();
    };
    section
        .services
        .into_iter()
        .filter(|s| s.enabled)
        .filter_map(|s| {
            let url = parse_service_url(s.url.as_deref()?)?;
            Some(Service { id: s.id, url })
        })
        .collect()
}

/// Default configuration validator: at least one enabled service, each with
/// an absolute http(s) URL.
#[derive(Debug, Default, Clone)]
pub struct ServiceValidator;

impl ConfigValidator for ServiceValidator {
    fn validate(&self, config: &UserConfig) -> ValidationOutcome {
        let section = match parse_section(config.as_value()) {
            Ok(section) => section,
            Err(message) => return ValidationOutcome::invalid(INVALID_FORMAT, message),
        };

        let enabled: Vec<&ServiceEntry> = section.services.iter().filter(|s| s.enabled).collect();
        if enabled.is_empty() {
            return ValidationOutcome::invalid(NO_SERVICES, "no services enabled");
        }

        for service in enabled {
            let valid_url = service
                .url
                .as_deref()
                .and_then(parse_service_url)
                .is_some();
            if !valid_url {
                return ValidationOutcome::invalid(
                    INVALID_SERVICE_URL,
                    format!("service {} needs an http(s) url", service.id),
                );
            }
        }

        ValidationOutcome::valid()
    }
}
