//! Addon manifest.
//!
//! The descriptor host platforms fetch before anything else. The config-aware
//! variant (served under `/<config>/manifest.json`) tells the host that no
//! further configuration is required.

use serde::Serialize;

use crate::config::ManifestConfig;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: &'static str,
    pub name: String,
    pub description: String,
    pub resources: Vec<&'static str>,
    pub types: Vec<&'static str>,
    pub id_prefixes: Vec<&'static str>,
    pub catalogs: Vec<serde_json::Value>,
    pub behavior_hints: BehaviorHints,
}

/// Build the manifest; `configured` is true on the config-aware route.
pub fn manifest(identity: &ManifestConfig, configured: bool) -> Manifest {
    Manifest {
        id: identity.id.clone(),
        version: env!("CARGO_PKG_VERSION"),
        name: identity.name.clone(),
        description: identity.description.clone(),
        resources: vec!["stream"],
        types: vec!["movie", "series"],
        id_prefixes: vec!["tt"],
        catalogs: Vec::new(),
        behavior_hints: BehaviorHints {
            configurable: true,
            configuration_required: !configured,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_configuration_required_only_without_config() {
        let identity = ManifestConfig::default();
        assert!(manifest(&identity, false).behavior_hints.configuration_required);
        assert!(!manifest(&identity, true).behavior_hints.configuration_required);
    }

    #[test]
    fn test_serialized_keys() {
        let value = serde_json::to_value(manifest(&ManifestConfig::default(), true)).unwrap();
        assert_eq!(value["resources"], json!(["stream"]));
        assert_eq!(value["types"], json!(["movie", "series"]));
        assert_eq!(value["idPrefixes"], json!(["tt"]));
        assert_eq!(
            value["behaviorHints"],
            json!({"configurable": true, "configurationRequired": false})
        );
    }
}
