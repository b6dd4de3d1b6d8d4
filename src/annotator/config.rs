//! Annotator client configuration.

use std::env;

use serde::{Deserialize, Serialize};

/// BioPortal annotator endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://data.bioontology.org/annotator";

/// Configuration for the annotator client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatorConfig {
    /// Annotator endpoint (default: http://data.bioontology.org/annotator)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds. Requests never time out when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Print raw response bodies before decoding.
    #[serde(default)]
    pub debug: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: None,
            user_agent: None,
            debug: false,
        }
    }
}

impl AnnotatorConfig {
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Check if this is the default config.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Apply environment variable overrides.
    pub fn with_env_overrides(mut self) -> Self {
        // ANNOTARFF_ENDPOINT - alternate annotator deployment
        if let Ok(endpoint) = env::var("ANNOTARFF_ENDPOINT") {
            if !endpoint.is_empty() {
                self.endpoint = endpoint;
            }
        }

        // ANNOTARFF_USER_AGENT - custom user agent
        if let Ok(user_agent) = env::var("ANNOTARFF_USER_AGENT") {
            if !user_agent.is_empty() {
                self.user_agent = Some(user_agent);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let config = AnnotatorConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(!config.debug);
        assert!(config.timeout_secs.is_none());
        assert!(config.is_default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnnotatorConfig = serde_json::from_str(r#"{"timeout_secs": 30}"#).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_secs, Some(30));
        assert!(!config.is_default());
    }

    #[test]
    fn test_builders() {
        let config = AnnotatorConfig::default()
            .with_endpoint("http://localhost:8080/annotator")
            .with_debug(true);
        assert_eq!(config.endpoint, "http://localhost:8080/annotator");
        assert!(config.debug);
    }
}
