use crate::errors::StoreError;
use serde::Deserialize;
use std::fs;

/// Model for the server connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// default host to use
fn default_host() -> String {
    String::from("http://localhost:8080")
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            host: default_host(),
            access_token: None,
        }
    }
}

impl StoreConfig {
    /// Reads a connection configuration from a JSON file
    ///
    /// # Arguments
    ///
    /// * `path` - String slice that holds the path to the JSON config file
    pub fn from_file(path: &str) -> Result<Self, StoreError> {
        let data = fs::read_to_string(path).map_err(|err| StoreError::Config {
            path: path.to_string(),
            message: err.to_string(),
        })?;
        Self::from_json(path, data.as_str())
    }

    fn from_json(path: &str, data: &str) -> Result<Self, StoreError> {
        serde_json::from_str(data).map_err(|err| StoreError::Config {
            path: path.to_string(),
            message: format!("Invalid JSON format: {}", err),
        })
    }

    /// Host without trailing slash, so request paths can be appended as-is.
    pub fn base_url(&self) -> &str {
        self.host.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_config_file() {
        let config = StoreConfig::from_file("test/test_config.json").unwrap();
        assert_eq!(config.base_url(), "https://bytebase.example.com");
        assert_eq!(config.access_token.as_deref(), Some("secret-token"));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = StoreConfig::from_json("inline", "{}").unwrap();
        assert_eq!(config.host, "http://localhost:8080");
        assert!(config.access_token.is_none());
    }

    #[test]
    fn missing_file_is_a_config_error() {
        match StoreConfig::from_file("test/does_not_exist.json") {
            Err(StoreError::Config { path, .. }) => assert_eq!(path, "test/does_not_exist.json"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = StoreConfig::from_json("inline", "{host:").unwrap_err();
        assert!(err.to_string().contains("Invalid JSON format"));
    }
}
