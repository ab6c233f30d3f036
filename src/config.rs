//! Mapping layer configuration

use indexmap::IndexMap;
use oxiri::Iri;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// OGM configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OgmConfig {
    /// Namespace root of generated URIs and of relative graph names
    pub base_uri: String,
    /// Language used when a caller gives none
    pub default_language: String,
    /// Retry ceiling of URI generation strategies that do not declare their own
    pub uri_generation_max_retries: u32,
    /// Extra namespace prefixes (prefix -> namespace IRI)
    pub prefixes: IndexMap<String, String>,
}

impl Default for OgmConfig {
    fn default() -> Self {
        Self {
            base_uri: "http://default.samyama.org/".to_string(),
            default_language: "en".to_string(),
            uri_generation_max_retries: 1000,
            prefixes: IndexMap::new(),
        }
    }
}

impl OgmConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let config: OgmConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        Iri::parse(self.base_uri.as_str())
            .map_err(|e| ConfigError::Invalid(format!("base_uri '{}': {}", self.base_uri, e)))?;

        if !self.base_uri.ends_with('/') && !self.base_uri.ends_with('#') {
            return Err(ConfigError::Invalid(format!(
                "base_uri '{}' must end with '/' or '#'",
                self.base_uri
            )));
        }

        if self.default_language.trim().is_empty() {
            return Err(ConfigError::Invalid("default_language is empty".to_string()));
        }

        for (prefix, namespace) in &self.prefixes {
            Iri::parse(namespace.as_str()).map_err(|e| {
                ConfigError::Invalid(format!("prefix '{}' -> '{}': {}", prefix, namespace, e))
            })?;
        }

        Ok(())
    }

    /// Resolve a graph or resource reference against the base URI.
    ///
    /// Absolute IRIs are returned unchanged, anything else is appended to the base URI.
    pub fn resolve(&self, reference: &str) -> String {
        match Iri::parse(reference) {
            Ok(_) => reference.to_string(),
            Err(_) => format!("{}{}", self.base_uri, reference.trim_start_matches('/')),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = OgmConfig::default();
        assert_eq!(config.base_uri, "http://default.samyama.org/");
        assert_eq!(config.default_language, "en");
        assert_eq!(config.uri_generation_max_retries, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = OgmConfig::from_yaml_str(
            "base_uri: http://data.example.org/test/\nprefixes:\n  ex: http://example.org/vocab#\n",
        )
        .unwrap();
        assert_eq!(config.base_uri, "http://data.example.org/test/");
        assert_eq!(config.default_language, "en");
        assert_eq!(
            config.prefixes.get("ex").map(String::as_str),
            Some("http://example.org/vocab#")
        );
    }

    #[test]
    fn test_invalid_config() {
        assert!(OgmConfig::from_yaml_str("base_uri: not an iri").is_err());
        assert!(OgmConfig::from_yaml_str("base_uri: http://example.org/x").is_err());
        assert!(OgmConfig::from_yaml_str("default_language: ''").is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_language: fr").unwrap();

        let config = OgmConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.default_language, "fr");
    }

    #[test]
    fn test_resolve_reference() {
        let config = OgmConfig::default();
        assert_eq!(config.resolve("set/units"), "http://default.samyama.org/set/units");
        assert_eq!(config.resolve("http://example.org/g"), "http://example.org/g");
    }
}
