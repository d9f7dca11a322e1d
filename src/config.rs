//! Configuration file for mappcheck.
//!
//! A config file tunes technology detection, path exclusion and the
//! optional advisory exchange. Every field has a default, so an empty file
//! (or no file at all) is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::rules::{Technology, DEFAULT_TECHNOLOGY};

/// Default config file names to search for.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["mappcheck.yaml", ".mappcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Technology assumed for files whose extension is not recognized
    #[serde(default = "default_technology")]
    pub default_technology: Technology,
    /// Glob patterns for paths to exclude from analysis (e.g. "**/generated/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

fn default_technology() -> Technology {
    DEFAULT_TECHNOLOGY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_technology: DEFAULT_TECHNOLOGY,
            excluded_paths: Vec::new(),
            advisory: AdvisoryConfig::default(),
        }
    }
}

impl Config {
    /// Parse a config from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load the given file, or the first default-named file in `dir`, or
    /// fall back to defaults when neither exists.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> anyhow::Result<Self> {
        let config = match explicit {
            Some(path) => Self::parse_file(path)
                .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
            None => match discover(dir) {
                Some(path) => Self::parse_file(&path).map_err(|e| {
                    anyhow::anyhow!("failed to load config {}: {}", path.display(), e)
                })?,
                None => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the config for correctness.
    pub fn validate(&self) -> anyhow::Result<()> {
        for pattern in &self.excluded_paths {
            globset::Glob::new(pattern).map_err(|e| {
                anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e)
            })?;
        }

        if self.advisory.enabled {
            if self.advisory.endpoint.trim().is_empty() {
                anyhow::bail!("advisory.endpoint must not be empty");
            }
            if self.advisory.api_key_env.trim().is_empty() {
                anyhow::bail!("advisory.api_key_env must not be empty");
            }
        }

        Ok(())
    }
}

/// Find a default-named config file in `dir`.
pub fn discover(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Settings for the advisory collaborator.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdvisoryConfig {
    /// Whether to run the advisory exchange (default: false)
    #[serde(default)]
    pub enabled: bool,
    /// OpenAI-compatible chat-completions URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the bearer key (default: OPENAI_API_KEY)
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Request timeout in milliseconds (default: 60000)
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout() -> u64 {
    60_000
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_ms: default_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
default_technology: react-native
excluded_paths:
  - "**/generated/**"
advisory:
  enabled: true
  model: "local-model"
  timeout_ms: 1000
"#;
        let config = Config::parse_str(yaml).unwrap();
        assert_eq!(config.default_technology, Technology::ReactNative);
        assert_eq!(config.excluded_paths, vec!["**/generated/**".to_string()]);
        assert!(config.advisory.enabled);
        assert_eq!(config.advisory.model, "local-model");
        assert_eq!(config.advisory.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.advisory.timeout_ms, 1000);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse_str("").unwrap();
        assert_eq!(config.default_technology, Technology::Flutter);
        assert!(!config.advisory.enabled);
        assert!(config.excluded_paths.is_empty());
    }

    #[test]
    fn test_unknown_technology_is_rejected() {
        assert!(Config::parse_str("default_technology: cobol\n").is_err());
    }

    #[test]
    fn test_invalid_glob_fails_validation() {
        let config = Config {
            excluded_paths: vec!["a/[b".to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_discover_and_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path()).is_none());
        let loaded = Config::load(None, dir.path()).unwrap();
        assert_eq!(loaded.default_technology, Technology::Flutter);

        fs::write(
            dir.path().join(".mappcheck.yaml"),
            "default_technology: ios-swift\n",
        )
        .unwrap();
        assert!(discover(dir.path()).is_some());
        let loaded = Config::load(None, dir.path()).unwrap();
        assert_eq!(loaded.default_technology, Technology::IosSwift);
    }

    #[test]
    fn test_bundled_template_parses() {
        let config = Config::parse_str(include_str!("templates/mappcheck.yaml")).unwrap();
        config.validate().unwrap();
    }
}
