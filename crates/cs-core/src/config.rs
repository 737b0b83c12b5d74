//! Configuration types and parsing for cardsmith.yml

use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding `metabase.url`
pub const URL_ENV: &str = "CARDSMITH_URL";

/// Environment variable overriding the API key
pub const API_KEY_ENV: &str = "CARDSMITH_API_KEY";

const DEFAULT_API_KEY_ENV: &str = "METABASE_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RESPONSE_BYTES: usize = 100_000;

/// Main configuration from cardsmith.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Remote API connection settings
    pub metabase: MetabaseConfig,

    /// Response shaping limits
    #[serde(default)]
    pub response: ResponseConfig,

    /// Optional engine capabilities
    #[serde(default)]
    pub capabilities: Capabilities,
}

/// Remote API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetabaseConfig {
    /// Base URL of the BI platform, e.g. `https://metabase.example.com`
    pub url: String,

    /// API key given literally (prefer `api_key_env`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Response shaping limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseConfig {
    /// Ceiling on serialized response size, in bytes
    #[serde(default = "default_max_response_bytes")]
    pub max_size_bytes: usize,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

/// Optional engine capabilities.
///
/// Disabling a capability makes operations that need it fail with an
/// unavailable-capability error instead of silently skipping validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Capabilities {
    /// Card parameter processing
    #[serde(default = "default_true")]
    pub card_parameters: bool,

    /// MBQL structural validation
    #[serde(default = "default_true")]
    pub mbql: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            card_parameters: true,
            mbql: true,
        }
    }
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

impl Config {
    /// Configuration pointing at `url` with every other setting defaulted
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            metabase: MetabaseConfig {
                url: url.into(),
                api_key: None,
                api_key_env: default_api_key_env(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            response: ResponseConfig::default(),
            capabilities: Capabilities::default(),
        }
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a directory
    /// Looks for cardsmith.yml or cardsmith.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("cardsmith.yml");
        let yaml_path = dir.join("cardsmith.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Apply `CARDSMITH_URL` / `CARDSMITH_API_KEY` overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(URL_ENV) {
            if !url.is_empty() {
                self.metabase.url = url;
            }
        }
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.metabase.api_key = Some(key);
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        let url = self.metabase.url.trim();
        if url.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "metabase.url cannot be empty".to_string(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CoreError::ConfigInvalid {
                message: format!("metabase.url must be an http(s) URL, got '{}'", url),
            });
        }
        if self.metabase.timeout_secs == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "metabase.timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.response.max_size_bytes == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "response.max_size_bytes must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// The API key: literal value first, then the configured env var
    pub fn resolve_api_key(&self) -> Option<String> {
        self.metabase
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| {
                std::env::var(&self.metabase.api_key_env)
                    .ok()
                    .filter(|k| !k.is_empty())
            })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
