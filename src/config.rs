//! Configuration management for shieldaudit.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::Path;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::enricher::DEFAULT_WORKERS;
use crate::model::Environment;
use crate::validation::is_valid_behavior_name;

/// Default environment variable holding the API token
pub const TOKEN_ENV: &str = "SHIELDAUDIT_API_TOKEN";

/// Default behavior used to enumerate addressable properties
pub const DEFAULT_UNIVERSE_BEHAVIOR: &str = "cpCode";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// API bearer token, wiped from memory on drop and never printed
#[derive(Clone, Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// `Authorization` header value, `None` when no token is set
    pub fn authorization(&self) -> Option<Zeroizing<String>> {
        if self.is_empty() {
            return None;
        }
        Some(Zeroizing::new(format!("Bearer {}", self.0.trim())))
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("ApiToken(unset)")
        } else {
            f.write_str("ApiToken(****)")
        }
    }
}

impl From<String> for ApiToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ApiToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API access
    pub api: ApiConfig,

    /// Audit behavior
    pub audit: AuditConfig,
}

impl Config {
    /// Load configuration from YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            debug!(
                "No config file at {:?}, using defaults",
                path.as_ref()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.api.base_url.is_empty() && !self.api.base_url.starts_with("https://") {
            anyhow::bail!("API base_url must use HTTPS: {}", self.api.base_url);
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than 0");
        }

        if self.audit.workers == 0 {
            anyhow::bail!("audit.workers must be at least 1");
        }

        if !is_valid_behavior_name(&self.audit.universe_behavior) {
            anyhow::bail!(
                "Invalid universe_behavior '{}'. Use a behavior name like 'cpCode'",
                self.audit.universe_behavior
            );
        }

        Ok(())
    }

    /// Check that the API can actually be reached with this configuration
    pub fn require_api(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("api.base_url is not set. Add it to the config file");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the API host (https only)
    pub base_url: String,
    /// Bearer token; `token_env` and SHIELDAUDIT_API_TOKEN take precedence
    pub token: ApiToken,
    /// Environment variable name to read token from (optional)
    pub token_env: Option<String>,
    /// Account switch key for multi-account credentials
    pub account_switch_key: Option<String>,
    /// Extra headers sent with every request
    #[serde(deserialize_with = "checked_headers")]
    pub headers: HashMap<String, String>,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: ApiToken::default(),
            token_env: None,
            account_switch_key: None,
            headers: HashMap::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Token in effect: the first non-empty of `token_env`, then
    /// SHIELDAUDIT_API_TOKEN, then `token`
    pub fn resolve_token(&self) -> ApiToken {
        self.token_env
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(TOKEN_ENV))
            .find_map(|name| env::var(name).ok().filter(|v| !v.trim().is_empty()))
            .map(ApiToken::from)
            .unwrap_or_else(|| self.token.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Concurrent hostname lookups per batch
    pub workers: usize,
    /// Behavior whose presence marks a property as addressable
    pub universe_behavior: String,
    /// Network audited when --staging is not given
    pub environment: Environment,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            universe_behavior: DEFAULT_UNIVERSE_BEHAVIOR.to_string(),
            environment: Environment::Production,
        }
    }
}

/// Extra headers must parse as HTTP headers and must not carry credentials
fn checked_headers<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
    use serde::de::Error;

    let headers: HashMap<String, String> = HashMap::deserialize(deserializer)?;

    for (name, value) in &headers {
        let parsed = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| D::Error::custom(format!("Invalid header name '{}'", name)))?;
        if parsed == AUTHORIZATION {
            return Err(D::Error::custom(
                "Authorization cannot be set in api.headers, use api.token",
            ));
        }
        HeaderValue::from_str(value)
            .map_err(|_| D::Error::custom(format!("Invalid header value for '{}'", name)))?;
    }

    Ok(headers)
}
