//! Configuration module for loading environment variables and settings.

use std::time::Duration;

use crate::error::ConfigError;

/// Default AWS region when neither `AWS_REGION` nor `AWS_DEFAULT_REGION` is set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default shared-config profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Default Bedrock model used for image generation.
pub const DEFAULT_MODEL_ID: &str = "amazon.nova-canvas-v1:0";

/// Default connection timeout for the Bedrock client.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default whole-request timeout for the Bedrock client.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Default number of attempts (initial call plus retries) made by the SDK.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default HTTP server port, used by `TransportArgs`.
pub const DEFAULT_PORT: u16 = 8080;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// AWS region hosting the Bedrock runtime endpoint
    pub region: String,
    /// Shared-config profile tried first during credential resolution
    pub profile: String,
    /// Bedrock model identifier
    pub model_id: String,
    /// Connection timeout for the Bedrock client
    pub connect_timeout: Duration,
    /// Total request timeout for a single Bedrock operation
    pub request_timeout: Duration,
    /// Maximum attempts for the SDK's standard retry strategy
    pub max_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: DEFAULT_PROFILE.to_string(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if a numeric variable is set but
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let region = get("AWS_REGION")
            .or_else(|| get("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let profile = get("AWS_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let model_id = get("BEDROCK_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        let connect_timeout = parse_positive::<u64>("BEDROCK_CONNECT_TIMEOUT_SECS", get("BEDROCK_CONNECT_TIMEOUT_SECS"))?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT);

        let request_timeout = parse_positive::<u64>("BEDROCK_REQUEST_TIMEOUT_SECS", get("BEDROCK_REQUEST_TIMEOUT_SECS"))?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let max_attempts = parse_positive::<u32>("BEDROCK_MAX_ATTEMPTS", get("BEDROCK_MAX_ATTEMPTS"))?
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        Ok(Self {
            region,
            profile,
            model_id,
            connect_timeout,
            request_timeout,
            max_attempts,
        })
    }

    /// Override the region, e.g. from a command-line flag.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Override the credential profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// Bedrock runtime endpoint for the configured region.
    pub fn bedrock_runtime_endpoint(&self) -> String {
        format!("https://bedrock-runtime.{}.amazonaws.com", self.region)
    }
}

fn parse_positive<T>(name: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value: T = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid_value(name, format!("'{}' is not a valid number", raw)))?;
    if value == T::default() {
        return Err(ConfigError::invalid_value(name, "must be greater than zero"));
    }
    Ok(Some(value))
}
