//! AWS client configuration and credential resolution.
//!
//! Credentials are resolved in the following order:
//! 1. The shared-config profile named by `AWS_PROFILE` (default `default`)
//! 2. The SDK default provider chain (environment, web identity, ECS, IMDS, ...)
//!
//! Resolution is configured once at startup; the resulting `SdkConfig` is
//! shared by every request.

use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::meta::credentials::CredentialsProviderChain;
use aws_config::profile::ProfileFileCredentialsProvider;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::AuthError;

/// Environment variables whose presence (never value) is reported at startup.
pub const CREDENTIAL_ENV_VARS: &[&str] = &[
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "AWS_SESSION_TOKEN",
];

/// Build the shared AWS SDK configuration.
///
/// Sets the region, the profile-then-default-chain credentials provider, the
/// standard retry strategy with `max_attempts`, and the connect and
/// whole-operation timeouts.
#[instrument(level = "debug", name = "load_sdk_config", skip_all, fields(region = %config.region, profile = %config.profile))]
pub async fn load_sdk_config(config: &Config) -> SdkConfig {
    let region = Region::new(config.region.clone());

    let profile = ProfileFileCredentialsProvider::builder()
        .profile_name(&config.profile)
        .build();
    let fallback = DefaultCredentialsChain::builder()
        .region(region.clone())
        .build()
        .await;
    let credentials = CredentialsProviderChain::first_try("Profile", profile).or_else("DefaultChain", fallback);

    let timeouts = TimeoutConfig::builder()
        .connect_timeout(config.connect_timeout)
        .operation_timeout(config.request_timeout)
        .build();

    debug!(
        max_attempts = config.max_attempts,
        connect_timeout_secs = config.connect_timeout.as_secs(),
        request_timeout_secs = config.request_timeout.as_secs(),
        "Building AWS SDK config"
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .credentials_provider(credentials)
        .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts))
        .timeout_config(timeouts)
        .load()
        .await
}

/// Resolve credentials once so configuration problems show up at startup.
///
/// # Errors
///
/// Returns `AuthError::NotConfigured` if the SDK config has no provider, or
/// `AuthError::ResolutionFailed` if every provider in the chain failed.
#[instrument(level = "debug", name = "probe_credentials", skip_all)]
pub async fn probe_credentials(sdk_config: &SdkConfig) -> Result<(), AuthError> {
    let provider = sdk_config
        .credentials_provider()
        .ok_or(AuthError::NotConfigured)?;

    let credentials = provider
        .provide_credentials()
        .await
        .map_err(|e| AuthError::resolution_failed(e.to_string()))?;

    debug!(
        has_session_token = credentials.session_token().is_some(),
        "Credentials resolved"
    );
    Ok(())
}

/// Log which credential sources are visible in the environment.
pub fn log_credential_environment(config: &Config) {
    log_credential_environment_with(config, |key| std::env::var_os(key).is_some());
}

fn log_credential_environment_with<F>(config: &Config, is_set: F) -> Vec<(&'static str, bool)>
where
    F: Fn(&str) -> bool,
{
    let presence: Vec<(&'static str, bool)> = CREDENTIAL_ENV_VARS
        .iter()
        .map(|name| (*name, is_set(name)))
        .collect();

    info!(
        region = %config.region,
        profile = %config.profile,
        has_access_key_id = presence[0].1,
        has_secret_key = presence[1].1,
        has_session_token = presence[2].1,
        "AWS configuration"
    );
    presence
}
