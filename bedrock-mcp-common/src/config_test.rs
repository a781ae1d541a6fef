//! Tests for configuration loading.
//!
//! Configuration is exercised through `Config::from_lookup` so no test has to
//! mutate the process environment.

use std::collections::HashMap;
use std::time::Duration;

use proptest::prelude::*;

use crate::config::{
    Config, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_ATTEMPTS, DEFAULT_MODEL_ID,
    DEFAULT_PROFILE, DEFAULT_REGION, DEFAULT_REQUEST_TIMEOUT,
};
use crate::error::ConfigError;

fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| map.get(key).cloned())
}

/// Strategy for generating AWS regions
fn region_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("us-east-1".to_string()),
        Just("us-west-2".to_string()),
        Just("eu-west-1".to_string()),
        Just("ap-northeast-1".to_string()),
    ]
}

/// Strategy for generating profile names
fn profile_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,20}"
}

#[cfg(test)]
mod config_logic_tests {
    use super::*;

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.profile, DEFAULT_PROFILE);
        assert_eq!(config.model_id, DEFAULT_MODEL_ID);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn aws_region_wins_over_default_region() {
        let config = load(&[("AWS_REGION", "eu-west-1"), ("AWS_DEFAULT_REGION", "us-west-2")]).unwrap();
        assert_eq!(config.region, "eu-west-1");
    }

    #[test]
    fn default_region_used_when_aws_region_missing() {
        let config = load(&[("AWS_DEFAULT_REGION", "us-west-2")]).unwrap();
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = load(&[("AWS_REGION", ""), ("AWS_PROFILE", "  ")]).unwrap();
        assert_eq!(config.region, DEFAULT_REGION);
        assert_eq!(config.profile, DEFAULT_PROFILE);
    }

    #[test]
    fn timeouts_and_attempts_are_parsed() {
        let config = load(&[
            ("BEDROCK_CONNECT_TIMEOUT_SECS", "5"),
            ("BEDROCK_REQUEST_TIMEOUT_SECS", "60"),
            ("BEDROCK_MAX_ATTEMPTS", "7"),
        ])
        .unwrap();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.max_attempts, 7);
    }

    #[test]
    fn unparsable_timeout_is_rejected() {
        let err = load(&[("BEDROCK_REQUEST_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref name, _) if name == "BEDROCK_REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn zero_attempts_is_rejected() {
        let err = load(&[("BEDROCK_MAX_ATTEMPTS", "0")]).unwrap_err();
        assert!(err.to_string().contains("BEDROCK_MAX_ATTEMPTS"));
    }

    #[test]
    fn port_is_left_to_transport_args() {
        // PORT is parsed once, by the transport flags.
        let config = load(&[("PORT", "70000")]).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn overrides_replace_env_values() {
        let config = load(&[("AWS_REGION", "us-east-1")])
            .unwrap()
            .with_region("us-west-2")
            .with_profile("imaging");
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.profile, "imaging");
    }

    #[test]
    fn bedrock_runtime_endpoint_uses_region() {
        let config = Config::default().with_region("eu-central-1");
        assert_eq!(
            config.bedrock_runtime_endpoint(),
            "https://bedrock-runtime.eu-central-1.amazonaws.com"
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        /// Any region set through AWS_REGION is preserved exactly.
        #[test]
        fn config_preserves_region(region in region_strategy()) {
            let config = load(&[("AWS_REGION", region.as_str())]).unwrap();
            prop_assert_eq!(config.region, region);
        }

        /// Any non-empty profile name is preserved exactly.
        #[test]
        fn config_preserves_profile(profile in profile_strategy()) {
            let config = load(&[("AWS_PROFILE", profile.as_str())]).unwrap();
            prop_assert_eq!(config.profile, profile);
        }

        /// Any positive attempt count round-trips through the environment.
        #[test]
        fn config_preserves_max_attempts(attempts in 1u32..100) {
            let raw = attempts.to_string();
            let config = load(&[("BEDROCK_MAX_ATTEMPTS", raw.as_str())]).unwrap();
            prop_assert_eq!(config.max_attempts, attempts);
        }
    }
}
