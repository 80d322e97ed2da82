//! Tests for configuration types.

use super::*;

mod interceptor_config_tests {
    use super::*;

    /// Verify defaults honour the server exactly.
    #[test]
    fn test_default() {
        let config = InterceptorConfig::default();

        assert!(!config.accept_delta_seconds);
        assert_eq!(config.max_pause_seconds, None);
        assert_eq!(config.max_pause(), None);
        assert!(config.validate().is_ok());
    }

    /// Verify the builder methods set each field.
    #[test]
    fn test_builder_methods() {
        let config = InterceptorConfig::default()
            .with_accept_delta_seconds(true)
            .with_max_pause(Duration::from_secs(90));

        assert!(config.accept_delta_seconds);
        assert_eq!(config.max_pause(), Some(Duration::from_secs(90)));

        let config = config.without_max_pause();
        assert_eq!(config.max_pause(), None);
    }

    /// Verify sub-second caps round up rather than down to zero.
    #[test]
    fn test_max_pause_rounds_up() {
        let config = InterceptorConfig::default().with_max_pause(Duration::from_millis(1500));
        assert_eq!(config.max_pause_seconds, Some(2));

        let config = InterceptorConfig::default().with_max_pause(Duration::from_millis(10));
        assert_eq!(config.max_pause_seconds, Some(1));
        assert!(config.validate().is_ok());
    }

    /// Verify the largest duration saturates instead of wrapping to zero.
    #[test]
    fn test_max_pause_saturates() {
        let config = InterceptorConfig::default().with_max_pause(Duration::MAX);

        assert_eq!(config.max_pause_seconds, Some(u64::MAX));
        assert!(config.validate().is_ok());
    }

    /// Verify a zero cap is rejected.
    #[test]
    fn test_validate_rejects_zero_cap() {
        let config = InterceptorConfig {
            max_pause_seconds: Some(0),
            ..Default::default()
        };

        let error = config.validate().expect_err("zero cap is invalid");
        assert!(matches!(
            error,
            ConfigError::InvalidValue { ref field, .. } if field == "max_pause_seconds"
        ));
    }

    /// Verify missing fields fall back to defaults when deserializing.
    #[test]
    fn test_deserialize_partial_yaml() {
        let config: InterceptorConfig =
            serde_yaml::from_str("accept_delta_seconds: true\n").expect("valid yaml");

        assert!(config.accept_delta_seconds);
        assert_eq!(config.max_pause_seconds, None);
    }

    /// Verify JSON serialization preserves all fields.
    #[test]
    fn test_json_serialization() {
        let config = InterceptorConfig::default().with_max_pause(Duration::from_secs(30));
        let json = serde_json::to_string(&config).expect("serialize");
        let restored: InterceptorConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(config, restored);
    }
}

mod logging_config_tests {
    use super::*;

    /// Verify logging defaults.
    #[test]
    fn test_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json_format);
    }

    /// Verify an empty document yields the defaults.
    #[test]
    fn test_deserialize_empty_object() {
        let config: LoggingConfig = serde_json::from_str("{}").expect("valid json");
        assert_eq!(config, LoggingConfig::default());
    }
}
