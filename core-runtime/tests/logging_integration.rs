//! Integration tests for logging system

use core_runtime::config::GatewaySettings;
use core_runtime::logging::{init_logging, redact_if_sensitive, LogFormat, LogLevel, LoggingConfig};
use tracing::info;

#[test]
fn test_logging_initializes_once() {
    // Only one global subscriber can be installed per process, so both the
    // first and the second attempt live in this single test.
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Debug)
        .with_spans(false);

    init_logging(config.clone()).expect("first initialization succeeds");
    info!(unit_id = "u-1", "logging ready");

    let second = init_logging(config);
    assert!(second.is_err());
    assert!(second
        .unwrap_err()
        .to_string()
        .contains("Failed to initialize logging"));
}

#[test]
fn test_cookie_never_logged_verbatim() {
    let cookie = "_on-premise=eyJhbGciOi";
    assert_eq!(redact_if_sensitive("cookie", cookie), "[REDACTED]");
    assert_eq!(redact_if_sensitive("session_cookie", cookie), "[REDACTED]");
    assert_eq!(redact_if_sensitive("user_id", "42"), "42");
}

#[test]
fn test_settings_drive_logging_config() {
    let settings = GatewaySettings::from_json_str(
        r#"{ "logLevel": "warn", "logFormat": "compact", "logFilter": "core_exchange=trace" }"#,
    )
    .unwrap();

    let config = settings.logging_config();

    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(config.format, LogFormat::Compact);
    assert_eq!(config.filter.as_deref(), Some("core_exchange=trace"));
}

#[test]
fn test_empty_settings_keep_logging_defaults() {
    let config = GatewaySettings::default().logging_config();

    assert_eq!(config.level, LogLevel::Info);
    assert!(config.filter.is_none());
    assert!(config.enable_spans);
}
