// SPDX-FileCopyrightText: 2026 Huddle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Huddle configuration system.

use huddle_config::model::HuddleConfig;
use huddle_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_huddle_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
log_level = "debug"

[storage]
database_path = "/tmp/huddle-test.db"
wal_mode = false
transcript_flush_secs = 2
transcript_buffer_max = 16

[bus]
enabled = true
channel_capacity = 64

[relay]
dedup_ttl_secs = 3
dedup_capacity = 256
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/huddle-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.storage.transcript_flush_secs, 2);
    assert_eq!(config.storage.transcript_buffer_max, 16);
    assert!(config.bus.enabled);
    assert_eq!(config.bus.channel_capacity, 64);
    assert_eq!(config.relay.dedup_ttl_secs, 3);
    assert_eq!(config.relay.dedup_capacity, 256);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 4100);
    assert_eq!(config.server.log_level, "info");
    assert!(config.storage.wal_mode);
    assert!(!config.bus.enabled);
    assert_eq!(config.bus.channel_capacity, 1024);
    assert_eq!(config.relay.dedup_ttl_secs, 5);
    assert_eq!(config.relay.dedup_capacity, 4096);
}

/// Unknown field in a section is rejected by deny_unknown_fields.
#[test]
fn unknown_field_in_server_produces_error() {
    let toml = r#"
[server]
hots = "0.0.0.0"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("hots"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err =
        load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown section, got: {err_str}"
    );
}

/// Env var style dotted overrides replace TOML values.
#[test]
fn dotted_override_replaces_toml_value() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[server]
port = 4100
"#;

    // Simulate HUDDLE_SERVER_PORT by merging the mapped dotted key directly.
    let config: HuddleConfig = Figment::new()
        .merge(Serialized::defaults(HuddleConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("server.port", 5000))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.server.port, 5000);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: HuddleConfig = Figment::new()
        .merge(Serialized::defaults(HuddleConfig::default()))
        .merge(Toml::file("/nonexistent/path/huddle.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.server.host, "127.0.0.1");
}

/// Validation failures surface as diagnostics from the high-level entry point.
#[test]
fn load_and_validate_str_reports_validation_errors() {
    let toml = r#"
[server]
port = 0
log_level = "loud"
"#;

    let errors = load_and_validate_str(toml).expect_err("invalid values should fail validation");
    assert!(errors.len() >= 2);
}

/// A disabled bus is a valid configuration, not an error.
#[test]
fn disabled_bus_is_valid_single_process_fallback() {
    let toml = r#"
[bus]
enabled = false
"#;
    let config = load_and_validate_str(toml).expect("disabled bus should validate");
    assert!(!config.bus.enabled);
}
