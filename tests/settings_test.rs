use std::io::Write;

use skald::presentation::config::{
    EngineProviderSetting, JobStoreProviderSetting, ServingMode, Settings, SettingsError,
    StorageProviderSetting,
};

#[test]
fn given_empty_config_when_parsed_then_defaults_apply_and_validate() {
    let settings = Settings::from_toml("").unwrap();

    assert_eq!(settings.server.port, 8000);
    assert_eq!(settings.server.mode, ServingMode::Queued);
    assert_eq!(settings.storage.provider, StorageProviderSetting::Local);
    assert_eq!(settings.job_store.provider, JobStoreProviderSetting::Memory);
    assert_eq!(settings.engine.provider, EngineProviderSetting::Local);
    assert_eq!(settings.engine.language.as_deref(), Some("en"));
    assert!(settings.engine.vad_filter);
    assert_eq!(settings.worker.deadline_secs, 600);
    assert!(settings.worker.delete_staging_after);
    assert!(!settings.notifications.enabled);

    settings.validate().unwrap();
}

#[test]
fn given_full_config_when_parsed_then_fields_are_read() {
    let raw = r#"
        [server]
        host = "127.0.0.1"
        port = 9000
        mode = "direct"
        environment = "prod"

        [storage]
        provider = "memory"

        [engine]
        provider = "remote"
        model = "whisper-1"
        language = "de"
        api_key = "sk-test"

        [worker]
        deadline_secs = 30
        delete_staging_after = false
        queue_capacity = 4

        [notifications]
        enabled = true
        webhook_url = "http://127.0.0.1:9999/alerts"

        [logging]
        level = "info"
        json = true
    "#;

    let settings = Settings::from_toml(raw).unwrap();
    settings.validate().unwrap();

    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 9000);
    assert_eq!(settings.server.mode, ServingMode::Direct);
    assert_eq!(settings.engine.provider, EngineProviderSetting::Remote);
    assert_eq!(settings.engine.model, "whisper-1");
    assert_eq!(settings.engine.language.as_deref(), Some("de"));
    assert_eq!(settings.worker.deadline_secs, 30);
    assert!(!settings.worker.delete_staging_after);
    assert!(settings.notifications.enabled);
    assert!(settings.logging.json);
}

#[test]
fn given_config_file_when_loaded_then_settings_are_read() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 9100").unwrap();

    let settings = Settings::from_file(file.path()).unwrap();

    assert_eq!(settings.server.port, 9100);
}

#[test]
fn given_missing_config_file_when_loaded_then_read_error_names_the_path() {
    let err = Settings::from_file(std::path::Path::new("/nonexistent/skald.toml")).unwrap_err();

    match err {
        SettingsError::Read(msg) => assert!(msg.contains("/nonexistent/skald.toml")),
        _ => panic!("expected a read error"),
    }
}

#[test]
fn given_malformed_toml_when_parsed_then_returns_parse_error() {
    assert!(matches!(
        Settings::from_toml("server = \"not-a-table\""),
        Err(SettingsError::Parse(_))
    ));
}

fn assert_invalid(raw: &str, expected_fragment: &str) {
    let settings = Settings::from_toml(raw).unwrap();
    match settings.validate().unwrap_err() {
        SettingsError::Invalid(msg) => assert!(
            msg.contains(expected_fragment),
            "message '{msg}' should mention '{expected_fragment}'"
        ),
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[test]
fn given_zero_port_when_validated_then_fails_naming_the_field() {
    assert_invalid("[server]\nport = 0", "server.port");
}

#[test]
fn given_zero_deadline_when_validated_then_fails_naming_the_field() {
    assert_invalid("[worker]\ndeadline_secs = 0", "worker.deadline_secs");
}

#[test]
fn given_zero_queue_capacity_when_validated_then_fails_naming_the_field() {
    assert_invalid("[worker]\nqueue_capacity = 0", "worker.queue_capacity");
}

#[test]
fn given_postgres_without_url_when_validated_then_fails_naming_the_field() {
    assert_invalid(
        "[job_store]\nprovider = \"postgres\"",
        "job_store.database_url",
    );
}

#[test]
fn given_azure_without_credentials_when_validated_then_fails_naming_the_field() {
    assert_invalid(
        "[storage]\nprovider = \"azure\"\nazure_account = \"acct\"",
        "storage.azure_access_key",
    );
}

#[test]
fn given_remote_engine_without_key_or_base_url_when_validated_then_fails() {
    assert_invalid("[engine]\nprovider = \"remote\"", "engine.api_key");
}

#[test]
fn given_remote_engine_with_base_url_when_validated_then_key_is_optional() {
    let settings = Settings::from_toml(
        "[engine]\nprovider = \"remote\"\nbase_url = \"http://localhost:8080/v1\"",
    )
    .unwrap();

    settings.validate().unwrap();
}

#[test]
fn given_notifications_enabled_without_url_when_validated_then_fails() {
    assert_invalid(
        "[notifications]\nenabled = true",
        "notifications.webhook_url",
    );
}
