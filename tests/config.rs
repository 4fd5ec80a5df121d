use std::fs;

use sheet_dashboard::SheetError;
use sheet_dashboard::config::{DEFAULT_EXPORT_TITLE, DEFAULT_RANGE, DashboardConfig};
use sheet_dashboard::export::ExportHeader;
use sheet_dashboard::view::SortMode;
use tempfile::tempdir;

#[test]
fn minimal_config_uses_defaults() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("dashboard.json");
    fs::write(&path, r#"{ "sheetId": "abc", "apiKey": "key" }"#).expect("config written");

    let config = DashboardConfig::load(&path).expect("config loaded");

    assert_eq!(config.sheet_id, "abc");
    assert_eq!(config.api_key, "key");
    assert_eq!(config.range, DEFAULT_RANGE);
    assert_eq!(config.export_title, DEFAULT_EXPORT_TITLE);
    assert_eq!(config.export_tab, DEFAULT_RANGE);
    assert_eq!(config.scopes.len(), 2);
    assert_eq!(config.sort_mode, SortMode::Compose);
    assert_eq!(config.export_header, ExportHeader::Union);
    config.validate_read().expect("readable");
}

#[test]
fn recognised_fields_are_read() {
    let json = serde_json::json!({
        "sheetId": "abc",
        "apiKey": "key",
        "clientId": "client.apps.example.com",
        "scopes": ["https://www.googleapis.com/auth/spreadsheets"],
        "range": "people",
        "sortMode": "canonical",
        "exportHeader": "firstRecord"
    });

    let config: DashboardConfig = serde_json::from_value(json).expect("config parsed");

    assert_eq!(config.range, "people");
    assert_eq!(config.sort_mode, SortMode::Canonical);
    assert_eq!(config.export_header, ExportHeader::FirstRecord);
    config.validate_write().expect("writable");
}

#[test]
fn write_validation_rejects_missing_oauth_settings() {
    let mut config = DashboardConfig::new("abc");
    assert!(matches!(
        config.validate_write(),
        Err(SheetError::InvalidConfig(_))
    ));

    config.client_id = "client".into();
    config.scopes = vec![" ".into()];
    assert!(matches!(
        config.validate_write(),
        Err(SheetError::InvalidConfig(_))
    ));
}

#[test]
fn missing_config_file_is_reported() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("absent.json");

    assert!(matches!(
        DashboardConfig::load(&path),
        Err(SheetError::MissingInput(_))
    ));
}
