//! Connector Settings Tests

use hostwire_infrastructure::config::Configuration;
use hostwire_mysql::MySqlConnectorSettings;

#[test]
fn test_defaults_enable_everything() {
    let settings = MySqlConnectorSettings::default();

    assert_eq!(settings.connection_string, None);
    assert!(settings.health_checks);
    assert!(settings.tracing);
    assert!(settings.metrics);
}

#[test]
fn test_bind_keeps_defaults_for_unset_fields() {
    let config = Configuration::from_toml_str(
        r#"
[Aspire.MySql]
ConnectionString = "Server=db;Database=catalog"
Metrics = false
"#,
    );

    let settings: MySqlConnectorSettings = config.bind("Aspire:MySql").unwrap();

    assert_eq!(
        settings.effective_connection_string(),
        Some("Server=db;Database=catalog")
    );
    assert!(settings.health_checks);
    assert!(settings.tracing);
    assert!(!settings.metrics);
}

#[test]
fn test_bind_accepts_snake_case_keys() {
    let config = Configuration::from_toml_str(
        r#"
[Aspire.MySql.orders]
connection_string = "Server=db;Database=o"
health_checks = false
"#,
    );

    let settings: MySqlConnectorSettings = config.bind("Aspire:MySql:orders").unwrap();

    assert_eq!(settings.effective_connection_string(), Some("Server=db;Database=o"));
    assert!(!settings.health_checks);
}

#[test]
fn test_bind_absent_section_is_default() {
    let config = Configuration::from_toml_str("");

    let settings: MySqlConnectorSettings = config.bind("Aspire:MySql:orders").unwrap();

    assert_eq!(settings, MySqlConnectorSettings::default());
}

#[test]
fn test_empty_connection_string_is_not_effective() {
    let settings = MySqlConnectorSettings {
        connection_string: Some(String::new()),
        ..Default::default()
    };

    assert_eq!(settings.effective_connection_string(), None);
}

#[test]
fn test_debug_redacts_connection_string() {
    let settings = MySqlConnectorSettings {
        connection_string: Some("Server=db;Password=hunter2".to_string()),
        ..Default::default()
    };

    let rendered = format!("{settings:?}");

    assert!(!rendered.contains("hunter2"));
    assert!(rendered.contains("<redacted>"));
}
