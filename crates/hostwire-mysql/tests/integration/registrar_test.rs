//! Host Registration Tests

use hostwire_domain::error::Error;
use hostwire_domain::ports::{DbConnection, DbDataSource};
use hostwire_infrastructure::config::{ConfigLoader, Configuration};
use hostwire_infrastructure::health::{HealthCheck, HealthCheckRegistration, HealthChecker, HealthStatus};
use hostwire_infrastructure::host::HostApplicationBuilder;
use hostwire_mysql::{MySqlConnection, MySqlDataSource, MySqlHostBuilderExt};
use std::sync::Arc;

fn builder(toml: &str) -> HostApplicationBuilder {
    HostApplicationBuilder::new(Configuration::from_toml_str(toml))
}

const MISSING_ORDERS: &str = "ConnectionString is missing. It should be provided in 'ConnectionStrings:orders' or under the 'ConnectionString' key in 'Aspire:MySql:orders' configuration section.";

#[tokio::test]
async fn test_keyed_registration_uses_connection_strings_entry() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=db;Database=o"

[Aspire.MySql.orders]
HealthChecks = true
"#,
    );

    builder.add_keyed_mysql_data_source("orders").unwrap();
    let host = builder.build();

    let orders: MySqlDataSource = host.services().get_required_keyed("orders").unwrap();
    assert_eq!(orders.connection_string(), "Server=db;Database=o");
    assert_eq!(orders.name(), "orders");
    assert_eq!(host.health().list_checks(), vec!["MySql_orders"]);
    assert!(host.services().get::<MySqlDataSource>().unwrap().is_none());
}

#[test]
fn test_empty_name_fails_before_registering() {
    let mut builder = builder(
        r#"
[Aspire.MySql]
ConnectionString = "Server=db"
"#,
    );

    let err = builder.add_keyed_mysql_data_source("").unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(err.to_string().contains("name"));
    assert!(builder.services().is_empty());
    assert!(builder.health_checks().is_empty());
    assert_eq!(builder.telemetry().tracing_sources().count(), 0);
}

#[tokio::test]
async fn test_unkeyed_registration() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
catalog = "Server=db;Database=catalog"
"#,
    );

    builder.add_mysql_data_source("catalog").unwrap();
    let host = builder.build();

    let data_source: MySqlDataSource = host.services().get_required().unwrap();
    assert_eq!(data_source.connection_string(), "Server=db;Database=catalog");
    assert!(data_source.metrics_enabled());
    assert_eq!(host.health().list_checks(), vec!["MySql"]);

    let generic: Arc<dyn DbDataSource> = host.services().get_required().unwrap();
    assert_eq!(generic.provider_name(), "mysql");
    assert_eq!(generic.connection_string(), "Server=db;Database=catalog");

    let connection: MySqlConnection = host.services().get_required().unwrap();
    assert!(!connection.is_open());
    let boxed: Box<dyn DbConnection> = host.services().get_required().unwrap();
    assert!(!boxed.is_open());
}

#[tokio::test]
async fn test_keyed_aliases_resolve_through_data_source() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=db;Database=o"
"#,
    );
    builder.add_keyed_mysql_data_source("orders").unwrap();
    let host = builder.build();
    let services = host.services();

    let data_source: MySqlDataSource = services.get_required_keyed("orders").unwrap();
    let generic: Arc<dyn DbDataSource> = services.get_required_keyed("orders").unwrap();
    let connection: MySqlConnection = services.get_required_keyed("orders").unwrap();
    let boxed: Box<dyn DbConnection> = services.get_required_keyed("orders").unwrap();

    assert_eq!(generic.connection_string(), data_source.connection_string());
    assert_eq!(connection.data_source().name(), "orders");
    assert!(!connection.is_open());
    assert_eq!(boxed.connection_string(), "Server=db;Database=o");
    assert!(services.get::<Arc<dyn DbDataSource>>().unwrap().is_none());
}

#[tokio::test]
async fn test_section_connection_string_is_used_without_store_entry() {
    let mut builder = builder(
        r#"
[Aspire.MySql.orders]
ConnectionString = "Server=section;Database=o"
"#,
    );

    builder.add_keyed_mysql_data_source("orders").unwrap();
    let host = builder.build();

    let orders: MySqlDataSource = host.services().get_required_keyed("orders").unwrap();
    assert_eq!(orders.connection_string(), "Server=section;Database=o");
}

#[tokio::test]
async fn test_store_entry_overrides_section() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=store;Database=o"

[Aspire.MySql.orders]
ConnectionString = "Server=section;Database=o"
"#,
    );

    builder.add_keyed_mysql_data_source("orders").unwrap();
    let host = builder.build();

    let orders: MySqlDataSource = host.services().get_required_keyed("orders").unwrap();
    assert_eq!(orders.connection_string(), "Server=store;Database=o");
}

#[tokio::test]
async fn test_callback_overrides_store_entry() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=store;Database=o"

[Aspire.MySql.orders]
ConnectionString = "Server=section;Database=o"
"#,
    );

    builder
        .add_keyed_mysql_data_source_with("orders", |settings| {
            assert_eq!(
                settings.connection_string.as_deref(),
                Some("Server=store;Database=o")
            );
            settings.connection_string = Some("Server=callback;Database=o".to_string());
        })
        .unwrap();
    let host = builder.build();

    let orders: MySqlDataSource = host.services().get_required_keyed("orders").unwrap();
    assert_eq!(orders.connection_string(), "Server=callback;Database=o");
}

#[test]
fn test_health_checks_disabled() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=db;Database=o"

[Aspire.MySql.orders]
HealthChecks = false
"#,
    );

    builder.add_keyed_mysql_data_source("orders").unwrap();

    assert!(builder.health_checks().is_empty());
    assert!(builder.services().contains_keyed::<MySqlDataSource>("orders"));
}

#[test]
fn test_missing_connection_string_fails_on_resolution_only() {
    let mut builder = builder("");

    builder.add_keyed_mysql_data_source("orders").unwrap();
    assert!(builder.services().contains_keyed::<MySqlDataSource>("orders"));
    let host = builder.build();

    let err = host
        .services()
        .get_required_keyed::<MySqlDataSource>("orders")
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains(MISSING_ORDERS), "{err}");

    // a failed resolution is not cached
    let again = host.services().get_required_keyed::<MySqlDataSource>("orders");
    assert!(again.is_err());
}

#[test]
fn test_empty_store_entry_counts_as_missing() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
catalog = ""

[Aspire.MySql]
ConnectionString = "Server=section"
"#,
    );

    builder.add_mysql_data_source("catalog").unwrap();
    let host = builder.build();

    let err = host.services().get_required::<MySqlDataSource>().unwrap_err();
    assert!(err.to_string().contains(
        "'ConnectionStrings:catalog' or under the 'ConnectionString' key in 'Aspire:MySql'"
    ));
}

#[test]
fn test_invalid_connection_string_fails_on_resolution() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=db;Bogus=1"
"#,
    );

    builder.add_keyed_mysql_data_source("orders").unwrap();
    let host = builder.build();

    let err = host
        .services()
        .get_required_keyed::<MySqlDataSource>("orders")
        .unwrap_err();
    assert!(err.is_configuration());
}

#[test]
fn test_malformed_section_fails_at_registration() {
    let mut builder = builder(
        r#"
[Aspire.MySql.orders]
HealthChecks = [1, 2]
"#,
    );

    let err = builder.add_keyed_mysql_data_source("orders").unwrap_err();

    assert!(err.is_configuration());
    assert!(builder.services().is_empty());
}

#[tokio::test]
async fn test_keyed_registrations_are_independent() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=db;Database=orders"
billing = "Server=db;Database=billing"

[Aspire.MySql.billing]
HealthChecks = false
"#,
    );

    builder
        .add_keyed_mysql_data_source("orders")
        .unwrap()
        .add_keyed_mysql_data_source("billing")
        .unwrap();
    let host = builder.build();

    let orders: MySqlDataSource = host.services().get_required_keyed("orders").unwrap();
    let billing: MySqlDataSource = host.services().get_required_keyed("billing").unwrap();
    assert_eq!(orders.connection_string(), "Server=db;Database=orders");
    assert_eq!(billing.connection_string(), "Server=db;Database=billing");
    assert_eq!(host.health().list_checks(), vec!["MySql_orders"]);
}

#[tokio::test]
async fn test_names_differing_by_underscore_are_independent() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
order_db = "Server=a;Database=a"
orderdb = "Server=b;Database=b"
"#,
    );

    builder
        .add_keyed_mysql_data_source("order_db")
        .unwrap()
        .add_keyed_mysql_data_source("orderdb")
        .unwrap();
    let host = builder.build();

    let order_db: MySqlDataSource = host.services().get_required_keyed("order_db").unwrap();
    let orderdb: MySqlDataSource = host.services().get_required_keyed("orderdb").unwrap();
    assert_eq!(order_db.connection_string(), "Server=a;Database=a");
    assert_eq!(orderdb.connection_string(), "Server=b;Database=b");
    assert_eq!(
        host.health().list_checks(),
        vec!["MySql_order_db", "MySql_orderdb"]
    );
}

struct PresetChecker;

#[async_trait::async_trait]
impl HealthChecker for PresetChecker {
    async fn check_health(&self) -> HealthCheck {
        HealthCheck::healthy("preset")
    }
}

#[test]
fn test_existing_health_check_is_kept() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
catalog = "Server=db"
"#,
    );
    builder.health_checks_mut().add(
        HealthCheckRegistration::new("MySql", |_| {
            Ok(Box::new(PresetChecker) as Box<dyn HealthChecker>)
        })
        .with_tags(["preset"]),
    );

    builder.add_mysql_data_source("catalog").unwrap();

    assert_eq!(builder.health_checks().len(), 1);
    assert_eq!(
        builder.health_checks().get("MySql").unwrap().tags(),
        ["preset".to_string()]
    );
}

#[test]
fn test_telemetry_follows_settings() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=db"
billing = "Server=db"

[Aspire.MySql.billing]
Tracing = false
Metrics = false
"#,
    );

    builder.add_keyed_mysql_data_source("billing").unwrap();
    assert!(!builder.telemetry().is_tracing_source_enabled("MySqlConnector"));
    assert!(!builder.telemetry().is_meter_enabled("MySqlConnector"));

    builder.add_keyed_mysql_data_source("orders").unwrap();
    assert!(builder.telemetry().is_tracing_source_enabled("MySqlConnector"));
    assert!(builder.telemetry().is_tracing_source_enabled("sqlx::query"));
    assert!(builder.telemetry().is_meter_enabled("MySqlConnector"));
}

#[tokio::test]
async fn test_metrics_flag_reaches_data_source() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=db"
"#,
    );

    builder
        .add_keyed_mysql_data_source_with("orders", |settings| settings.metrics = false)
        .unwrap();
    let host = builder.build();

    let orders: MySqlDataSource = host.services().get_required_keyed("orders").unwrap();
    assert!(!orders.metrics_enabled());
}

#[tokio::test]
async fn test_health_check_reports_unreachable_server() {
    let mut builder = builder(
        r#"
[ConnectionStrings]
orders = "Server=127.0.0.1;Port=1;User ID=monitor;Connection Timeout=2"
"#,
    );
    builder.add_keyed_mysql_data_source("orders").unwrap();
    let host = builder.build();

    let check = host.health().check("MySql_orders").await.unwrap();

    assert_eq!(check.name, "MySql_orders");
    assert_eq!(check.status, HealthStatus::Down);
}

#[tokio::test]
async fn test_health_check_reports_missing_connection_string() {
    let mut builder = builder("");
    builder.add_mysql_data_source("catalog").unwrap();
    let host = builder.build();

    let response = host.health().perform_health_checks().await;

    assert_eq!(response.status, HealthStatus::Down);
    let check = &response.checks["MySql"];
    assert!(check.error.as_deref().unwrap().contains("ConnectionString is missing"));
}

#[test]
fn test_environment_overrides_file() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "hostwire.toml",
            r#"
[ConnectionStrings]
orders = "Server=file;Database=o"
"#,
        )?;
        jail.set_env("HOSTWIRE__CONNECTIONSTRINGS__ORDERS", "Server=env;Database=o");
        jail.set_env("HOSTWIRE__ASPIRE__MYSQL__ORDERS__HEALTHCHECKS", "false");

        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();

        let mut builder = HostApplicationBuilder::from_loader(&ConfigLoader::new());
        builder.add_keyed_mysql_data_source("orders").unwrap();
        assert!(builder.health_checks().is_empty());
        let host = builder.build();

        let orders: MySqlDataSource = host.services().get_required_keyed("orders").unwrap();
        assert_eq!(orders.connection_string(), "Server=env;Database=o");
        Ok(())
    });
}
