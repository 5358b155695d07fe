//! Service Collection Registration Tests

use hostwire_domain::error::Error;
use hostwire_domain::ports::DbDataSource;
use hostwire_infrastructure::di::ServiceCollection;
use hostwire_mysql::{MySqlConnection, MySqlDataSource, MySqlDataSourceBuilder, MySqlServiceCollectionExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[tokio::test]
async fn test_unkeyed_services_share_one_data_source() {
    let built = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&built);
    let mut services = ServiceCollection::new();
    services.add_mysql_data_source_services("Server=db;Database=o", move |builder| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(builder.name("shared"))
    });
    let provider = services.build();

    let first: MySqlDataSource = provider.get_required().unwrap();
    let second: MySqlDataSource = provider.get_required().unwrap();
    let generic: Arc<dyn DbDataSource> = provider.get_required().unwrap();
    let connection: MySqlConnection = provider.get_required().unwrap();

    assert_eq!(built.load(Ordering::SeqCst), 1);
    assert_eq!(first.name(), "shared");
    assert_eq!(second.name(), "shared");
    assert_eq!(generic.connection_string(), "Server=db;Database=o");
    assert_eq!(connection.data_source().name(), "shared");
}

#[test]
fn test_configure_error_fails_resolution() {
    let mut services = ServiceCollection::new();
    services.add_mysql_data_source_services("", |_| Err(Error::configuration("not configured")));
    let provider = services.build();

    let err = provider.get_required::<MySqlDataSource>().unwrap_err();

    assert!(err.to_string().contains("not configured"));
}

#[tokio::test]
async fn test_keyed_services_use_their_key() {
    let mut services = ServiceCollection::new();
    for key in ["orders", "billing"] {
        services.add_keyed_mysql_data_source_services(key, |_, key| {
            MySqlDataSourceBuilder::new(format!("Server=db;Database={key}"))
                .name(key)
                .build()
        });
    }
    let provider = services.build();

    let orders: Arc<dyn DbDataSource> = provider.get_required_keyed("orders").unwrap();
    let billing: MySqlConnection = provider.get_required_keyed("billing").unwrap();

    assert_eq!(orders.connection_string(), "Server=db;Database=orders");
    assert_eq!(billing.data_source().name(), "billing");
    assert!(provider.get_keyed::<MySqlDataSource>("audit").unwrap().is_none());
}

#[tokio::test]
async fn test_builder_applies_pool_settings() {
    let data_source = MySqlDataSourceBuilder::new("Server=db;Max Pool Size=4;Min Pool Size=1")
        .metrics(true)
        .build()
        .unwrap();

    assert_eq!(data_source.pool_settings().bounds(), (1, 4));
    assert_eq!(data_source.name(), "mysql");
    assert!(data_source.metrics_enabled());
}

#[tokio::test]
async fn test_unopened_connection_cannot_ping() {
    let data_source = MySqlDataSourceBuilder::new("Server=db").build().unwrap();
    let mut connection = data_source.create_connection();

    let err = connection.ping().await.unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { .. }));
    connection.close();
    assert!(!connection.is_open());
}

#[tokio::test]
async fn test_open_connection_failure_is_reported_with_pool_name() {
    let data_source = MySqlDataSourceBuilder::new("Server=127.0.0.1;Port=1;Connection Timeout=1")
        .name("orders")
        .metrics(true)
        .build()
        .unwrap();

    let err = data_source.open_connection().await.unwrap_err();

    assert!(matches!(err, Error::Database { .. }), "{err}");
    assert!(err.to_string().contains("'orders'"));
}
