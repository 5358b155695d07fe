//! Service Provider Tests

use hostwire_domain::error::Error;
use hostwire_infrastructure::di::ServiceCollection;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
struct Pool {
    name: String,
}

trait Named: Send + Sync {
    fn name(&self) -> &str;
}

impl Named for Pool {
    fn name(&self) -> &str {
        &self.name
    }
}

#[test]
fn test_missing_service_is_none_or_error() {
    let provider = ServiceCollection::new().build();

    assert!(provider.get::<Arc<Pool>>().unwrap().is_none());
    assert!(provider.get_keyed::<Arc<Pool>>("orders").unwrap().is_none());

    match provider.get_required_keyed::<Arc<Pool>>("orders") {
        Err(Error::ServiceNotFound { service, key }) => {
            assert!(service.contains("Pool"));
            assert_eq!(key.as_deref(), Some("orders"));
        }
        other => panic!("Expected ServiceNotFound, got {other:?}"),
    }
}

#[test]
fn test_singleton_is_shared() {
    let mut services = ServiceCollection::new();
    services.add_singleton(|_| {
        Ok(Arc::new(Pool {
            name: "default".to_string(),
        }))
    });
    let provider = services.build();

    let first: Arc<Pool> = provider.get_required().unwrap();
    let second: Arc<Pool> = provider.clone().get_required().unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_transient_is_fresh_every_time() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut services = ServiceCollection::new();
    let calls = counter.clone();
    services.add_transient(move |_| Ok(calls.fetch_add(1, Ordering::SeqCst)));
    let provider = services.build();

    assert_eq!(provider.get_required::<usize>().unwrap(), 0);
    assert_eq!(provider.get_required::<usize>().unwrap(), 1);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[test]
fn test_last_registration_wins() {
    let mut services = ServiceCollection::new();
    services
        .add_singleton(|_| Ok(String::from("first")))
        .add_singleton(|_| Ok(String::from("second")));

    assert_eq!(services.build().get_required::<String>().unwrap(), "second");
}

#[test]
fn test_keyed_alias_resolves_through_singleton() {
    let mut services = ServiceCollection::new();
    services
        .add_keyed_singleton("orders", |_, key| {
            Ok(Arc::new(Pool {
                name: key.to_string(),
            }))
        })
        .add_keyed_singleton("orders", |sp, key| {
            let pool: Arc<Pool> = sp.get_required_keyed(key)?;
            Ok(pool as Arc<dyn Named>)
        });
    let provider = services.build();

    let concrete: Arc<Pool> = provider.get_required_keyed("orders").unwrap();
    let alias: Arc<dyn Named> = provider.get_required_keyed("orders").unwrap();

    assert_eq!(alias.name(), "orders");
    assert!(std::ptr::eq(
        Arc::as_ptr(&concrete).cast::<u8>(),
        Arc::as_ptr(&alias).cast::<u8>()
    ));
}

#[test]
fn test_failed_singleton_is_retried() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let mut services = ServiceCollection::new();
    let counter = attempts.clone();
    services.add_singleton::<Arc<Pool>, _>(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(Error::configuration("ConnectionString is missing"))
    });
    let provider = services.build();

    assert!(provider.get::<Arc<Pool>>().unwrap_err().is_configuration());
    assert!(provider.get::<Arc<Pool>>().unwrap_err().is_configuration());
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_first_resolution_constructs_once() {
    let constructions = Arc::new(AtomicUsize::new(0));
    let mut services = ServiceCollection::new();
    let counter = constructions.clone();
    services.add_keyed_singleton("orders", move |_, key| {
        counter.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(Arc::new(Pool {
            name: key.to_string(),
        }))
    });
    let provider = services.build();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let provider = provider.clone();
            std::thread::spawn(move || {
                provider
                    .get_required_keyed::<Arc<Pool>>("orders")
                    .unwrap()
            })
        })
        .collect();
    let pools: Vec<Arc<Pool>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(pools.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn test_separate_providers_do_not_share_singletons() {
    let mut services = ServiceCollection::new();
    services.add_singleton(|_| {
        Ok(Arc::new(Pool {
            name: "default".to_string(),
        }))
    });

    let first: Arc<Pool> = services.build().get_required().unwrap();
    let second: Arc<Pool> = services.build().get_required().unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
}
