//! Pool metrics
//!
//! Recorded through the `metrics` facade, so they go wherever the host's
//! recorder sends them. Every metric carries a `pool.name` label.

use ::metrics::{Unit, counter, describe_counter, describe_histogram, histogram};
use std::time::Duration;

/// Connections successfully acquired from a pool
pub const CONNECTION_OPENS: &str = "mysql.connection.opens";

/// Failed attempts to acquire a connection
pub const CONNECTION_FAILURES: &str = "mysql.connection.failures";

/// Time spent acquiring a connection
pub const CONNECTION_ACQUIRE_SECONDS: &str = "mysql.connection.acquire_seconds";

/// Label identifying the data source
pub const POOL_NAME_LABEL: &str = "pool.name";

/// Register descriptions with the installed recorder
pub fn describe_metrics() {
    describe_counter!(
        CONNECTION_OPENS,
        Unit::Count,
        "Connections acquired from the MySQL pool"
    );
    describe_counter!(
        CONNECTION_FAILURES,
        Unit::Count,
        "Failed attempts to acquire a MySQL connection"
    );
    describe_histogram!(
        CONNECTION_ACQUIRE_SECONDS,
        Unit::Seconds,
        "Time spent acquiring a MySQL connection"
    );
}

pub(crate) fn record_open(pool_name: &str, elapsed: Duration) {
    counter!(CONNECTION_OPENS, POOL_NAME_LABEL => pool_name.to_string()).increment(1);
    histogram!(CONNECTION_ACQUIRE_SECONDS, POOL_NAME_LABEL => pool_name.to_string())
        .record(elapsed.as_secs_f64());
}

pub(crate) fn record_failure(pool_name: &str) {
    counter!(CONNECTION_FAILURES, POOL_NAME_LABEL => pool_name.to_string()).increment(1);
}
