use std::time::{Duration, Instant};

use tracing::{Instrument, debug, info_span, warn};

const SLOW_QUERY_THRESHOLD: Duration = Duration::from_millis(250);

/// Runs a query future inside a `db_query` span and logs latency, affected
/// rows and failures. Queries slower than the threshold are logged at warn.
pub async fn log_query<F, T, E, R>(query_name: &str, query: F, row_counter: R) -> Result<T, E>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
    R: Fn(&T) -> Option<u64>,
{
    let span = info_span!("db_query", query = %query_name);
    let start = Instant::now();
    let result = query.instrument(span.clone()).await;
    let elapsed = start.elapsed();
    let latency_ms = elapsed.as_millis();

    span.in_scope(|| match &result {
        Ok(value) => {
            let rows = row_counter(value);
            if is_slow(elapsed) {
                warn!(latency_ms = %latency_ms, rows = ?rows, "Slow query");
            } else {
                debug!(latency_ms = %latency_ms, rows = ?rows, "Query executed successfully");
            }
        }
        Err(error) => {
            warn!(latency_ms = %latency_ms, error = ?error, "Query failed");
        }
    });

    result
}

fn is_slow(elapsed: Duration) -> bool {
    elapsed >= SLOW_QUERY_THRESHOLD
}

#[macro_export]
macro_rules! log_query_execute {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |result| {
            Some(result.rows_affected())
        })
        .await
    };
}

#[macro_export]
macro_rules! log_query_fetch_all {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |rows| Some(rows.len() as u64)).await
    };
}

#[macro_export]
macro_rules! log_query_fetch_optional {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |row| {
            Some(u64::from(row.is_some()))
        })
        .await
    };
}

#[macro_export]
macro_rules! log_query_fetch_one {
    ($name:expr, $query:expr) => {
        $crate::telemetry::database::log_query($name, $query, |_| Some(1)).await
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_query_result() {
        let result: Result<Vec<u8>, String> =
            log_query("test.ok", async { Ok(vec![1, 2, 3]) }, |rows: &Vec<u8>| {
                Some(rows.len() as u64)
            })
            .await;
        assert_eq!(result, Ok(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn passes_through_query_error() {
        let result: Result<(), String> =
            log_query("test.err", async { Err("boom".to_string()) }, |_| None).await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[test]
    fn slow_threshold() {
        assert!(!is_slow(Duration::from_millis(10)));
        assert!(is_slow(Duration::from_millis(250)));
    }
}
