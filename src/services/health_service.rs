use crate::config::HealthConfig;
use crate::storage::DbPool;
use crate::telemetry::METER_NAME;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProbeFailure {
    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("database did not answer within {0:?}")]
    TimedOut(Duration),
}

/// Answers readiness probes with a `SELECT 1` bounded by `db_timeout_ms`.
#[derive(Clone, Debug)]
pub struct HealthService {
    pool: DbPool,
    config: HealthConfig,
    database_up: Gauge<i64>,
}

impl HealthService {
    #[must_use]
    pub fn new(pool: DbPool, config: HealthConfig) -> Self {
        let database_up = global::meter(METER_NAME)
            .i64_gauge("travel_database_up")
            .with_description("1 when the last readiness probe reached the database, 0 otherwise")
            .build();
        Self { pool, config, database_up }
    }

    /// # Errors
    /// Returns `ProbeFailure` when the query errors or outlives the configured timeout.
    pub async fn database_ready(&self) -> Result<(), ProbeFailure> {
        let limit = Duration::from_millis(self.config.db_timeout_ms);
        let outcome = match tokio::time::timeout(limit, sqlx::query("SELECT 1").execute(&self.pool)).await {
            Ok(result) => result.map(drop).map_err(ProbeFailure::from),
            Err(_) => Err(ProbeFailure::TimedOut(limit)),
        };

        self.database_up.record(i64::from(outcome.is_ok()), &[KeyValue::new("pool", "primary")]);
        outcome
    }
}
