use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// Builds the shared pool. A request that cannot get a connection within
/// `acquire_timeout` fails as storage-unavailable instead of queueing.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await?;
    Ok(pool)
}
