use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use platewise_core::config::DatabaseConfig;

pub type DbPool = sqlx::SqlitePool;

/// Open a pool shaped by the `[database]` config section. Every connection
/// enforces foreign keys, switches to WAL journaling, and carries a sqlite
/// busy timeout matching the configured acquire timeout.
pub async fn connect(settings: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let acquire_timeout_secs = settings.timeout_secs.max(1);
    let busy_timeout_ms = acquire_timeout_secs.saturating_mul(1000);
    SqlitePoolOptions::new()
        .max_connections(settings.max_connections.max(1))
        .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query(&format!("PRAGMA busy_timeout = {busy_timeout_ms}"))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&settings.url)
        .await
}
