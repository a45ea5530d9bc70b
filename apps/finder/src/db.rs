use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `companies` table if it is missing. Slug is the natural key.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id          UUID PRIMARY KEY,
            name        TEXT NOT NULL,
            slug        TEXT NOT NULL UNIQUE,
            url         TEXT NOT NULL,
            source      TEXT NOT NULL,
            status      TEXT NOT NULL DEFAULT 'unvisited',
            visited     BOOLEAN NOT NULL DEFAULT FALSE,
            link_status TEXT NOT NULL DEFAULT 'unchecked',
            created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
            checked_at  TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS companies_link_status_idx ON companies (link_status)")
        .execute(pool)
        .await?;

    Ok(())
}
