use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::RecordSink;
use crate::errors::StoreError;
use crate::models::company::{CompanyRow, LinkStatus, LinkUpdate, NewCompany};

const UNIQUE_VIOLATION: &str = "23505";

/// `RecordSink` over the `companies` table.
#[derive(Clone)]
pub struct PgRecordSink {
    pool: PgPool,
}

impl PgRecordSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(e: sqlx::Error, slug: &str) -> StoreError {
    let is_unique_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION);

    if is_unique_violation {
        return StoreError::DuplicateSlug(slug.to_string());
    }
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            StoreError::Unavailable(e.to_string())
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl RecordSink for PgRecordSink {
    async fn existing_slugs(&self) -> Result<HashSet<String>, StoreError> {
        let slugs: Vec<String> = sqlx::query_scalar("SELECT slug FROM companies")
            .fetch_all(&self.pool)
            .await?;
        Ok(slugs.into_iter().collect())
    }

    async fn insert_company(&self, company: &NewCompany) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO companies
                (id, name, slug, url, source, status, visited, link_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(&company.name)
        .bind(&company.slug)
        .bind(&company.url)
        .bind(&company.source)
        .bind(&company.status)
        .bind(company.visited)
        .bind(company.link_status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_insert_error(e, &company.slug))?;

        debug!(%id, slug = %company.slug, "Inserted company");
        Ok(id)
    }

    async fn update_link(&self, id: Uuid, update: &LinkUpdate) -> Result<(), StoreError> {
        let result = match &update.relocation {
            None => {
                sqlx::query(
                    "UPDATE companies SET link_status = $1, checked_at = now() WHERE id = $2",
                )
                .bind(update.link_status.as_str())
                .bind(id)
                .execute(&self.pool)
                .await?
            }
            Some(relocation) => sqlx::query(
                r#"
                UPDATE companies
                SET link_status = $1, slug = $2, url = $3, source = $4, checked_at = now()
                WHERE id = $5
                "#,
            )
            .bind(update.link_status.as_str())
            .bind(&relocation.slug)
            .bind(&relocation.url)
            .bind(&relocation.source)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_error(e, &relocation.slug))?,
        };

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn companies_with_status(
        &self,
        status: LinkStatus,
    ) -> Result<Vec<CompanyRow>, StoreError> {
        Ok(sqlx::query_as::<_, CompanyRow>(
            "SELECT * FROM companies WHERE link_status = $1 ORDER BY name",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?)
    }
}
