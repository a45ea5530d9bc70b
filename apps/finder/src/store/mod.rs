//! Durable store of company records, keyed by slug.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::company::{CompanyRow, LinkStatus, LinkUpdate, NewCompany};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRecordSink;
pub use postgres::PgRecordSink;

#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Every slug currently stored.
    async fn existing_slugs(&self) -> Result<HashSet<String>, StoreError>;

    /// Inserts one record. A slug that is already taken is `DuplicateSlug`.
    async fn insert_company(&self, company: &NewCompany) -> Result<Uuid, StoreError>;

    /// Updates link status (and, when relocating, slug/url/source) by id.
    async fn update_link(&self, id: Uuid, update: &LinkUpdate) -> Result<(), StoreError>;

    /// Records with the given link status, ordered by name.
    async fn companies_with_status(&self, status: LinkStatus)
        -> Result<Vec<CompanyRow>, StoreError>;
}
