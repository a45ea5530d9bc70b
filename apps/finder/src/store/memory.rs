use std::collections::HashSet;
#[cfg(test)]
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::RecordSink;
use crate::errors::StoreError;
use crate::models::company::{CompanyRow, LinkStatus, LinkUpdate, NewCompany};

/// In-process sink used for `--dry-run` and tests. Same slug uniqueness rules
/// as the Postgres table.
#[derive(Default)]
pub struct MemoryRecordSink {
    rows: Mutex<Vec<CompanyRow>>,
    #[cfg(test)]
    reject_writes: AtomicBool,
}

impl MemoryRecordSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored row in insertion order.
    #[cfg(test)]
    pub fn records(&self) -> Vec<CompanyRow> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CompanyRow>> {
        // A poisoned lock only means another test thread panicked mid-write.
        self.rows.lock().unwrap_or_else(|e| e.into_inner())
    }

    #[cfg(test)]
    pub fn rejecting_writes() -> Self {
        let sink = Self::default();
        sink.set_reject_writes(true);
        sink
    }

    #[cfg(test)]
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_writable(&self) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes rejected".to_string()));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_writable(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl RecordSink for MemoryRecordSink {
    async fn existing_slugs(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self.lock().iter().map(|r| r.slug.clone()).collect())
    }

    async fn insert_company(&self, company: &NewCompany) -> Result<Uuid, StoreError> {
        self.check_writable()?;
        let mut rows = self.lock();
        if rows.iter().any(|r| r.slug == company.slug) {
            return Err(StoreError::DuplicateSlug(company.slug.clone()));
        }

        let id = Uuid::new_v4();
        rows.push(CompanyRow {
            id,
            name: company.name.clone(),
            slug: company.slug.clone(),
            url: company.url.clone(),
            source: company.source.clone(),
            status: company.status.clone(),
            visited: company.visited,
            link_status: company.link_status.as_str().to_string(),
            created_at: Utc::now(),
            checked_at: None,
        });
        Ok(id)
    }

    async fn update_link(&self, id: Uuid, update: &LinkUpdate) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut rows = self.lock();

        if let Some(relocation) = &update.relocation {
            if rows.iter().any(|r| r.slug == relocation.slug && r.id != id) {
                return Err(StoreError::DuplicateSlug(relocation.slug.clone()));
            }
        }

        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound(id))?;

        row.link_status = update.link_status.as_str().to_string();
        row.checked_at = Some(Utc::now());
        if let Some(relocation) = &update.relocation {
            row.slug = relocation.slug.clone();
            row.url = relocation.url.clone();
            row.source = relocation.source.clone();
        }
        Ok(())
    }

    async fn companies_with_status(
        &self,
        status: LinkStatus,
    ) -> Result<Vec<CompanyRow>, StoreError> {
        let mut matching: Vec<CompanyRow> = self
            .lock()
            .iter()
            .filter(|r| r.link_status == status.as_str())
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(matching)
    }
}
