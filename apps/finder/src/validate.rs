//! Validation pass: re-checks every `unchecked` record's stored URL.

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::batch::run_in_batches;
use crate::config::BatchPlan;
use crate::errors::StoreError;
use crate::models::company::{CompanyRow, LinkStatus, LinkUpdate};
use crate::probe::Presence;
use crate::resolver::Resolver;

#[derive(Debug, Clone, Serialize)]
pub struct Validation {
    pub id: Uuid,
    pub name: String,
    /// Final URL: the stored one, or the new one after a relocation.
    pub url: String,
    pub link_status: LinkStatus,
    pub relocated: bool,
    /// Store error while recording the result; the probe result still stands.
    pub error: Option<String>,
}

impl Validation {
    pub fn is_active(&self) -> bool {
        self.link_status == LinkStatus::Active
    }
}

/// Probes every unchecked record and writes back `active` or `dead`.
/// With `repair`, dead records get one search for a board elsewhere.
pub async fn validate_unchecked(
    resolver: &Resolver,
    plan: BatchPlan,
    repair: bool,
    on_batch: impl FnMut(&[Validation], usize, usize),
) -> Result<Vec<Validation>, StoreError> {
    let records = resolver
        .sink()
        .companies_with_status(LinkStatus::Unchecked)
        .await?;

    if records.is_empty() {
        info!("No unchecked companies found");
        return Ok(Vec::new());
    }
    info!("Found {} unchecked companies", records.len());

    Ok(run_in_batches(
        &records,
        plan,
        |record| validate_one(resolver, record, repair),
        on_batch,
    )
    .await)
}

async fn validate_one(resolver: &Resolver, record: &CompanyRow, repair: bool) -> Validation {
    let provider = resolver.config().provider_or_default(&record.source);
    let presence = resolver
        .prober()
        .probe(&record.url, provider.classifier.as_ref())
        .await;

    let mut validation = Validation {
        id: record.id,
        name: record.name.clone(),
        url: record.url.clone(),
        link_status: match presence {
            Presence::Present => LinkStatus::Active,
            Presence::Absent => LinkStatus::Dead,
        },
        relocated: false,
        error: None,
    };

    if presence == Presence::Absent && repair {
        match resolver.relocate(record).await {
            Ok(Some(relocation)) => {
                validation.url = relocation.url;
                validation.link_status = LinkStatus::Active;
                validation.relocated = true;
                return validation;
            }
            Ok(None) => {}
            Err(e) => warn!(name = %record.name, "Relocation failed: {e}"),
        }
    }

    if let Err(e) = resolver
        .sink()
        .update_link(record.id, &LinkUpdate::status(validation.link_status))
        .await
    {
        error!(name = %record.name, "Update error: {e}");
        validation.error = Some(e.to_string());
    }

    validation
}
