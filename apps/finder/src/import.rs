//! Bulk import: stores names as `unchecked` records without touching the
//! network. The validation pass decides later whether each guess is live.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{error, info};

use crate::config::ResolverConfig;
use crate::errors::StoreError;
use crate::models::company::{LinkStatus, NewCompany};
use crate::slug;
use crate::store::RecordSink;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub parsed: usize,
    pub inserted: usize,
    /// Slug already stored, or repeated within this import.
    pub skipped: usize,
    /// Names with no usable characters.
    pub unusable: usize,
    pub failed: usize,
}

/// Inserts one `unchecked` record per new slug, guessing the highest-priority
/// candidate on the highest-priority provider.
pub async fn import_names(
    names: &[String],
    config: &ResolverConfig,
    sink: &dyn RecordSink,
) -> Result<ImportSummary, StoreError> {
    let provider = &config.providers[0];
    let mut summary = ImportSummary {
        parsed: names.len(),
        ..Default::default()
    };

    let mut taken: HashSet<String> = sink.existing_slugs().await?;
    info!("Found {} existing companies", taken.len());

    for name in names {
        let Some(slug) = slug::candidates_for(name).into_iter().next() else {
            summary.unusable += 1;
            continue;
        };
        if !taken.insert(slug.clone()) {
            summary.skipped += 1;
            continue;
        }

        let record = NewCompany::new(
            name.as_str(),
            slug.as_str(),
            provider.url_for(&slug),
            provider.name,
            LinkStatus::Unchecked,
        );
        match sink.insert_company(&record).await {
            Ok(_) => summary.inserted += 1,
            Err(StoreError::DuplicateSlug(_)) => summary.skipped += 1,
            Err(e) => {
                error!(name = %name, slug = %slug, "Insert error: {e}");
                summary.failed += 1;
            }
        }
    }

    info!(
        "Imported {} of {} companies as 'unchecked'",
        summary.inserted, summary.parsed
    );
    Ok(summary)
}
