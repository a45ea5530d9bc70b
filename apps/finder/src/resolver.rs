//! Resolver — company name to a confirmed job-board URL.
//!
//! Providers are scanned in configured priority order, candidates in
//! generation order; the first `Present` (provider, slug) pair wins. A
//! candidate slug that is already stored short-circuits to `Skipped` before
//! any network call is made for it.
//!
//! Known slugs live behind one async mutex. Every persist re-checks the set
//! while holding it, so two companies in the same concurrent batch that land
//! on the same slug produce one record and one `Skipped`.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::batch::run_in_batches;
use crate::config::{BatchPlan, ResolverConfig};
use crate::errors::StoreError;
use crate::models::company::{CompanyRow, LinkStatus, LinkUpdate, NewCompany, Relocation};
use crate::probe::{Presence, Prober};
use crate::providers::Provider;
use crate::slug;
use crate::store::RecordSink;

/// Result of resolving one company name. Exactly one per name per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Active {
        slug: String,
        provider: String,
        url: String,
    },
    /// No provider confirmed any candidate. `best_guess` is the first
    /// candidate, or the trimmed name when there were none.
    Dead { best_guess: String },
    Skipped { existing_slug: String },
    /// A board was found but the record could not be written.
    ProbeError {
        slug: String,
        provider: String,
        cause: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub name: String,
    #[serde(flatten)]
    pub outcome: ResolutionOutcome,
}

pub struct Resolver {
    config: ResolverConfig,
    prober: Prober,
    sink: Arc<dyn RecordSink>,
    known_slugs: Mutex<HashSet<String>>,
}

impl Resolver {
    pub fn new(
        config: ResolverConfig,
        prober: Prober,
        sink: Arc<dyn RecordSink>,
        existing_slugs: HashSet<String>,
    ) -> Self {
        Self {
            config,
            prober,
            sink,
            known_slugs: Mutex::new(existing_slugs),
        }
    }

    /// Builds a resolver seeded with every slug the sink already holds.
    pub async fn from_sink(
        config: ResolverConfig,
        prober: Prober,
        sink: Arc<dyn RecordSink>,
    ) -> Result<Self, StoreError> {
        let existing = sink.existing_slugs().await?;
        info!("Loaded {} existing slugs", existing.len());
        Ok(Self::new(config, prober, sink, existing))
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn prober(&self) -> &Prober {
        &self.prober
    }

    pub fn sink(&self) -> &dyn RecordSink {
        self.sink.as_ref()
    }

    async fn is_known(&self, slug: &str) -> bool {
        self.known_slugs.lock().await.contains(slug)
    }

    pub async fn resolve(&self, name: &str) -> ResolutionOutcome {
        let candidates = slug::candidates_for(name);
        let Some(first) = candidates.first() else {
            debug!(name, "Name has no usable characters");
            return ResolutionOutcome::Dead {
                best_guess: name.trim().to_string(),
            };
        };

        for provider in &self.config.providers {
            for slug in &candidates {
                if self.is_known(slug).await {
                    debug!(name, slug = %slug, "Slug already stored");
                    return ResolutionOutcome::Skipped {
                        existing_slug: slug.clone(),
                    };
                }

                let url = provider.url_for(slug);
                let presence = self.prober.probe(&url, provider.classifier.as_ref()).await;
                debug!(name, provider = provider.name, slug = %slug, ?presence, "Probed");

                if presence == Presence::Present {
                    return self.persist(name, slug, provider, url).await;
                }
            }
        }

        info!(name, best_guess = %first, "No board found");
        ResolutionOutcome::Dead {
            best_guess: first.clone(),
        }
    }

    async fn persist(
        &self,
        name: &str,
        slug: &str,
        provider: &Provider,
        url: String,
    ) -> ResolutionOutcome {
        let mut known = self.known_slugs.lock().await;
        if known.contains(slug) {
            return ResolutionOutcome::Skipped {
                existing_slug: slug.to_string(),
            };
        }

        let record = NewCompany::new(name, slug, url.as_str(), provider.name, LinkStatus::Active);
        match self.sink.insert_company(&record).await {
            Ok(id) => {
                known.insert(slug.to_string());
                info!(%id, slug, provider = provider.name, "Recorded active board");
                ResolutionOutcome::Active {
                    slug: slug.to_string(),
                    provider: provider.name.to_string(),
                    url,
                }
            }
            Err(StoreError::DuplicateSlug(_)) => {
                // Written by someone outside this run since the slugs were loaded.
                known.insert(slug.to_string());
                ResolutionOutcome::Skipped {
                    existing_slug: slug.to_string(),
                }
            }
            Err(e) => {
                error!(name, slug, provider = provider.name, "Failed to record board: {e}");
                ResolutionOutcome::ProbeError {
                    slug: slug.to_string(),
                    provider: provider.name.to_string(),
                    cause: e.to_string(),
                }
            }
        }
    }

    /// Resolves every name, `plan.size` at a time.
    pub async fn resolve_all(
        &self,
        names: &[String],
        plan: BatchPlan,
        on_batch: impl FnMut(&[Resolution], usize, usize),
    ) -> Vec<Resolution> {
        run_in_batches(
            names,
            plan,
            |name| async move {
                Resolution {
                    name: name.clone(),
                    outcome: self.resolve(name).await,
                }
            },
            on_batch,
        )
        .await
    }

    /// Searches for a live board for a record whose current URL is dead and
    /// moves the record there.
    ///
    /// The record's own (provider, slug) pair is not retried. Slugs held by
    /// other records are passed over rather than ending the search.
    pub async fn relocate(&self, record: &CompanyRow) -> Result<Option<Relocation>, StoreError> {
        let candidates = slug::candidates_for(&record.name);

        for provider in &self.config.providers {
            for slug in &candidates {
                if *slug == record.slug && provider.name.eq_ignore_ascii_case(&record.source) {
                    continue;
                }
                if *slug != record.slug && self.is_known(slug).await {
                    continue;
                }

                let url = provider.url_for(slug);
                if self.prober.probe(&url, provider.classifier.as_ref()).await != Presence::Present {
                    continue;
                }

                let mut known = self.known_slugs.lock().await;
                if *slug != record.slug && known.contains(slug) {
                    continue;
                }

                let relocation = Relocation {
                    slug: slug.clone(),
                    url,
                    source: provider.name.to_string(),
                };
                self.sink
                    .update_link(record.id, &LinkUpdate::relocate(relocation.clone()))
                    .await?;

                known.remove(&record.slug);
                known.insert(slug.clone());
                info!(
                    name = %record.name,
                    from = %record.url,
                    to = %relocation.url,
                    "Relocated record"
                );
                return Ok(Some(relocation));
            }
        }

        Ok(None)
    }
}
