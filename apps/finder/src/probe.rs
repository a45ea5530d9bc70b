//! Provider prober — bounded-retry existence check for one candidate URL.
//!
//! Transport failures (connection errors, per-attempt timeouts) are retried
//! with linear backoff; once the retries run out the URL counts as `Absent`.
//! A completed HTTP exchange is never retried: non-200 is `Absent`, a 200 is
//! handed to the provider's classifier.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};

use crate::providers::DeadPageClassifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Present,
    Absent,
}

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection failed: {0}")]
    Connect(String),
}

/// Raw GET seam. The prober owns retries and timeouts; a fetcher makes one attempt.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// `PageFetcher` backed by a shared reqwest client.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_connect() {
                FetchError::Connect(e.to_string())
            } else {
                FetchError::Http(e)
            }
        })?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(FetchedPage { status, body })
    }
}

/// Bounded-retry prober shared by the resolver and the validation pass.
#[derive(Clone)]
pub struct Prober {
    fetcher: Arc<dyn PageFetcher>,
    retries: u32,
    timeout: Duration,
    backoff: Duration,
}

impl Prober {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        retries: u32,
        timeout: Duration,
        backoff: Duration,
    ) -> Self {
        Self {
            fetcher,
            retries: retries.max(1),
            timeout,
            backoff,
        }
    }

    /// Never fails: exhausting the retries is reported as `Absent`.
    pub async fn probe(&self, url: &str, classifier: &dyn DeadPageClassifier) -> Presence {
        for attempt in 1..=self.retries {
            let outcome = match tokio::time::timeout(self.timeout, self.fetcher.get(url)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(page) => return classify(&page, classifier),
                Err(e) if attempt < self.retries => {
                    // Linear backoff: 1x, 2x, 3x ...
                    let delay = self.backoff * attempt;
                    warn!(
                        url,
                        attempt,
                        error = %e,
                        "Probe attempt failed, retrying after {}ms",
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(url, attempts = self.retries, error = %e, "Probe gave up, treating as absent");
                }
            }
        }

        Presence::Absent
    }
}

fn classify(page: &FetchedPage, classifier: &dyn DeadPageClassifier) -> Presence {
    if page.status != 200 {
        debug!(status = page.status, "Non-200 response");
        return Presence::Absent;
    }
    if classifier.is_dead(page.status, &page.body) {
        Presence::Absent
    } else {
        Presence::Present
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    /// One scripted reply. `Hang` never completes, so the prober's timeout fires.
    #[derive(Debug, Clone)]
    pub enum Reply {
        Page(u16, &'static str),
        Refused,
        Hang,
    }

    /// Fetcher that plays back scripted replies per URL and records every call.
    /// URLs without a script answer with a 404.
    #[derive(Default)]
    pub struct ScriptedFetcher {
        scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
        calls: Mutex<Vec<(String, tokio::time::Instant)>>,
        yields: bool,
    }

    impl ScriptedFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on(self, url: &str, replies: Vec<Reply>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(url.to_string(), replies.into());
            self
        }

        /// Yields to the scheduler once per call before replying, so futures
        /// joined together interleave at every fetch.
        pub fn yielding(mut self) -> Self {
            self.yields = true;
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(u, _)| u.clone()).collect()
        }

        pub fn call_times(&self) -> Vec<tokio::time::Instant> {
            self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
        }
    }

    #[async_trait]
    impl PageFetcher for ScriptedFetcher {
        async fn get(&self, url: &str) -> Result<FetchedPage, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), tokio::time::Instant::now()));
            if self.yields {
                tokio::task::yield_now().await;
            }

            let reply = {
                let mut scripts = self.scripts.lock().unwrap();
                match scripts.get_mut(url) {
                    // The last reply repeats once the script runs dry.
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            };

            match reply {
                Some(Reply::Page(status, body)) => Ok(FetchedPage {
                    status,
                    body: body.to_string(),
                }),
                Some(Reply::Refused) => Err(FetchError::Connect("connection refused".into())),
                Some(Reply::Hang) => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                None => Ok(FetchedPage {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }
}
