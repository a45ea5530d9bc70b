//! Job-board providers — URL convention plus a dead-page classifier per backend.
//!
//! Each backend signals "no board here" differently: Ashby serves a 200 whose
//! embedded app data has a null organization, the others answer 404 or render
//! a not-found page. The prober only ever sees the `DeadPageClassifier`
//! capability, so no provider names leak into the retry machinery.

use std::fmt;
use std::sync::Arc;

use crate::errors::ConfigError;

/// Decides whether a fetched page means the board does not exist.
pub trait DeadPageClassifier: Send + Sync {
    fn is_dead(&self, status: u16, body: &str) -> bool;
}

/// One applicant-tracking-system backend.
#[derive(Clone)]
pub struct Provider {
    pub name: &'static str,
    pub base_url: String,
    pub classifier: Arc<dyn DeadPageClassifier>,
}

impl Provider {
    pub fn new(
        name: &'static str,
        base_url: impl Into<String>,
        classifier: Arc<dyn DeadPageClassifier>,
    ) -> Self {
        Self {
            name,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            classifier,
        }
    }

    /// `{base_url}/{slug}`, no query string.
    pub fn url_for(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url, slug)
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Ashby
// ────────────────────────────────────────────────────────────────────────────

pub const ASHBY_BASE_URL: &str = "https://jobs.ashbyhq.com";

/// Ashby renders every slug with a 200; unknown boards carry null
/// `organization` / `jobBoard` fields in the embedded `__appData` payload.
pub struct AshbyClassifier;

impl DeadPageClassifier for AshbyClassifier {
    fn is_dead(&self, _status: u16, body: &str) -> bool {
        body.contains(r#""organization":null"#) || body.contains(r#""jobBoard":null"#)
    }
}

pub fn ashby() -> Provider {
    Provider::new("ashby", ASHBY_BASE_URL, Arc::new(AshbyClassifier))
}

// ────────────────────────────────────────────────────────────────────────────
// Lever
// ────────────────────────────────────────────────────────────────────────────

pub const LEVER_BASE_URL: &str = "https://jobs.lever.co";

// Not yet confirmed against live responses.
const LEVER_NOT_FOUND_MARKERS: &[&str] = &["Page not found", "couldn't find"];

pub struct LeverClassifier;

impl DeadPageClassifier for LeverClassifier {
    fn is_dead(&self, status: u16, body: &str) -> bool {
        status == 404 || LEVER_NOT_FOUND_MARKERS.iter().any(|m| body.contains(m))
    }
}

pub fn lever() -> Provider {
    Provider::new("lever", LEVER_BASE_URL, Arc::new(LeverClassifier))
}

// ────────────────────────────────────────────────────────────────────────────
// Gem
// ────────────────────────────────────────────────────────────────────────────

pub const GEM_BASE_URL: &str = "https://jobs.gem.com";

// Not yet confirmed against live responses.
const GEM_NOT_FOUND_MARKERS: &[&str] = &[r#""jobBoard":null"#, "Job board not found"];

pub struct GemClassifier;

impl DeadPageClassifier for GemClassifier {
    fn is_dead(&self, status: u16, body: &str) -> bool {
        status == 404 || GEM_NOT_FOUND_MARKERS.iter().any(|m| body.contains(m))
    }
}

pub fn gem() -> Provider {
    Provider::new("gem", GEM_BASE_URL, Arc::new(GemClassifier))
}

/// Resolves a configured provider name to its built-in definition.
pub fn by_name(name: &str) -> Result<Provider, ConfigError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "ashby" => Ok(ashby()),
        "lever" => Ok(lever()),
        "gem" => Ok(gem()),
        other => Err(ConfigError::UnknownProvider(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ashby_null_organization_is_dead() {
        let body = r#"<script>window.__appData = {"organization":null,"jobBoard":null}</script>"#;
        assert!(AshbyClassifier.is_dead(200, body));
    }

    #[test]
    fn test_ashby_null_job_board_alone_is_dead() {
        let body = r#"{"organization":{"name":"Acme"},"jobBoard":null}"#;
        assert!(AshbyClassifier.is_dead(200, body));
    }

    #[test]
    fn test_ashby_real_board_is_alive() {
        let body = r#"{"organization":{"name":"Acme"},"jobBoard":{"id":"x"}}"#;
        assert!(!AshbyClassifier.is_dead(200, body));
    }

    #[test]
    fn test_lever_404_is_dead() {
        assert!(LeverClassifier.is_dead(404, ""));
        assert!(LeverClassifier.is_dead(200, "<h1>Page not found</h1>"));
        assert!(!LeverClassifier.is_dead(200, "<h1>Acme Jobs</h1>"));
    }

    #[test]
    fn test_gem_markers() {
        assert!(GemClassifier.is_dead(404, ""));
        assert!(GemClassifier.is_dead(200, "Job board not found"));
        assert!(!GemClassifier.is_dead(200, "<title>Acme careers</title>"));
    }

    #[test]
    fn test_url_for_joins_with_single_slash() {
        let provider = Provider::new("ashby", "https://jobs.ashbyhq.com/", Arc::new(AshbyClassifier));
        assert_eq!(provider.url_for("acme"), "https://jobs.ashbyhq.com/acme");
    }

    #[test]
    fn test_by_name_is_case_insensitive() {
        assert_eq!(by_name(" Lever ").unwrap().name, "lever");
        assert!(matches!(
            by_name("greenhouse"),
            Err(ConfigError::UnknownProvider(name)) if name == "greenhouse"
        ));
    }
}
