use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::errors::ConfigError;
use crate::providers::{self, Provider};

const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_BACKOFF_MS: u64 = 1_000;
const DEFAULT_BATCH_SIZE: usize = 5;
const DEFAULT_BATCH_DELAY_MS: u64 = 200;
const DEFAULT_PROVIDERS: &str = "ashby,lever,gem";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Only required when talking to Postgres; `--dry-run` runs without it.
    pub database_url: Option<String>,
    pub rust_log: String,
    pub probe_retries: u32,
    pub probe_timeout_ms: u64,
    pub probe_backoff_ms: u64,
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// Provider names in priority order.
    pub providers: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: std::env::var("DATABASE_URL").ok(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            probe_retries: env_or("PROBE_RETRIES", DEFAULT_RETRIES)?,
            probe_timeout_ms: env_or("PROBE_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            probe_backoff_ms: env_or("PROBE_BACKOFF_MS", DEFAULT_BACKOFF_MS)?,
            batch_size: env_or("BATCH_SIZE", DEFAULT_BATCH_SIZE)?,
            batch_delay_ms: env_or("BATCH_DELAY_MS", DEFAULT_BATCH_DELAY_MS)?,
            providers: parse_provider_list(
                &std::env::var("PROVIDERS").unwrap_or_else(|_| DEFAULT_PROVIDERS.to_string()),
            ),
        })
    }

    pub fn require_database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .context("Required environment variable 'DATABASE_URL' is not set (use --dry-run to skip the database)")
    }

    pub fn resolver_config(&self) -> Result<ResolverConfig, ConfigError> {
        let providers = self
            .providers
            .iter()
            .map(|name| providers::by_name(name))
            .collect::<Result<Vec<_>, _>>()?;

        ResolverConfig::new(
            self.probe_retries,
            Duration::from_millis(self.probe_timeout_ms),
            Duration::from_millis(self.probe_backoff_ms),
            providers,
        )
    }

    pub fn batch_plan(&self) -> Result<BatchPlan, ConfigError> {
        BatchPlan::new(self.batch_size, Duration::from_millis(self.batch_delay_ms))
    }
}

/// Everything the resolver needs, validated once at construction.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub retries: u32,
    pub timeout: Duration,
    pub backoff: Duration,
    pub providers: Vec<Provider>,
}

impl ResolverConfig {
    pub fn new(
        retries: u32,
        timeout: Duration,
        backoff: Duration,
        providers: Vec<Provider>,
    ) -> Result<Self, ConfigError> {
        if providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        if retries == 0 {
            return Err(ConfigError::ZeroRetries);
        }
        for (i, provider) in providers.iter().enumerate() {
            if providers[..i].iter().any(|p| p.name == provider.name) {
                return Err(ConfigError::DuplicateProvider(provider.name.to_string()));
            }
        }

        Ok(Self {
            retries,
            timeout,
            backoff,
            providers,
        })
    }

    /// Looks a provider up by its stored name, falling back to the
    /// highest-priority provider for names this build doesn't know.
    pub fn provider_or_default(&self, name: &str) -> &Provider {
        self.providers
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .unwrap_or(&self.providers[0])
    }
}

/// Batch size and inter-batch delay for concurrent passes.
#[derive(Debug, Clone, Copy)]
pub struct BatchPlan {
    pub size: usize,
    pub delay: Duration,
}

impl BatchPlan {
    pub fn new(size: usize, delay: Duration) -> Result<Self, ConfigError> {
        if size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        Ok(Self { size, delay })
    }
}

fn parse_provider_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn env_or<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ashby, gem, lever};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_empty_provider_list_rejected() {
        let err = ResolverConfig::new(3, ms(10_000), ms(1_000), vec![]).unwrap_err();
        assert_eq!(err, ConfigError::NoProviders);
    }

    #[test]
    fn test_zero_retries_rejected() {
        let err = ResolverConfig::new(0, ms(10_000), ms(1_000), vec![ashby()]).unwrap_err();
        assert_eq!(err, ConfigError::ZeroRetries);
    }

    #[test]
    fn test_duplicate_provider_rejected() {
        let err =
            ResolverConfig::new(3, ms(10_000), ms(1_000), vec![ashby(), lever(), ashby()])
                .unwrap_err();
        assert_eq!(err, ConfigError::DuplicateProvider("ashby".to_string()));
    }

    #[test]
    fn test_provider_order_preserved() {
        let config =
            ResolverConfig::new(3, ms(10_000), ms(1_000), vec![gem(), ashby()]).unwrap();
        let names: Vec<_> = config.providers.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["gem", "ashby"]);
    }

    #[test]
    fn test_provider_or_default_falls_back_to_first() {
        let config =
            ResolverConfig::new(3, ms(10_000), ms(1_000), vec![lever(), gem()]).unwrap();
        assert_eq!(config.provider_or_default("GEM").name, "gem");
        assert_eq!(config.provider_or_default("ashby_csv").name, "lever");
    }

    #[test]
    fn test_parse_provider_list_trims_and_lowercases() {
        assert_eq!(
            parse_provider_list(" Ashby, ,LEVER ,gem"),
            vec!["ashby", "lever", "gem"]
        );
    }

    #[test]
    fn test_resolver_config_from_unknown_provider_fails() {
        let config = Config {
            database_url: None,
            rust_log: "info".to_string(),
            probe_retries: 3,
            probe_timeout_ms: 10_000,
            probe_backoff_ms: 1_000,
            batch_size: 5,
            batch_delay_ms: 200,
            providers: vec!["ashby".to_string(), "workday".to_string()],
        };
        assert_eq!(
            config.resolver_config().unwrap_err(),
            ConfigError::UnknownProvider("workday".to_string())
        );
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert_eq!(
            BatchPlan::new(0, ms(200)).unwrap_err(),
            ConfigError::ZeroBatchSize
        );
    }
}
