//! Queue configuration structures.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, RateLimit};

/// Rate-limit settings: at most `count` transactions per `duration_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Transactions allowed per window.
    pub count: u32,
    /// Window length in milliseconds.
    pub duration_ms: u64,
}

impl RateLimitConfig {
    /// Window length.
    pub const fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Validate rate-limit values.
    pub fn validate(&self) -> Result<(), String> {
        if self.count == 0 {
            return Err("rate_limit.count must be greater than 0".into());
        }
        if self.duration_ms == 0 {
            return Err("rate_limit.duration_ms must be greater than 0".into());
        }
        Ok(())
    }
}

impl From<RateLimitConfig> for RateLimit {
    fn from(cfg: RateLimitConfig) -> Self {
        Self::new(cfg.count, cfg.duration())
    }
}

/// Transaction queue configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Label used in logs. A random one is generated when absent.
    pub name: Option<String>,
    /// Maximum transactions per batch.
    pub concurrency: usize,
    /// Start the processing loop at construction.
    pub auto_start: bool,
    /// Pause between batches in milliseconds.
    pub delay_ms: u64,
    /// Optional fixed-window rate limit.
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: None,
            concurrency: 1,
            auto_start: true,
            delay_ms: 0,
            rate_limit: None,
        }
    }
}

impl QueueConfig {
    /// Default configuration: one transaction per batch, no delay, no rate
    /// limit, auto-start enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the log label.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the batch size.
    #[must_use]
    pub const fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enable or disable starting the loop at construction.
    #[must_use]
    pub const fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Set the inter-batch delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Limit dispatch to `count` transactions per `duration`.
    #[must_use]
    pub fn with_rate_limit(mut self, count: u32, duration: Duration) -> Self {
        self.rate_limit = Some(RateLimitConfig {
            count,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });
        self
    }

    /// Inter-batch delay.
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be greater than 0".into());
        }
        if let Some(limit) = &self.rate_limit {
            limit.validate()?;
        }
        Ok(())
    }

    /// Parse queue configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from `TXQ_*` environment variables, reading a
    /// `.env` file first if one exists. Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Fails when a variable does not parse, when only one of the two
    /// rate-limit variables is set, or when the result does not validate.
    pub fn from_env() -> AppResult<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err).context("failed to load .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<L>(lookup: L) -> AppResult<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(name) = lookup("TXQ_NAME").filter(|n| !n.trim().is_empty()) {
            cfg.name = Some(name.trim().to_string());
        }
        if let Some(concurrency) = parse_var(&lookup, "TXQ_CONCURRENCY")? {
            cfg.concurrency = concurrency;
        }
        if let Some(auto_start) = parse_var(&lookup, "TXQ_AUTO_START")? {
            cfg.auto_start = auto_start;
        }
        if let Some(delay_ms) = parse_var(&lookup, "TXQ_DELAY_MS")? {
            cfg.delay_ms = delay_ms;
        }

        let count: Option<u32> = parse_var(&lookup, "TXQ_RATE_LIMIT_COUNT")?;
        let duration_ms: Option<u64> = parse_var(&lookup, "TXQ_RATE_LIMIT_DURATION_MS")?;
        cfg.rate_limit = match (count, duration_ms) {
            (Some(count), Some(duration_ms)) => Some(RateLimitConfig { count, duration_ms }),
            (None, None) => None,
            _ => bail!("TXQ_RATE_LIMIT_COUNT and TXQ_RATE_LIMIT_DURATION_MS must be set together"),
        };

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }
}

fn parse_var<L, V>(lookup: &L, key: &str) -> AppResult<Option<V>>
where
    L: Fn(&str) -> Option<String>,
    V: FromStr,
    V::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<V>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))
        })
        .transpose()
}
