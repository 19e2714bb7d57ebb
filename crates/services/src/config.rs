use std::time::Duration;

use nutri_core::model::REVIEW_LOG_CAPACITY;

use crate::error::ConfigError;

pub const DEFAULT_DB_URL: &str = "sqlite://nutriduo.sqlite3?mode=rwc";
pub const DEFAULT_FEEDBACK_DELAY: Duration = Duration::from_millis(500);

const DB_URL_VAR: &str = "NUTRI_DB_URL";
const FEEDBACK_DELAY_VAR: &str = "NUTRI_FEEDBACK_DELAY_MS";
const REVIEW_CAPACITY_VAR: &str = "NUTRI_REVIEW_CAPACITY";
const SEED_VAR: &str = "NUTRI_SEED";

/// Runtime settings for the services layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicesConfig {
    db_url: String,
    feedback_delay: Duration,
    review_capacity: usize,
    seed: Option<u64>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.to_owned(),
            feedback_delay: DEFAULT_FEEDBACK_DELAY,
            review_capacity: REVIEW_LOG_CAPACITY,
            seed: None,
        }
    }
}

impl ServicesConfig {
    /// Read settings from `NUTRI_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    ///
    /// Unset or blank variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = read(DB_URL_VAR) {
            config.db_url = url.trim().to_owned();
        }
        if let Some(raw) = read(FEEDBACK_DELAY_VAR) {
            let millis = parse_number(FEEDBACK_DELAY_VAR, &raw)?;
            config.feedback_delay = Duration::from_millis(millis);
        }
        if let Some(raw) = read(REVIEW_CAPACITY_VAR) {
            let capacity = parse_number(REVIEW_CAPACITY_VAR, &raw)?;
            if capacity == 0 {
                return Err(ConfigError::ZeroCapacity {
                    name: REVIEW_CAPACITY_VAR,
                });
            }
            config.review_capacity =
                usize::try_from(capacity).map_err(|_| ConfigError::InvalidValue {
                    name: REVIEW_CAPACITY_VAR,
                    raw: raw.clone(),
                })?;
        }
        if let Some(raw) = read(SEED_VAR) {
            config.seed = Some(parse_number(SEED_VAR, &raw)?);
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_db_url(mut self, db_url: impl Into<String>) -> Self {
        self.db_url = db_url.into();
        self
    }

    #[must_use]
    pub fn with_feedback_delay(mut self, delay: Duration) -> Self {
        self.feedback_delay = delay;
        self
    }

    /// Override the review log capacity. Zero is raised to one.
    #[must_use]
    pub fn with_review_capacity(mut self, capacity: usize) -> Self {
        self.review_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn db_url(&self) -> &str {
        &self.db_url
    }

    #[must_use]
    pub fn feedback_delay(&self) -> Duration {
        self.feedback_delay
    }

    #[must_use]
    pub fn review_capacity(&self) -> usize {
        self.review_capacity
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

fn parse_number(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            name,
            raw: raw.to_owned(),
        })
}
