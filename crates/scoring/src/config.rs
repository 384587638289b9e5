use serde::{Deserialize, Serialize};

/// Scoring service settings
///
/// Bind address and database connection come from the shared
/// `PROGRAMMER_HELPER_*` loaders in the core crate; this covers what is
/// specific to scoring.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// Where content is kept
    pub storage: StorageConfig,

    /// Related-item listing limits
    pub related: RelatedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// PostgreSQL when a database URL is configured, memory otherwise
    Auto,
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelatedConfig {
    /// Items returned when the request has no `limit`
    pub default_limit: usize,

    /// Upper bound on a requested `limit`
    pub max_limit: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: StorageBackend::Auto,
                run_migrations: true,
            },
            related: RelatedConfig {
                default_limit: 5,
                max_limit: 50,
            },
        }
    }
}

impl ScoringConfig {
    /// Load configuration from defaults, `config/scoring.*` and `SCORING__*`
    /// environment variables, in that order
    pub fn load() -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::with_name("config/scoring").required(false))
            .add_source(config::Environment::with_prefix("SCORING").separator("__"))
            .build()?;

        let loaded: Self = settings.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.related.max_limit == 0 {
            anyhow::bail!("related.max_limit must be greater than 0");
        }
        if self.related.default_limit > self.related.max_limit {
            anyhow::bail!(
                "related.default_limit ({}) exceeds related.max_limit ({})",
                self.related.default_limit,
                self.related.max_limit
            );
        }
        Ok(())
    }

    /// Clamp a requested related-items limit to the configured bounds
    pub fn related_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.related.default_limit)
            .min(self.related.max_limit)
    }
}
