//! ProgrammerHelper scoring: marks, ratings, labels and related items
//! for community content, served over HTTP.

pub mod aggregate;
pub mod annotate;
pub mod classify;
pub mod config;
pub mod related;
pub mod server;
pub mod service;
pub mod store;

pub use aggregate::{mark, rating, MarkTally, ScopeTally};
pub use annotate::{
    annotate, items_by_marks, items_by_rating, AnnotatedItem, AnnotationRow, Annotations,
    ItemCounts, ScoreSummary, SortKey, BIG_MIN_PAGES, HOT_MIN_COMMENTS, POPULAR_MIN_RATING,
};
pub use classify::{QualityLabel, SizeLabel};
pub use config::{ScoringConfig, StorageBackend};
pub use related::{rank_related, RelatedItem, RelatedSubject};
pub use service::ScoringService;
pub use store::{ContentStore, InMemoryStore, PgContentStore};

use programmer_helper_core::{ConfigLoader, DatabaseConfig, DatabasePool, EventBus};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the content store selected by `config`
pub async fn init_store(config: &ScoringConfig) -> anyhow::Result<Arc<dyn ContentStore>> {
    let database = match config.storage.backend {
        StorageBackend::Memory => None,
        StorageBackend::Postgres => Some(DatabaseConfig::from_env()?),
        StorageBackend::Auto => match DatabaseConfig::from_env() {
            Ok(database) => Some(database),
            Err(e) => {
                warn!("No database configured ({}), keeping content in memory", e);
                None
            }
        },
    };

    let Some(database) = database else {
        return Ok(Arc::new(InMemoryStore::new()));
    };

    database.validate()?;
    let pool = DatabasePool::new(&database).await?;
    let store = PgContentStore::new(pool.pool().clone());

    if config.storage.run_migrations {
        store.migrate().await?;
        info!("Database migrations applied");
    }

    Ok(Arc::new(store))
}

/// Initialize the scoring service with its store and event bus
pub async fn init_service(config: ScoringConfig, events: EventBus) -> anyhow::Result<ScoringService> {
    let store = init_store(&config).await?;
    Ok(ScoringService::new(store, events).with_config(config))
}
