//! Scoring service
//!
//! Ties the store to the pure scoring modules. HTTP handlers and the binary
//! talk to [`ScoringService`] only.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use programmer_helper_core::{
    ContentKind, DomainEvent, EventBus, HelperError, ItemId, JudgementKind, NewOpinion, NewScope,
    Opinion, Result, Scope, UserId,
};

use crate::aggregate;
use crate::annotate::{self, AnnotatedItem, SortKey};
use crate::classify::{QualityLabel, SizeLabel};
use crate::config::ScoringConfig;
use crate::related::{rank_related, RelatedItem};
use crate::store::ContentStore;

#[derive(Clone)]
pub struct ScoringService {
    store: Arc<dyn ContentStore>,
    events: EventBus,
    config: ScoringConfig,
}

impl ScoringService {
    pub fn new(store: Arc<dyn ContentStore>, events: EventBus) -> Self {
        Self {
            store,
            events,
            config: ScoringConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ScoringConfig) -> Self {
        self.config = config;
        self
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Marks, rating, counts and labels of one item
    #[instrument(skip(self))]
    pub async fn item_scores(&self, id: ItemId) -> Result<AnnotatedItem> {
        self.store.annotate_item(id).await
    }

    /// Mark of one item computed from its opinions
    #[instrument(skip(self))]
    pub async fn item_mark(&self, id: ItemId) -> Result<i64> {
        let item = self.store.get_item(id).await?;
        item.kind.require_judgement(JudgementKind::Opinion)?;
        let opinions = self.store.get_opinions(id).await?;
        Ok(aggregate::mark(opinions.into_iter().map(|(_, useful)| useful)))
    }

    /// Rating of one item computed from its scopes
    #[instrument(skip(self))]
    pub async fn item_rating(&self, id: ItemId) -> Result<Option<f64>> {
        let item = self.store.get_item(id).await?;
        item.kind.require_judgement(JudgementKind::Scope)?;
        let scopes = self.store.get_scopes(id).await?;
        Ok(aggregate::rating(scopes.into_iter().map(|(_, scope)| scope)))
    }

    /// All items of a kind, annotated and sorted
    #[instrument(skip(self))]
    pub async fn listing(&self, kind: ContentKind, sort: SortKey) -> Result<Vec<AnnotatedItem>> {
        let mut items = self.store.annotate_kind(kind).await?;
        annotate::sort_items(&mut items, sort);
        debug!(count = items.len(), "Listing built");
        Ok(items)
    }

    #[instrument(skip(self))]
    pub async fn by_rating(
        &self,
        kind: ContentKind,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Vec<AnnotatedItem>> {
        kind.require_judgement(JudgementKind::Scope)?;
        let items = self.store.annotate_kind(kind).await?;
        annotate::items_by_rating(items, min, max)
    }

    #[instrument(skip(self))]
    pub async fn by_marks(
        &self,
        kind: ContentKind,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Result<Vec<AnnotatedItem>> {
        kind.require_judgement(JudgementKind::Opinion)?;
        let items = self.store.annotate_kind(kind).await?;
        annotate::items_by_marks(items, min, max)
    }

    #[instrument(skip(self))]
    pub async fn popular(&self, kind: ContentKind) -> Result<Vec<AnnotatedItem>> {
        kind.require_judgement(JudgementKind::Scope)?;
        Ok(annotate::popular(self.store.annotate_kind(kind).await?))
    }

    #[instrument(skip(self))]
    pub async fn hot(&self, kind: ContentKind) -> Result<Vec<AnnotatedItem>> {
        Ok(annotate::hot(self.store.annotate_kind(kind).await?))
    }

    #[instrument(skip(self))]
    pub async fn big_books(&self) -> Result<Vec<AnnotatedItem>> {
        Ok(annotate::big(self.store.annotate_kind(ContentKind::Book).await?))
    }

    #[instrument(skip(self))]
    pub async fn books_by_size(&self, label: SizeLabel) -> Result<Vec<AnnotatedItem>> {
        Ok(annotate::by_size(
            self.store.annotate_kind(ContentKind::Book).await?,
            label,
        ))
    }

    /// Items of the same kind ranked by tag and category overlap
    #[instrument(skip(self))]
    pub async fn related(&self, id: ItemId, limit: Option<usize>) -> Result<Vec<RelatedItem>> {
        let item = self.store.get_item(id).await?;
        let pool = self.store.related_subjects(item.kind).await?;
        let subject = pool
            .iter()
            .find(|candidate| candidate.id == id)
            .cloned()
            .ok_or_else(|| HelperError::not_found("item", id))?;

        let limit = self.config.related_limit(limit);
        let ranked = rank_related(&subject, &pool, Some(limit));
        debug!(candidates = pool.len(), returned = ranked.len(), "Related items ranked");
        Ok(ranked)
    }

    #[instrument(skip(self))]
    pub async fn record_opinion(&self, opinion: NewOpinion) -> Result<Opinion> {
        let stored = self.store.add_opinion(opinion).await?;
        info!(item = %stored.item, user = %stored.user, "Opinion recorded");
        self.publish(DomainEvent::judgement_recorded(stored.item, stored.user))
            .await;
        Ok(stored)
    }

    #[instrument(skip(self))]
    pub async fn record_scope(&self, scope: NewScope) -> Result<Scope> {
        let stored = self.store.add_scope(scope).await?;
        info!(item = %stored.item, user = %stored.user, scope = stored.scope, "Scope recorded");
        self.publish(DomainEvent::judgement_recorded(stored.item, stored.user))
            .await;
        Ok(stored)
    }

    /// Quality label of a solution
    #[instrument(skip(self))]
    pub async fn quality(&self, id: ItemId) -> Result<QualityLabel> {
        let annotated = self.store.annotate_item(id).await?;
        annotated.quality().ok_or_else(|| {
            HelperError::validation_field(
                format!("Item {} is a {}, not a solution", id, annotated.item.kind),
                "kind",
            )
        })
    }

    /// Size label of a book
    #[instrument(skip(self))]
    pub async fn size(&self, id: ItemId) -> Result<SizeLabel> {
        let item = self.store.get_item(id).await?;
        if item.kind != ContentKind::Book {
            return Err(HelperError::validation_field(
                format!("Item {} is a {}, not a book", id, item.kind),
                "kind",
            ));
        }
        item.pages
            .map(SizeLabel::from_pages)
            .ok_or_else(|| HelperError::Internal(format!("Book {} has no page count", id)))
    }

    /// Announce a new account to the registered event handlers
    #[instrument(skip(self))]
    pub async fn announce_account(&self, user: UserId, username: &str) -> Result<()> {
        if username.trim().is_empty() {
            return Err(HelperError::validation_field(
                "Username is required",
                "username",
            ));
        }
        self.publish(DomainEvent::account_created(user, username))
            .await;
        Ok(())
    }

    async fn publish(&self, event: DomainEvent) {
        let failures = self.events.publish(event).await;
        if failures > 0 {
            warn!(failures, "Some event handlers failed");
        }
    }
}
