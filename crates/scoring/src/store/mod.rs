//! Content store abstraction
//!
//! The scoring service reads items, judgements and tags through
//! [`ContentStore`]. Two implementations ship with the crate:
//! [`InMemoryStore`] for tests and database-less runs, and [`PgContentStore`]
//! backed by PostgreSQL.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{PgContentStore, MIGRATOR};

use async_trait::async_trait;
use std::collections::HashSet;

use programmer_helper_core::{
    ContentItem, ContentKind, ItemId, NewItem, NewOpinion, NewScope, NewTag, Opinion, Result,
    Scope, Tag, TagId, UserId,
};

use crate::annotate::AnnotatedItem;
use crate::related::RelatedSubject;

/// Persistence operations needed by the scoring service
///
/// Listings return items in ascending id order. Writes validate their input
/// and report a duplicate (user, item) judgement as
/// [`HelperError::Conflict`](programmer_helper_core::HelperError::Conflict).
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch one item; `NotFound` when missing
    async fn get_item(&self, id: ItemId) -> Result<ContentItem>;

    async fn list_items(&self, kind: ContentKind) -> Result<Vec<ContentItem>>;

    async fn get_opinions(&self, item: ItemId) -> Result<Vec<(UserId, bool)>>;

    async fn get_scopes(&self, item: ItemId) -> Result<Vec<(UserId, i32)>>;

    async fn get_tags(&self, item: ItemId) -> Result<HashSet<TagId>>;

    /// Every item of `kind` with marks, ratings and counts computed in bulk
    async fn annotate_kind(&self, kind: ContentKind) -> Result<Vec<AnnotatedItem>>;

    /// A single item with its annotations
    async fn annotate_item(&self, id: ItemId) -> Result<AnnotatedItem>;

    /// Tag sets and categories of every item of `kind`
    async fn related_subjects(&self, kind: ContentKind) -> Result<Vec<RelatedSubject>>;

    async fn insert_item(&self, item: NewItem) -> Result<ContentItem>;

    /// Create a tag; a duplicate name is a conflict
    async fn insert_tag(&self, tag: NewTag) -> Result<Tag>;

    async fn attach_tag(&self, item: ItemId, tag: TagId) -> Result<()>;

    async fn add_comment(&self, item: ItemId, author: UserId, body: &str) -> Result<()>;

    async fn add_link(&self, item: ItemId, url: &str) -> Result<()>;

    async fn add_subsection(&self, item: ItemId, title: &str) -> Result<()>;

    async fn add_opinion(&self, opinion: NewOpinion) -> Result<Opinion>;

    async fn add_scope(&self, scope: NewScope) -> Result<Scope>;
}

pub(crate) fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(programmer_helper_core::HelperError::validation_field(
            format!("{} must not be empty", field),
            field,
        ))
    } else {
        Ok(())
    }
}
