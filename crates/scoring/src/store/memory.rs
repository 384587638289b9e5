//! In-memory content store

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use programmer_helper_core::validation::validate_link;
use programmer_helper_core::{
    ContentItem, ContentKind, HelperError, ItemId, NewItem, NewOpinion, NewScope, NewTag, Opinion,
    Result, Scope, Tag, TagId, UserId,
};

use super::{require_text, ContentStore};
use crate::annotate::{annotate, AnnotatedItem, AnnotationRow};
use crate::related::RelatedSubject;

#[derive(Default)]
struct State {
    next_item: i64,
    next_tag: i64,
    items: BTreeMap<ItemId, ContentItem>,
    tags: BTreeMap<TagId, Tag>,
    item_tags: BTreeMap<ItemId, BTreeSet<TagId>>,
    opinions: Vec<Opinion>,
    scopes: Vec<Scope>,
    comments: Vec<(ItemId, UserId, String)>,
    links: Vec<(ItemId, String)>,
    subsections: Vec<(ItemId, String)>,
}

impl State {
    fn item(&self, id: ItemId) -> Result<&ContentItem> {
        self.items
            .get(&id)
            .ok_or_else(|| HelperError::not_found("item", id))
    }

    /// Flat rows of every judgement, tag and child record
    fn rows(&self) -> impl Iterator<Item = AnnotationRow> + '_ {
        let opinions = self.opinions.iter().map(|o| AnnotationRow::Opinion {
            item: o.item,
            is_useful: o.is_useful,
        });
        let scopes = self.scopes.iter().map(|s| AnnotationRow::Scope {
            item: s.item,
            scope: s.scope,
        });
        let tags = self
            .item_tags
            .iter()
            .flat_map(|(item, tags)| tags.iter().map(move |_| AnnotationRow::Tag { item: *item }));
        let comments = self
            .comments
            .iter()
            .map(|(item, _, _)| AnnotationRow::Comment { item: *item });
        let links = self
            .links
            .iter()
            .map(|(item, _)| AnnotationRow::Link { item: *item });
        let subsections = self
            .subsections
            .iter()
            .map(|(item, _)| AnnotationRow::Subsection { item: *item });

        opinions
            .chain(scopes)
            .chain(tags)
            .chain(comments)
            .chain(links)
            .chain(subsections)
    }
}

/// Content store kept in process memory
///
/// Ids are assigned sequentially from 1, so ascending id is insertion order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn get_item(&self, id: ItemId) -> Result<ContentItem> {
        self.state.read().await.item(id).cloned()
    }

    async fn list_items(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        Ok(self
            .state
            .read()
            .await
            .items
            .values()
            .filter(|item| item.kind == kind)
            .cloned()
            .collect())
    }

    async fn get_opinions(&self, item: ItemId) -> Result<Vec<(UserId, bool)>> {
        let state = self.state.read().await;
        state.item(item)?;
        Ok(state
            .opinions
            .iter()
            .filter(|o| o.item == item)
            .map(|o| (o.user, o.is_useful))
            .collect())
    }

    async fn get_scopes(&self, item: ItemId) -> Result<Vec<(UserId, i32)>> {
        let state = self.state.read().await;
        state.item(item)?;
        Ok(state
            .scopes
            .iter()
            .filter(|s| s.item == item)
            .map(|s| (s.user, s.scope))
            .collect())
    }

    async fn get_tags(&self, item: ItemId) -> Result<HashSet<TagId>> {
        let state = self.state.read().await;
        state.item(item)?;
        Ok(state
            .item_tags
            .get(&item)
            .map(|tags| tags.iter().copied().collect())
            .unwrap_or_default())
    }

    async fn annotate_kind(&self, kind: ContentKind) -> Result<Vec<AnnotatedItem>> {
        let state = self.state.read().await;
        let items: Vec<ContentItem> = state
            .items
            .values()
            .filter(|item| item.kind == kind)
            .cloned()
            .collect();
        debug!(kind = %kind, items = items.len(), "Annotating in memory");
        Ok(annotate(items, state.rows()))
    }

    async fn annotate_item(&self, id: ItemId) -> Result<AnnotatedItem> {
        let state = self.state.read().await;
        let item = state.item(id)?.clone();
        let rows = state.rows().filter(|row| row.item() == id);
        annotate(vec![item], rows)
            .pop()
            .ok_or_else(|| HelperError::Internal(format!("annotation of item {} was empty", id)))
    }

    async fn related_subjects(&self, kind: ContentKind) -> Result<Vec<RelatedSubject>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .values()
            .filter(|item| item.kind == kind)
            .map(|item| {
                let tags = state
                    .item_tags
                    .get(&item.id)
                    .into_iter()
                    .flatten()
                    .copied();
                RelatedSubject {
                    id: item.id,
                    tags: tags.collect(),
                    category: item.category.clone(),
                }
            })
            .collect())
    }

    async fn insert_item(&self, item: NewItem) -> Result<ContentItem> {
        item.check()?;
        let mut state = self.state.write().await;
        state.next_item += 1;
        let stored = item.into_item(ItemId(state.next_item));
        state.items.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn insert_tag(&self, tag: NewTag) -> Result<Tag> {
        tag.check()?;
        let mut state = self.state.write().await;
        if state.tags.values().any(|t| t.name == tag.name) {
            return Err(HelperError::Conflict {
                message: format!("Tag '{}' already exists", tag.name),
            });
        }
        state.next_tag += 1;
        let stored = tag.into_tag(TagId(state.next_tag));
        state.tags.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn attach_tag(&self, item: ItemId, tag: TagId) -> Result<()> {
        let mut state = self.state.write().await;
        state.item(item)?;
        if !state.tags.contains_key(&tag) {
            return Err(HelperError::not_found("tag", tag));
        }
        if !state.item_tags.entry(item).or_default().insert(tag) {
            return Err(HelperError::Conflict {
                message: format!("Tag {} is already attached to item {}", tag, item),
            });
        }
        Ok(())
    }

    async fn add_comment(&self, item: ItemId, author: UserId, body: &str) -> Result<()> {
        require_text(body, "body")?;
        let mut state = self.state.write().await;
        state.item(item)?;
        state.comments.push((item, author, body.to_string()));
        Ok(())
    }

    async fn add_link(&self, item: ItemId, url: &str) -> Result<()> {
        validate_link(url)?;
        let mut state = self.state.write().await;
        state.item(item)?;
        state.links.push((item, url.to_string()));
        Ok(())
    }

    async fn add_subsection(&self, item: ItemId, title: &str) -> Result<()> {
        require_text(title, "title")?;
        let mut state = self.state.write().await;
        state.item(item)?;
        state.subsections.push((item, title.to_string()));
        Ok(())
    }

    async fn add_opinion(&self, opinion: NewOpinion) -> Result<Opinion> {
        let mut state = self.state.write().await;
        opinion.check(state.item(opinion.item)?)?;

        if state
            .opinions
            .iter()
            .any(|o| o.user == opinion.user && o.item == opinion.item)
        {
            return Err(HelperError::Conflict {
                message: format!(
                    "User {} already left an opinion on item {}",
                    opinion.user, opinion.item
                ),
            });
        }

        let stored = opinion.into_opinion();
        state.opinions.push(stored.clone());
        Ok(stored)
    }

    async fn add_scope(&self, scope: NewScope) -> Result<Scope> {
        let mut state = self.state.write().await;
        scope.check(state.item(scope.item)?)?;

        if state
            .scopes
            .iter()
            .any(|s| s.user == scope.user && s.item == scope.item)
        {
            return Err(HelperError::Conflict {
                message: format!("User {} already scoped item {}", scope.user, scope.item),
            });
        }

        let stored = scope.into_scope();
        state.scopes.push(stored.clone());
        Ok(stored)
    }
}
