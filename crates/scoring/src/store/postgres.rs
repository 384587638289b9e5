//! PostgreSQL content store

use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, instrument};

use programmer_helper_core::validation::validate_link;
use programmer_helper_core::{
    is_foreign_key_violation, is_unique_violation, ContentItem, ContentKind, HelperError, ItemId,
    NewItem, NewOpinion, NewScope, NewTag, Opinion, Result, Scope, Tag, TagId, UserId,
};

use super::{require_text, ContentStore};
use crate::aggregate::{MarkTally, ScopeTally};
use crate::annotate::{AnnotatedItem, Annotations};
use crate::related::RelatedSubject;

/// Embedded schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// One row per item; judgements and child records are reduced by per-table
/// GROUP BY subqueries so the whole collection is annotated in one statement.
const ANNOTATE_SELECT: &str = r#"
    SELECT i.id, i.kind, i.title, i.author_id, i.category, i.pages, i.created_at,
           COALESCE(o.useful, 0) AS useful,
           COALESCE(o.not_useful, 0) AS not_useful,
           COALESCE(s.scope_sum, 0) AS scope_sum,
           COALESCE(s.scope_count, 0) AS scope_count,
           COALESCE(t.n, 0) AS count_tags,
           COALESCE(c.n, 0) AS count_comments,
           COALESCE(l.n, 0) AS count_links,
           COALESCE(ss.n, 0) AS count_subsections
    FROM items i
    LEFT JOIN (
        SELECT item_id,
               SUM(CASE WHEN is_useful THEN 1 ELSE 0 END)::BIGINT AS useful,
               SUM(CASE WHEN is_useful THEN 0 ELSE 1 END)::BIGINT AS not_useful
        FROM opinions GROUP BY item_id
    ) o ON o.item_id = i.id
    LEFT JOIN (
        SELECT item_id, SUM(scope)::BIGINT AS scope_sum, COUNT(*) AS scope_count
        FROM scopes GROUP BY item_id
    ) s ON s.item_id = i.id
    LEFT JOIN (SELECT item_id, COUNT(*) AS n FROM item_tags GROUP BY item_id) t
        ON t.item_id = i.id
    LEFT JOIN (SELECT item_id, COUNT(*) AS n FROM comments GROUP BY item_id) c
        ON c.item_id = i.id
    LEFT JOIN (SELECT item_id, COUNT(*) AS n FROM links GROUP BY item_id) l
        ON l.item_id = i.id
    LEFT JOIN (SELECT item_id, COUNT(*) AS n FROM subsections GROUP BY item_id) ss
        ON ss.item_id = i.id
"#;

const ITEM_COLUMNS: &str = "id, kind, title, author_id, category, pages, created_at";

/// Content store backed by PostgreSQL
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded schema
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| HelperError::Internal(format!("Migration failed: {}", e)))
    }

    fn item_from_row(row: &PgRow) -> Result<ContentItem> {
        let kind: String = row.try_get("kind")?;
        Ok(ContentItem {
            id: ItemId(row.try_get("id")?),
            kind: kind.parse()?,
            title: row.try_get("title")?,
            author: UserId(row.try_get("author_id")?),
            category: row.try_get("category")?,
            pages: row.try_get("pages")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn annotated_from_row(row: &PgRow) -> Result<AnnotatedItem> {
        let item = Self::item_from_row(row)?;
        let mut annotations = Annotations::empty_for(item.kind);

        if annotations.opinions.is_some() {
            annotations.opinions = Some(MarkTally {
                useful: row.try_get("useful")?,
                not_useful: row.try_get("not_useful")?,
            });
        }
        if annotations.scopes.is_some() {
            annotations.scopes = Some(ScopeTally::from_parts(
                row.try_get("scope_sum")?,
                row.try_get("scope_count")?,
            ));
        }
        annotations.count_tags = Some(count(row, "count_tags")?);
        annotations.count_comments = Some(count(row, "count_comments")?);
        annotations.count_links = Some(count(row, "count_links")?);
        annotations.count_subsections = Some(count(row, "count_subsections")?);

        Ok(AnnotatedItem { item, annotations })
    }

    async fn ensure_item(&self, id: ItemId) -> Result<()> {
        self.get_item(id).await.map(|_| ())
    }
}

fn count(row: &PgRow, column: &str) -> Result<usize> {
    let n: i64 = row.try_get(column)?;
    usize::try_from(n).map_err(|_| HelperError::Internal(format!("negative {} ({})", column, n)))
}

fn write_error(err: sqlx::Error, conflict: impl FnOnce() -> String) -> HelperError {
    if is_unique_violation(&err) {
        HelperError::Conflict {
            message: conflict(),
        }
    } else {
        HelperError::DatabaseError(err)
    }
}

#[async_trait]
impl ContentStore for PgContentStore {
    #[instrument(skip(self))]
    async fn get_item(&self, id: ItemId) -> Result<ContentItem> {
        let sql = format!("SELECT {} FROM items WHERE id = $1", ITEM_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HelperError::not_found("item", id))?;
        Self::item_from_row(&row)
    }

    async fn list_items(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        let sql = format!(
            "SELECT {} FROM items WHERE kind = $1 ORDER BY id",
            ITEM_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::item_from_row).collect()
    }

    async fn get_opinions(&self, item: ItemId) -> Result<Vec<(UserId, bool)>> {
        self.ensure_item(item).await?;
        let rows = sqlx::query("SELECT user_id, is_useful FROM opinions WHERE item_id = $1 ORDER BY id")
            .bind(item.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| -> Result<(UserId, bool)> {
                Ok((UserId(r.try_get("user_id")?), r.try_get("is_useful")?))
            })
            .collect()
    }

    async fn get_scopes(&self, item: ItemId) -> Result<Vec<(UserId, i32)>> {
        self.ensure_item(item).await?;
        let rows = sqlx::query("SELECT user_id, scope FROM scopes WHERE item_id = $1 ORDER BY id")
            .bind(item.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| -> Result<(UserId, i32)> {
                Ok((UserId(r.try_get("user_id")?), r.try_get("scope")?))
            })
            .collect()
    }

    async fn get_tags(&self, item: ItemId) -> Result<HashSet<TagId>> {
        self.ensure_item(item).await?;
        let rows = sqlx::query("SELECT tag_id FROM item_tags WHERE item_id = $1")
            .bind(item.0)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(|r| -> Result<TagId> { Ok(TagId(r.try_get("tag_id")?)) })
            .collect()
    }

    #[instrument(skip(self))]
    async fn annotate_kind(&self, kind: ContentKind) -> Result<Vec<AnnotatedItem>> {
        let sql = format!("{} WHERE i.kind = $1 ORDER BY i.id", ANNOTATE_SELECT);
        let rows = sqlx::query(&sql)
            .bind(kind.as_str())
            .fetch_all(&self.pool)
            .await?;
        debug!(rows = rows.len(), "Annotated items in bulk");
        rows.iter().map(Self::annotated_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn annotate_item(&self, id: ItemId) -> Result<AnnotatedItem> {
        let sql = format!("{} WHERE i.id = $1", ANNOTATE_SELECT);
        let row = sqlx::query(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| HelperError::not_found("item", id))?;
        Self::annotated_from_row(&row)
    }

    async fn related_subjects(&self, kind: ContentKind) -> Result<Vec<RelatedSubject>> {
        let rows = sqlx::query(
            r#"
            SELECT i.id, i.category, t.tag_id
            FROM items i
            LEFT JOIN item_tags t ON t.item_id = i.id
            WHERE i.kind = $1
            ORDER BY i.id
            "#,
        )
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut subjects: BTreeMap<ItemId, RelatedSubject> = BTreeMap::new();
        for row in &rows {
            let id = ItemId(row.try_get("id")?);
            let category: Option<String> = row.try_get("category")?;
            let tag: Option<i64> = row.try_get("tag_id")?;

            let subject = subjects.entry(id).or_insert_with(|| RelatedSubject {
                id,
                tags: HashSet::new(),
                category,
            });
            if let Some(tag) = tag {
                subject.tags.insert(TagId(tag));
            }
        }
        Ok(subjects.into_values().collect())
    }

    #[instrument(skip(self, item), fields(kind = %item.kind))]
    async fn insert_item(&self, item: NewItem) -> Result<ContentItem> {
        item.check()?;
        let row = sqlx::query(
            r#"
            INSERT INTO items (kind, title, author_id, category, pages)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, created_at
            "#,
        )
        .bind(item.kind.as_str())
        .bind(&item.title)
        .bind(item.author.0)
        .bind(&item.category)
        .bind(item.pages)
        .fetch_one(&self.pool)
        .await?;

        let id = ItemId(row.try_get("id")?);
        let mut stored = item.into_item(id);
        stored.created_at = row.try_get("created_at")?;
        Ok(stored)
    }

    async fn insert_tag(&self, tag: NewTag) -> Result<Tag> {
        tag.check()?;
        let row = sqlx::query("INSERT INTO tags (name, description) VALUES ($1, $2) RETURNING id")
            .bind(&tag.name)
            .bind(&tag.description)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| write_error(e, || format!("Tag '{}' already exists", tag.name)))?;
        Ok(tag.into_tag(TagId(row.try_get("id")?)))
    }

    async fn attach_tag(&self, item: ItemId, tag: TagId) -> Result<()> {
        self.ensure_item(item).await?;
        sqlx::query("INSERT INTO item_tags (item_id, tag_id) VALUES ($1, $2)")
            .bind(item.0)
            .bind(tag.0)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    HelperError::not_found("tag", tag)
                } else {
                    write_error(e, || {
                        format!("Tag {} is already attached to item {}", tag, item)
                    })
                }
            })?;
        Ok(())
    }

    async fn add_comment(&self, item: ItemId, author: UserId, body: &str) -> Result<()> {
        require_text(body, "body")?;
        self.ensure_item(item).await?;
        sqlx::query("INSERT INTO comments (item_id, author_id, body) VALUES ($1, $2, $3)")
            .bind(item.0)
            .bind(author.0)
            .bind(body)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_link(&self, item: ItemId, url: &str) -> Result<()> {
        validate_link(url)?;
        self.ensure_item(item).await?;
        sqlx::query("INSERT INTO links (item_id, url) VALUES ($1, $2)")
            .bind(item.0)
            .bind(url)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn add_subsection(&self, item: ItemId, title: &str) -> Result<()> {
        require_text(title, "title")?;
        self.ensure_item(item).await?;
        sqlx::query("INSERT INTO subsections (item_id, title) VALUES ($1, $2)")
            .bind(item.0)
            .bind(title)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_opinion(&self, opinion: NewOpinion) -> Result<Opinion> {
        let item = self.get_item(opinion.item).await?;
        opinion.check(&item)?;

        let row = sqlx::query(
            r#"
            INSERT INTO opinions (user_id, item_id, is_useful)
            VALUES ($1, $2, $3)
            RETURNING created_at
            "#,
        )
        .bind(opinion.user.0)
        .bind(opinion.item.0)
        .bind(opinion.is_useful)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            write_error(e, || {
                format!(
                    "User {} already left an opinion on item {}",
                    opinion.user, opinion.item
                )
            })
        })?;

        let mut stored = opinion.into_opinion();
        stored.created_at = row.try_get("created_at")?;
        Ok(stored)
    }

    #[instrument(skip(self))]
    async fn add_scope(&self, scope: NewScope) -> Result<Scope> {
        let item = self.get_item(scope.item).await?;
        scope.check(&item)?;

        let row = sqlx::query(
            r#"
            INSERT INTO scopes (user_id, item_id, scope)
            VALUES ($1, $2, $3)
            RETURNING created_at
            "#,
        )
        .bind(scope.user.0)
        .bind(scope.item.0)
        .bind(scope.scope)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            write_error(e, || {
                format!("User {} already scoped item {}", scope.user, scope.item)
            })
        })?;

        let mut stored = scope.into_scope();
        stored.created_at = row.try_get("created_at")?;
        Ok(stored)
    }
}
