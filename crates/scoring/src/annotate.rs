//! Bulk annotation, range filters and classification filters
//!
//! [`annotate`] computes marks, ratings and secondary counts for a whole
//! collection in one pass over flat rows. The result for every item equals
//! what [`Annotations::compute`] yields for that item alone.
//!
//! Annotation fields are optional: `None` means "not precomputed", and the
//! `*_or_else` accessors fall back to an on-demand computation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use programmer_helper_core::{ContentItem, ContentKind, HelperError, ItemId, JudgementKind};

use crate::aggregate::{MarkTally, ScopeTally};
use crate::classify::{QualityLabel, SizeLabel};

/// Rating at or above which an item counts as popular
pub const POPULAR_MIN_RATING: f64 = 4.0;

/// Comment count at or above which an item counts as hot
pub const HOT_MIN_COMMENTS: usize = 7;

/// Page count at or above which a book counts as big (Big and Giant buckets)
pub const BIG_MIN_PAGES: i32 = 200;

/// Message of the usage error raised by range filters called without bounds
pub const RANGE_USAGE_MESSAGE: &str = "Must be specified at least one of min or max value";

/// One flat row feeding the bulk annotator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnnotationRow {
    Opinion { item: ItemId, is_useful: bool },
    Scope { item: ItemId, scope: i32 },
    Tag { item: ItemId },
    Comment { item: ItemId },
    Link { item: ItemId },
    Subsection { item: ItemId },
}

impl AnnotationRow {
    pub fn item(&self) -> ItemId {
        match *self {
            AnnotationRow::Opinion { item, .. }
            | AnnotationRow::Scope { item, .. }
            | AnnotationRow::Tag { item }
            | AnnotationRow::Comment { item }
            | AnnotationRow::Link { item }
            | AnnotationRow::Subsection { item } => item,
        }
    }
}

/// Derived per-item values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    pub opinions: Option<MarkTally>,
    pub scopes: Option<ScopeTally>,
    pub count_tags: Option<usize>,
    pub count_comments: Option<usize>,
    pub count_links: Option<usize>,
    pub count_subsections: Option<usize>,
}

impl Annotations {
    /// Zeroed annotations with the tally matching the kind's judgement style
    pub fn empty_for(kind: ContentKind) -> Self {
        let (opinions, scopes) = match kind.judgement() {
            JudgementKind::Opinion => (Some(MarkTally::default()), None),
            JudgementKind::Scope => (None, Some(ScopeTally::default())),
        };
        Self {
            opinions,
            scopes,
            count_tags: Some(0),
            count_comments: Some(0),
            count_links: Some(0),
            count_subsections: Some(0),
        }
    }

    /// Per-item computation from the item's own judgements and counts
    pub fn compute(
        kind: ContentKind,
        opinions: &[bool],
        scopes: &[i32],
        counts: ItemCounts,
    ) -> Self {
        let mut annotations = Self::empty_for(kind);
        if let Some(tally) = annotations.opinions.as_mut() {
            opinions.iter().for_each(|&useful| tally.add(useful));
        }
        if let Some(tally) = annotations.scopes.as_mut() {
            scopes.iter().for_each(|&scope| tally.add(scope));
        }
        annotations.count_tags = Some(counts.tags);
        annotations.count_comments = Some(counts.comments);
        annotations.count_links = Some(counts.links);
        annotations.count_subsections = Some(counts.subsections);
        annotations
    }

    fn apply(&mut self, row: &AnnotationRow) {
        match *row {
            AnnotationRow::Opinion { is_useful, .. } => {
                if let Some(tally) = self.opinions.as_mut() {
                    tally.add(is_useful);
                }
            }
            AnnotationRow::Scope { scope, .. } => {
                if let Some(tally) = self.scopes.as_mut() {
                    tally.add(scope);
                }
            }
            AnnotationRow::Tag { .. } => bump(&mut self.count_tags),
            AnnotationRow::Comment { .. } => bump(&mut self.count_comments),
            AnnotationRow::Link { .. } => bump(&mut self.count_links),
            AnnotationRow::Subsection { .. } => bump(&mut self.count_subsections),
        }
    }
}

fn bump(counter: &mut Option<usize>) {
    *counter.get_or_insert(0) += 1;
}

/// Secondary counts of one item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCounts {
    pub tags: usize,
    pub comments: usize,
    pub links: usize,
    pub subsections: usize,
}

/// A content item together with its annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedItem {
    pub item: ContentItem,
    pub annotations: Annotations,
}

impl AnnotatedItem {
    /// Item with nothing precomputed
    pub fn bare(item: ContentItem) -> Self {
        Self {
            item,
            annotations: Annotations::default(),
        }
    }

    pub fn id(&self) -> ItemId {
        self.item.id
    }

    /// Precomputed mark, if any
    pub fn mark(&self) -> Option<i64> {
        self.annotations.opinions.map(|t| t.mark())
    }

    /// Precomputed rating; `None` also when the item has no scopes
    pub fn rating(&self) -> Option<f64> {
        self.annotations.scopes.and_then(|t| t.rating())
    }

    pub fn mark_or_else(&self, compute: impl FnOnce() -> i64) -> i64 {
        self.mark().unwrap_or_else(compute)
    }

    pub fn rating_or_else(&self, compute: impl FnOnce() -> Option<f64>) -> Option<f64> {
        match self.annotations.scopes {
            Some(tally) => tally.rating(),
            None => compute(),
        }
    }

    pub fn count_tags_or_else(&self, compute: impl FnOnce() -> usize) -> usize {
        self.annotations.count_tags.unwrap_or_else(compute)
    }

    pub fn count_comments_or_else(&self, compute: impl FnOnce() -> usize) -> usize {
        self.annotations.count_comments.unwrap_or_else(compute)
    }

    pub fn count_opinions(&self) -> Option<i64> {
        self.annotations.opinions.map(|t| t.count())
    }

    pub fn count_scopes(&self) -> Option<i64> {
        self.annotations.scopes.map(|t| t.count)
    }

    /// Quality label, solutions only
    pub fn quality(&self) -> Option<QualityLabel> {
        if self.item.kind != ContentKind::Solution {
            return None;
        }
        self.mark().map(QualityLabel::from_mark)
    }

    /// Size label, books only
    pub fn size(&self) -> Option<SizeLabel> {
        self.item.pages.map(SizeLabel::from_pages)
    }

    /// Flat view for listings and JSON responses
    pub fn summary(&self) -> ScoreSummary {
        ScoreSummary {
            id: self.item.id,
            kind: self.item.kind,
            title: self.item.title.clone(),
            mark: self.mark(),
            rating: self.rating(),
            count_opinions: self.count_opinions(),
            count_scopes: self.count_scopes(),
            count_tags: self.annotations.count_tags,
            count_comments: self.annotations.count_comments,
            count_links: self.annotations.count_links,
            count_subsections: self.annotations.count_subsections,
            quality: self.quality().map(LabelView::quality),
            size: self.size().map(LabelView::size),
        }
    }
}

/// Display label with its colour hint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelView {
    pub label: String,
    pub css_class: String,
}

impl LabelView {
    fn quality(label: QualityLabel) -> Self {
        Self {
            label: label.as_str().to_string(),
            css_class: label.css_class().to_string(),
        }
    }

    fn size(label: SizeLabel) -> Self {
        Self {
            label: label.as_str().to_string(),
            css_class: label.css_class().to_string(),
        }
    }
}

/// JSON-friendly projection of an annotated item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub id: ItemId,
    pub kind: ContentKind,
    pub title: String,
    pub mark: Option<i64>,
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_opinions: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_scopes: Option<i64>,
    pub count_tags: Option<usize>,
    pub count_comments: Option<usize>,
    pub count_links: Option<usize>,
    pub count_subsections: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<LabelView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<LabelView>,
}

/// Annotate `items` in a single pass over `rows`
///
/// Output keeps the order of `items`. Rows for unknown items are ignored, as
/// are judgements that do not match the item's judgement style.
pub fn annotate<R>(items: Vec<ContentItem>, rows: R) -> Vec<AnnotatedItem>
where
    R: IntoIterator<Item = AnnotationRow>,
{
    let mut by_id: HashMap<ItemId, Annotations> = items
        .iter()
        .map(|item| (item.id, Annotations::empty_for(item.kind)))
        .collect();

    for row in rows {
        if let Some(annotations) = by_id.get_mut(&row.item()) {
            annotations.apply(&row);
        }
    }

    items
        .into_iter()
        .map(|item| {
            let annotations = by_id.remove(&item.id).unwrap_or_default();
            AnnotatedItem { item, annotations }
        })
        .collect()
}

fn check_bounds<T>(min: Option<T>, max: Option<T>) -> Result<(), HelperError>
where
    T: PartialOrd + Display + Copy,
{
    match (min, max) {
        (None, None) => Err(HelperError::Usage(RANGE_USAGE_MESSAGE.to_string())),
        (Some(lo), Some(hi)) if lo > hi => Err(HelperError::invalid_range(lo, hi)),
        _ => Ok(()),
    }
}

fn in_bounds<T: PartialOrd>(value: T, min: Option<T>, max: Option<T>) -> bool {
    min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
}

/// Items whose rating lies in `[min, max]`; unrated items never match
pub fn items_by_rating(
    items: Vec<AnnotatedItem>,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<Vec<AnnotatedItem>, HelperError> {
    if min.map_or(false, f64::is_nan) || max.map_or(false, f64::is_nan) {
        return Err(HelperError::validation("Rating bounds must be numbers"));
    }
    check_bounds(min, max)?;

    Ok(items
        .into_iter()
        .filter(|item| item.rating().map_or(false, |r| in_bounds(r, min, max)))
        .collect())
}

/// Items whose mark lies in `[min, max]`
pub fn items_by_marks(
    items: Vec<AnnotatedItem>,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<Vec<AnnotatedItem>, HelperError> {
    check_bounds(min, max)?;

    Ok(items
        .into_iter()
        .filter(|item| item.mark().map_or(false, |m| in_bounds(m, min, max)))
        .collect())
}

/// Items rated at least [`POPULAR_MIN_RATING`]
pub fn popular(items: Vec<AnnotatedItem>) -> Vec<AnnotatedItem> {
    items
        .into_iter()
        .filter(|item| item.rating().map_or(false, |r| r >= POPULAR_MIN_RATING))
        .collect()
}

/// Items with at least [`HOT_MIN_COMMENTS`] comments
pub fn hot(items: Vec<AnnotatedItem>) -> Vec<AnnotatedItem> {
    items
        .into_iter()
        .filter(|item| item.count_comments_or_else(|| 0) >= HOT_MIN_COMMENTS)
        .collect()
}

/// Books with at least [`BIG_MIN_PAGES`] pages
pub fn big(items: Vec<AnnotatedItem>) -> Vec<AnnotatedItem> {
    items
        .into_iter()
        .filter(|item| item.item.pages.map_or(false, |p| p >= BIG_MIN_PAGES))
        .collect()
}

/// Books in one size bucket
pub fn by_size(items: Vec<AnnotatedItem>, label: SizeLabel) -> Vec<AnnotatedItem> {
    items
        .into_iter()
        .filter(|item| item.size() == Some(label))
        .collect()
}

/// Listing order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    Rating,
    Mark,
}

impl FromStr for SortKey {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(SortKey::Id),
            "rating" => Ok(SortKey::Rating),
            "mark" | "marks" => Ok(SortKey::Mark),
            other => Err(HelperError::validation_field(
                format!("Unknown sort key '{}'", other),
                "sort",
            )),
        }
    }
}

/// Sort in place. Rating and mark sort descending with missing values last;
/// ties fall back to ascending id.
pub fn sort_items(items: &mut [AnnotatedItem], key: SortKey) {
    match key {
        SortKey::Id => items.sort_by_key(|item| item.id()),
        SortKey::Rating => items.sort_by(|a, b| {
            match (a.rating(), b.rating()) {
                (Some(x), Some(y)) => y.total_cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(a.id().cmp(&b.id()))
        }),
        SortKey::Mark => items.sort_by(|a, b| {
            match (a.mark(), b.mark()) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }
            .then(a.id().cmp(&b.id()))
        }),
    }
}
