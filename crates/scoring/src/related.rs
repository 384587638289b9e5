//! Related-item ranking by tag and category overlap
//!
//! score(Y) = |tags(X) ∩ tags(Y)| + 1 if X and Y share a category
//!
//! Candidates with a zero score are dropped. Equal scores keep ascending id
//! order, which is insertion order.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use programmer_helper_core::{ItemId, TagId};

/// The tag set and category of one item, as seen by the ranker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedSubject {
    pub id: ItemId,
    pub tags: HashSet<TagId>,
    pub category: Option<String>,
}

impl RelatedSubject {
    pub fn new(id: ItemId, tags: impl IntoIterator<Item = TagId>) -> Self {
        Self {
            id,
            tags: tags.into_iter().collect(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Relevance of `other` to this subject
    pub fn score(&self, other: &RelatedSubject) -> u32 {
        let overlap = self.tags.intersection(&other.tags).count() as u32;
        let category_bonus = match (&self.category, &other.category) {
            (Some(a), Some(b)) if a == b => 1,
            _ => 0,
        };
        overlap + category_bonus
    }
}

/// One ranked candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub id: ItemId,
    pub score: u32,
}

/// Rank `candidates` against `subject`
///
/// The subject is skipped if it appears in the pool.
pub fn rank_related<'a, I>(
    subject: &RelatedSubject,
    candidates: I,
    limit: Option<usize>,
) -> Vec<RelatedItem>
where
    I: IntoIterator<Item = &'a RelatedSubject>,
{
    let mut ranked: Vec<RelatedItem> = candidates
        .into_iter()
        .filter(|candidate| candidate.id != subject.id)
        .filter_map(|candidate| {
            let score = subject.score(candidate);
            (score > 0).then_some(RelatedItem {
                id: candidate.id,
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.id.cmp(&b.id)));

    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}
