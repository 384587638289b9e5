//! Opinions and scopes users attach to content

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::content::{ContentItem, ItemId, JudgementKind, UserId};
use crate::error::HelperError;
use crate::validation::{validate_not_author, validate_scope};

/// A user's useful / not useful verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opinion {
    pub user: UserId,
    pub item: ItemId,
    pub is_useful: bool,
    pub created_at: DateTime<Utc>,
}

/// A user's 1..=5 score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub user: UserId,
    pub item: ItemId,
    pub scope: i32,
    pub created_at: DateTime<Utc>,
}

/// Request to record an opinion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOpinion {
    pub user: UserId,
    pub item: ItemId,
    pub is_useful: bool,
}

/// Request to record a scope
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewScope {
    pub user: UserId,
    pub item: ItemId,
    #[validate(range(min = 1, max = 5))]
    pub scope: i32,
}

impl NewOpinion {
    /// Check against the target item before writing
    pub fn check(&self, item: &ContentItem) -> Result<(), HelperError> {
        item.kind.require_judgement(JudgementKind::Opinion)?;
        validate_not_author(self.user, item.author, item.id)
    }

    pub fn into_opinion(self) -> Opinion {
        Opinion {
            user: self.user,
            item: self.item,
            is_useful: self.is_useful,
            created_at: Utc::now(),
        }
    }
}

impl NewScope {
    /// Check against the target item before writing
    pub fn check(&self, item: &ContentItem) -> Result<(), HelperError> {
        validate_scope(self.scope)?;
        item.kind.require_judgement(JudgementKind::Scope)?;
        validate_not_author(self.user, item.author, item.id)
    }

    pub fn into_scope(self) -> Scope {
        Scope {
            user: self.user,
            item: self.item,
            scope: self.scope,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentKind, NewItem};

    fn item(kind: ContentKind) -> ContentItem {
        let mut new = NewItem::new(kind, "Item", UserId(1));
        if kind == ContentKind::Book {
            new = new.with_pages(100);
        }
        new.into_item(ItemId(7))
    }

    #[test]
    fn test_opinion_on_own_item_rejected() {
        let request = NewOpinion {
            user: UserId(1),
            item: ItemId(7),
            is_useful: true,
        };
        assert!(matches!(
            request.check(&item(ContentKind::Snippet)),
            Err(HelperError::SelfJudgement { .. })
        ));
    }

    #[test]
    fn test_opinion_on_scope_kind_rejected() {
        let request = NewOpinion {
            user: UserId(2),
            item: ItemId(7),
            is_useful: false,
        };
        assert!(request.check(&item(ContentKind::Book)).is_err());
        assert!(request.check(&item(ContentKind::Answer)).is_ok());
    }

    #[test]
    fn test_scope_out_of_range_rejected() {
        let request = NewScope {
            user: UserId(2),
            item: ItemId(7),
            scope: 6,
        };
        assert!(request.validate().is_err());
        assert!(request.check(&item(ContentKind::Article)).is_err());
    }

    #[test]
    fn test_scope_accepted() {
        let request = NewScope {
            user: UserId(3),
            item: ItemId(7),
            scope: 4,
        };
        assert!(request.check(&item(ContentKind::Article)).is_ok());
        assert_eq!(request.into_scope().scope, 4);
    }
}
