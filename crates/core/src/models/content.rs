//! Content models
//!
//! Every content type of the site (articles, books, snippets, solutions,
//! questions, answers) is represented by one [`ContentItem`] record tagged with
//! its [`ContentKind`]. The kind decides how users judge the item and whether
//! it carries a category.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::error::HelperError;
use crate::validation::validate_pages;

/// Primary key of a content item. Ascending ids follow insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

/// Primary key of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How users judge a content kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JudgementKind {
    /// Boolean useful / not useful verdicts, reduced to a mark
    Opinion,
    /// Integer 1..=5 scopes, reduced to a rating
    Scope,
}

/// Content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Article,
    Book,
    Snippet,
    Solution,
    Question,
    Answer,
}

impl ContentKind {
    pub const ALL: [ContentKind; 6] = [
        ContentKind::Article,
        ContentKind::Book,
        ContentKind::Snippet,
        ContentKind::Solution,
        ContentKind::Question,
        ContentKind::Answer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Book => "book",
            ContentKind::Snippet => "snippet",
            ContentKind::Solution => "solution",
            ContentKind::Question => "question",
            ContentKind::Answer => "answer",
        }
    }

    /// Judgement style for this kind
    pub fn judgement(&self) -> JudgementKind {
        match self {
            ContentKind::Article | ContentKind::Book => JudgementKind::Scope,
            ContentKind::Snippet
            | ContentKind::Solution
            | ContentKind::Question
            | ContentKind::Answer => JudgementKind::Opinion,
        }
    }

    /// Reject items whose kind is judged some other way
    pub fn require_judgement(&self, expected: JudgementKind) -> Result<(), HelperError> {
        if self.judgement() == expected {
            return Ok(());
        }
        Err(HelperError::validation_field(
            format!("{} items are not judged by {:?}", self, expected),
            "kind",
        ))
    }

    /// Articles have a category, snippets have a lexer; both act as the
    /// category for related-item ranking.
    pub fn has_category(&self) -> bool {
        matches!(self, ContentKind::Article | ContentKind::Snippet)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = HelperError;

    /// Accepts singular and plural forms, so URL segments like `books` parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let singular = lowered.strip_suffix('s').unwrap_or(&lowered);
        ContentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == singular)
            .ok_or_else(|| {
                HelperError::validation_field(format!("Unknown content kind '{}'", s), "kind")
            })
    }
}

/// A stored content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ItemId,
    pub kind: ContentKind,
    pub title: String,
    pub author: UserId,
    /// Article category or snippet lexer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Page count, books only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Request to create a content item
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewItem {
    pub kind: ContentKind,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub author: UserId,

    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,

    pub pages: Option<i32>,
}

impl NewItem {
    pub fn new(kind: ContentKind, title: impl Into<String>, author: UserId) -> Self {
        Self {
            kind,
            title: title.into(),
            author,
            category: None,
            pages: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_pages(mut self, pages: i32) -> Self {
        self.pages = Some(pages);
        self
    }

    /// Field checks plus the kind-specific rules
    pub fn check(&self) -> Result<(), HelperError> {
        self.validate()?;

        if self.title.trim().is_empty() {
            return Err(HelperError::validation_field("Title is required", "title"));
        }

        if self.category.is_some() && !self.kind.has_category() {
            return Err(HelperError::validation_field(
                format!("{} items do not carry a category", self.kind),
                "category",
            ));
        }

        match (self.kind, self.pages) {
            (ContentKind::Book, Some(pages)) => validate_pages(pages),
            (ContentKind::Book, None) => Err(HelperError::validation_field(
                "Books require a page count",
                "pages",
            )),
            (_, Some(_)) => Err(HelperError::validation_field(
                "Only books have a page count",
                "pages",
            )),
            (_, None) => Ok(()),
        }
    }

    /// Materialise the stored record once the store has assigned an id
    pub fn into_item(self, id: ItemId) -> ContentItem {
        ContentItem {
            id,
            kind: self.kind,
            title: self.title,
            author: self.author,
            category: self.category,
            pages: self.pages,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_judgement() {
        assert!(ContentKind::Book.require_judgement(JudgementKind::Scope).is_ok());
        assert!(ContentKind::Answer.require_judgement(JudgementKind::Opinion).is_ok());

        match ContentKind::Snippet.require_judgement(JudgementKind::Scope) {
            Err(HelperError::ValidationError { message, field }) => {
                assert_eq!(message, "snippet items are not judged by Scope");
                assert_eq!(field.as_deref(), Some("kind"));
            }
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_parsing_accepts_plural() {
        assert_eq!("books".parse::<ContentKind>().unwrap(), ContentKind::Book);
        assert_eq!("Snippet".parse::<ContentKind>().unwrap(), ContentKind::Snippet);
        assert_eq!("answers".parse::<ContentKind>().unwrap(), ContentKind::Answer);
        assert!("podcasts".parse::<ContentKind>().is_err());
    }

    #[test]
    fn test_judgement_kinds() {
        assert_eq!(ContentKind::Article.judgement(), JudgementKind::Scope);
        assert_eq!(ContentKind::Book.judgement(), JudgementKind::Scope);
        assert_eq!(ContentKind::Solution.judgement(), JudgementKind::Opinion);
        assert_eq!(ContentKind::Snippet.judgement(), JudgementKind::Opinion);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&ContentKind::Question).unwrap();
        assert_eq!(json, r#""question""#);
    }

    #[test]
    fn test_book_requires_pages() {
        let book = NewItem::new(ContentKind::Book, "Programming Rust", UserId(1));
        assert!(book.check().is_err());
        assert!(book.with_pages(720).check().is_ok());
    }

    #[test]
    fn test_pages_rejected_outside_books() {
        let article = NewItem::new(ContentKind::Article, "Ownership", UserId(1)).with_pages(3);
        assert!(article.check().is_err());
    }

    #[test]
    fn test_category_only_where_supported() {
        let snippet =
            NewItem::new(ContentKind::Snippet, "Quicksort", UserId(1)).with_category("rust");
        assert!(snippet.check().is_ok());

        let question =
            NewItem::new(ContentKind::Question, "Why?", UserId(1)).with_category("rust");
        assert!(question.check().is_err());
    }

    #[test]
    fn test_blank_title_rejected() {
        let item = NewItem::new(ContentKind::Answer, "   ", UserId(1));
        match item.check().unwrap_err() {
            HelperError::ValidationError { field, .. } => {
                assert_eq!(field.as_deref(), Some("title"))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
