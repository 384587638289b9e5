//! Validation utilities for ProgrammerHelper data
//!
//! Write-time checks live here so the aggregation code can assume clean input:
//! scope range, tag slugs and the rule that authors do not judge their own
//! content.

use crate::error::HelperError;
use crate::models::{ItemId, UserId};
use once_cell::sync::Lazy;
use regex::Regex;

/// Lowest accepted scope value
pub const MIN_SCOPE: i32 = 1;

/// Highest accepted scope value
pub const MAX_SCOPE: i32 = 5;

/// Tag slug pattern: lowercase words joined by single hyphens or underscores
pub static SLUG_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]+(?:[-_][a-z0-9]+)*$").expect("Failed to compile slug regex")
});

/// Validate a tag slug
///
/// # Examples
///
/// ```
/// use programmer_helper_core::validation::validate_slug;
///
/// assert!(validate_slug("rust").is_ok());
/// assert!(validate_slug("async-await").is_ok());
/// assert!(validate_slug("Not A Slug").is_err());
/// ```
pub fn validate_slug(slug: &str) -> Result<(), HelperError> {
    if slug.len() <= 50 && SLUG_REGEX.is_match(slug) {
        Ok(())
    } else {
        Err(HelperError::validation_field(
            format!("Invalid tag slug '{}'", slug),
            "name",
        ))
    }
}

/// Validate a scope value
///
/// # Examples
///
/// ```
/// use programmer_helper_core::validation::validate_scope;
///
/// assert!(validate_scope(1).is_ok());
/// assert!(validate_scope(5).is_ok());
/// assert!(validate_scope(0).is_err());
/// assert!(validate_scope(6).is_err());
/// ```
pub fn validate_scope(scope: i32) -> Result<(), HelperError> {
    if (MIN_SCOPE..=MAX_SCOPE).contains(&scope) {
        Ok(())
    } else {
        Err(HelperError::validation_field(
            format!(
                "Scope must be between {} and {}, got {}",
                MIN_SCOPE, MAX_SCOPE, scope
            ),
            "scope",
        ))
    }
}

/// Reject a judgement whose author is the item's author
pub fn validate_not_author(user: UserId, author: UserId, item: ItemId) -> Result<(), HelperError> {
    if user == author {
        Err(HelperError::SelfJudgement {
            user: user.0,
            item: item.0,
        })
    } else {
        Ok(())
    }
}

/// Validate a page count for books
pub fn validate_pages(pages: i32) -> Result<(), HelperError> {
    if pages > 0 {
        Ok(())
    } else {
        Err(HelperError::validation_field(
            "Pages must be positive",
            "pages",
        ))
    }
}

/// Validate an external link attached to an item; only http(s) is accepted
pub fn validate_link(link: &str) -> Result<(), HelperError> {
    let parsed = url::Url::parse(link).map_err(|e| {
        HelperError::validation_field(format!("Invalid link '{}': {}", link, e), "url")
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(HelperError::validation_field(
            format!("Unsupported link scheme '{}'", other),
            "url",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_validation() {
        assert!(validate_link("https://doc.rust-lang.org/book/").is_ok());
        assert!(validate_link("ftp://example.com/file").is_err());
        assert!(validate_link("not a link").is_err());
    }

    #[test]
    fn test_slug_validation() {
        assert!(validate_slug("python3").is_ok());
        assert!(validate_slug("design_patterns").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("-leading").is_err());
        assert!(validate_slug("double--hyphen").is_err());
        assert!(validate_slug(&"a".repeat(51)).is_err());
    }

    #[test]
    fn test_scope_bounds() {
        for scope in MIN_SCOPE..=MAX_SCOPE {
            assert!(validate_scope(scope).is_ok());
        }
        assert!(validate_scope(-1).is_err());
    }

    #[test]
    fn test_not_author() {
        assert!(validate_not_author(UserId(1), UserId(2), ItemId(10)).is_ok());
        let err = validate_not_author(UserId(2), UserId(2), ItemId(10)).unwrap_err();
        assert!(matches!(err, HelperError::SelfJudgement { user: 2, item: 10 }));
    }

    #[test]
    fn test_pages() {
        assert!(validate_pages(1).is_ok());
        assert!(validate_pages(0).is_err());
    }
}
