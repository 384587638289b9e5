//! Tags shared by every content kind

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::error::HelperError;
use crate::validation::validate_slug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub i64);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag. Tags outlive the items they are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTag {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 1000))]
    #[serde(default)]
    pub description: String,
}

impl NewTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn check(&self) -> Result<(), HelperError> {
        self.validate()?;
        validate_slug(&self.name)
    }

    pub fn into_tag(self, id: TagId) -> Tag {
        Tag {
            id,
            name: self.name,
            description: self.description,
        }
    }
}
