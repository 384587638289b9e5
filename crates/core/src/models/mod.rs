//! Domain models shared across ProgrammerHelper crates

pub mod content;
pub mod judgement;
pub mod tag;

pub use content::{ContentItem, ContentKind, ItemId, JudgementKind, NewItem, UserId};
pub use judgement::{NewOpinion, NewScope, Opinion, Scope};
pub use tag::{NewTag, Tag, TagId};
