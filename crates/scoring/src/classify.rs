//! Threshold classifiers
//!
//! Pure mappings from an already computed number to a display label. The
//! lower bound of every bucket is inclusive: a book with exactly 50 pages is
//! `Middle`, a solution with mark exactly 2 is `Good`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use programmer_helper_core::HelperError;

/// Solution quality, derived from the solution's mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityLabel {
    Heinously,
    Bad,
    Vague,
    Good,
    Approved,
}

impl QualityLabel {
    /// `<= -5` Heinously, `-4..=-1` Bad, `0..=1` Vague, `2..=4` Good, `>= 5` Approved
    pub fn from_mark(mark: i64) -> Self {
        match mark {
            i64::MIN..=-5 => QualityLabel::Heinously,
            -4..=-1 => QualityLabel::Bad,
            0..=1 => QualityLabel::Vague,
            2..=4 => QualityLabel::Good,
            _ => QualityLabel::Approved,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QualityLabel::Heinously => "Heinously",
            QualityLabel::Bad => "Bad",
            QualityLabel::Vague => "Vague",
            QualityLabel::Good => "Good",
            QualityLabel::Approved => "Approved",
        }
    }

    /// Colour hint for the web tier
    pub fn css_class(&self) -> &'static str {
        match self {
            QualityLabel::Heinously => "text-danger",
            QualityLabel::Bad => "text-warning",
            QualityLabel::Vague => "text-muted",
            QualityLabel::Good => "text-info",
            QualityLabel::Approved => "text-success",
        }
    }
}

/// Book size, derived from the page count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeLabel {
    Tiny,
    Middle,
    Big,
    Giant,
}

impl SizeLabel {
    /// `< 50` Tiny, `50..=199` Middle, `200..=499` Big, `>= 500` Giant
    pub fn from_pages(pages: i32) -> Self {
        match pages {
            i32::MIN..=49 => SizeLabel::Tiny,
            50..=199 => SizeLabel::Middle,
            200..=499 => SizeLabel::Big,
            _ => SizeLabel::Giant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SizeLabel::Tiny => "Tiny book",
            SizeLabel::Middle => "Middle book",
            SizeLabel::Big => "Big book",
            SizeLabel::Giant => "Giant book",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            SizeLabel::Tiny => "badge-light",
            SizeLabel::Middle => "badge-secondary",
            SizeLabel::Big => "badge-primary",
            SizeLabel::Giant => "badge-dark",
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeLabel {
    type Err = HelperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tiny" => Ok(SizeLabel::Tiny),
            "middle" => Ok(SizeLabel::Middle),
            "big" => Ok(SizeLabel::Big),
            "giant" => Ok(SizeLabel::Giant),
            _ => Err(HelperError::validation_field(
                format!("Unknown size label '{}'", s),
                "size",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_cutovers() {
        assert_eq!(SizeLabel::from_pages(49), SizeLabel::Tiny);
        assert_eq!(SizeLabel::from_pages(50), SizeLabel::Middle);
        assert_eq!(SizeLabel::from_pages(199), SizeLabel::Middle);
        assert_eq!(SizeLabel::from_pages(200), SizeLabel::Big);
        assert_eq!(SizeLabel::from_pages(499), SizeLabel::Big);
        assert_eq!(SizeLabel::from_pages(500), SizeLabel::Giant);
        assert_eq!(SizeLabel::from_pages(1), SizeLabel::Tiny);
    }

    #[test]
    fn test_quality_cutovers() {
        assert_eq!(QualityLabel::from_mark(-5), QualityLabel::Heinously);
        assert_eq!(QualityLabel::from_mark(-40), QualityLabel::Heinously);
        assert_eq!(QualityLabel::from_mark(-4), QualityLabel::Bad);
        assert_eq!(QualityLabel::from_mark(-1), QualityLabel::Bad);
        assert_eq!(QualityLabel::from_mark(0), QualityLabel::Vague);
        assert_eq!(QualityLabel::from_mark(1), QualityLabel::Vague);
        assert_eq!(QualityLabel::from_mark(2), QualityLabel::Good);
        assert_eq!(QualityLabel::from_mark(4), QualityLabel::Good);
        assert_eq!(QualityLabel::from_mark(5), QualityLabel::Approved);
    }

    #[test]
    fn test_labels_are_ordered() {
        assert!(QualityLabel::Bad < QualityLabel::Good);
        assert!(SizeLabel::Tiny < SizeLabel::Giant);
    }

    #[test]
    fn test_size_label_parsing() {
        assert_eq!("Giant".parse::<SizeLabel>().unwrap(), SizeLabel::Giant);
        assert!("huge".parse::<SizeLabel>().is_err());
    }

    #[test]
    fn test_display_and_hints() {
        assert_eq!(QualityLabel::Approved.to_string(), "Approved");
        assert_eq!(QualityLabel::Heinously.css_class(), "text-danger");
        assert_eq!(SizeLabel::Middle.to_string(), "Middle book");
        assert_eq!(
            serde_json::to_string(&SizeLabel::Big).unwrap(),
            r#""big""#
        );
    }
}
