//! Opinion and scope aggregation
//!
//! Reduces the judgements attached to one item to a single number:
//!
//! - mark = #useful - #not useful (0 when there are no opinions)
//! - rating = mean of scopes rounded to 4 decimals (None when there are none)
//!
//! The tallies fold rows one at a time so the bulk annotator can reuse them
//! and produce exactly the numbers the free functions produce.

use serde::{Deserialize, Serialize};

/// Decimal places kept by [`rating`]
pub const RATING_PRECISION: i32 = 4;

/// Net opinion score
pub fn mark<I>(opinions: I) -> i64
where
    I: IntoIterator<Item = bool>,
{
    opinions
        .into_iter()
        .fold(MarkTally::default(), |tally, useful| tally.push(useful))
        .mark()
}

/// Mean scope rounded to 4 decimals, `None` for no scopes
pub fn rating<I>(scopes: I) -> Option<f64>
where
    I: IntoIterator<Item = i32>,
{
    scopes
        .into_iter()
        .fold(ScopeTally::default(), |tally, scope| tally.push(scope))
        .rating()
}

/// Running counts of useful / not useful opinions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkTally {
    pub useful: i64,
    pub not_useful: i64,
}

impl MarkTally {
    #[must_use]
    pub fn push(mut self, is_useful: bool) -> Self {
        self.add(is_useful);
        self
    }

    pub fn add(&mut self, is_useful: bool) {
        if is_useful {
            self.useful += 1;
        } else {
            self.not_useful += 1;
        }
    }

    pub fn count(&self) -> i64 {
        self.useful + self.not_useful
    }

    pub fn mark(&self) -> i64 {
        self.useful - self.not_useful
    }
}

/// Running sum and count of scopes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeTally {
    pub sum: i64,
    pub count: i64,
}

impl ScopeTally {
    #[must_use]
    pub fn push(mut self, scope: i32) -> Self {
        self.add(scope);
        self
    }

    pub fn add(&mut self, scope: i32) {
        self.sum += i64::from(scope);
        self.count += 1;
    }

    /// Build from a database-side `SUM` / `COUNT` pair
    pub fn from_parts(sum: i64, count: i64) -> Self {
        Self { sum, count }
    }

    /// Mean rounded half away from zero at [`RATING_PRECISION`] decimals
    ///
    /// The rounding is done on the exact fraction `sum / count`, so a mean
    /// sitting exactly on a half (1.03625) always rounds up in magnitude.
    pub fn rating(&self) -> Option<f64> {
        if self.count <= 0 {
            return None;
        }
        let scale = 10i128.pow(RATING_PRECISION as u32);
        let count = i128::from(self.count);
        let magnitude = i128::from(self.sum).abs();
        let rounded = (2 * magnitude * scale + count) / (2 * count);
        let signed = if self.sum < 0 { -rounded } else { rounded };
        Some(signed as f64 / scale as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_counts_difference() {
        assert_eq!(mark([true, true, false]), 1);
        assert_eq!(mark([false, false, false, true]), -2);
        assert_eq!(mark(std::iter::empty()), 0);
    }

    #[test]
    fn test_single_opinion_is_exact() {
        assert_eq!(mark([true]), 1);
        assert_eq!(mark([false]), -1);
    }

    #[test]
    fn test_rating_rounds_to_four_places() {
        assert_eq!(rating([2, 1, 0, 4, 5, 1, 4]), Some(2.4286));
        assert_eq!(rating([1, 2]), Some(1.5));
        assert_eq!(rating([1, 1, 2]), Some(1.3333));
        assert_eq!(rating([2, 2, 1]), Some(1.6667));
    }

    #[test]
    fn test_rating_rounds_exact_halves_up() {
        // mean 829 / 800 = 1.03625
        let scopes = std::iter::repeat(2).take(29).chain(std::iter::repeat(1).take(771));
        assert_eq!(rating(scopes), Some(1.0363));

        // mean 2.00005
        let scopes = std::iter::repeat(2).take(19_999).chain([3]);
        assert_eq!(rating(scopes), Some(2.0001));
    }

    #[test]
    fn test_rating_negative_sum_rounds_away_from_zero() {
        assert_eq!(ScopeTally::from_parts(-829, 800).rating(), Some(-1.0363));
    }

    #[test]
    fn test_rating_empty_is_none() {
        assert_eq!(rating(Vec::<i32>::new()), None);
    }

    #[test]
    fn test_single_scope_is_exact() {
        for scope in 1..=5 {
            assert_eq!(rating([scope]), Some(f64::from(scope)));
        }
    }

    #[test]
    fn test_tally_from_parts_matches_fold() {
        let folded = [3, 4, 5, 5].into_iter().fold(ScopeTally::default(), ScopeTally::push);
        assert_eq!(folded, ScopeTally::from_parts(17, 4));
        assert_eq!(folded.rating(), Some(4.25));
    }

    #[test]
    fn test_mark_tally_count() {
        let mut tally = MarkTally::default();
        tally.add(true);
        tally.add(false);
        tally.add(false);
        assert_eq!(tally.count(), 3);
        assert_eq!(tally.mark(), -1);
    }
}
