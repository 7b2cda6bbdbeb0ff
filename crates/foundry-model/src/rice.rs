//! RICE scorer
//!
//! `score = round(reach * impact * confidence / effort, 1)`; any missing
//! input yields no score.

use serde::{Deserialize, Serialize};

/// Lowest accepted RICE input
pub const RICE_MIN: u8 = 1;
/// Highest accepted RICE input
pub const RICE_MAX: u8 = 10;

/// The four RICE inputs, each optional
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiceInputs {
    /// How many users are affected
    pub reach: Option<u8>,
    /// How much each user benefits
    pub impact: Option<u8>,
    /// How sure we are
    pub confidence: Option<u8>,
    /// How much work it takes
    pub effort: Option<u8>,
}

impl RiceInputs {
    /// All four inputs present
    #[inline]
    #[must_use]
    pub fn new(reach: u8, impact: u8, confidence: u8, effort: u8) -> Self {
        Self {
            reach: Some(reach),
            impact: Some(impact),
            confidence: Some(confidence),
            effort: Some(effort),
        }
    }

    /// Clamp every present input into `[RICE_MIN, RICE_MAX]`
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |v: Option<u8>| v.map(|v| v.clamp(RICE_MIN, RICE_MAX));
        Self {
            reach: clamp(self.reach),
            impact: clamp(self.impact),
            confidence: clamp(self.confidence),
            effort: clamp(self.effort),
        }
    }

    /// Overlay `update` on `self`: present values in `update` win
    #[must_use]
    pub fn merged(self, update: Self) -> Self {
        Self {
            reach: update.reach.or(self.reach),
            impact: update.impact.or(self.impact),
            confidence: update.confidence.or(self.confidence),
            effort: update.effort.or(self.effort),
        }
    }

    /// Score for these inputs
    #[inline]
    #[must_use]
    pub fn score(&self) -> Option<f64> {
        rice_score(self.reach, self.impact, self.confidence, self.effort)
    }
}

/// Compute a RICE score rounded to one decimal place.
///
/// Returns `None` when any input is missing or zero.
#[must_use]
pub fn rice_score(
    reach: Option<u8>,
    impact: Option<u8>,
    confidence: Option<u8>,
    effort: Option<u8>,
) -> Option<f64> {
    let (r, i, c, e) = (reach?, impact?, confidence?, effort?);
    if r == 0 || i == 0 || c == 0 || e == 0 {
        return None;
    }
    let raw = f64::from(r) * f64::from(i) * f64::from(c) / f64::from(e);
    Some((raw * 10.0).round() / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rounds_to_one_decimal() {
        // 7 * 3 * 5 / 4 = 26.25
        assert_eq!(rice_score(Some(7), Some(3), Some(5), Some(4)), Some(26.3));
        // 10 * 10 * 10 / 3 = 333.33..
        assert_eq!(rice_score(Some(10), Some(10), Some(10), Some(3)), Some(333.3));
        assert_eq!(rice_score(Some(1), Some(1), Some(1), Some(10)), Some(0.1));
    }

    #[test]
    fn missing_input_yields_none() {
        assert_eq!(rice_score(None, Some(1), Some(1), Some(1)), None);
        assert_eq!(rice_score(Some(1), Some(1), Some(1), None), None);
        assert_eq!(RiceInputs::default().score(), None);
    }

    #[test]
    fn zero_effort_yields_none() {
        assert_eq!(rice_score(Some(5), Some(5), Some(5), Some(0)), None);
    }

    #[test]
    fn merge_prefers_update() {
        let stored = RiceInputs::new(2, 3, 4, 5);
        let update = RiceInputs {
            effort: Some(1),
            ..RiceInputs::default()
        };
        assert_eq!(stored.merged(update), RiceInputs::new(2, 3, 4, 1));
    }

    #[test]
    fn clamp_bounds_inputs() {
        let clamped = RiceInputs::new(0, 11, 5, 200).clamped();
        assert_eq!(clamped, RiceInputs::new(1, 10, 5, 10));
    }

    proptest! {
        #[test]
        fn prop_score_matches_formula(
            r in 1u8..=10, i in 1u8..=10, c in 1u8..=10, e in 1u8..=10
        ) {
            let expected = (f64::from(r) * f64::from(i) * f64::from(c) / f64::from(e) * 10.0).round() / 10.0;
            prop_assert_eq!(rice_score(Some(r), Some(i), Some(c), Some(e)), Some(expected));
        }

        #[test]
        fn prop_any_missing_input_is_none(
            r in proptest::option::of(1u8..=10),
            i in proptest::option::of(1u8..=10),
            c in proptest::option::of(1u8..=10),
            e in proptest::option::of(1u8..=10),
        ) {
            let score = rice_score(r, i, c, e);
            let complete = r.is_some() && i.is_some() && c.is_some() && e.is_some();
            prop_assert_eq!(score.is_some(), complete);
        }
    }
}
