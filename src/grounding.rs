//! Confidence and grounding derived from the ranked match distribution.
//!
//! Confidence rewards a clear single best answer: it rises with the top
//! match's relevance score and with the gap between the top match and the
//! runner-up, so one strong hit outranks many weak, ambiguous ones. The
//! result is always in `[0, 100]` and `grounded` is true only above the
//! threshold; callers prepend a low-confidence disclaimer below it.
//!
//! Pure function of the match list, no external calls.

use crate::models::RankedMatch;

/// Confidence above this value counts as grounded.
pub const GROUNDED_THRESHOLD: f64 = 30.0;

/// Saturation constant for the top-score component: a top score equal to
/// it earns half the base weight.
const SATURATION: f64 = 2.5;
/// Portion of the scale driven by the top score alone.
const BASE_WEIGHT: f64 = 75.0;
/// Portion driven by the top-vs-runner-up separation.
const GAP_WEIGHT: f64 = 25.0;

/// The grounding signal for one query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grounding {
    /// Always in `[0, 100]`.
    pub confidence: f64,
    /// `confidence > threshold`, never set independently.
    pub grounded: bool,
}

impl Grounding {
    /// The signal for an empty match set: no confidence, not grounded.
    pub fn none() -> Self {
        Self {
            confidence: 0.0,
            grounded: false,
        }
    }
}

/// Score a ranked match list with the default threshold.
pub fn score(matches: &[RankedMatch]) -> Grounding {
    score_with_threshold(matches, GROUNDED_THRESHOLD)
}

/// Score a ranked match list against a caller-chosen threshold.
///
/// `confidence = 75·top/(top+2.5) + 25·(top−second)/top`, clamped to
/// `[0, 100]`; monotonic in both the top score and the separation.
pub fn score_with_threshold(matches: &[RankedMatch], threshold: f64) -> Grounding {
    let Some(top) = matches.first().map(|m| m.relevance_score) else {
        return Grounding::none();
    };
    if top <= 0.0 {
        return Grounding::none();
    }
    let second = matches
        .get(1)
        .map(|m| m.relevance_score.max(0.0))
        .unwrap_or(0.0);

    let base = BASE_WEIGHT * top / (top + SATURATION);
    let separation = GAP_WEIGHT * (top - second).max(0.0) / top;
    let confidence = (base + separation).clamp(0.0, 100.0);

    Grounding {
        confidence,
        grounded: confidence > threshold,
    }
}
