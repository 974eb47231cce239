//! Per-pixel best-disparity tracking.
//!
//! Each output pixel owns one `BestDisparity`; nothing is shared between
//! pixels. Candidates are offered in ascending disparity order and ranked in
//! two tiers: placements with at least `min_support` in-bounds samples
//! outrank border placements clipped below it, whatever their scores. Within
//! a tier only a strictly greater score replaces the current best, so ties
//! keep the first candidate. Undefined scores, and scores not above
//! [`SCORE_FLOOR`], are never selected.

use crate::kernel::WindowScore;

/// Score a candidate must strictly exceed to be selectable.
pub const SCORE_FLOOR: f32 = -1.0;

/// Running best candidate for a single pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BestDisparity {
    disparity: i32,
    score: f32,
    supported: bool,
    min_support: usize,
}

impl BestDisparity {
    /// Starts a search whose fallback, when no candidate is selectable, is
    /// `fallback`. Candidates with fewer than `min_support` samples form the
    /// lower tier.
    pub fn new(fallback: i32, min_support: usize) -> Self {
        Self {
            disparity: fallback,
            score: SCORE_FLOOR,
            supported: false,
            min_support,
        }
    }

    /// Offers candidate `d`; returns `true` if it became the new best.
    #[inline]
    pub fn offer(&mut self, d: i32, candidate: Option<WindowScore>) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        if !improves(Some(candidate.score), SCORE_FLOOR) {
            return false;
        }
        let supported = candidate.samples >= self.min_support;
        let wins = match (supported, self.supported) {
            (true, false) => true,
            (false, true) => false,
            _ => improves(Some(candidate.score), self.score),
        };
        if wins {
            self.disparity = d;
            self.score = candidate.score;
            self.supported = supported;
        }
        wins
    }

    /// Selected disparity (signed).
    pub fn disparity(&self) -> i32 {
        self.disparity
    }

    /// Best score seen, or the floor when nothing qualified.
    pub fn score(&self) -> f32 {
        self.score
    }

    /// Whether the selected candidate meets the support minimum.
    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Selected disparity magnitude.
    pub fn magnitude(&self) -> u32 {
        self.disparity.unsigned_abs()
    }
}

/// Whether `candidate` strictly beats `best`. Undefined and NaN scores never
/// do.
#[inline]
pub fn improves(candidate: Option<f32>, best: f32) -> bool {
    match candidate {
        Some(score) if !score.is_nan() => score > best,
        _ => false,
    }
}
