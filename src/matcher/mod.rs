//! Dense disparity search with windowed ZNCC.
//!
//! For every reference pixel each disparity of the inclusive range is scored
//! and the best one is kept (see [`select`]). The output stores the magnitude
//! of the selected disparity, so a left-reference search over `[0, D]` and a
//! right-reference search over `[-D, 0]` land on the same scale.

pub mod select;

use crate::image::DisparityMap;
use crate::kernel::{DefaultKernel, Kernel, Window};
use crate::trace::{trace_event, trace_span};
use crate::util::rows::fill_rows;
use crate::util::{StereoError, StereoResult};
use crate::ImageView;
use select::BestDisparity;

/// Inclusive disparity search range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisparityRange {
    min: i32,
    max: i32,
}

impl DisparityRange {
    /// Creates the range `[min, max]`.
    pub fn new(min: i32, max: i32) -> StereoResult<Self> {
        if min > max {
            return Err(StereoError::Configuration(
                "disparity range minimum exceeds maximum",
            ));
        }
        Ok(Self { min, max })
    }

    /// Range `[0, max_disparity]` for a left-reference search.
    pub fn left_to_right(max_disparity: u32) -> StereoResult<Self> {
        let max = i32::try_from(max_disparity)
            .map_err(|_| StereoError::Configuration("max disparity out of range"))?;
        Self::new(0, max)
    }

    /// Range `[-max_disparity, 0]` for a right-reference search.
    pub fn right_to_left(max_disparity: u32) -> StereoResult<Self> {
        let max = i32::try_from(max_disparity)
            .map_err(|_| StereoError::Configuration("max disparity out of range"))?;
        Self::new(-max, 0)
    }

    /// Smallest candidate.
    pub fn min(&self) -> i32 {
        self.min
    }

    /// Largest candidate; also the fallback when no score is defined.
    pub fn max(&self) -> i32 {
        self.max
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        (i64::from(self.max) - i64::from(self.min) + 1) as usize
    }

    /// Always false; a range holds at least one candidate.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Candidates in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.min..=self.max
    }
}

/// Configuration for disparity matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Correlation window.
    pub window: Window,
    /// Enable row parallelism (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            window: Window::new(4, 4),
            parallel: true,
        }
    }
}

/// Windowed ZNCC disparity matcher.
#[derive(Clone, Debug, Default)]
pub struct DisparityMatcher {
    cfg: MatchConfig,
}

impl DisparityMatcher {
    /// Creates a matcher with the given window and default settings.
    pub fn new(window: Window) -> Self {
        Self {
            cfg: MatchConfig {
                window,
                ..MatchConfig::default()
            },
        }
    }

    /// Replaces the matcher configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Computes the disparity map of `reference` against `comparison`.
    pub fn compute(
        &self,
        reference: ImageView<'_, u8>,
        comparison: ImageView<'_, u8>,
        range: DisparityRange,
    ) -> StereoResult<DisparityMap> {
        self.compute_with::<DefaultKernel>(reference, comparison, range)
    }

    /// Computes the disparity map with an explicit kernel.
    pub fn compute_with<K: Kernel>(
        &self,
        reference: ImageView<'_, u8>,
        comparison: ImageView<'_, u8>,
        range: DisparityRange,
    ) -> StereoResult<DisparityMap> {
        if reference.dims() != comparison.dims() {
            return Err(StereoError::mismatch(reference.dims(), comparison.dims()));
        }
        let (width, height) = reference.dims();
        let window = self.cfg.window;
        let _span = trace_span!(
            "zncc",
            width,
            height,
            d_min = range.min(),
            d_max = range.max()
        )
        .entered();

        let mut out = vec![0u32; width * height];
        fill_rows(&mut out, width, self.cfg.parallel, |y, row| {
            for (x, dst) in row.iter_mut().enumerate() {
                *dst = best_disparity_at::<K>(reference, comparison, x, y, range, window)
                    .magnitude();
            }
        });

        trace_event!("zncc_done", candidates = range.len(), window_area = window.area());
        DisparityMap::new(out, width, height)
    }
}

/// Searches `range` for reference pixel `(x, y)`.
///
/// Candidates are visited in ascending order. Placements clipped below
/// [`Window::min_support`] samples only win when no better-supported
/// candidate has a defined score. When no candidate has a defined score the
/// range maximum is returned.
pub fn best_disparity_at<K: Kernel>(
    reference: ImageView<'_, u8>,
    comparison: ImageView<'_, u8>,
    x: usize,
    y: usize,
    range: DisparityRange,
    window: Window,
) -> BestDisparity {
    let mut best = BestDisparity::new(range.max(), window.min_support());
    for d in range.iter() {
        best.offer(d, K::score_at(reference, comparison, x, y, d, window));
    }
    best
}
