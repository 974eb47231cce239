//! Windowed ZNCC score kernels.
//!
//! A kernel scores one disparity candidate for one reference pixel. The
//! window is centred on `(x, y)` in the reference image and on `(x - d, y)`
//! in the comparison image. Samples falling outside either image are skipped,
//! so the effective window shrinks near the borders; means and variances are
//! taken over the surviving samples only.

use crate::util::{StereoError, StereoResult};
use crate::ImageView;

/// Rectangular correlation window described by its half-extents.
///
/// A window with half-extents `(hx, hy)` covers `(2*hx + 1) x (2*hy + 1)`
/// pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    /// Horizontal half-extent.
    pub half_width: usize,
    /// Vertical half-extent.
    pub half_height: usize,
}

impl Window {
    /// Creates a window from half-extents.
    pub fn new(half_width: usize, half_height: usize) -> Self {
        Self {
            half_width,
            half_height,
        }
    }

    /// Creates a window from full, odd extents.
    pub fn from_size(width: usize, height: usize) -> StereoResult<Self> {
        if width == 0 || height == 0 {
            return Err(StereoError::Configuration("window extents must be non-zero"));
        }
        if width % 2 == 0 || height % 2 == 0 {
            return Err(StereoError::Configuration("window extents must be odd"));
        }
        Ok(Self::new(width / 2, height / 2))
    }

    /// Full window width in pixels.
    pub fn width(&self) -> usize {
        2 * self.half_width + 1
    }

    /// Full window height in pixels.
    pub fn height(&self) -> usize {
        2 * self.half_height + 1
    }

    /// Number of pixels in an unclipped window.
    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    /// Fewest in-bounds samples a placement needs to count as fully
    /// supported: half of the window area, rounded up.
    pub fn min_support(&self) -> usize {
        (self.area() + 1) / 2
    }
}

/// Defined ZNCC score of one placement together with its sample count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowScore {
    /// Correlation in `[-1, 1]`.
    pub score: f32,
    /// In-bounds samples the score was computed from.
    pub samples: usize,
}

/// In-bounds sample region for one `(x, y, d)` placement.
///
/// Rows are `y0..=y1`; reference columns are `x0..=x1` and the matching
/// comparison columns are shifted left by `d`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Support {
    pub y0: usize,
    pub y1: usize,
    pub x0: usize,
    pub x1: usize,
    /// First comparison column, `x0 - d`.
    pub cx0: usize,
}

impl Support {
    /// Clips the window at `(x, y)` with disparity `d` against an image of
    /// `width x height`. Returns `None` when no sample survives.
    pub fn clip(
        width: usize,
        height: usize,
        x: usize,
        y: usize,
        d: i32,
        window: Window,
    ) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let y0 = y.saturating_sub(window.half_height);
        let y1 = (y + window.half_height).min(height - 1);

        let w = width as i64;
        let d = i64::from(d);
        let x = x as i64;
        let hx = window.half_width as i64;
        let x0 = (x - hx).max(0).max(d);
        let x1 = (x + hx).min(w - 1).min(w - 1 + d);
        if x0 > x1 || y0 > y1 {
            return None;
        }
        Some(Self {
            y0,
            y1,
            x0: x0 as usize,
            x1: x1 as usize,
            cx0: (x0 - d) as usize,
        })
    }

    /// Number of samples in the region.
    pub fn len(&self) -> usize {
        (self.y1 - self.y0 + 1) * (self.x1 - self.x0 + 1)
    }

    /// Whether the region is empty (never true for a clipped region).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Columns per row.
    pub fn cols(&self) -> usize {
        self.x1 - self.x0 + 1
    }
}

/// Kernel trait for scoring one disparity candidate.
pub trait Kernel {
    /// Returns the ZNCC score for reference pixel `(x, y)` at disparity `d`,
    /// or `None` when the score is undefined (no samples, or a flat window on
    /// either side).
    fn score_at(
        reference: ImageView<'_, u8>,
        comparison: ImageView<'_, u8>,
        x: usize,
        y: usize,
        d: i32,
        window: Window,
    ) -> Option<WindowScore>;
}

/// Sums of the reference and comparison samples in `support`.
#[inline]
pub(crate) fn window_sums(
    reference: ImageView<'_, u8>,
    comparison: ImageView<'_, u8>,
    support: &Support,
) -> Option<(u32, u32)> {
    let cols = support.cols();
    let mut sum_l = 0u32;
    let mut sum_r = 0u32;
    for y in support.y0..=support.y1 {
        let l_row = reference.row(y)?.get(support.x0..support.x0 + cols)?;
        let r_row = comparison.row(y)?.get(support.cx0..support.cx0 + cols)?;
        sum_l += l_row.iter().map(|&v| u32::from(v)).sum::<u32>();
        sum_r += r_row.iter().map(|&v| u32::from(v)).sum::<u32>();
    }
    Some((sum_l, sum_r))
}

/// Final normalisation shared by all kernels.
///
/// The ratio is formed in f64 and clamped to `[-1, 1]`. With
/// `cross == var_l == var_r` (identical windows) the f32 sums square exactly
/// in f64, so a self-match scores exactly 1.
#[inline]
pub(crate) fn finish_score(
    cross: f32,
    var_l: f32,
    var_r: f32,
    samples: usize,
) -> Option<WindowScore> {
    if var_l <= 0.0 || var_r <= 0.0 {
        return None;
    }
    let denom = (f64::from(var_l) * f64::from(var_r)).sqrt();
    let score = f64::from(cross) / denom;
    if !score.is_finite() {
        return None;
    }
    Some(WindowScore {
        score: score.clamp(-1.0, 1.0) as f32,
        samples,
    })
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

/// Kernel used by the matcher for the enabled feature set.
#[cfg(feature = "simd")]
pub type DefaultKernel = simd::ZnccSimd;

/// Kernel used by the matcher for the enabled feature set.
#[cfg(not(feature = "simd"))]
pub type DefaultKernel = scalar::ZnccScalar;

#[cfg(test)]
mod tests {
    use super::{Support, Window};

    #[test]
    fn window_from_size_requires_odd_extents() {
        assert_eq!(Window::from_size(9, 15).unwrap(), Window::new(4, 7));
        assert!(Window::from_size(8, 9).is_err());
        assert!(Window::from_size(0, 9).is_err());
        assert_eq!(Window::new(1, 1).area(), 9);
        assert_eq!(Window::new(1, 1).min_support(), 5);
        assert_eq!(Window::new(4, 7).min_support(), 68);
    }

    #[test]
    fn scores_are_clamped_and_self_match_is_exact() {
        use super::finish_score;
        let exact = finish_score(12.345, 12.345, 12.345, 9).unwrap();
        assert_eq!(exact.score, 1.0);
        assert_eq!(exact.samples, 9);
        let anti = finish_score(-7.0, 7.0, 7.0, 2).unwrap();
        assert_eq!(anti.score, -1.0);
        assert!(finish_score(1.0, 0.0, 3.0, 4).is_none());
    }

    #[test]
    fn support_clips_both_images() {
        let window = Window::new(1, 1);
        // Interior, no shift.
        let s = Support::clip(8, 8, 4, 4, 0, window).unwrap();
        assert_eq!((s.x0, s.x1, s.cx0, s.y0, s.y1), (3, 5, 3, 3, 5));
        // Left border with positive disparity loses the columns below d.
        let s = Support::clip(8, 8, 0, 0, 1, window).unwrap();
        assert_eq!((s.x0, s.x1, s.cx0), (1, 1, 0));
        assert_eq!(s.len(), 2);
        // Negative disparity clips on the right.
        let s = Support::clip(8, 8, 7, 4, -1, window).unwrap();
        assert_eq!((s.x0, s.x1, s.cx0), (6, 6, 7));
        // Nothing survives.
        assert!(Support::clip(8, 8, 0, 4, 2, window).is_none());
        assert!(Support::clip(3, 3, 1, 1, 5, window).is_none());
    }
}
