//! SIMD-accelerated ZNCC kernel using the `wide` crate.
//!
//! The clipped window is a contiguous run of columns in every row, so the
//! centred products are accumulated 8 columns at a time in `f32x8` lanes with
//! a scalar tail. Lane sums are reduced in a fixed order, keeping the result
//! independent of how pixels are scheduled across threads.

use crate::kernel::{finish_score, window_sums, Kernel, Support, Window, WindowScore};
use crate::ImageView;
use wide::f32x8;

const LANES: usize = 8;

/// Load 8 u8 values and convert to f32x8.
#[inline]
fn load_u8x8_as_f32x8(slice: &[u8]) -> f32x8 {
    f32x8::from([
        slice[0] as f32,
        slice[1] as f32,
        slice[2] as f32,
        slice[3] as f32,
        slice[4] as f32,
        slice[5] as f32,
        slice[6] as f32,
        slice[7] as f32,
    ])
}

/// Horizontal sum of f32x8.
#[inline]
fn hsum(v: f32x8) -> f32 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3] + arr[4] + arr[5] + arr[6] + arr[7]
}

/// SIMD two-pass ZNCC kernel.
pub struct ZnccSimd;

impl Kernel for ZnccSimd {
    fn score_at(
        reference: ImageView<'_, u8>,
        comparison: ImageView<'_, u8>,
        x: usize,
        y: usize,
        d: i32,
        window: Window,
    ) -> Option<WindowScore> {
        let support = Support::clip(reference.width(), reference.height(), x, y, d, window)?;
        let samples = support.len();
        let n = samples as f32;
        let (sum_l, sum_r) = window_sums(reference, comparison, &support)?;
        let mean_l = sum_l as f32 / n;
        let mean_r = sum_r as f32 / n;
        let mean_l_vec = f32x8::splat(mean_l);
        let mean_r_vec = f32x8::splat(mean_r);

        let cols = support.cols();
        let simd_end = cols / LANES * LANES;

        let mut cross_vec = f32x8::ZERO;
        let mut var_l_vec = f32x8::ZERO;
        let mut var_r_vec = f32x8::ZERO;
        let mut cross_s = 0.0f32;
        let mut var_l_s = 0.0f32;
        let mut var_r_s = 0.0f32;

        for row in support.y0..=support.y1 {
            let l_row = reference.row(row)?.get(support.x0..support.x0 + cols)?;
            let r_row = comparison.row(row)?.get(support.cx0..support.cx0 + cols)?;

            let mut tx = 0;
            while tx < simd_end {
                let cl = load_u8x8_as_f32x8(&l_row[tx..]) - mean_l_vec;
                let cr = load_u8x8_as_f32x8(&r_row[tx..]) - mean_r_vec;
                cross_vec += cl * cr;
                var_l_vec += cl * cl;
                var_r_vec += cr * cr;
                tx += LANES;
            }

            while tx < cols {
                let cl = l_row[tx] as f32 - mean_l;
                let cr = r_row[tx] as f32 - mean_r;
                cross_s += cl * cr;
                var_l_s += cl * cl;
                var_r_s += cr * cr;
                tx += 1;
            }
        }

        finish_score(
            hsum(cross_vec) + cross_s,
            hsum(var_l_vec) + var_l_s,
            hsum(var_r_vec) + var_r_s,
            samples,
        )
    }
}
