//! Integer-factor downscaling with RGB to luma conversion.
//!
//! Output pixel `(x, y)` samples the source pixel at
//! `(S*x - 1, S*y - 1)`, except that the first row and column sample source
//! index 0. No low-pass filtering is applied before decimation. Luma uses the
//! Rec. 709 weights and is truncated toward zero.

use crate::image::{GrayImage, RgbaImage};
use crate::trace::{trace_event, trace_span};
use crate::util::rows::fill_rows;
use crate::util::{StereoError, StereoResult};

/// Red luma weight.
pub const LUMA_R: f64 = 0.2126;
/// Green luma weight.
pub const LUMA_G: f64 = 0.7152;
/// Blue luma weight.
pub const LUMA_B: f64 = 0.0722;

/// Converts an RGB triple to 8-bit luma (truncated, alpha ignored).
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = LUMA_R * f64::from(r) + LUMA_G * f64::from(g) + LUMA_B * f64::from(b);
    // The weights sum to 1, so `y` never exceeds 255.
    y as u8
}

/// Source coordinate sampled for output index `i` at scale `factor`.
#[inline]
pub fn source_index(i: usize, factor: usize) -> usize {
    if i > 0 {
        factor * i - 1
    } else {
        0
    }
}

/// Downscales `rgba` by `factor` and converts it to grayscale.
///
/// `factor` must be at least 1 and divide both dimensions exactly.
pub fn scale_gray(rgba: &RgbaImage, factor: usize, parallel: bool) -> StereoResult<GrayImage> {
    if factor == 0 {
        return Err(StereoError::Configuration("scale factor must be at least 1"));
    }
    let (width, height) = rgba.dims();
    if width % factor != 0 || height % factor != 0 {
        return Err(StereoError::ScaleNotDivisible {
            width,
            height,
            factor,
        });
    }

    let out_width = width / factor;
    let out_height = height / factor;
    let _span = trace_span!("scale_gray", factor, out_width, out_height).entered();

    let src = rgba.data();
    let src_stride = width * 4;
    let mut out = vec![0u8; out_width * out_height];
    fill_rows(&mut out, out_width, parallel, |y, row| {
        let sy = source_index(y, factor);
        let src_row = &src[sy * src_stride..(sy + 1) * src_stride];
        for (x, dst) in row.iter_mut().enumerate() {
            let sx = source_index(x, factor) * 4;
            *dst = luma(src_row[sx], src_row[sx + 1], src_row[sx + 2]);
        }
    });

    trace_event!("scale_gray_done", width = out_width, height = out_height);
    GrayImage::new(out, out_width, out_height)
}
