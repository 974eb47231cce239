//! Linear stretch of a map to 0..=255 for display.
//!
//! `out = 255 * (v - min) / (max - min)` with integer division. A flat map
//! (`max == min`) carries no contrast and maps every pixel to 0.

use crate::image::{DisparityMap, GrayImage, OwnedImage, RgbaImage};
use crate::trace::{trace_event, trace_span};
use crate::util::StereoResult;

/// Stretches `values` to 0..=255.
fn stretch<T: Copy + Into<u32>>(values: &[T]) -> Vec<u8> {
    let Some((min, max)) = values.iter().fold(None, |acc: Option<(u32, u32)>, &v| {
        let v: u32 = v.into();
        Some(match acc {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        })
    }) else {
        return Vec::new();
    };
    trace_event!("normalize_range", min = min, max = max);
    if max == min {
        return vec![0; values.len()];
    }
    let span = u64::from(max - min);
    values
        .iter()
        .map(|&v| {
            let v: u32 = v.into();
            (255 * u64::from(v - min) / span) as u8
        })
        .collect()
}

fn stretch_image<T: Copy + Into<u32>>(image: &OwnedImage<T>) -> StereoResult<GrayImage> {
    let _span = trace_span!("normalize", width = image.width(), height = image.height()).entered();
    GrayImage::new(stretch(image.data()), image.width(), image.height())
}

/// Normalizes a disparity map to a single-channel 8-bit image.
pub fn normalize(map: &DisparityMap) -> StereoResult<GrayImage> {
    stretch_image(map)
}

/// Normalizes a disparity map to opaque RGBA with R = G = B.
pub fn normalize_rgba(map: &DisparityMap) -> StereoResult<RgbaImage> {
    normalize(map).map(|gray| RgbaImage::from_gray(&gray))
}

/// Stretches a grayscale image to the full 0..=255 range.
pub fn normalize_gray(gray: &GrayImage) -> StereoResult<GrayImage> {
    stretch_image(gray)
}
