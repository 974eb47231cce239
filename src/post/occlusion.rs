//! Occlusion filling by expanding ring search.
//!
//! A hole (zero) takes the value of the first non-zero pixel met while
//! searching rings of growing Chebyshev radius `1..=neighborhood / 2`. Donors
//! are read from the input map only, so filled values never propagate and
//! pixels can be processed in any order.
//!
//! Within a ring, cells are visited column by column from left to right, and
//! top to bottom within each column (see [`ring_offsets`]). This order decides
//! the donor when several non-zero pixels share the smallest radius.

use crate::image::DisparityMap;
use crate::trace::{trace_event, trace_span};
use crate::util::rows::fill_rows;
use crate::util::StereoResult;

/// Offsets `(dx, dy)` of the ring at Chebyshev radius `ext`, in search order.
///
/// `dx` runs from `-ext` to `ext`; for each `dx`, `dy` runs from `-ext` to
/// `ext`. Only cells with `max(|dx|, |dy|) == ext` are produced.
pub fn ring_offsets(ext: usize) -> impl Iterator<Item = (isize, isize)> {
    let ext = ext as isize;
    (-ext..=ext).flat_map(move |dx| {
        let edge = dx.abs() == ext;
        (-ext..=ext)
            .filter(move |dy| edge || dy.abs() == ext)
            .map(move |dy| (dx, dy))
    })
}

/// Fills holes with the nearest non-zero value within `neighborhood / 2`.
///
/// Holes with no donor in range stay 0.
pub fn fill_occlusions(
    map: &DisparityMap,
    neighborhood: usize,
    parallel: bool,
) -> StereoResult<DisparityMap> {
    let (width, height) = map.dims();
    // Rings beyond the image extent are empty.
    let radius = (neighborhood / 2).min(width.max(height));
    let _span = trace_span!("occlusion_fill", radius).entered();
    trace_event!("occlusion_fill_start", holes = map.hole_count());

    let src = map.data();
    let mut out = src.to_vec();
    fill_rows(&mut out, width, parallel, |y, row| {
        for (x, dst) in row.iter_mut().enumerate() {
            if *dst == 0 {
                *dst = nearest_donor(src, width, height, x, y, radius).unwrap_or(0);
            }
        }
    });

    let filled = DisparityMap::new(out, width, height)?;
    trace_event!("occlusion_fill_done", holes = filled.hole_count());
    Ok(filled)
}

fn nearest_donor(
    src: &[u32],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
    radius: usize,
) -> Option<u32> {
    for ext in 1..=radius {
        for (dx, dy) in ring_offsets(ext) {
            let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                continue;
            };
            if nx >= width || ny >= height {
                continue;
            }
            let v = src[ny * width + nx];
            if v != 0 {
                return Some(v);
            }
        }
    }
    None
}
